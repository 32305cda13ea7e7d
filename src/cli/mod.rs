//! Command-line interface.

pub mod check;
pub mod completions;
pub mod inject;
pub mod output;
pub mod scan;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::core::config::{CliOverrides, Config, EnvOverrides, Settings};
use crate::core::constants;
use crate::core::store::StoreKind;
use crate::core::template::FormatChoice;
use crate::error::Result;

/// dotinject - Inject password-manager secrets into dotfile templates.
#[derive(Parser)]
#[command(
    name = "dotinject",
    about = "Inject password-manager secrets into dotfile templates",
    version,
    after_help = "Formats: ${NAME}  $NAME  {{ op://VAULT/NAME/FIELD }}  %%NAME%%  {{NAME}}"
)]
pub struct Cli {
    /// Enable debug output
    #[arg(
        short,
        long,
        global = true,
        env = constants::ENV_DEBUG,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub verbose: bool,

    /// Config file (default: <config dir>/dotinject/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Render templates, writing secrets into the output files
    Inject(InjectArgs),

    /// List the tokens a template references, without resolving them
    Scan(ScanArgs),

    /// Check that the secret store is reachable and signed in
    Check {
        /// Secret store backend
        #[arg(long, value_enum)]
        store: Option<StoreKind>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by commands that read templates.
#[derive(Args, Debug, Clone, Default)]
pub struct TemplateArgs {
    /// Token syntax, or auto to detect it per file
    #[arg(long, value_enum)]
    pub format: Option<FormatChoice>,

    /// Vault for tokens that do not name one
    #[arg(long)]
    pub vault: Option<String>,

    /// Field for tokens that do not name one
    #[arg(long)]
    pub field: Option<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,
}

/// `inject` arguments.
#[derive(Args, Debug, Clone)]
pub struct InjectArgs {
    /// Template file or directory, or - for standard input
    pub path: PathBuf,

    /// Output file (single file or stdin input only)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub template: TemplateArgs,

    /// Secret store backend
    #[arg(long, value_enum)]
    pub store: Option<StoreKind>,

    /// Show what would change without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show secret values in dry-run diffs
    #[arg(long, requires = "dry_run")]
    pub reveal: bool,

    /// Back up files before overwriting them (default)
    #[arg(long, overrides_with = "no_backup")]
    pub backup: bool,

    /// Do not back up files before overwriting them
    #[arg(long)]
    pub no_backup: bool,

    /// Overwrite existing output files without asking
    #[arg(short, long)]
    pub force: bool,

    /// Leave unresolved tokens in place instead of failing
    #[arg(long)]
    pub best_effort: bool,

    /// Seconds a looked-up secret stays cached
    #[arg(long, value_name = "SECS")]
    pub cache_ttl: Option<u64>,

    /// Disable the lookup cache
    #[arg(long)]
    pub no_cache: bool,

    /// Seconds to wait for each store lookup
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl InjectArgs {
    fn overrides(&self) -> CliOverrides {
        let backup = match (self.backup, self.no_backup) {
            (_, true) => Some(false),
            (true, false) => Some(true),
            (false, false) => None,
        };
        CliOverrides {
            store: self.store,
            vault: self.template.vault.clone(),
            field: self.template.field.clone(),
            format: self.template.format,
            cache_ttl: self.cache_ttl,
            no_cache: self.no_cache,
            timeout: self.timeout,
            backup,
        }
    }
}

/// `scan` arguments.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Template file or directory, or - for standard input
    pub path: PathBuf,

    #[command(flatten)]
    pub template: TemplateArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Merge config file, environment and flags.
pub fn load_settings(config: Option<&Path>, cli: &CliOverrides) -> Result<Settings> {
    let file = Config::load(config)?;
    let env = EnvOverrides::from_env()?;
    Settings::resolve(&file, &env, cli)
}

/// Execute a command and return the process exit code.
pub fn execute(cli: Cli) -> Result<i32> {
    let config = cli.config.as_deref();

    match cli.command {
        Command::Inject(args) => inject::execute(&args, config),
        Command::Scan(args) => scan::execute(&args, config),
        Command::Check { store } => check::execute(store, config),
        Command::Completions { shell } => completions::execute(shell),
    }
}
