//! Inject command.
//!
//! Renders a template file, a directory of templates, or standard input.

use std::io::{IsTerminal, Read, Write};
use std::path::Path;

use dialoguer::Confirm;

use crate::cli::{load_settings, output, InjectArgs};
use crate::core::cache::SecretCache;
use crate::core::constants::STDIN_SENTINEL;
use crate::core::driver::{BatchReport, Driver, DriverOptions, FileReport, FileStatus};
use crate::core::interrupt::Interrupt;
use crate::core::resolver::Resolver;
use crate::core::store;
use crate::core::template::{Mode, Renderer};
use crate::error::Result;

/// Render templates and return the exit code.
pub fn execute(args: &InjectArgs, config: Option<&Path>) -> Result<i32> {
    let settings = load_settings(config, &args.overrides())?;
    tracing::debug!(store = %settings.store, format = ?settings.format, "inject");

    let backend = store::build(settings.store, settings.timeout);
    let mut resolver = Resolver::new(backend, SecretCache::new(settings.cache));
    let renderer = Renderer::new(settings.defaults.clone(), settings.format);
    let options = DriverOptions {
        dry_run: args.dry_run,
        reveal: args.reveal,
        force: args.force,
        backup: settings.backup,
        recursive: args.template.recursive,
        mode: if args.best_effort {
            Mode::BestEffort
        } else {
            Mode::Strict
        },
        suffixes: settings.suffixes.clone(),
    };

    let mut driver = Driver::new(&mut resolver, renderer, options);
    let mut confirm = confirm_overwrite;
    if args.path.as_os_str() == STDIN_SENTINEL {
        return inject_stdin(&mut driver, args, &mut confirm);
    }

    let interrupt = Interrupt::install()?;
    let mut driver = driver.with_interrupt(interrupt);
    let report = driver.run_path(&args.path, args.output.as_deref(), &mut confirm)?;
    warn_offline(&driver);

    let stats = resolver.cache_stats();
    tracing::debug!(
        hits = stats.hits,
        misses = stats.misses,
        fetches = resolver.fetches(),
        "cache stats"
    );
    print_report(&report);
    Ok(report.exit_code())
}

fn inject_stdin<S, C>(
    driver: &mut Driver<'_, S, C>,
    args: &InjectArgs,
    confirm: &mut dyn FnMut(&Path) -> bool,
) -> Result<i32>
where
    S: store::SecretStore,
    C: crate::core::cache::Clock,
{
    let mut content = String::new();
    std::io::stdin().read_to_string(&mut content)?;

    let result = driver.run_content(Path::new(STDIN_SENTINEL), &content)?;
    warn_offline(driver);
    let mut report = result.report;
    let Some(rendered) = result.content else {
        print_file(&report);
        return Ok(1);
    };

    for warning in &report.warnings {
        output::warn(&format!("unresolved {} left in output", warning));
    }

    if let FileStatus::Previewed { diff } = &report.status {
        output::diff(diff);
        return Ok(0);
    }

    match &args.output {
        Some(path) => {
            report.output = path.clone();
            report.status = driver.emit(path, &rendered, confirm);
            print_file(&report);
            Ok(if report.is_failure() { 1 } else { 0 })
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
            Ok(0)
        }
    }
}

fn warn_offline<S, C>(driver: &Driver<'_, S, C>)
where
    S: store::SecretStore,
    C: crate::core::cache::Clock,
{
    if let Some(e) = driver.offline_reason() {
        output::warn(&format!("{}; previewing without secret values", e));
    }
}

/// Ask before overwriting when someone is there to answer.
fn confirm_overwrite(path: &Path) -> bool {
    if !std::io::stdin().is_terminal() || !console::Term::stderr().is_term() {
        return false;
    }
    Confirm::new()
        .with_prompt(format!("Overwrite {}?", path.display()))
        .default(false)
        .interact()
        .unwrap_or(false)
}

fn print_report(report: &BatchReport) {
    for file in &report.files {
        print_file(file);
    }

    if report.interrupted {
        output::warn("interrupted; remaining files were not processed");
    }

    if report.files.len() > 1 || report.failed() > 0 {
        let mut summary = format!(
            "{} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        if report.skipped() > 0 {
            summary.push_str(&format!(", {} skipped", report.skipped()));
        }
        output::dimmed(&summary);
    }
}

fn print_file(file: &FileReport) {
    let input = output::path(file.input.display());
    let target = output::path(file.output.display());

    match &file.status {
        FileStatus::Written { backup } => {
            let secrets = plural(file.resolved, "secret");
            if file.input == file.output {
                output::success(&format!("{} ({})", target, secrets));
            } else {
                output::success(&format!("{} → {} ({})", input, target, secrets));
            }
            if let Some(backup) = backup {
                output::dimmed(&format!("  backup: {}", backup.display()));
            }
        }
        FileStatus::Unchanged => output::success(&format!("{} unchanged", target)),
        FileStatus::Previewed { diff } => {
            if diff.lines().count() <= 2 {
                output::dimmed(&format!("{}: no changes", input));
            } else {
                output::diff(diff);
            }
        }
        FileStatus::NoTemplate => output::dimmed(&format!("{}: no tokens", input)),
        FileStatus::Skipped => output::warn(&format!("{}: skipped", input)),
        FileStatus::Failed(failure) => {
            output::error(&format!("{}: {}: {}", input, failure.kind(), failure.detail()))
        }
    }

    for warning in &file.warnings {
        output::warn(&format!("{}: unresolved {} left in output", input, warning));
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}
