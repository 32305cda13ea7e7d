//! Batch file driver.
//!
//! Finds template files, renders each one and writes the result. Files are
//! processed one after another; a failure is recorded in the report and the
//! driver moves on. Only a fatal store error (the store is unusable) aborts
//! the run, since no later file could be resolved either.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::core::cache::Clock;
use crate::core::constants::STDIN_SENTINEL;
use crate::core::diff::Diff;
use crate::core::interrupt::Interrupt;
use crate::core::resolver::Resolver;
use crate::core::store::SecretStore;
use crate::core::template::{Mode, RenderOutcome, RenderStatus, Renderer, TemplateFormat};
use crate::core::write;
use crate::error::{DriverError, Error, Result, StoreError};

/// Lines of unchanged context shown around each change in a dry-run diff.
const DIFF_CONTEXT: usize = 2;

/// How a run treats files.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Render and diff, but never touch the filesystem.
    pub dry_run: bool,
    /// Show secret values in dry-run diffs.
    pub reveal: bool,
    /// Overwrite existing output files without asking.
    pub force: bool,
    /// Copy existing output files aside before overwriting.
    pub backup: bool,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Unresolved-token policy.
    pub mode: Mode,
    /// Suffixes marking template files.
    pub suffixes: Vec<String>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            reveal: false,
            force: false,
            backup: true,
            recursive: false,
            mode: Mode::Strict,
            suffixes: crate::core::constants::TEMPLATE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Why a file failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Auto-detection found several syntaxes.
    Ambiguous(Vec<TemplateFormat>),
    /// Tokens could not be resolved under strict mode.
    Unresolved {
        missing: Vec<String>,
        failed: Vec<String>,
    },
    /// The input could not be read.
    Read(String),
    /// The output could not be written; the input is untouched.
    Write(String),
    /// The output exists and overwriting was declined.
    OutputExists,
}

impl Failure {
    /// Short error kind for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Failure::Ambiguous(_) => "ambiguous",
            Failure::Unresolved { missing, .. } if !missing.is_empty() => "not found",
            Failure::Unresolved { .. } => "lookup failed",
            Failure::Read(_) => "read error",
            Failure::Write(_) => "write error",
            Failure::OutputExists => "output exists",
        }
    }

    /// Human readable detail.
    pub fn detail(&self) -> String {
        match self {
            Failure::Ambiguous(formats) => format!(
                "found {}; pass --format to choose",
                formats.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
            ),
            Failure::Unresolved { missing, failed } => {
                let mut parts = Vec::new();
                if !missing.is_empty() {
                    parts.push(format!("missing {}", missing.join(", ")));
                }
                if !failed.is_empty() {
                    parts.push(format!("failed {}", failed.join(", ")));
                }
                parts.join("; ")
            }
            Failure::Read(e) | Failure::Write(e) => e.clone(),
            Failure::OutputExists => "use --force to overwrite".to_string(),
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Output written, with the backup path if one was made.
    Written { backup: Option<PathBuf> },
    /// Output already had the rendered content.
    Unchanged,
    /// Dry run: the diff that would be applied.
    Previewed { diff: String },
    /// The file contains no tokens.
    NoTemplate,
    /// Not processed because the run was interrupted.
    Skipped,
    Failed(Failure),
}

/// Per-file result.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub status: FileStatus,
    pub format: Option<TemplateFormat>,
    pub resolved: usize,
    /// Unresolved tokens left in a best-effort render.
    pub warnings: Vec<String>,
}

impl FileReport {
    fn new(input: &Path, output: &Path, status: FileStatus) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            status,
            format: None,
            resolved: 0,
            warnings: Vec::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, FileStatus::Failed(_))
    }
}

/// Aggregate result of a run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub interrupted: bool,
}

impl BatchReport {
    /// Files that did not fail (skipped files excluded).
    pub fn succeeded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !f.is_failure() && f.status != FileStatus::Skipped)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Skipped)
            .count()
    }

    /// Process exit code for this report.
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            crate::core::constants::EXIT_INTERRUPTED
        } else if self.failed() > 0 {
            1
        } else {
            0
        }
    }
}

/// Rendered content for a single in-memory input (stdin).
#[derive(Debug)]
pub struct StreamResult {
    pub report: FileReport,
    /// Content to emit; `None` when the render failed.
    pub content: Option<String>,
}

/// Whether `name` ends with one of `suffixes` and has a stem left over.
fn strip_suffix<'a>(name: &'a str, suffixes: &[String]) -> Option<&'a str> {
    suffixes
        .iter()
        .find_map(|s| name.strip_suffix(s.as_str()).filter(|stem| !stem.is_empty()))
}

/// Output path for a template: the suffix stripped, or the input itself.
pub fn output_path(input: &Path, suffixes: &[String]) -> PathBuf {
    let stripped = input
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|name| strip_suffix(name, suffixes));
    match stripped {
        Some(stem) => input.with_file_name(stem),
        None => input.to_path_buf(),
    }
}

/// Find template files under `path`.
///
/// A file path is returned as is. A directory yields the files carrying a
/// template suffix, sorted by path; `.git` directories are skipped.
///
/// # Errors
///
/// Returns `DriverError::NotFound` if `path` does not exist, or
/// `DriverError::Read` if a directory cannot be walked.
pub fn discover(path: &Path, recursive: bool, suffixes: &[String]) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(DriverError::NotFound(path.to_path_buf()).into());
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let depth = if recursive { usize::MAX } else { 1 };
    let mut found = Vec::new();
    let walker = WalkDir::new(path)
        .max_depth(depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| DriverError::Read {
            path: e.path().unwrap_or(path).to_path_buf(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop")
                }),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_template = entry
            .file_name()
            .to_str()
            .and_then(|name| strip_suffix(name, suffixes))
            .is_some();
        if is_template {
            found.push(entry.into_path());
        }
    }

    debug!(root = %path.display(), count = found.len(), "discovered templates");
    Ok(found)
}

/// Renders files through a resolver.
pub struct Driver<'r, S: SecretStore, C: Clock> {
    resolver: &'r mut Resolver<S, C>,
    renderer: Renderer,
    options: DriverOptions,
    interrupt: Interrupt,
    offline_reason: Option<StoreError>,
}

impl<'r, S: SecretStore, C: Clock> Driver<'r, S, C> {
    pub fn new(resolver: &'r mut Resolver<S, C>, renderer: Renderer, options: DriverOptions) -> Self {
        Self {
            resolver,
            renderer,
            options,
            interrupt: Interrupt::new(),
            offline_reason: None,
        }
    }

    /// Check this flag before each file.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    /// Store error that switched a dry run to an offline preview, if any.
    pub fn offline_reason(&self) -> Option<&StoreError> {
        self.offline_reason.as_ref()
    }

    /// Render every template under `path`.
    ///
    /// `output` applies only when `path` is a single file. `confirm` is asked
    /// before overwriting an existing output that is not the input itself,
    /// unless `force` is set.
    ///
    /// # Errors
    ///
    /// Returns discovery errors and fatal store errors. Per-file problems are
    /// recorded in the report.
    pub fn run_path(
        &mut self,
        path: &Path,
        output: Option<&Path>,
        confirm: &mut dyn FnMut(&Path) -> bool,
    ) -> Result<BatchReport> {
        let inputs = discover(path, self.options.recursive, &self.options.suffixes)?;
        if output.is_some() && path.is_dir() {
            return Err(DriverError::OutputForDirectory(path.to_path_buf()).into());
        }

        let mut report = BatchReport::default();
        for input in inputs {
            let target = match output {
                Some(o) => o.to_path_buf(),
                None => output_path(&input, &self.options.suffixes),
            };

            if self.interrupt.is_set() {
                report.interrupted = true;
                report
                    .files
                    .push(FileReport::new(&input, &target, FileStatus::Skipped));
                continue;
            }

            let file = self.process_file(&input, &target, confirm)?;
            report.files.push(file);
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped(),
            "batch finished"
        );
        Ok(report)
    }

    /// Render in-memory content, such as standard input.
    ///
    /// # Errors
    ///
    /// Returns fatal store errors.
    pub fn run_content(&mut self, label: &Path, content: &str) -> Result<StreamResult> {
        let mut report = FileReport::new(label, label, FileStatus::Unchanged);
        let rendered = self.render(content, &mut report)?;
        let content = match rendered {
            Rendered::Content { output, redacted } if self.options.dry_run => {
                let preview = if self.options.reveal { output } else { redacted };
                let label = label.display().to_string();
                let diff = Diff::compute(content, &preview).to_text(&label, &label, DIFF_CONTEXT);
                report.status = FileStatus::Previewed { diff };
                Some(preview)
            }
            Rendered::Content { output, .. } => {
                report.status = FileStatus::Written { backup: None };
                Some(output)
            }
            Rendered::Verbatim => {
                report.status = FileStatus::NoTemplate;
                Some(content.to_string())
            }
            Rendered::Failed => None,
        };
        Ok(StreamResult { report, content })
    }

    /// Write content rendered by [`Driver::run_content`] to a file, with the
    /// same overwrite, backup and unchanged-file rules as batch runs.
    pub fn emit(
        &self,
        output: &Path,
        rendered: &str,
        confirm: &mut dyn FnMut(&Path) -> bool,
    ) -> FileStatus {
        self.write_output(Path::new(STDIN_SENTINEL), output, rendered, confirm)
    }

    fn process_file(
        &mut self,
        input: &Path,
        output: &Path,
        confirm: &mut dyn FnMut(&Path) -> bool,
    ) -> Result<FileReport> {
        let mut report = FileReport::new(input, output, FileStatus::Unchanged);
        debug!(input = %input.display(), output = %output.display(), "processing");

        let content = match fs::read_to_string(input) {
            Ok(c) => c,
            Err(e) => {
                report.status = FileStatus::Failed(Failure::Read(e.to_string()));
                return Ok(report);
            }
        };

        let (rendered, redacted) = match self.render(&content, &mut report)? {
            Rendered::Content { output, redacted } => (output, redacted),
            Rendered::Verbatim => {
                report.status = FileStatus::NoTemplate;
                return Ok(report);
            }
            Rendered::Failed => return Ok(report),
        };

        if self.options.dry_run {
            let preview = if self.options.reveal { &rendered } else { &redacted };
            let diff = Diff::compute(&content, preview).to_text(
                &input.display().to_string(),
                &output.display().to_string(),
                DIFF_CONTEXT,
            );
            report.status = FileStatus::Previewed { diff };
            return Ok(report);
        }

        report.status = self.write_output(input, output, &rendered, confirm);
        Ok(report)
    }

    fn write_output(
        &self,
        input: &Path,
        output: &Path,
        rendered: &str,
        confirm: &mut dyn FnMut(&Path) -> bool,
    ) -> FileStatus {
        let exists = output.exists();
        if exists {
            if fs::read_to_string(output).map(|c| c == rendered).unwrap_or(false) {
                return FileStatus::Unchanged;
            }
            if output != input && !self.options.force && !confirm(output) {
                return FileStatus::Failed(Failure::OutputExists);
            }
        }

        let backup = if exists && self.options.backup {
            match write::backup(output) {
                Ok(path) => Some(path),
                Err(e) => {
                    return FileStatus::Failed(Failure::Write(format!(
                        "backup of {} failed: {}",
                        output.display(),
                        e
                    )))
                }
            }
        } else {
            None
        };

        let mode_from = if exists { output } else { input };
        match write::write_atomic(output, rendered, Some(mode_from)) {
            Ok(()) => FileStatus::Written { backup },
            Err(e) => {
                let err = DriverError::Write {
                    path: output.to_path_buf(),
                    source: e,
                };
                FileStatus::Failed(Failure::Write(err.to_string()))
            }
        }
    }

    /// Detect, resolve, and apply the unresolved-token policy.
    ///
    /// A fatal store error aborts the run, except in a dry run: there the
    /// resolver goes offline, remaining lookups resolve as not found, and
    /// the file is rendered again best-effort.
    fn render(&mut self, content: &str, report: &mut FileReport) -> Result<Rendered> {
        let resolver = &mut *self.resolver;
        let outcome = match self.renderer.run(content, |key| resolver.resolve(key)) {
            Ok(outcome) => outcome,
            Err(Error::Store(e)) if self.options.dry_run && !self.resolver.is_offline() => {
                info!(error = %e, "store unusable; previewing without secrets");
                self.resolver.set_offline(true);
                self.options.mode = Mode::BestEffort;
                self.offline_reason = Some(e);
                return self.render(content, report);
            }
            Err(e) => return Err(e),
        };

        let result = match outcome {
            RenderOutcome::NoTemplate => return Ok(Rendered::Verbatim),
            RenderOutcome::Ambiguous(formats) => {
                report.status = FileStatus::Failed(Failure::Ambiguous(formats));
                return Ok(Rendered::Failed);
            }
            RenderOutcome::Rendered(result) => result,
        };

        report.format = Some(result.format());
        report.resolved = result.resolved_count();

        match result.status(self.options.mode) {
            RenderStatus::Failed => {
                report.status = FileStatus::Failed(Failure::Unresolved {
                    missing: result.missing().to_vec(),
                    failed: result.failed().to_vec(),
                });
                Ok(Rendered::Failed)
            }
            RenderStatus::PartialSuccess | RenderStatus::Success => {
                report.warnings = result.unresolved();
                Ok(Rendered::Content {
                    output: result.output().to_string(),
                    redacted: result.redacted().to_string(),
                })
            }
        }
    }
}

enum Rendered {
    Content { output: String, redacted: String },
    Verbatim,
    Failed,
}
