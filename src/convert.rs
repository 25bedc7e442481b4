//! Conversion orchestration.
//!
//! One run is a straight line, no retries:
//!
//! ```text
//! ParseArgs ─▶ ResolveOutputPath ─▶ PrepareCapabilities ─▶ RunConversion
//!                                                              │
//!                                      ┌───────────────────────┴──┐
//!                                      ▼                          ▼
//!                                WriteDocument               WriteLog (capture mode)
//!                                      └──────────▶ Exit ◀────────┘
//! ```
//!
//! Every failure after argument parsing is reported at `fatal` through the
//! active logger and turns the exit status into
//! [`ExitStatus::CapturedFailure`]. The captured log is still written. If
//! writing it fails, that is printed straight to stderr since the logger
//! can no longer help.

use crate::config::Configuration;
use crate::engine::{ConversionEngine, ConvertContext};
use crate::error::ConvError;
use crate::logger::{DiagnosticLogger, Logger, Message};
use crate::output;
use crate::writer::FileBufferWriter;
use std::path::PathBuf;
use tracing::info;

/// Process outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Document (and log, if requested) written.
    Success,
    /// Something failed after the command line was accepted; it was logged.
    CapturedFailure,
    /// The command line was rejected; nothing was attempted.
    UsageError,
}

impl ExitStatus {
    /// `0`, `1` or `-1`.
    pub const fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::CapturedFailure => 1,
            ExitStatus::UsageError => -1,
        }
    }
}

/// Convert with the logger selected by `config` (capture if a log file is
/// configured, console otherwise).
pub fn run(config: &Configuration, engine: &dyn ConversionEngine) -> ExitStatus {
    run_with_logger(config, engine, DiagnosticLogger::for_config(config))
}

/// Convert, reporting through `logger`. The captured log is persisted when
/// `logger` is the capture variant and `config` names a log file.
pub fn run_with_logger(
    config: &Configuration,
    engine: &dyn ConversionEngine,
    mut logger: DiagnosticLogger,
) -> ExitStatus {
    info!("Converting {}", config.input.display());

    let mut status = match convert_and_write(config, engine, &mut logger) {
        Ok(document) => {
            info!("Wrote {}", document.display());
            ExitStatus::Success
        }
        Err(e) => {
            logger.fatal(Message::from(e.to_string()));
            ExitStatus::CapturedFailure
        }
    };

    if let (Some(path), Some(captured)) = (config.log_file.as_deref(), logger.captured()) {
        if let Err(e) = output::write_log(path, captured) {
            eprintln!("{e}");
            status = ExitStatus::CapturedFailure;
        }
    }

    status
}

/// Parse `args`, then run. Usage problems are printed and yield
/// [`ExitStatus::UsageError`] without touching the file system.
#[cfg(feature = "cli")]
pub fn run_cli<I, T>(args: I, engine: &dyn ConversionEngine) -> ExitStatus
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match crate::cli::resolve_or_report(args) {
        Ok(resolved) => run_resolved(resolved, engine),
        Err(status) => status,
    }
}

/// Run a resolved command line. Resolution warnings are emitted first so
/// they land in the captured log too.
#[cfg(feature = "cli")]
pub fn run_resolved(resolved: crate::cli::Resolved, engine: &dyn ConversionEngine) -> ExitStatus {
    tracing::debug!("Resolved configuration: {:?}", resolved.config);
    let mut logger = DiagnosticLogger::for_config(&resolved.config);
    for warning in resolved.warnings {
        logger.warn(Message::from(warning));
    }
    run_with_logger(&resolved.config, engine, logger)
}

fn convert_and_write(
    config: &Configuration,
    engine: &dyn ConversionEngine,
    logger: &mut DiagnosticLogger,
) -> Result<PathBuf, ConvError> {
    let document_path = output::resolve_output_path(config)?;
    let mut writer = FileBufferWriter::new(&document_path);

    let document = {
        let mut ctx = ConvertContext {
            options: &config.options,
            output: &document_path,
            fbm_dir: config.fbm_dir.as_deref(),
            writer: &mut writer,
            logger,
        };
        engine.convert(&config.input, &mut ctx)?
    };

    output::write_document(&document_path, &document)?;
    Ok(document_path)
}
