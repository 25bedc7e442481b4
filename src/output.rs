//! Output layout: where the document goes, and how files are persisted.
//!
//! Without `--out` the document lands in a fresh folder next to the working
//! directory, named after the input:
//!
//! ```text
//! <cwd>/<stem>_glTF/<stem>.gltf
//! ```
//!
//! Documents and log files are written atomically (temp file in the target
//! directory, then rename) so an interrupted run never leaves a truncated
//! JSON file behind.

use crate::config::Configuration;
use crate::error::ConvError;
use crate::logger::CaptureLogger;
use serde_json::Value;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of the emitted document.
pub const DOCUMENT_EXTENSION: &str = "gltf";

/// Suffix of the folder created for a defaulted destination.
const DEFAULT_DIR_SUFFIX: &str = "_glTF";

/// `<cwd>/<stem>_glTF/<stem>.gltf` for `input`.
pub fn default_output_path(input: &Path, cwd: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    cwd.join(format!("{stem}{DEFAULT_DIR_SUFFIX}"))
        .join(format!("{stem}.{DOCUMENT_EXTENSION}"))
}

/// Resolve the destination document relative to the process working
/// directory and create its parent directories.
pub fn resolve_output_path(config: &Configuration) -> Result<PathBuf, ConvError> {
    let cwd = std::env::current_dir().map_err(|e| ConvError::DirectoryCreation {
        path: PathBuf::from("."),
        source: e,
    })?;
    resolve_output_path_in(config, &cwd)
}

/// Like [`resolve_output_path`] with an explicit working directory.
pub fn resolve_output_path_in(config: &Configuration, cwd: &Path) -> Result<PathBuf, ConvError> {
    let path = match config.output {
        Some(ref out) => out.clone(),
        None => default_output_path(&config.input, cwd),
    };
    if let Some(parent) = non_empty_parent(&path) {
        std::fs::create_dir_all(parent).map_err(|e| ConvError::DirectoryCreation {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    debug!("Output document: {}", path.display());
    Ok(path)
}

/// Serialise `document` with two-space indentation and write it to `path`.
pub fn write_document(path: &Path, document: &Value) -> Result<(), ConvError> {
    let text = serde_json::to_string_pretty(document)?;
    write_atomic(path, text.as_bytes()).map_err(|e| ConvError::DocumentWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("Wrote document {} ({} bytes)", path.display(), text.len());
    Ok(())
}

/// Write every captured diagnostic to `path` as one JSON array.
pub fn write_log(path: &Path, log: &CaptureLogger) -> Result<(), ConvError> {
    let text = log.to_json_pretty()?;
    let persist_err = |e: io::Error| ConvError::LogPersist {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = non_empty_parent(path) {
        std::fs::create_dir_all(parent).map_err(persist_err)?;
    }
    write_atomic(path, text.as_bytes()).map_err(persist_err)?;
    debug!(
        "Wrote {} log entries to {}",
        log.entries().len(),
        path.display()
    );
    Ok(())
}

/// The parent of `path`, or `None` for bare file names.
pub(crate) fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = non_empty_parent(path).unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
