//! Error types for the fbx-gltf-conv library.
//!
//! One enum covers every way a run can fail. The variants map one-to-one onto
//! the failure kinds the orchestrator distinguishes when it picks an exit
//! code:
//!
//! * [`ConvError::Argument`]: bad command line or invalid option value;
//!   nothing has been attempted yet.
//! * [`ConvError::DirectoryCreation`]: the destination directory could not
//!   be created.
//! * [`ConvError::Conversion`]: opaque failure reported by the conversion
//!   engine.
//! * [`ConvError::BufferWrite`]: a binary buffer could not be persisted while
//!   the engine was running.
//! * [`ConvError::DocumentWrite`]: the returned document could not be saved.
//! * [`ConvError::LogPersist`]: the captured diagnostics could not be saved.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the fbx-gltf-conv library.
#[derive(Debug, Error)]
pub enum ConvError {
    // ── Usage errors ──────────────────────────────────────────────────────
    /// The command line or an option value was rejected.
    #[error("Invalid arguments: {0}")]
    Argument(String),

    // ── Output layout errors ──────────────────────────────────────────────
    /// Could not create the directory that will hold the output document.
    #[error("Failed to create directories for '{path}': {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// The conversion engine gave up on the input.
    #[error("{0}")]
    Conversion(String),

    /// A binary buffer could not be written.
    #[error("Failed to write buffer '{path}': {source}")]
    BufferWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Persistence errors ────────────────────────────────────────────────
    /// Could not write the output glTF document.
    #[error("Failed to write output file '{path}': {source}")]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the JSON log file.
    #[error("Failed to write log file '{path}': {source}")]
    LogPersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document or log could not be serialised.
    #[error("Failed to serialise JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConvError {
    /// Shorthand for an engine failure with a formatted message.
    pub fn conversion(message: impl Into<String>) -> Self {
        ConvError::Conversion(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn buffer_write_names_path() {
        let e = ConvError::BufferWrite {
            path: PathBuf::from("out/model0.bin"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = e.to_string();
        assert!(msg.contains("out/model0.bin"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }

    #[test]
    fn directory_creation_names_path() {
        let e = ConvError::DirectoryCreation {
            path: PathBuf::from("/ro/model_glTF"),
            source: io::Error::new(io::ErrorKind::Other, "read-only"),
        };
        assert!(e.to_string().contains("/ro/model_glTF"));
    }

    #[test]
    fn conversion_display_is_the_bare_message() {
        let e = ConvError::conversion("unsupported FBX version 6100");
        assert_eq!(e.to_string(), "unsupported FBX version 6100");
    }

    #[test]
    fn serde_error_converts() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: ConvError = err.into();
        assert!(matches!(e, ConvError::Serialize(_)));
    }
}
