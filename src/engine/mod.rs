//! The conversion engine contract.
//!
//! An engine turns one input file into a glTF JSON document. It never writes
//! files or prints on its own; it goes through the capabilities lent to it in
//! [`ConvertContext`]:
//!
//! ```text
//! engine ──▶ ctx.writer.write_buffer(..)  ──▶ <base>.bin / <base><i>.bin
//!        ──▶ ctx.logger.emit(level, msg)  ──▶ console or captured log
//!        ──▶ Ok(document)                 ──▶ orchestrator writes <base>.gltf
//! ```
//!
//! The context borrows everything for exactly one `convert` call, so an
//! engine cannot hold on to the writer or logger afterwards.
//!
//! The crate ships one engine, [`obj::ObjEngine`]. Tests and embedders can pass
//! any closure with the right signature instead.

pub mod gltf;
pub mod obj;

use crate::config::ConvertOptions;
use crate::error::ConvError;
use crate::logger::Logger;
use crate::writer::BufferWriter;
use serde_json::Value;
use std::path::Path;

pub use obj::ObjEngine;

/// Capabilities and settings lent to an engine for one conversion.
pub struct ConvertContext<'a> {
    /// Engine options resolved from the command line.
    pub options: &'a ConvertOptions,
    /// Where the orchestrator will write the returned document.
    pub output: &'a Path,
    /// Directory for extracted embedded media, if configured.
    pub fbm_dir: Option<&'a Path>,
    /// Persists binary buffers and returns their URIs.
    pub writer: &'a mut dyn BufferWriter,
    /// Diagnostic sink.
    pub logger: &'a mut dyn Logger,
}

/// Converts a source asset into a glTF JSON document.
pub trait ConversionEngine {
    fn convert(&self, input: &Path, ctx: &mut ConvertContext<'_>) -> Result<Value, ConvError>;
}

impl<F> ConversionEngine for F
where
    F: Fn(&Path, &mut ConvertContext<'_>) -> Result<Value, ConvError>,
{
    fn convert(&self, input: &Path, ctx: &mut ConvertContext<'_>) -> Result<Value, ConvError> {
        self(input, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{CaptureLogger, Level, Message};
    use crate::writer::{BufferDescriptor, FileBufferWriter};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn closure_is_an_engine() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("cube.gltf");
        let options = ConvertOptions::default();
        let mut writer = FileBufferWriter::new(&output);
        let mut logger = CaptureLogger::new();

        let engine = |_input: &Path, ctx: &mut ConvertContext<'_>| -> Result<Value, ConvError> {
            let uri = ctx
                .writer
                .write_buffer(BufferDescriptor::new(&[0u8; 12], 0, false))?;
            ctx.logger.emit(Level::Info, Message::from("wrote buffer"));
            Ok(json!({"buffers": [{"byteLength": 12, "uri": uri}]}))
        };

        let mut ctx = ConvertContext {
            options: &options,
            output: &output,
            fbm_dir: None,
            writer: &mut writer,
            logger: &mut logger,
        };
        let doc = engine.convert(Path::new("cube.fbx"), &mut ctx).unwrap();

        assert_eq!(doc["buffers"][0]["uri"], "cube.bin");
        assert_eq!(logger.entries().len(), 1);
    }
}
