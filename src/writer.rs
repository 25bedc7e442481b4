//! Buffer persistence: the engine hands over binary payloads, we put them
//! next to the document and tell it what URI to embed.
//!
//! Buffer files are named after the document:
//!
//! | buffers in run | file names |
//! |----------------|------------|
//! | one            | `<base>.bin` |
//! | several        | `<base>0.bin`, `<base>1.bin`, … |
//!
//! The returned URI is relative to the document's directory and always uses
//! `/` separators so the document stays portable across platforms.

use crate::error::ConvError;
use crate::output::non_empty_parent;
use pathdiff::diff_paths;
use std::fs::File;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// One buffer produced by the engine. Only lives for the duration of the
/// writer call.
#[derive(Debug, Clone, Copy)]
pub struct BufferDescriptor<'a> {
    /// Payload bytes.
    pub data: &'a [u8],
    /// Zero-based buffer index within the run.
    pub index: u32,
    /// Whether the run produces more than one buffer.
    pub multi: bool,
}

impl<'a> BufferDescriptor<'a> {
    pub fn new(data: &'a [u8], index: u32, multi: bool) -> Self {
        Self { data, index, multi }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Persists buffers on behalf of the conversion engine.
pub trait BufferWriter {
    /// Write `buffer` and return the URI the document must reference it by.
    ///
    /// Writing the same index twice overwrites the earlier file.
    fn write_buffer(&mut self, buffer: BufferDescriptor<'_>) -> Result<String, ConvError>;
}

/// Writes buffers as sibling `.bin` files of the output document.
#[derive(Debug, Clone)]
pub struct FileBufferWriter {
    document: PathBuf,
}

impl FileBufferWriter {
    /// Writer for buffers belonging to the document at `document`.
    pub fn new(document: impl Into<PathBuf>) -> Self {
        Self {
            document: document.into(),
        }
    }

    /// The directory buffers are written to and URIs are relative to.
    pub fn document_dir(&self) -> &Path {
        non_empty_parent(&self.document).unwrap_or_else(|| Path::new(""))
    }

    /// `<base>.bin` or `<base><index>.bin`.
    pub fn buffer_file_name(&self, index: u32, multi: bool) -> String {
        let base = self
            .document
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if multi {
            format!("{base}{index}.bin")
        } else {
            format!("{base}.bin")
        }
    }

    /// Full path of the buffer file for `index`.
    pub fn buffer_path(&self, index: u32, multi: bool) -> PathBuf {
        self.document_dir().join(self.buffer_file_name(index, multi))
    }
}

impl BufferWriter for FileBufferWriter {
    fn write_buffer(&mut self, buffer: BufferDescriptor<'_>) -> Result<String, ConvError> {
        let path = self.buffer_path(buffer.index, buffer.multi);
        let write_err = |e: std::io::Error| ConvError::BufferWrite {
            path: path.clone(),
            source: e,
        };

        if let Some(parent) = non_empty_parent(&path) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut file = File::create(&path).map_err(write_err)?;
        file.write_all(buffer.data).map_err(write_err)?;
        file.flush().map_err(write_err)?;

        let uri = relative_uri(self.document_dir(), &path);
        debug!(
            "Wrote buffer {} ({} bytes) as {}",
            buffer.index,
            buffer.len(),
            uri
        );
        Ok(uri)
    }
}

/// Path from directory `from` to `to`, joined with `/`.
///
/// Neither path is touched on disk; `.` and `..` are collapsed lexically
/// first. Both must be absolute or both relative. When no relative path
/// exists (different roots, or `from` climbs above a relative `to`) the
/// target is returned as given.
pub fn relative_uri(from: &Path, to: &Path) -> String {
    let from = collapse_dots(from);
    let to = collapse_dots(to);
    match diff_paths(&to, &from) {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => to_forward_slashes(&rel),
        None => to_forward_slashes(&to),
    }
}

/// Drop `.` components and fold `name/..` pairs. `..` directly under the
/// root stays at the root.
fn collapse_dots(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
