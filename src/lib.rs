//! # fbx-gltf-conv
//!
//! Output emission and diagnostics for a 3D asset to glTF 2.0 converter.
//!
//! The heavy lifting (reading the source scene, building the glTF JSON) is
//! done by a [`ConversionEngine`]. This crate owns everything around it: the
//! command line, where files go, how binary buffers are persisted, and how
//! diagnostics reach the user.
//!
//! ## Run Overview
//!
//! ```text
//! argv
//!  │
//!  ├─ 1. Resolve   command line → Configuration           (cli)
//!  ├─ 2. Place     <cwd>/<stem>_glTF/<stem>.gltf or --out  (output)
//!  ├─ 3. Convert   engine + BufferWriter + Logger          (engine, writer, logger)
//!  ├─ 4. Emit      pretty-printed .gltf                    (output)
//!  ├─ 5. Log       JSON array of {level, message}          (output, with --log-file)
//!  └─ 6. Exit      0 / 1 / -1                              (convert)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fbx_gltf_conv::{run, Configuration, ConvertOptions, ExitStatus, ObjEngine};
//!
//! let config = Configuration::new("model.obj", ConvertOptions::default())?
//!     .with_log_file("model.log.json");
//! let status = run(&config, &ObjEngine);
//! assert_eq!(status, ExitStatus::Success);
//! # Ok::<(), fbx_gltf_conv::ConvError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Command-line resolution and the `fbx-gltf-conv` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod logger;
pub mod output;
pub mod writer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    Configuration, ConvertOptions, ConvertOptionsBuilder, TextureResolution, UnitConversion,
};
pub use convert::{run, run_with_logger, ExitStatus};
#[cfg(feature = "cli")]
pub use convert::{run_cli, run_resolved};
pub use engine::{ConversionEngine, ConvertContext, ObjEngine};
pub use error::ConvError;
pub use logger::{CaptureLogger, ConsoleLogger, DiagnosticLogger, Level, LogEntry, Logger, Message};
pub use writer::{BufferDescriptor, BufferWriter, FileBufferWriter};
