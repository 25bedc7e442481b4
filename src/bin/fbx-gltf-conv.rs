//! CLI binary for fbx-gltf-conv.
//!
//! A thin shim: decode argv, resolve it, set up internal tracing, run the
//! built-in engine and exit with the run's status code.

use anyhow::{anyhow, Result};
use fbx_gltf_conv::cli::{self, Resolved};
use fbx_gltf_conv::{run_resolved, ExitStatus, ObjEngine};
use std::io;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = match utf8_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(ExitStatus::UsageError.code());
        }
    };

    let resolved = match cli::resolve_or_report(args) {
        Ok(resolved) => resolved,
        Err(status) => std::process::exit(status.code()),
    };

    init_tracing(&resolved);

    let status = run_resolved(resolved, &ObjEngine);
    std::process::exit(status.code());
}

/// Arguments must be valid UTF-8; paths are handed on as written.
fn utf8_args() -> Result<Vec<String>> {
    std::env::args_os()
        .map(|arg| {
            arg.into_string()
                .map_err(|raw| anyhow!("argument is not valid UTF-8: {}", raw.to_string_lossy()))
        })
        .collect()
}

fn init_tracing(resolved: &Resolved) {
    // Library diagnostics only; user-facing messages go through the logger.
    let filter = if resolved.config.options.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}
