//! Command-line option resolution.
//!
//! Turns argv (already decoded to UTF-8) into a [`Configuration`]. Anything
//! wrong with the command line is a [`clap::Error`] carrying the usage text;
//! no partial configuration ever escapes.
//!
//! One value is recovered from instead of rejected: an unknown
//! `--unit-conversion` keeps the default mode and is reported back in
//! [`Resolved::warnings`] so the orchestrator can log it like any other
//! diagnostic.

use crate::config::{Configuration, ConvertOptions, UnitConversion};
use crate::convert::ExitStatus;
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert next to the working directory (writes ./model_glTF/model.gltf)
  fbx-gltf-conv model.obj

  # Choose the output document
  fbx-gltf-conv model.obj --out dist/model.gltf

  # Look for textures in extra folders (relative to the input's folder)
  fbx-gltf-conv model.obj --texture-search-locations textures,../shared

  # Machine-readable diagnostics
  fbx-gltf-conv model.obj --log-file build/model.log.json

EXIT CODES:
   0  success
   1  conversion failed; the failure was logged
  -1  invalid command line; nothing was attempted

ENVIRONMENT VARIABLES:
  FBX_GLTF_CONV_FBM_DIR              Default for --fbm-dir
  FBX_GLTF_CONV_LOG_FILE             Default for --log-file
  FBX_GLTF_CONV_ANIMATION_BAKE_RATE  Default for --animation-bake-rate
  FBX_GLTF_CONV_VERBOSE              Default for --verbose
  RUST_LOG                           Internal tracing filter (stderr)
"#;

/// Convert 3D assets to glTF 2.0.
#[derive(Parser, Debug)]
#[command(
    name = "fbx-gltf-conv",
    version,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
pub struct Cli {
    /// Input file.
    #[arg(value_name = "INPUT_FILE")]
    pub input: Option<String>,

    /// The output path to the .gltf file.
    /// Defaults to `<working-directory>/<input-basename>_glTF/<input-basename>.gltf`.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// The directory to store the embedded media.
    #[arg(long, value_name = "DIR", env = "FBX_GLTF_CONV_FBM_DIR")]
    pub fbm_dir: Option<PathBuf>,

    /// Do not flip V texture coordinates.
    #[arg(long)]
    pub no_flip_v: bool,

    /// How to perform unit conversion: geometry-level, hierarchy-level or disabled.
    #[arg(
        long,
        value_name = "MODE",
        default_value = "geometry-level",
        long_help = "How to perform unit conversion.\n  \
          - `geometry-level` Do unit conversion at geometry level.\n  \
          - `hierarchy-level` Do unit conversion at hierarchy level.\n  \
          - `disabled` Disable unit conversion. This may cause the generated \
          glTF doesn't conform to glTF specification."
    )]
    pub unit_conversion: String,

    /// Do not resolve textures.
    #[arg(long)]
    pub no_texture_resolution: bool,

    /// Texture search locations. These paths shall be absolute or relative
    /// to the input file's directory.
    #[arg(long, value_name = "PATHS", value_delimiter = ',', action = ArgAction::Append)]
    pub texture_search_locations: Vec<String>,

    /// Prefer local time spans recorded in the input for animation exporting.
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub prefer_local_time_span: bool,

    /// Animation bake rate (in FPS).
    #[arg(long, value_name = "FPS", env = "FBX_GLTF_CONV_ANIMATION_BAKE_RATE",
          default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    pub animation_bake_rate: u32,

    /// Verbose output.
    #[arg(short, long, env = "FBX_GLTF_CONV_VERBOSE")]
    pub verbose: bool,

    /// Specify the log file (logs are written as JSON). If not specified,
    /// logs are printed to console.
    #[arg(long, value_name = "PATH", env = "FBX_GLTF_CONV_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// A validated configuration plus the recoverable problems found on the way.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub config: Configuration,
    pub warnings: Vec<String>,
}

/// Resolve `args` (including the program name) into a configuration.
pub fn resolve_args<I, T>(args: I) -> Result<Resolved, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    resolve(cli)
}

/// Like [`resolve_args`], but prints the clap error (usage to stderr, help or
/// version to stdout) and maps it to the matching exit status.
pub fn resolve_or_report<I, T>(args: I) -> Result<Resolved, ExitStatus>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    resolve_args(args).map_err(|e| {
        let _ = e.print();
        if e.use_stderr() {
            ExitStatus::UsageError
        } else {
            ExitStatus::Success
        }
    })
}

fn resolve(cli: Cli) -> Result<Resolved, clap::Error> {
    let mut warnings = Vec::new();

    let input = match cli.input {
        Some(ref input) if !input.is_empty() => input.clone(),
        _ => {
            return Err(Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                "Input file not specified.",
            ))
        }
    };

    let unit_conversion = match cli.unit_conversion.parse::<UnitConversion>() {
        Ok(mode) => mode,
        Err(e) => {
            warnings.push(e.to_string());
            UnitConversion::default()
        }
    };

    let locations = resolve_search_locations(Path::new(&input), &cli.texture_search_locations);

    let options = ConvertOptions::builder()
        .flip_v(!cli.no_flip_v)
        .unit_conversion(unit_conversion)
        .texture_resolution_disabled(cli.no_texture_resolution)
        .texture_search_locations(locations)
        .prefer_local_time_span(cli.prefer_local_time_span)
        .animation_bake_rate(cli.animation_bake_rate)
        .verbose(cli.verbose)
        .build()
        .map_err(|e| Cli::command().error(ErrorKind::ValueValidation, e.to_string()))?;

    let mut config = Configuration::new(input, options)
        .map_err(|e| Cli::command().error(ErrorKind::MissingRequiredArgument, e.to_string()))?;
    config.output = cli.out;
    config.fbm_dir = cli.fbm_dir;
    config.log_file = cli.log_file;

    Ok(Resolved { config, warnings })
}

/// Absolute entries pass through; relative ones are joined onto the input
/// file's directory.
fn resolve_search_locations(input: &Path, locations: &[String]) -> Vec<PathBuf> {
    let base = input.parent().unwrap_or_else(|| Path::new(""));
    locations
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| {
            let p = PathBuf::from(l);
            if p.is_absolute() {
                p
            } else {
                base.join(p)
            }
        })
        .collect()
}
