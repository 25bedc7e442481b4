//! Configuration types for a conversion run.
//!
//! [`Configuration`] is what the option resolver hands to the orchestrator:
//! where to read, where to write, and the [`ConvertOptions`] forwarded to the
//! conversion engine. Options are built via [`ConvertOptionsBuilder`] so new
//! knobs can be added without breaking callers that only set a few.

use crate::error::ConvError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Everything one run needs, fixed once resolution succeeds.
///
/// # Example
/// ```rust
/// use fbx_gltf_conv::{Configuration, ConvertOptions};
///
/// let config = Configuration::new("scene.fbx", ConvertOptions::default())
///     .unwrap()
///     .with_output("out/scene.gltf")
///     .with_log_file("out/log.json");
/// assert!(config.capture_logs());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Source asset. Never empty.
    pub input: PathBuf,

    /// Destination `.gltf` document. When `None` the output path deriver
    /// picks `<cwd>/<stem>_glTF/<stem>.gltf`.
    pub output: Option<PathBuf>,

    /// Directory the engine extracts embedded media into.
    pub fbm_dir: Option<PathBuf>,

    /// JSON log file. Its presence selects capture-mode logging.
    pub log_file: Option<PathBuf>,

    /// Options forwarded to the conversion engine.
    pub options: ConvertOptions,
}

impl Configuration {
    /// Create a configuration for `input`, rejecting an empty path.
    pub fn new(input: impl Into<PathBuf>, options: ConvertOptions) -> Result<Self, ConvError> {
        let input = input.into();
        if input.as_os_str().is_empty() {
            return Err(ConvError::Argument("Input file not specified.".into()));
        }
        Ok(Self {
            input,
            output: None,
            fbm_dir: None,
            log_file: None,
            options,
        })
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn with_fbm_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.fbm_dir = Some(path.into());
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Whether diagnostics are captured to a JSON log file instead of being
    /// printed.
    pub fn capture_logs(&self) -> bool {
        self.log_file.is_some()
    }
}

/// Knobs the conversion engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Flip the V texture coordinate (`v' = 1 - v`). Default: true.
    pub flip_v: bool,

    /// Where unit conversion is applied. Default: geometry level.
    pub unit_conversion: UnitConversion,

    /// Texture lookup settings.
    pub texture_resolution: TextureResolution,

    /// Prefer time spans recorded locally on animation stacks. Default: true.
    pub prefer_local_time_span: bool,

    /// Animation bake rate in frames per second. Default: 30.
    pub animation_bake_rate: u32,

    /// Emit per-mesh info diagnostics. Default: false.
    pub verbose: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            flip_v: true,
            unit_conversion: UnitConversion::default(),
            texture_resolution: TextureResolution::default(),
            prefer_local_time_span: true,
            animation_bake_rate: 30,
            verbose: false,
        }
    }
}

impl ConvertOptions {
    /// Create a new builder for `ConvertOptions`.
    pub fn builder() -> ConvertOptionsBuilder {
        ConvertOptionsBuilder {
            options: Self::default(),
        }
    }
}

/// Builder for [`ConvertOptions`].
#[derive(Debug)]
pub struct ConvertOptionsBuilder {
    options: ConvertOptions,
}

impl ConvertOptionsBuilder {
    pub fn flip_v(mut self, v: bool) -> Self {
        self.options.flip_v = v;
        self
    }

    pub fn unit_conversion(mut self, mode: UnitConversion) -> Self {
        self.options.unit_conversion = mode;
        self
    }

    pub fn texture_resolution_disabled(mut self, v: bool) -> Self {
        self.options.texture_resolution.disabled = v;
        self
    }

    pub fn texture_search_locations(mut self, locations: Vec<PathBuf>) -> Self {
        self.options.texture_resolution.locations = locations;
        self
    }

    pub fn prefer_local_time_span(mut self, v: bool) -> Self {
        self.options.prefer_local_time_span = v;
        self
    }

    pub fn animation_bake_rate(mut self, fps: u32) -> Self {
        self.options.animation_bake_rate = fps;
        self
    }

    pub fn verbose(mut self, v: bool) -> Self {
        self.options.verbose = v;
        self
    }

    /// Build the options, validating constraints.
    pub fn build(self) -> Result<ConvertOptions, ConvError> {
        if self.options.animation_bake_rate == 0 {
            return Err(ConvError::Argument(
                "Animation bake rate must be ≥ 1 FPS".into(),
            ));
        }
        Ok(self.options)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Where the source's unit scale is folded into the output.
///
/// glTF mandates metres; sources authored in other units must be rescaled
/// somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitConversion {
    /// Bake the scale into vertex data. (default)
    #[default]
    GeometryLevel,
    /// Apply the scale on the root node.
    HierarchyLevel,
    /// Leave units untouched. The output may not conform to glTF.
    Disabled,
}

impl UnitConversion {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitConversion::GeometryLevel => "geometry-level",
            UnitConversion::HierarchyLevel => "hierarchy-level",
            UnitConversion::Disabled => "disabled",
        }
    }
}

impl fmt::Display for UnitConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitConversion {
    type Err = ConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geometry-level" => Ok(UnitConversion::GeometryLevel),
            "hierarchy-level" => Ok(UnitConversion::HierarchyLevel),
            "disabled" => Ok(UnitConversion::Disabled),
            other => Err(ConvError::Argument(format!(
                "Unknown unit conversion option: {other}"
            ))),
        }
    }
}

/// Texture lookup settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureResolution {
    /// Skip texture lookup entirely; references are kept verbatim.
    pub disabled: bool,

    /// Directories searched in order. Relative entries have already been
    /// joined onto the input file's directory.
    pub locations: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let o = ConvertOptions::default();
        assert!(o.flip_v);
        assert_eq!(o.unit_conversion, UnitConversion::GeometryLevel);
        assert!(!o.texture_resolution.disabled);
        assert!(o.texture_resolution.locations.is_empty());
        assert!(o.prefer_local_time_span);
        assert_eq!(o.animation_bake_rate, 30);
        assert!(!o.verbose);
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = Configuration::new("", ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvError::Argument(_)));
    }

    #[test]
    fn capture_follows_log_file() {
        let c = Configuration::new("a.fbx", ConvertOptions::default()).unwrap();
        assert!(!c.capture_logs());
        assert!(c.with_log_file("log.json").capture_logs());
    }

    #[test]
    fn unit_conversion_parses_known_names() {
        for mode in [
            UnitConversion::GeometryLevel,
            UnitConversion::HierarchyLevel,
            UnitConversion::Disabled,
        ] {
            assert_eq!(mode.as_str().parse::<UnitConversion>().unwrap(), mode);
        }
    }

    #[test]
    fn unit_conversion_rejects_unknown_name() {
        let err = "bogus".parse::<UnitConversion>().unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn builder_rejects_zero_bake_rate() {
        assert!(ConvertOptions::builder()
            .animation_bake_rate(0)
            .build()
            .is_err());
    }

    #[test]
    fn builder_sets_fields() {
        let o = ConvertOptions::builder()
            .flip_v(false)
            .unit_conversion(UnitConversion::Disabled)
            .texture_resolution_disabled(true)
            .animation_bake_rate(60)
            .verbose(true)
            .build()
            .unwrap();
        assert!(!o.flip_v);
        assert_eq!(o.unit_conversion, UnitConversion::Disabled);
        assert!(o.texture_resolution.disabled);
        assert_eq!(o.animation_bake_rate, 60);
        assert!(o.verbose);
    }

    #[test]
    fn unit_conversion_serialises_kebab_case() {
        let v = serde_json::to_value(UnitConversion::HierarchyLevel).unwrap();
        assert_eq!(v, serde_json::json!("hierarchy-level"));
    }
}
