//! Settings for a generator run.
//!
//! All values have defaults that reproduce the classic firmware header:
//! 1024 samples per table, 16 literals per line, all eight waveshapes.
//! A JSON file can override any subset of the fields.

use super::{LutError, Waveform};

use log::{debug, info};
use serde::{Serialize, Deserialize};

use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_RESOLUTION: usize = 1024;
pub const DEFAULT_LITERALS_PER_LINE: usize = 16;

/// How the emitted index macro wraps phases outside of [0, 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexWrap {
    /// floor(x * N) mod N, always in [0, N).
    Floor,
    /// C cast and `%`: truncates towards zero, negative for negative phases.
    Truncate,
}

/// Formatting of the sample literals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatPolicy {
    pub precision: usize,         // Digits after the decimal point
    pub suffix: String,           // Type suffix appended to every literal
    pub separator: String,        // Between literals on one line
    pub indent: String,           // Prefix of every literal line
    pub literals_per_line: usize, // Upper bound of literals on one line
}

impl Default for FormatPolicy {
    fn default() -> Self {
        FormatPolicy {
            precision: 10,
            suffix: "f".to_string(),
            separator: ",".to_string(),
            indent: "    ".to_string(),
            literals_per_line: DEFAULT_LITERALS_PER_LINE,
        }
    }
}

/// Text surrounding the tables in the generated header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderLayout {
    pub include_guard: String,
    pub attribute_header: String,
    pub memory_attribute: String,
    pub element_type: String,
    pub symbol_prefix: String,
    pub resolution_macro: String,
    pub index_macro: String,
    pub index_wrap: IndexWrap,
    pub blank_lines_after_table: usize,
}

impl Default for HeaderLayout {
    fn default() -> Self {
        HeaderLayout {
            include_guard: "#pragma once".to_string(),
            attribute_header: "esp_attr.h".to_string(),
            memory_attribute: "IRAM_ATTR".to_string(),
            element_type: "float".to_string(),
            symbol_prefix: "lutgen_".to_string(),
            resolution_macro: "LUTGEN_RESOLUTION".to_string(),
            index_macro: "LUTGEN_INDEX".to_string(),
            index_wrap: IndexWrap::Floor,
            blank_lines_after_table: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LutConfig {
    pub resolution: usize,         // Samples per table, shared by all tables
    pub waveforms: Vec<Waveform>,  // Tables to generate
    pub num_threads: u32,          // Worker threads for table calculation
    pub dest_dir: PathBuf,         // Directory receiving the header
    pub file_name: String,         // Name of the header file
    pub plot_dir: Option<PathBuf>, // Directory for debug plots, None disables plotting
    pub format: FormatPolicy,
    pub layout: HeaderLayout,
}

impl Default for LutConfig {
    fn default() -> Self {
        LutConfig {
            resolution: DEFAULT_RESOLUTION,
            waveforms: Waveform::ALL.to_vec(),
            num_threads: 1,
            dest_dir: PathBuf::from("src/audio/generated"),
            file_name: "luts.hpp".to_string(),
            plot_dir: Some(PathBuf::from("figures")),
            format: FormatPolicy::default(),
            layout: HeaderLayout::default(),
        }
    }
}

impl LutConfig {
    /// Default settings with a different resolution.
    ///
    /// ```
    /// use lutgen::LutConfig;
    ///
    /// let config = LutConfig::with_resolution(256);
    /// assert_eq!(config.resolution, 256);
    /// assert_eq!(config.format.literals_per_line, 16);
    /// ```
    pub fn with_resolution(resolution: usize) -> Self {
        LutConfig { resolution, ..LutConfig::default() }
    }

    /// Read settings from a JSON file.
    ///
    /// Missing fields keep their default values.
    pub fn load(path: &Path) -> Result<LutConfig, LutError> {
        info!("Reading config [{}]", path.display());
        let content = fs::read_to_string(path).map_err(|e| LutError::io(path, e))?;
        LutConfig::from_json(&content)
    }

    /// Parse settings from a JSON string.
    ///
    /// ```
    /// use lutgen::{LutConfig, Waveform};
    ///
    /// let config = LutConfig::from_json(r#"{"resolution": 512, "waveforms": ["sin", "tri"]}"#).unwrap();
    /// assert_eq!(config.resolution, 512);
    /// assert_eq!(config.waveforms, vec![Waveform::Sin, Waveform::Tri]);
    /// ```
    pub fn from_json(content: &str) -> Result<LutConfig, LutError> {
        let config: LutConfig = serde_json::from_str(content)?;
        debug!("Parsed config: {:?}", config);
        Ok(config)
    }

    /// Full path of the generated header.
    pub fn dest_path(&self) -> PathBuf {
        self.dest_dir.join(&self.file_name)
    }

    /// Check all values before any work is done.
    ///
    /// ```
    /// use lutgen::LutConfig;
    ///
    /// assert!(LutConfig::default().validate().is_ok());
    /// assert!(LutConfig::with_resolution(0).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), LutError> {
        if self.resolution == 0 {
            return Err(LutError::InvalidResolution(self.resolution));
        }
        if self.waveforms.is_empty() {
            return Err(LutError::EmptyWaveformSet);
        }
        for (i, wave) in self.waveforms.iter().enumerate() {
            if self.waveforms[..i].contains(wave) {
                return Err(LutError::DuplicateWaveform(*wave));
            }
        }
        if self.format.literals_per_line == 0 {
            return Err(LutError::InvalidLineWidth(self.format.literals_per_line));
        }
        if self.num_threads == 0 {
            return Err(LutError::InvalidThreadCount(self.num_threads));
        }
        Ok(())
    }

    /// Selected waveforms in canonical order.
    pub fn ordered_waveforms(&self) -> Vec<Waveform> {
        Waveform::canonical_order(&self.waveforms)
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[test]
fn partial_json_keeps_defaults() {
    let config = LutConfig::from_json(r#"{"format": {"literals_per_line": 8}, "plot_dir": null}"#).unwrap();
    assert_eq!(config.resolution, DEFAULT_RESOLUTION);
    assert_eq!(config.format.literals_per_line, 8);
    assert_eq!(config.format.precision, 10);
    assert_eq!(config.plot_dir, None);
    assert_eq!(config.layout, HeaderLayout::default());
}

#[test]
fn index_wrap_is_parsed() {
    let config = LutConfig::from_json(r#"{"layout": {"index_wrap": "truncate"}}"#).unwrap();
    assert_eq!(config.layout.index_wrap, IndexWrap::Truncate);
}

#[test]
fn invalid_json_is_config_error() {
    let result = LutConfig::from_json(r#"{"resolution": -4}"#);
    assert!(matches!(result, Err(LutError::ConfigParse(_))));
    let result = LutConfig::from_json(r#"{"waveforms": ["noise"]}"#);
    assert!(matches!(result, Err(LutError::ConfigParse(_))));
}

#[test]
fn invalid_values_are_rejected() {
    let mut config = LutConfig::default();
    config.waveforms.clear();
    assert!(matches!(config.validate(), Err(LutError::EmptyWaveformSet)));

    let mut config = LutConfig::default();
    config.waveforms.push(Waveform::Tri);
    assert!(matches!(config.validate(), Err(LutError::DuplicateWaveform(Waveform::Tri))));

    let mut config = LutConfig::default();
    config.format.literals_per_line = 0;
    assert!(matches!(config.validate(), Err(LutError::InvalidLineWidth(0))));

    let mut config = LutConfig::default();
    config.num_threads = 0;
    assert!(matches!(config.validate(), Err(LutError::InvalidThreadCount(0))));
}

#[test]
fn waveforms_are_ordered_canonically() {
    let mut config = LutConfig::default();
    config.waveforms = vec![Waveform::RectNarrow, Waveform::Sin, Waveform::Tri];
    assert_eq!(config.ordered_waveforms(), vec![Waveform::Sin, Waveform::Tri, Waveform::RectNarrow]);
}

#[test]
fn dest_path_joins_dir_and_file() {
    let config = LutConfig::default();
    assert_eq!(config.dest_path(), PathBuf::from("src/audio/generated/luts.hpp"));
}
