//! Error type shared by all stages of a generator run.

use super::Waveform;

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum LutError {
    /// Resolution must be at least one sample per period.
    InvalidResolution(usize),
    EmptyWaveformSet,
    DuplicateWaveform(Waveform),
    InvalidLineWidth(usize),
    InvalidThreadCount(u32),
    ConfigParse(serde_json::Error),
    /// A table handed to the emitter doesn't hold exactly N samples.
    TableLength {
        waveform: Waveform,
        expected: usize,
        actual: usize,
    },
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Plot(image::ImageError),
}

impl LutError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LutError::Io { path: path.into(), source }
    }

    /// True for errors caused by invalid configuration values.
    pub fn is_config_error(&self) -> bool {
        matches!(self,
            LutError::InvalidResolution(_)
            | LutError::EmptyWaveformSet
            | LutError::DuplicateWaveform(_)
            | LutError::InvalidLineWidth(_)
            | LutError::InvalidThreadCount(_)
            | LutError::ConfigParse(_))
    }
}

impl fmt::Display for LutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LutError::InvalidResolution(n) => write!(f, "Invalid resolution {}, need at least 1 sample", n),
            LutError::EmptyWaveformSet => write!(f, "No waveforms selected"),
            LutError::DuplicateWaveform(w) => write!(f, "Waveform {} selected more than once", w),
            LutError::InvalidLineWidth(n) => write!(f, "Invalid number of literals per line: {}", n),
            LutError::InvalidThreadCount(n) => write!(f, "Invalid number of threads: {}", n),
            LutError::ConfigParse(e) => write!(f, "Unable to parse config: {}", e),
            LutError::TableLength { waveform, expected, actual } => write!(f,
                "Table {} has {} samples, expected {}", waveform, actual, expected),
            LutError::Io { path, source } => write!(f, "I/O error on [{}]: {}", path.display(), source),
            LutError::Plot(e) => write!(f, "Unable to render plot: {}", e),
        }
    }
}

impl std::error::Error for LutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LutError::ConfigParse(e) => Some(e),
            LutError::Io { source, .. } => Some(source),
            LutError::Plot(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LutError {
    fn from(e: serde_json::Error) -> Self {
        LutError::ConfigParse(e)
    }
}

impl From<image::ImageError> for LutError {
    fn from(e: image::ImageError) -> Self {
        LutError::Plot(e)
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[test]
fn config_errors_are_classified() {
    assert!(LutError::InvalidResolution(0).is_config_error());
    assert!(LutError::EmptyWaveformSet.is_config_error());
    assert!(!LutError::TableLength { waveform: Waveform::Sin, expected: 4, actual: 3 }.is_config_error());
}

#[test]
fn io_error_names_path() {
    let e = LutError::io("out/luts.hpp", io::Error::new(io::ErrorKind::Other, "disk full"));
    let msg = e.to_string();
    assert!(msg.contains("out/luts.hpp"));
    assert!(msg.contains("disk full"));
}
