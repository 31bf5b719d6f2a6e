//! Generates waveform lookup tables for firmware synthesizers.
//!
//! Samples a fixed set of waveshapes (sine, saws, triangles, pulses) over one
//! period and writes them as float arrays into a C/C++ header, together with
//! a macro converting a phase into a table index.
//!
//! ```
//! use lutgen::{HeaderWriter, LutConfig, TableBuilder};
//!
//! let config = LutConfig::with_resolution(64);
//! let wt = TableBuilder::from_config(&config).unwrap().build_all(&config).unwrap();
//! let header = HeaderWriter::from_config(&config).render(&wt).unwrap();
//! assert!(header.contains("#define LUTGEN_RESOLUTION 64\n"));
//! ```

mod config;
mod error;
mod generator;
mod header_writer;
mod plotter;
mod table_builder;
mod waveform;
mod wavetable;

pub use config::{FormatPolicy, HeaderLayout, IndexWrap, LutConfig};
pub use config::{DEFAULT_LITERALS_PER_LINE, DEFAULT_RESOLUTION};
pub use error::LutError;
pub use generator::{LutGenerator, RunSummary};
pub use header_writer::HeaderWriter;
pub use plotter::Plotter;
pub use table_builder::TableBuilder;
pub use waveform::Waveform;
pub use wavetable::{phase_index, wrapped_index, Wavetable};

pub type Float = f64;

pub const PI: Float = std::f64::consts::PI;
