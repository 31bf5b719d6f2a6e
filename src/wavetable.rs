//! A set of sampled waveshapes sharing one resolution.
//!
//! Every table holds exactly one period of its waveshape, sampled at the
//! phases i / N for i in 0..N. There is no duplicated first sample at the
//! end of a table; the index calculation wraps instead.
//!
//! Runtime code looks up a sample by converting a phase into an index with
//! `floor(phase * N) mod N`, see `phase_index`.

use super::{Float, IndexWrap, Waveform};

use log::{debug, info};
use num::Integer;

use std::slice;

#[derive(Debug, Clone, PartialEq)]
pub struct Wavetable {
    pub resolution: usize,                // Number of samples per table (N)
    pub tables: Vec<(Waveform, Vec<Float>)>, // Sample tables in output order
}

impl Wavetable {
    /// Creates a new Wavetable instance with zeroed tables.
    ///
    /// ```
    /// use lutgen::{Wavetable, Waveform};
    ///
    /// let wt = Wavetable::new(&[Waveform::Sin, Waveform::Saw], 1024);
    /// assert_eq!(wt.num_tables(), 2);
    /// assert_eq!(wt.get_table(Waveform::Saw).unwrap().len(), 1024);
    /// ```
    pub fn new(waveforms: &[Waveform], resolution: usize) -> Wavetable {
        debug!("New Wavetable: {} tables with {} samples", waveforms.len(), resolution);
        let tables = waveforms.iter()
            .map(|w| (*w, vec![0.0; resolution]))
            .collect();
        Wavetable { resolution, tables }
    }

    /// Create a Wavetable from already calculated tables.
    ///
    /// The tables are taken as they are. Their lengths are checked when the
    /// table gets written, not here.
    ///
    /// ```
    /// use lutgen::{Wavetable, Waveform};
    ///
    /// let wt = Wavetable::from_tables(4, vec![(Waveform::Square, vec![1.0, 1.0, -1.0, -1.0])]);
    /// assert_eq!(wt.get_table(Waveform::Square).unwrap()[2], -1.0);
    /// ```
    pub fn from_tables(resolution: usize, tables: Vec<(Waveform, Vec<Float>)>) -> Wavetable {
        Wavetable { resolution, tables }
    }

    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }

    /// Waveshapes contained in the table, in output order.
    pub fn waveforms(&self) -> Vec<Waveform> {
        self.tables.iter().map(|(w, _)| *w).collect()
    }

    /// Return the samples of the given waveshape, if it is part of the table.
    pub fn get_table(&self, waveform: Waveform) -> Option<&[Float]> {
        self.tables.iter()
            .find(|(w, _)| *w == waveform)
            .map(|(_, t)| t.as_slice())
    }

    pub fn iter(&self) -> slice::Iter<'_, (Waveform, Vec<Float>)> {
        self.tables.iter()
    }

    /// Fill a single table by sampling the waveshape over one period.
    ///
    /// ```
    /// use lutgen::{Wavetable, Waveform};
    ///
    /// let mut table = vec![0.0; 4];
    /// Wavetable::sample_wave(&mut table, Waveform::Saw);
    /// assert_eq!(table, vec![-1.0, -0.5, 0.0, 0.5]);
    /// ```
    pub fn sample_wave(table: &mut [Float], waveform: Waveform) {
        let num_samples = table.len() as Float;
        for (i, sample) in table.iter_mut().enumerate() {
            *sample = waveform.evaluate(i as Float / num_samples);
        }
    }

    /// Convert a phase into a table index.
    ///
    /// Shorthand for `phase_index` with floor wrapping and this table's
    /// resolution.
    pub fn index(&self, phase: Float) -> usize {
        phase_index(phase, self.resolution)
    }

    /// Look up a sample without interpolation.
    ///
    /// ```
    /// use lutgen::{Wavetable, Waveform};
    ///
    /// let mut wt = Wavetable::new(&[Waveform::Square], 1024);
    /// wt.fill();
    /// assert_eq!(wt.lookup(Waveform::Square, 0.25), Some(1.0));
    /// assert_eq!(wt.lookup(Waveform::Square, 1.75), Some(-1.0));
    /// ```
    pub fn lookup(&self, waveform: Waveform, phase: Float) -> Option<Float> {
        let index = self.index(phase);
        self.get_table(waveform).and_then(|t| t.get(index).copied())
    }

    /// Sample all waveshapes of the table sequentially.
    pub fn fill(&mut self) {
        for (wave, table) in self.tables.iter_mut() {
            info!("Creating table {}", wave);
            Wavetable::sample_wave(table, *wave);
        }
    }
}

/// Convert a phase into an index into a table with the given resolution.
///
/// Calculates floor(phase * N) mod N. The result is always in [0, N), also
/// for negative phases.
///
/// ```
/// use lutgen::phase_index;
///
/// assert_eq!(phase_index(0.5, 1024), 512);
/// assert_eq!(phase_index(1.5, 1024), 512);
/// assert_eq!(phase_index(-0.25, 1024), 768);
/// ```
pub fn phase_index(phase: Float, resolution: usize) -> usize {
    wrapped_index(phase, resolution, IndexWrap::Floor) as usize
}

/// Convert a phase into an index using the given wrapping mode.
///
/// With `IndexWrap::Truncate` this gives the same result as the C expression
/// `(int32_t)(x * N) % N`, which is negative for negative phases.
pub fn wrapped_index(phase: Float, resolution: usize, wrap: IndexWrap) -> i64 {
    let n = resolution as i64;
    let scaled = phase * resolution as Float;
    match wrap {
        IndexWrap::Floor => (scaled.floor() as i64).mod_floor(&n),
        IndexWrap::Truncate => (scaled as i64) % n,
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[test]
fn index_wraps_like_the_header_macro() {
    let n = 1024;
    assert_eq!(phase_index(0.0, n), 0);
    assert_eq!(phase_index(0.5, n), 512);
    assert_eq!(phase_index(0.999, n), 1022); // 1022.976 rounds down
    assert_eq!(phase_index(0.9995, n), 1023);
    assert_eq!(phase_index(1.0, n), 0);
    assert_eq!(phase_index(1.5, n), 512);
}

#[test]
fn negative_phases_use_floor_modulo() {
    let n = 1024;
    assert_eq!(phase_index(-0.5, n), 512);
    assert_eq!(phase_index(-1.0 / 1024.0, n), 1023);
    assert_eq!(phase_index(-0.0001, n), 1023);
    assert_eq!(phase_index(-3.25, n), 768);
}

#[test]
fn truncating_index_matches_c() {
    let n = 1024;
    assert_eq!(wrapped_index(1.5, n, IndexWrap::Truncate), 512);
    assert_eq!(wrapped_index(-0.25, n, IndexWrap::Truncate), -256);
    assert_eq!(wrapped_index(-0.0001, n, IndexWrap::Truncate), 0);
}

#[test]
fn index_is_always_in_range() {
    for n in [1, 3, 100, 1024].iter() {
        let mut phase = -5.0;
        while phase < 5.0 {
            assert!(phase_index(phase, *n) < *n);
            phase += 0.0137;
        }
    }
}

#[test]
fn lookup_of_missing_wave_is_none() {
    let wt = Wavetable::new(&[Waveform::Sin], 16);
    assert_eq!(wt.lookup(Waveform::Tri, 0.0), None);
    assert_eq!(wt.waveforms(), vec![Waveform::Sin]);
}
