//! Builds the lookup tables for a generator run.
//!
//! Each waveshape is sampled into its own table. Tables don't depend on each
//! other, so they can be calculated on a thread pool; the resulting
//! Wavetable always lists them in canonical order.

use super::{LutConfig, LutError, Wavetable, Waveform};

use log::{debug, info};
use scoped_threadpool::Pool;

pub struct TableBuilder {
    resolution: usize,
    num_threads: u32,
}

impl TableBuilder {
    /// Create a builder for the given resolution.
    ///
    /// Fails for a resolution of 0.
    ///
    /// ```
    /// use lutgen::TableBuilder;
    ///
    /// assert!(TableBuilder::new(1024).is_ok());
    /// assert!(TableBuilder::new(0).is_err());
    /// ```
    pub fn new(resolution: usize) -> Result<TableBuilder, LutError> {
        if resolution == 0 {
            return Err(LutError::InvalidResolution(resolution));
        }
        Ok(TableBuilder { resolution, num_threads: 1 })
    }

    /// Create a builder using resolution and thread count of a config.
    pub fn from_config(config: &LutConfig) -> Result<TableBuilder, LutError> {
        TableBuilder::new(config.resolution)?.with_threads(config.num_threads)
    }

    /// Set the number of worker threads used to calculate the tables.
    pub fn with_threads(mut self, num_threads: u32) -> Result<TableBuilder, LutError> {
        if num_threads == 0 {
            return Err(LutError::InvalidThreadCount(num_threads));
        }
        self.num_threads = num_threads;
        Ok(self)
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Sample the given waveshapes.
    ///
    /// The waveshapes are reordered into canonical order. An empty or
    /// duplicated selection is rejected before anything is calculated.
    ///
    /// ```
    /// use lutgen::{TableBuilder, Waveform};
    ///
    /// let builder = TableBuilder::new(1024).unwrap();
    /// let wt = builder.build(&Waveform::ALL).unwrap();
    /// assert_eq!(wt.num_tables(), 8);
    /// assert_eq!(wt.get_table(Waveform::Sin).unwrap().len(), 1024);
    /// ```
    pub fn build(&self, waveforms: &[Waveform]) -> Result<Wavetable, LutError> {
        if waveforms.is_empty() {
            return Err(LutError::EmptyWaveformSet);
        }
        for (i, wave) in waveforms.iter().enumerate() {
            if waveforms[..i].contains(wave) {
                return Err(LutError::DuplicateWaveform(*wave));
            }
        }
        let ordered = Waveform::canonical_order(waveforms);
        let mut wt = Wavetable::new(&ordered, self.resolution);
        if self.num_threads == 1 {
            wt.fill();
        } else {
            self.fill_parallel(&mut wt);
        }
        info!("Built {} tables with {} samples", wt.num_tables(), wt.resolution);
        Ok(wt)
    }

    /// Sample the waveshapes selected in the config.
    pub fn build_all(&self, config: &LutConfig) -> Result<Wavetable, LutError> {
        self.build(&config.waveforms)
    }

    // One job per table. Every job owns a disjoint table, so the order in
    // which jobs finish doesn't matter.
    fn fill_parallel(&self, wt: &mut Wavetable) {
        debug!("Calculating tables on {} threads", self.num_threads);
        let mut pool = Pool::new(self.num_threads);
        pool.scoped(|scope| {
            for (wave, table) in wt.tables.iter_mut() {
                let wave = *wave;
                scope.execute(move || {
                    info!("Creating table {}", wave);
                    Wavetable::sample_wave(table, wave);
                });
            }
        });
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
fn build_default(resolution: usize) -> Wavetable {
    TableBuilder::new(resolution).unwrap().build(&Waveform::ALL).unwrap()
}

#[test]
fn tables_have_resolution_length_and_range() {
    for n in [1, 2, 7, 100, 1024].iter() {
        let wt = build_default(*n);
        for (wave, table) in wt.iter() {
            assert_eq!(table.len(), *n, "{}", wave);
            for v in table.iter() {
                assert!(v.is_finite());
                assert!(*v >= -1.0 && *v <= 1.0, "{}: {}", wave, v);
            }
        }
    }
}

#[test]
fn first_sample_is_phase_zero() {
    let wt = build_default(1024);
    let expected = [
        (Waveform::Sin, 0.0),
        (Waveform::Saw, -1.0),
        (Waveform::SawRev, 1.0),
        (Waveform::Tri, 1.0),
        (Waveform::TriSaw, -1.0),
        (Waveform::Square, 1.0),
        (Waveform::RectWide, 1.0),
        (Waveform::RectNarrow, 1.0),
    ];
    for (wave, value) in expected.iter() {
        assert_eq!(wt.get_table(*wave).unwrap()[0], *value, "{}", wave);
    }
}

#[test]
fn last_sample_is_not_a_duplicate_endpoint() {
    let wt = build_default(1024);
    let saw = wt.get_table(Waveform::Saw).unwrap();
    assert_eq!(saw[1023], 2.0 * 1023.0 / 1024.0 - 1.0);
    assert!(saw[1023] < 1.0);
}

#[test]
fn sine_is_inverted_after_half_period() {
    for n in [2, 64, 1024, 1000].iter() {
        let wt = build_default(*n);
        let sin = wt.get_table(Waveform::Sin).unwrap();
        for i in 0..*n {
            let j = (i + n / 2) % n;
            assert!((sin[i] + sin[j]).abs() < 1e-12, "{}: {} vs {}", i, sin[i], sin[j]);
        }
    }
}

#[test]
fn rect_wide_switches_at_quarter() {
    let wt = build_default(1024);
    let rect = wt.get_table(Waveform::RectWide).unwrap();
    assert_eq!(rect[255], 1.0);
    assert_eq!(rect[256], -1.0);
    assert_eq!(rect.iter().filter(|v| **v > 0.0).count(), 256);
}

#[test]
fn rect_narrow_switches_at_tenth() {
    let wt = build_default(1000);
    let rect = wt.get_table(Waveform::RectNarrow).unwrap();
    assert_eq!(rect.iter().filter(|v| **v > 0.0).count(), 100);
}

#[test]
fn output_follows_canonical_order() {
    let builder = TableBuilder::new(16).unwrap();
    let wt = builder.build(&[Waveform::RectNarrow, Waveform::Tri, Waveform::Sin]).unwrap();
    assert_eq!(wt.waveforms(), vec![Waveform::Sin, Waveform::Tri, Waveform::RectNarrow]);
}

#[test]
fn parallel_build_matches_sequential() {
    let sequential = build_default(1024);
    let parallel = TableBuilder::new(1024).unwrap()
        .with_threads(4).unwrap()
        .build(&Waveform::ALL).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn invalid_selection_is_rejected() {
    let builder = TableBuilder::new(16).unwrap();
    assert!(matches!(builder.build(&[]), Err(LutError::EmptyWaveformSet)));
    assert!(matches!(builder.build(&[Waveform::Saw, Waveform::Saw]),
                     Err(LutError::DuplicateWaveform(Waveform::Saw))));
    assert!(matches!(TableBuilder::new(16).unwrap().with_threads(0),
                     Err(LutError::InvalidThreadCount(0))));
}
