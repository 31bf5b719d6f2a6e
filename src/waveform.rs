//! The closed set of waveshapes that can be put into a lookup table.
//!
//! Every waveshape is a pure function of the normalized phase t in [0, 1),
//! returning an amplitude in [-1, 1]. The order of `Waveform::ALL` is the
//! canonical order in which tables are built and written.

use super::{Float, PI};

use serde::{Serialize, Deserialize};

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sin,
    Saw,
    SawRev,
    Tri,
    TriSaw,
    Square,
    RectWide,
    RectNarrow,
}

impl Waveform {
    /// All waveshapes in canonical order.
    pub const ALL: [Waveform; 8] = [
        Waveform::Sin,
        Waveform::Saw,
        Waveform::SawRev,
        Waveform::Tri,
        Waveform::TriSaw,
        Waveform::Square,
        Waveform::RectWide,
        Waveform::RectNarrow,
    ];

    /// Sort a selection of waveshapes into canonical order.
    pub fn canonical_order(selection: &[Waveform]) -> Vec<Waveform> {
        Waveform::ALL.iter()
            .filter(|w| selection.contains(*w))
            .copied()
            .collect()
    }

    /// Short symbolic name, used for array symbols and plot filenames.
    ///
    /// ```
    /// use lutgen::Waveform;
    ///
    /// assert_eq!(Waveform::RectWide.name(), "rect_wide");
    /// ```
    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sin => "sin",
            Waveform::Saw => "saw",
            Waveform::SawRev => "saw_rev",
            Waveform::Tri => "tri",
            Waveform::TriSaw => "tri_saw",
            Waveform::Square => "square",
            Waveform::RectWide => "rect_wide",
            Waveform::RectNarrow => "rect_narrow",
        }
    }

    /// Evaluate the waveshape at phase t.
    ///
    /// t is expected to be in [0, 1). Pulse shapes switch from high to low
    /// exactly at their duty cycle.
    ///
    /// ```
    /// use lutgen::Waveform;
    ///
    /// assert_eq!(Waveform::Saw.evaluate(0.0), -1.0);
    /// assert_eq!(Waveform::Square.evaluate(0.5), -1.0);
    /// ```
    pub fn evaluate(&self, t: Float) -> Float {
        match self {
            Waveform::Sin => (t * 2.0 * PI).sin(),
            Waveform::Saw => 2.0 * t - 1.0,
            Waveform::SawRev => 1.0 - 2.0 * t,
            Waveform::Tri => 4.0 * (t - 0.5).abs() - 1.0,
            Waveform::TriSaw => {
                if t < 0.5 {
                    4.0 * t - 1.0 // rising
                } else {
                    -2.0 * (t - 0.5) // falling
                }
            }
            Waveform::Square => Waveform::pulse(t, 0.5),
            Waveform::RectWide => Waveform::pulse(t, 0.25),
            Waveform::RectNarrow => Waveform::pulse(t, 0.1),
        }
    }

    /// Fraction of the period spent high, for the pulse shapes.
    pub fn duty_cycle(&self) -> Option<Float> {
        match self {
            Waveform::Square => Some(0.5),
            Waveform::RectWide => Some(0.25),
            Waveform::RectNarrow => Some(0.1),
            _ => None,
        }
    }

    fn pulse(t: Float, duty: Float) -> Float {
        if t < duty { 1.0 } else { -1.0 }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[test]
fn values_at_phase_zero() {
    let expected = [0.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0, 1.0];
    for (wave, value) in Waveform::ALL.iter().zip(expected.iter()) {
        assert_eq!(wave.evaluate(0.0), *value, "{}", wave);
    }
}

#[test]
fn sine_hits_extremes_at_quarter_periods() {
    assert!((Waveform::Sin.evaluate(0.25) - 1.0).abs() < 1e-12);
    assert!((Waveform::Sin.evaluate(0.75) + 1.0).abs() < 1e-12);
    assert!(((0.125 * 2.0 * PI).sin() - Waveform::Sin.evaluate(0.125)).abs() < 1e-12);
}

#[test]
fn tri_saw_has_asymmetric_slopes() {
    assert_eq!(Waveform::TriSaw.evaluate(0.25), 0.0);
    assert_eq!(Waveform::TriSaw.evaluate(0.5), 0.0);
    assert_eq!(Waveform::TriSaw.evaluate(0.75), -0.5);
}

#[test]
fn pulses_switch_at_duty_cycle() {
    for wave in Waveform::ALL.iter() {
        if let Some(duty) = wave.duty_cycle() {
            assert_eq!(wave.evaluate(duty - 1e-9), 1.0, "{}", wave);
            assert_eq!(wave.evaluate(duty), -1.0, "{}", wave);
        }
    }
}

#[test]
fn names_match_serde_names() {
    for wave in Waveform::ALL.iter() {
        let json = serde_json::to_string(wave).unwrap();
        assert_eq!(json, format!("\"{}\"", wave.name()));
    }
}
