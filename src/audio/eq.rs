//! Ten-band peaking equalizer and the built-in preset table.

use biquad::{Biquad, Coefficients, DirectForm1, Hertz, Type};
use tracing::warn;

use super::frames::{Frame, FrameSource};

pub const EQ_BANDS: usize = 10;

/// Centre frequency of each band (Hz).
pub const EQ_FREQS: [f64; EQ_BANDS] = [
    70.0, 180.0, 320.0, 600.0, 1_000.0, 3_000.0, 6_000.0, 12_000.0, 14_000.0, 16_000.0,
];

pub const MIN_EQ_DB: f64 = -12.0;
pub const MAX_EQ_DB: f64 = 12.0;

const BAND_Q: f64 = 1.0;

/// A named 10-band EQ curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqPreset {
    pub name: &'static str,
    pub gains: [f64; EQ_BANDS],
}

pub const PRESETS: [EqPreset; 10] = [
    EqPreset { name: "Flat", gains: [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0] },
    EqPreset { name: "Rock", gains: [5.0, 4.0, 2.0, -1.0, -2.0, 2.0, 4.0, 5.0, 5.0, 5.0] },
    EqPreset { name: "Pop", gains: [-1.0, 2.0, 4.0, 5.0, 4.0, 1.0, -1.0, -1.0, 1.0, 2.0] },
    EqPreset { name: "Jazz", gains: [3.0, 4.0, 2.0, 1.0, -1.0, -1.0, 1.0, 2.0, 3.0, 4.0] },
    EqPreset { name: "Classical", gains: [3.0, 2.0, 1.0, 0.0, -1.0, -1.0, 0.0, 2.0, 3.0, 4.0] },
    EqPreset { name: "Bass Boost", gains: [8.0, 6.0, 4.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0] },
    EqPreset { name: "Treble Boost", gains: [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 3.0, 5.0, 6.0, 7.0] },
    EqPreset { name: "Vocal", gains: [-2.0, -1.0, 1.0, 4.0, 5.0, 4.0, 2.0, 0.0, -1.0, -2.0] },
    EqPreset { name: "Electronic", gains: [6.0, 4.0, 1.0, -1.0, -2.0, 1.0, 3.0, 4.0, 5.0, 6.0] },
    EqPreset { name: "Acoustic", gains: [3.0, 3.0, 2.0, 0.0, 1.0, 2.0, 3.0, 3.0, 2.0, 1.0] },
];

/// Look a preset up by name, ignoring case.
pub fn find_preset(name: &str) -> Option<(usize, &'static EqPreset)> {
    PRESETS
        .iter()
        .enumerate()
        .find(|(_, p)| p.name.eq_ignore_ascii_case(name.trim()))
}

pub fn clamp_gain(db: f64) -> f64 {
    if db.is_nan() {
        return 0.0;
    }
    db.clamp(MIN_EQ_DB, MAX_EQ_DB)
}

/// Left/right filter pair for one band. `None` while the band is flat.
type BandFilters = Option<[DirectForm1<f64>; 2]>;

/// Peaking-filter equalizer stage.
pub struct Equalizer<S> {
    inner: S,
    sample_rate: f64,
    gains: [f64; EQ_BANDS],
    filters: [BandFilters; EQ_BANDS],
}

impl<S> Equalizer<S> {
    pub fn new(inner: S, sample_rate: u32, gains: [f64; EQ_BANDS]) -> Self {
        let mut eq = Self {
            inner,
            sample_rate: f64::from(sample_rate),
            gains: [0.0; EQ_BANDS],
            filters: Default::default(),
        };
        for (band, gain) in gains.into_iter().enumerate() {
            eq.set_gain(band, gain);
        }
        eq
    }

    #[cfg(test)]
    pub fn gains(&self) -> [f64; EQ_BANDS] {
        self.gains
    }

    /// Set one band's gain (clamped). Out-of-range bands are ignored.
    pub fn set_gain(&mut self, band: usize, db: f64) {
        if band >= EQ_BANDS {
            return;
        }
        let db = clamp_gain(db);
        self.gains[band] = db;

        if db == 0.0 {
            self.filters[band] = None;
            return;
        }

        let Some(coeffs) = peaking(self.sample_rate, EQ_FREQS[band], db) else {
            // Above Nyquist for this rate: the band stays bypassed.
            self.filters[band] = None;
            return;
        };
        if let Some(pair) = &mut self.filters[band] {
            for f in pair.iter_mut() {
                f.update_coefficients(coeffs);
            }
        } else {
            self.filters[band] = Some([DirectForm1::<f64>::new(coeffs), DirectForm1::<f64>::new(coeffs)]);
        }
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

fn peaking(sample_rate: f64, freq: f64, db: f64) -> Option<Coefficients<f64>> {
    let fs = Hertz::<f64>::from_hz(sample_rate).ok()?;
    let f0 = Hertz::<f64>::from_hz(freq).ok()?;
    match Coefficients::<f64>::from_params(Type::PeakingEQ(db), fs, f0, BAND_Q) {
        Ok(c) => Some(c),
        Err(e) => {
            warn!(freq, sample_rate, error = ?e, "eq band disabled");
            None
        }
    }
}

impl<S: FrameSource> FrameSource for Equalizer<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let (n, more) = self.inner.stream(frames);
        for [left, right] in self.filters.iter_mut().flatten() {
            for frame in &mut frames[..n] {
                frame[0] = left.run(frame[0]);
                frame[1] = right.run(frame[1]);
            }
        }
        (n, more)
    }
}

impl<S> std::fmt::Debug for Equalizer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Equalizer")
            .field("sample_rate", &self.sample_rate)
            .field("gains", &self.gains)
            .finish()
    }
}
