//! Spectrum analyzer: turns a window of recent mono samples into a handful of
//! smoothed, normalized band levels for the visualizer.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use tracing::warn;

/// Multiplier applied to every band when no audio is available.
const DECAY: f64 = 0.8;
const ATTACK_NEW: f64 = 0.6;
const RELEASE_NEW: f64 = 0.25;

/// Band layout and transform size.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumConfig {
    pub sample_rate: u32,
    /// FFT size in samples. Longer inputs are truncated, shorter ones zero-padded.
    pub window: usize,
    /// Band edges in Hz; `edges.len() - 1` bands.
    pub edges: Vec<f64>,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            window: 2048,
            edges: vec![
                20.0, 100.0, 200.0, 400.0, 800.0, 1_600.0, 3_200.0, 6_400.0, 12_800.0, 16_000.0,
                20_000.0,
            ],
        }
    }
}

impl SpectrumConfig {
    pub fn bands(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }
}

pub struct SpectrumAnalyzer {
    config: SpectrumConfig,
    fft: Arc<dyn RealToComplex<f64>>,
    hann: Vec<f64>,
    input: Vec<f64>,
    spectrum: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
    /// Inclusive bin range per band; `None` when the band maps to no bins.
    ranges: Vec<Option<(usize, usize)>>,
    levels: Vec<f64>,
}

impl SpectrumAnalyzer {
    pub fn new(config: SpectrumConfig) -> Self {
        let window = config.window.max(2);
        let fft = RealFftPlanner::<f64>::new().plan_fft_forward(window);
        let hann = (0..window)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / (window - 1) as f64).cos()))
            .collect();
        let ranges = band_ranges(&config.edges, f64::from(config.sample_rate), window);
        let bands = config.bands();

        Self {
            input: fft.make_input_vec(),
            spectrum: fft.make_output_vec(),
            scratch: fft.make_scratch_vec(),
            fft,
            hann,
            ranges,
            levels: vec![0.0; bands],
            config: SpectrumConfig { window, ..config },
        }
    }

    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    /// Current smoothed levels without feeding new audio.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Feed the latest sample window and return the smoothed band levels.
    ///
    /// An empty window decays every band by a fixed factor.
    pub fn analyze(&mut self, samples: &[f64]) -> &[f64] {
        if samples.is_empty() {
            self.decay();
            return &self.levels;
        }

        self.input.fill(0.0);
        let n = samples.len().min(self.input.len());
        self.input[..n].copy_from_slice(&samples[..n]);
        for (x, w) in self.input.iter_mut().zip(&self.hann) {
            *x *= w;
        }

        if let Err(e) =
            self.fft
                .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)
        {
            warn!(error = %e, "fft failed");
            self.decay();
            return &self.levels;
        }

        for (band, range) in self.ranges.iter().enumerate() {
            let mean = match range {
                Some((lo, hi)) => {
                    let bins = &self.spectrum[*lo..=*hi];
                    bins.iter().map(|c| c.norm()).sum::<f64>() / bins.len() as f64
                }
                None => 0.0,
            };
            let level = if mean > 0.0 {
                ((20.0 * mean.log10() + 10.0) / 50.0).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let prev = self.levels[band];
            self.levels[band] = if level > prev {
                level * ATTACK_NEW + prev * (1.0 - ATTACK_NEW)
            } else {
                level * RELEASE_NEW + prev * (1.0 - RELEASE_NEW)
            };
        }
        &self.levels
    }

    /// Forget all smoothing history.
    pub fn reset(&mut self) {
        self.levels.fill(0.0);
    }

    fn decay(&mut self) {
        for level in &mut self.levels {
            *level *= DECAY;
        }
    }
}

impl fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("config", &self.config)
            .field("levels", &self.levels)
            .finish()
    }
}

/// Map band edges to inclusive FFT bin ranges. Bin 0 (DC) and the top bin
/// are never used.
fn band_ranges(edges: &[f64], sample_rate: f64, window: usize) -> Vec<Option<(usize, usize)>> {
    let bin_hz = sample_rate / window as f64;
    let top = (window / 2).saturating_sub(1);
    edges
        .windows(2)
        .map(|pair| {
            let lo = ((pair[0] / bin_hz).floor() as usize).max(1);
            let hi = ((pair[1] / bin_hz).floor() as usize).min(top);
            (lo <= hi).then_some((lo, hi))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, amplitude: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / 44_100.0).sin())
            .collect()
    }

    fn argmax(levels: &[f64]) -> usize {
        levels
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, v)| if *v > best.1 { (i, *v) } else { best })
            .0
    }

    #[test]
    fn default_layout_has_ten_bands() {
        let analyzer = SpectrumAnalyzer::new(SpectrumConfig::default());
        assert_eq!(analyzer.levels().len(), 10);
        assert!(analyzer.ranges.iter().all(Option::is_some));
        assert_eq!(analyzer.ranges[0], Some((1, 4)));
        assert_eq!(analyzer.ranges[9].map(|r| r.1), Some(928));
    }

    #[test]
    fn sine_energy_lands_in_its_band() {
        let mut analyzer = SpectrumAnalyzer::new(SpectrumConfig::default());
        let levels = analyzer.analyze(&sine(1_000.0, 0.5, 2048)).to_vec();
        assert_eq!(argmax(&levels), 4);
        assert!(levels[4] > 0.2, "{levels:?}");

        let levels = analyzer.analyze(&sine(150.0, 0.5, 2048)).to_vec();
        assert_eq!(argmax(&levels), 1, "{levels:?}");
    }

    #[test]
    fn empty_input_decays_levels() {
        let mut analyzer = SpectrumAnalyzer::new(SpectrumConfig::default());
        let start = analyzer.analyze(&sine(1_000.0, 0.5, 2048)).to_vec();

        let mut expected = start.clone();
        for _ in 0..5 {
            let levels = analyzer.analyze(&[]);
            for (e, l) in expected.iter_mut().zip(levels) {
                *e *= 0.8;
                assert!((*e - l).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn silence_never_decays_below_zero() {
        let mut analyzer = SpectrumAnalyzer::new(SpectrumConfig::default());
        let levels = analyzer.analyze(&vec![0.0; 2048]);
        assert!(levels.iter().all(|l| *l == 0.0));
    }

    #[test]
    fn levels_stay_in_unit_range() {
        let mut analyzer = SpectrumAnalyzer::new(SpectrumConfig::default());
        let loud: Vec<f64> = (0..2048).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        for _ in 0..20 {
            let levels = analyzer.analyze(&loud);
            assert!(levels.iter().all(|l| (0.0..=1.0).contains(l)), "{levels:?}");
        }
    }

    #[test]
    fn same_input_and_state_give_same_output() {
        let input = sine(440.0, 0.3, 1500);
        let mut a = SpectrumAnalyzer::new(SpectrumConfig::default());
        let mut b = SpectrumAnalyzer::new(SpectrumConfig::default());
        for _ in 0..3 {
            assert_eq!(a.analyze(&input), b.analyze(&input));
        }
    }

    #[test]
    fn rising_levels_attack_faster_than_they_release() {
        let mut analyzer = SpectrumAnalyzer::new(SpectrumConfig::default());
        let loud = sine(1_000.0, 0.5, 2048);
        let first = analyzer.analyze(&loud)[4];
        let raw = first / ATTACK_NEW;

        let second = analyzer.analyze(&loud)[4];
        assert!((second - (raw * 0.6 + first * 0.4)).abs() < 1e-9);

        let quiet = analyzer.analyze(&vec![0.0; 2048])[4];
        assert!((quiet - second * 0.75).abs() < 1e-9);
    }

    #[test]
    fn bands_without_bins_stay_silent() {
        // 689 Hz per bin: the 20-100 Hz band floors to bin 0 on both edges.
        let config = SpectrumConfig {
            window: 64,
            ..SpectrumConfig::default()
        };
        let mut analyzer = SpectrumAnalyzer::new(config);
        assert_eq!(analyzer.ranges[0], None);
        let levels = analyzer.analyze(&sine(60.0, 1.0, 64));
        assert_eq!(levels[0], 0.0);
    }

    #[test]
    fn reset_clears_history() {
        let mut analyzer = SpectrumAnalyzer::new(SpectrumConfig::default());
        analyzer.analyze(&sine(1_000.0, 0.5, 2048));
        analyzer.reset();
        assert!(analyzer.levels().iter().all(|l| *l == 0.0));
    }
}
