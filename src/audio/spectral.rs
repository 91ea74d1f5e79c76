//! Reduction of a frequency snapshot into band energy and loudness

use super::types::{AudioFrame, BandEnergy, FormantBand};

/// Volume smoothing factor: equal parts current and previous frame,
/// light enough that mouth motion tracks speech onset without lag.
const VOLUME_ALPHA: f32 = 0.5;

/// Per-tick reduction of an [`AudioFrame`] into five normalized band
/// energies and an exponentially smoothed RMS loudness.
///
/// The smoothed volume is the only state; it is reset together with the
/// temporal smoother whenever the bound source changes.
pub struct SpectralAnalyzer {
    prev_volume: f32,
}

impl SpectralAnalyzer {
    pub fn new() -> Self {
        Self { prev_volume: 0.0 }
    }

    pub fn reset(&mut self) {
        self.prev_volume = 0.0;
    }

    /// Exponentially smooth a raw loudness reading.
    pub fn smooth_volume(&mut self, raw: f32) -> f32 {
        let smoothed = self.prev_volume * VOLUME_ALPHA + raw * (1.0 - VOLUME_ALPHA);
        self.prev_volume = smoothed;
        smoothed
    }

    /// Reduce one frame into normalized band energy plus smoothed volume.
    /// Pure apart from the volume smoothing state; a degenerate frame
    /// reduces to all-zero output rather than an error.
    pub fn reduce(&mut self, frame: &AudioFrame) -> (BandEnergy, f32) {
        if frame.is_empty() {
            let volume = self.smooth_volume(0.0);
            return (BandEnergy::default(), volume);
        }

        // RMS across all bins on the [0,1] scale
        let sum_squares: f32 = frame
            .bins
            .iter()
            .map(|&bin| {
                let value = bin as f32 / 255.0;
                value * value
            })
            .sum();
        let raw = (sum_squares / frame.bins.len() as f32).sqrt();
        let volume = self.smooth_volume(raw);

        let resolution = frame.bin_width();
        let bands = FormantBand::all();
        let mut averages = [0.0f32; 5];
        for (i, band) in bands.iter().enumerate() {
            averages[i] = band_average(frame, *band, resolution);
        }

        let total: f32 = averages.iter().sum();
        let energy = if total > 0.0 {
            BandEnergy {
                bass: averages[0] / total,
                low_mid: averages[1] / total,
                mid: averages[2] / total,
                high_mid: averages[3] / total,
                high: averages[4] / total,
            }
        } else {
            BandEnergy::default()
        };

        (energy, volume)
    }
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Average magnitude within a band's bin range, 0 when the range
/// collapses at this sample rate.
fn band_average(frame: &AudioFrame, band: FormantBand, resolution: f32) -> f32 {
    if resolution <= 0.0 {
        return 0.0;
    }
    let (low, high) = band.frequency_range();
    let start = (low / resolution).floor() as usize;
    let end = (((high / resolution).floor()) as usize).min(frame.bins.len());
    if start >= end {
        return 0.0;
    }

    let sum: f32 = frame.bins[start..end]
        .iter()
        .map(|&bin| bin as f32 / 255.0)
        .sum();
    sum / (end - start) as f32
}
