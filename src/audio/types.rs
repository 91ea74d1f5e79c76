//! Audio types shared across the analysis pipeline

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Frequency bands aligned to vocal-formant ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormantBand {
    /// Fundamental frequency (0-400 Hz)
    #[default]
    Bass,
    /// F1 formant (400-800 Hz)
    LowMid,
    /// F2 formant (800-2000 Hz)
    Mid,
    /// F3 formant (2000-4000 Hz)
    HighMid,
    /// Fricatives and sibilants (4000-8000 Hz)
    High,
}

impl FormantBand {
    /// Get all bands for iteration, in ascending frequency order.
    pub fn all() -> &'static [FormantBand] {
        &[
            FormantBand::Bass,
            FormantBand::LowMid,
            FormantBand::Mid,
            FormantBand::HighMid,
            FormantBand::High,
        ]
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            FormantBand::Bass => "Bass",
            FormantBand::LowMid => "Low Mid",
            FormantBand::Mid => "Mid",
            FormantBand::HighMid => "High Mid",
            FormantBand::High => "High",
        }
    }

    /// Get frequency range (min_hz, max_hz)
    pub fn frequency_range(&self) -> (f32, f32) {
        match self {
            FormantBand::Bass => (0.0, 400.0),
            FormantBand::LowMid => (400.0, 800.0),
            FormantBand::Mid => (800.0, 2000.0),
            FormantBand::HighMid => (2000.0, 4000.0),
            FormantBand::High => (4000.0, 8000.0),
        }
    }
}

/// One frequency-domain snapshot pulled from the bound source.
///
/// Created fresh each tick and discarded after reduction. Magnitudes use
/// the analyser's 0-255 scale, one entry per frequency bin up to Nyquist.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Magnitude per frequency bin (0-255 scale)
    pub bins: Vec<u8>,
    /// Sample rate of the source that produced the snapshot
    pub sample_rate: u32,
    /// Timestamp of this snapshot
    pub timestamp: Instant,
}

impl AudioFrame {
    /// Number of frequency bins.
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Width of one frequency bin in Hz.
    pub fn bin_width(&self) -> f32 {
        if self.bins.is_empty() {
            return 0.0;
        }
        self.sample_rate as f32 / (2.0 * self.bins.len() as f32)
    }
}

/// Normalized energy of the five formant bands.
///
/// The scalars sum to ~1 whenever the frame carries energy, and are all
/// zero for a silent frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandEnergy {
    pub bass: f32,
    pub low_mid: f32,
    pub mid: f32,
    pub high_mid: f32,
    pub high: f32,
}

impl BandEnergy {
    /// Get band value by enum
    pub fn get(&self, band: FormantBand) -> f32 {
        match band {
            FormantBand::Bass => self.bass,
            FormantBand::LowMid => self.low_mid,
            FormantBand::Mid => self.mid,
            FormantBand::HighMid => self.high_mid,
            FormantBand::High => self.high,
        }
    }

    /// Sum across all five bands.
    pub fn total(&self) -> f32 {
        self.bass + self.low_mid + self.mid + self.high_mid + self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_ranges_cover_speech_spectrum() {
        let mut previous_end = 0.0;
        for band in FormantBand::all() {
            let (start, end) = band.frequency_range();
            assert_eq!(start, previous_end, "bands must be contiguous");
            assert!(end > start);
            previous_end = end;
        }
        assert_eq!(previous_end, 8000.0);
    }

    #[test]
    fn bin_width_matches_transform_window() {
        let frame = AudioFrame {
            bins: vec![0; 1024],
            sample_rate: 48000,
            timestamp: Instant::now(),
        };
        // 48 kHz with a 2048-sample window: 48000 / 2048 = 23.4375 Hz
        assert!((frame.bin_width() - 23.4375).abs() < 1e-3);
    }

    #[test]
    fn band_energy_lookup_matches_fields() {
        let energy = BandEnergy {
            bass: 0.5,
            low_mid: 0.2,
            mid: 0.1,
            high_mid: 0.1,
            high: 0.1,
        };
        assert_eq!(energy.get(FormantBand::Bass), 0.5);
        assert_eq!(energy.get(FormantBand::High), 0.1);
        assert!((energy.total() - 1.0).abs() < 1e-6);
    }
}
