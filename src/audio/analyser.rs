//! Frequency-domain analysis node for live-stream sources
//!
//! The equivalent of an FFT analyser tap: a fixed transform window over
//! the newest samples, bounded per-bin smoothing so the spectrum does
//! not flicker, and a wide dynamic range so quiet speech still
//! registers on the byte scale.

use super::source::LiveStreamHandle;
use super::types::AudioFrame;
use crate::config::EngineConfig;
use crate::error::LipsyncError;
use rustfft::{num_complex::Complex, FftPlanner};
use std::time::Instant;

pub struct AnalyserNode {
    /// FFT planner (reusable)
    planner: FftPlanner<f32>,
    /// FFT input buffer
    input: Vec<Complex<f32>>,
    /// Scratch for the time-domain window
    time_buf: Vec<f32>,
    /// Hann window coefficients
    window: Vec<f32>,
    /// Per-bin magnitudes after time smoothing
    smoothed: Vec<f32>,
    sample_rate: u32,
    fft_size: usize,
    time_constant: f32,
    min_db: f32,
    max_db: f32,
}

impl AnalyserNode {
    /// Allocate an analysis node for the given source sample rate.
    ///
    /// Fails recoverably when the audio subsystem cannot support the
    /// configured transform (zero sample rate, invalid window, empty
    /// dynamic range); the caller stays unbound in that case.
    pub fn new(config: &EngineConfig, sample_rate: u32) -> Result<Self, LipsyncError> {
        if sample_rate == 0 {
            return Err(LipsyncError::SourceBind(
                "analysis context requires a non-zero sample rate".to_string(),
            ));
        }
        if !config.fft_size.is_power_of_two() || config.fft_size < 32 {
            return Err(LipsyncError::SourceBind(format!(
                "invalid transform window: {}",
                config.fft_size
            )));
        }
        if config.min_decibels >= config.max_decibels {
            return Err(LipsyncError::SourceBind(format!(
                "empty dynamic range: {}..{} dB",
                config.min_decibels, config.max_decibels
            )));
        }

        let fft_size = config.fft_size;

        // Pre-compute Hann window
        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / fft_size as f32).cos()))
            .collect();

        Ok(Self {
            planner: FftPlanner::new(),
            input: vec![Complex::new(0.0, 0.0); fft_size],
            time_buf: vec![0.0; fft_size],
            window,
            smoothed: vec![0.0; fft_size / 2],
            sample_rate,
            fft_size,
            time_constant: config.smoothing_time_constant.clamp(0.0, 0.99),
            min_db: config.min_decibels,
            max_db: config.max_decibels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frequency bins per snapshot (half the window).
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Take a frequency-domain snapshot of the source's newest window.
    ///
    /// Always succeeds: a short or empty feed is analyzed as (partial)
    /// silence.
    pub fn snapshot(&mut self, source: &LiveStreamHandle, now: Instant) -> AudioFrame {
        source.copy_latest(&mut self.time_buf);

        // Apply window and copy to input buffer
        for (i, &sample) in self.time_buf.iter().enumerate() {
            self.input[i] = Complex::new(sample * self.window[i], 0.0);
        }

        // Perform FFT (in-place)
        let fft = self.planner.plan_fft_forward(self.fft_size);
        fft.process(&mut self.input);

        // Magnitudes (first half up to Nyquist), smoothed over time,
        // then mapped through dB onto the 0-255 scale
        let scale = 1.0 / self.fft_size as f32;
        let range = self.max_db - self.min_db;
        let tau = self.time_constant;

        let mut bins = Vec::with_capacity(self.bin_count());
        for (k, value) in self.input[..self.fft_size / 2].iter().enumerate() {
            let magnitude = value.norm() * scale;
            let smoothed = tau * self.smoothed[k] + (1.0 - tau) * magnitude;
            self.smoothed[k] = smoothed;

            let db = if smoothed > 0.0 {
                20.0 * smoothed.log10()
            } else {
                f32::NEG_INFINITY
            };
            let normalized = ((db - self.min_db) / range).clamp(0.0, 1.0);
            bins.push((normalized * 255.0).round() as u8);
        }

        AudioFrame {
            bins,
            sample_rate: self.sample_rate,
            timestamp: now,
        }
    }

    /// Drop accumulated smoothing state.
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn sine(frequency: f32, sample_rate: u32, length: usize) -> Vec<f32> {
        (0..length)
            .map(|i| (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn rejects_degenerate_contexts() {
        let config = EngineConfig::default();
        assert!(AnalyserNode::new(&config, 0).is_err());

        let bad_window = EngineConfig {
            fft_size: 1000,
            ..EngineConfig::default()
        };
        assert!(AnalyserNode::new(&bad_window, 48000).is_err());
    }

    #[test]
    fn silence_maps_to_zero_bins() {
        let config = EngineConfig::default();
        let mut analyser = AnalyserNode::new(&config, 48000).unwrap();
        let source = LiveStreamHandle::new(48000, 1);
        source.push_samples(&vec![0.0; 4096]);

        let frame = analyser.snapshot(&source, Instant::now());
        assert_eq!(frame.bin_count(), 1024);
        assert!(frame.bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn empty_feed_is_analyzed_as_silence() {
        let config = EngineConfig::default();
        let mut analyser = AnalyserNode::new(&config, 48000).unwrap();
        let source = LiveStreamHandle::new(48000, 1);

        let frame = analyser.snapshot(&source, Instant::now());
        assert_eq!(frame.bin_count(), 1024);
        assert!(frame.bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn sine_concentrates_energy_in_its_band() {
        let config = EngineConfig::default();
        let mut analyser = AnalyserNode::new(&config, 48000).unwrap();
        let source = LiveStreamHandle::new(48000, 1);
        source.push_samples(&sine(1000.0, 48000, 4096));

        let frame = analyser.snapshot(&source, Instant::now());
        let width = frame.bin_width();

        // 1 kHz lands around bin 42-43 at 48 kHz / 2048
        let peak_region: u8 = frame.bins[(900.0 / width) as usize..(1100.0 / width) as usize]
            .iter()
            .copied()
            .max()
            .unwrap();
        assert!(peak_region > 200, "peak region too quiet: {peak_region}");

        // far-away bins stay near the floor
        let high_region = &frame.bins[(6000.0 / width) as usize..(8000.0 / width) as usize];
        assert!(high_region.iter().all(|&b| b < 50));
    }
}
