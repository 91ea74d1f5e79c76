//! Engine configuration, fixed at construction

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Morph-target translation scheme, chosen once per rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MorphScheme {
    /// One `viseme_*` channel per code; the active code at weight 1.
    #[default]
    Direct,
    /// Shared jaw/mouth blend-shape channels for legacy rigs.
    LegacyBlend,
}

/// Configuration of a [`crate::LipsyncEngine`]. All values are fixed at
/// construction; there is no dynamic reconfiguration mid-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Transform window of the live-stream analyser node, in samples.
    /// Must be a power of two.
    pub fft_size: usize,
    /// Per-bin exponential smoothing of the analyser (0 = instant,
    /// approaching 1 = very smooth). Kept low so quiet speech onsets
    /// register within a frame.
    pub smoothing_time_constant: f32,
    /// Lower edge of the analyser dynamic range.
    pub min_decibels: f32,
    /// Upper edge of the analyser dynamic range.
    pub max_decibels: f32,
    /// Majority-vote window of the temporal smoother, in frames.
    pub smoothing_window: usize,
    /// Below this volume the signal counts as silence.
    pub silence_threshold: f32,
    /// Above this volume the signal counts as speech.
    pub speech_threshold: f32,
    /// Minimum time a published viseme persists before it may change.
    pub min_viseme_hold: Duration,
    /// Morph-target scheme used by weight lookups on this engine.
    pub morph_scheme: MorphScheme,
    /// Tick rate of the built-in frame scheduler.
    pub target_fps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing_time_constant: 0.1,
            min_decibels: -90.0,
            max_decibels: -10.0,
            smoothing_window: 2,
            silence_threshold: 0.001,
            speech_threshold: 0.003,
            min_viseme_hold: Duration::from_millis(30),
            morph_scheme: MorphScheme::Direct,
            target_fps: 60,
        }
    }
}

impl EngineConfig {
    /// History capacity of the temporal smoother.
    pub fn history_capacity(&self) -> usize {
        self.smoothing_window * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.fft_size, 2048);
        assert_eq!(config.smoothing_window, 2);
        assert_eq!(config.history_capacity(), 4);
        assert!((config.silence_threshold - 0.001).abs() < f32::EPSILON);
        assert!((config.speech_threshold - 0.003).abs() < f32::EPSILON);
        assert_eq!(config.min_viseme_hold, Duration::from_millis(30));
        assert_eq!(config.morph_scheme, MorphScheme::Direct);
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"speech_threshold": 0.005, "morph_scheme": "legacy_blend"}"#)
                .unwrap();
        assert!((config.speech_threshold - 0.005).abs() < f32::EPSILON);
        assert_eq!(config.morph_scheme, MorphScheme::LegacyBlend);
        // untouched fields keep their defaults
        assert_eq!(config.fft_size, 2048);
    }
}
