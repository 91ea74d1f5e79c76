//! Temporal smoothing of raw classifications
//!
//! A minimum hold duration suppresses frame-to-frame chatter, a
//! majority vote stabilizes weak signals, and true silence always wins
//! immediately so the mouth never hangs open after speech stops.

use super::classifier::ClassificationResult;
use super::code::Viseme;
use crate::config::EngineConfig;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Published lip-sync data, recomputed every tick. The previous value
/// remains valid to read between ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedResult {
    pub viseme: Viseme,
    /// Exponentially smoothed loudness in [0,1]
    pub volume: f32,
    /// Whether the signal is above the silence threshold
    pub is_active: bool,
    /// When the signal was last active, if ever
    pub last_active_time: Option<Instant>,
    /// Animation intensity; tracks the smoothed loudness
    pub intensity: f32,
}

impl Default for SmoothedResult {
    fn default() -> Self {
        Self {
            viseme: Viseme::Sil,
            volume: 0.0,
            is_active: false,
            last_active_time: None,
            intensity: 0.0,
        }
    }
}

/// Stateful filter over the raw per-tick classifications.
///
/// Owns the bounded viseme history and change timestamps; reset
/// whenever the bound source changes or the engine is explicitly
/// reset.
pub struct TemporalSmoother {
    /// Recent published visemes, newest last
    history: VecDeque<Viseme>,
    last_change: Option<Instant>,
    last_active: Option<Instant>,
    window: usize,
    capacity: usize,
    silence_threshold: f32,
    speech_threshold: f32,
    min_hold: Duration,
}

impl TemporalSmoother {
    pub fn new(config: &EngineConfig) -> Self {
        let window = config.smoothing_window.max(1);
        Self {
            history: VecDeque::with_capacity(window * 2),
            last_change: None,
            last_active: None,
            window,
            capacity: window * 2,
            silence_threshold: config.silence_threshold,
            speech_threshold: config.speech_threshold,
            min_hold: config.min_viseme_hold,
        }
    }

    /// Return to the initial state: empty history, no timestamps.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_change = None;
        self.last_active = None;
    }

    /// The most recently published viseme, if any.
    pub fn last_viseme(&self) -> Option<Viseme> {
        self.history.back().copied()
    }

    /// Apply the hold and majority-vote rules to one classification and
    /// publish the result.
    pub fn advance(&mut self, raw: &ClassificationResult, now: Instant) -> SmoothedResult {
        let volume = raw.volume;
        let mut viseme = raw.viseme;

        if volume < self.silence_threshold {
            // True silence closes the mouth immediately; neither rule
            // may keep a stale shape alive.
            viseme = Viseme::Sil;
        } else if let Some(last) = self.last_viseme() {
            if last != Viseme::Sil {
                // Strong signals may switch in half the time; exits
                // from silence are never held at all.
                let strong = volume > self.speech_threshold * 3.0;
                let hold = if strong {
                    self.min_hold / 2
                } else {
                    self.min_hold
                };
                if let Some(changed) = self.last_change {
                    if now.duration_since(changed) < hold {
                        viseme = last;
                    }
                }

                // Majority vote, weak signals only, so clearly voiced
                // speech never lags behind its classification.
                if self.history.len() >= self.window && volume < self.speech_threshold * 2.0 {
                    if let Some((winner, count)) = self.majority() {
                        if winner != viseme && count >= 2 {
                            viseme = winner;
                        }
                    }
                }
            }
        }

        if self.last_viseme() != Some(viseme) {
            self.last_change = Some(now);
        }
        self.history.push_back(viseme);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        let is_active = volume > self.silence_threshold;
        if is_active {
            self.last_active = Some(now);
        }

        SmoothedResult {
            viseme,
            volume,
            is_active,
            last_active_time: self.last_active,
            intensity: volume,
        }
    }

    /// Most frequent viseme among the newest `window` entries; first
    /// seen wins ties.
    fn majority(&self) -> Option<(Viseme, usize)> {
        let skip = self.history.len().saturating_sub(self.window);
        let mut counts: Vec<(Viseme, usize)> = Vec::with_capacity(self.window);
        for &v in self.history.iter().skip(skip) {
            match counts.iter_mut().find(|(code, _)| *code == v) {
                Some((_, n)) => *n += 1,
                None => counts.push((v, 1)),
            }
        }

        let mut best: Option<(Viseme, usize)> = None;
        for (code, count) in counts {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((code, count));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::BandEnergy;
    use crate::viseme::classifier::classify;

    fn smoother() -> TemporalSmoother {
        TemporalSmoother::new(&EngineConfig::default())
    }

    fn raw(viseme: Viseme, volume: f32) -> ClassificationResult {
        ClassificationResult {
            viseme,
            volume,
            bands: BandEnergy::default(),
        }
    }

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    #[test]
    fn silence_is_idempotent_regardless_of_history() {
        let mut smoother = smoother();
        let base = Instant::now();

        // accumulate a speaking history
        smoother.advance(&raw(Viseme::Aa, 0.01), base);
        smoother.advance(&raw(Viseme::Aa, 0.01), ms(base, 16));

        // all-zero input drops to silence on the very next tick and
        // stays there
        for i in 0..5 {
            let result = smoother.advance(&raw(Viseme::Sil, 0.0), ms(base, 32 + i * 16));
            assert_eq!(result.viseme, Viseme::Sil);
            assert_eq!(result.volume, 0.0);
            assert!(!result.is_active);
        }
    }

    #[test]
    fn fast_silence_exit_opens_mouth_same_tick() {
        let mut smoother = smoother();
        let config = EngineConfig::default();
        let base = Instant::now();

        smoother.advance(&raw(Viseme::Sil, 0.0), base);

        // strong onset frame with balanced low-mid/mid energy
        let bands = BandEnergy {
            bass: 0.15,
            low_mid: 0.35,
            mid: 0.35,
            high_mid: 0.1,
            high: 0.05,
        };
        let onset = classify(bands, 0.012, smoother.last_viseme(), &config);
        let result = smoother.advance(&onset, ms(base, 16));
        assert_eq!(result.viseme, Viseme::Aa);
        assert!(result.is_active);
    }

    #[test]
    fn hold_duration_pins_viseme_inside_window() {
        let mut smoother = smoother();
        let base = Instant::now();

        smoother.advance(&raw(Viseme::E, 0.007), base);
        // a flip arrives 16ms later, inside the 30ms hold, volume not
        // strong enough to halve the window
        let held = smoother.advance(&raw(Viseme::I, 0.007), ms(base, 16));
        assert_eq!(held.viseme, Viseme::E);

        // after the window elapses the change goes through
        let released = smoother.advance(&raw(Viseme::I, 0.007), ms(base, 40));
        assert_eq!(released.viseme, Viseme::I);
    }

    #[test]
    fn strong_signal_halves_the_hold() {
        let mut smoother = smoother();
        let base = Instant::now();

        smoother.advance(&raw(Viseme::E, 0.007), base);
        // 20ms is inside the nominal hold but past the halved 15ms one
        let result = smoother.advance(&raw(Viseme::O, 0.012), ms(base, 20));
        assert_eq!(result.viseme, Viseme::O);
    }

    #[test]
    fn majority_vote_overrides_weak_outliers() {
        let mut smoother = smoother();
        let base = Instant::now();

        smoother.advance(&raw(Viseme::E, 0.007), base);
        smoother.advance(&raw(Viseme::E, 0.007), ms(base, 50));
        smoother.advance(&raw(Viseme::E, 0.007), ms(base, 100));

        // a weak-signal flicker to CH loses against the E majority
        let result = smoother.advance(&raw(Viseme::CH, 0.004), ms(base, 150));
        assert_eq!(result.viseme, Viseme::E);

        // a clearly voiced CH is not vetoed
        let voiced = smoother.advance(&raw(Viseme::CH, 0.008), ms(base, 200));
        assert_eq!(voiced.viseme, Viseme::CH);
    }

    #[test]
    fn history_is_bounded_to_twice_the_window() {
        let mut smoother = smoother();
        let base = Instant::now();
        for i in 0..20 {
            smoother.advance(&raw(Viseme::Aa, 0.01), ms(base, i * 50));
        }
        assert!(smoother.history.len() <= 4);
    }

    #[test]
    fn ambiguous_volume_retains_previous_viseme() {
        let mut smoother = smoother();
        let config = EngineConfig::default();
        let base = Instant::now();

        smoother.advance(&raw(Viseme::Aa, 0.01), base);
        smoother.advance(&raw(Viseme::Aa, 0.01), ms(base, 50));

        // 0.002 sits between the silence and speech thresholds; the
        // classifier offers Sil but the majority keeps the mouth shape
        let ambiguous = classify(BandEnergy::default(), 0.002, smoother.last_viseme(), &config);
        assert_eq!(ambiguous.viseme, Viseme::Sil);
        let result = smoother.advance(&ambiguous, ms(base, 100));
        assert_eq!(result.viseme, Viseme::Aa);
        assert!(result.is_active);
    }

    #[test]
    fn last_active_time_persists_through_silence() {
        let mut smoother = smoother();
        let base = Instant::now();

        let active = smoother.advance(&raw(Viseme::Aa, 0.01), base);
        let active_at = active.last_active_time.unwrap();

        let silent = smoother.advance(&raw(Viseme::Sil, 0.0), ms(base, 16));
        assert!(!silent.is_active);
        assert_eq!(silent.last_active_time, Some(active_at));
    }

    /// The five-frame scenario: volumes [0, 0.0005, 0.004, 0.004,
    /// 0.0002] with bass-dominant energy on frames 3-4, ticked at 60Hz.
    #[test]
    fn scenario_five_frames() {
        let mut smoother = smoother();
        let config = EngineConfig::default();
        let base = Instant::now();

        let bass_heavy = BandEnergy {
            bass: 0.5,
            low_mid: 0.2,
            mid: 0.1,
            high_mid: 0.1,
            high: 0.1,
        };
        let quiet = BandEnergy::default();

        let inputs = [
            (quiet, 0.0),
            (quiet, 0.0005),
            (bass_heavy, 0.004),
            (bass_heavy, 0.004),
            (quiet, 0.0002),
        ];

        let mut published = Vec::new();
        for (i, (bands, volume)) in inputs.into_iter().enumerate() {
            let raw = classify(bands, volume, smoother.last_viseme(), &config);
            let result = smoother.advance(&raw, ms(base, i as u64 * 16));
            published.push(result.viseme);
        }

        assert_eq!(published[0], Viseme::Sil);
        assert_eq!(published[1], Viseme::Sil);
        // onset override opens the mouth on the first speech frame
        assert_eq!(published[2], Viseme::Aa);
        // held inside the 30ms window even though the raw cascade says U
        assert_eq!(published[3], Viseme::Aa);
        assert_eq!(published[4], Viseme::Sil);
    }
}
