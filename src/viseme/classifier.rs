//! Heuristic viseme classification from band energy and loudness

use super::code::Viseme;
use crate::audio::BandEnergy;
use crate::config::EngineConfig;

/// Output of one classification pass, consumed once by the smoother.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationResult {
    pub viseme: Viseme,
    pub volume: f32,
    pub bands: BandEnergy,
}

/// Classify one frame of band energy and smoothed loudness.
///
/// Pure and total: every input maps to exactly one of the fifteen
/// codes. The rules form an ordered priority cascade, not a partition;
/// the first match wins. `previous` is the last *published* viseme,
/// used for the speech-onset override.
pub fn classify(
    bands: BandEnergy,
    volume: f32,
    previous: Option<Viseme>,
    config: &EngineConfig,
) -> ClassificationResult {
    ClassificationResult {
        viseme: classify_code(&bands, volume, previous, config),
        volume,
        bands,
    }
}

fn classify_code(
    b: &BandEnergy,
    volume: f32,
    previous: Option<Viseme>,
    config: &EngineConfig,
) -> Viseme {
    if volume < config.silence_threshold {
        return Viseme::Sil;
    }
    if volume <= config.speech_threshold {
        // ambiguous low-energy input: offer silence and let the
        // smoother decide what persists
        return Viseme::Sil;
    }

    // Speech onset: the first voiced frame after silence opens the
    // mouth immediately; band rules take over on the next tick.
    if previous.map_or(true, |v| v == Viseme::Sil) {
        return Viseme::Aa;
    }

    // Strong high-frequency energy: fricatives and sibilants
    if b.high > 0.30 && b.high_mid > 0.25 {
        return if b.high > b.high_mid {
            Viseme::SS
        } else {
            Viseme::CH
        };
    }
    // Dominant bass with little mid: closed vowels
    if b.bass > 0.40 && b.mid < 0.20 {
        return Viseme::U;
    }
    // Strong mid with little bass: front vowels
    if b.mid > 0.40 && b.bass < 0.30 {
        return if b.high_mid > b.low_mid {
            Viseme::I
        } else {
            Viseme::E
        };
    }
    // Balanced low-mid and mid: open vowels
    if b.low_mid > 0.30 && b.mid > 0.30 {
        return Viseme::Aa;
    }
    // Remaining bass dominance: back vowels
    if b.bass > 0.35 {
        return Viseme::O;
    }
    // Weak-signal band just above the speech threshold: consonants
    if volume < config.speech_threshold * 3.0 {
        return if b.high_mid > b.low_mid {
            Viseme::TH
        } else if b.mid > b.bass {
            Viseme::DD
        } else {
            Viseme::PP
        };
    }

    Viseme::Aa
}
