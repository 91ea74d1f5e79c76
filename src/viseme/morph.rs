//! Translation of viseme codes into animation-channel weights
//!
//! Two interchangeable schemes, both pure functions of the code alone:
//! direct per-viseme channel activation for rigs with dedicated viseme
//! targets, and a shared jaw/mouth blend table for legacy rigs.

use super::code::Viseme;
use crate::config::MorphScheme;
use std::collections::HashMap;

/// Channel-name to weight map consumed by the animation sink.
pub type MorphWeights = HashMap<&'static str, f32>;

/// Compatibility channel fed alongside the one-hot viseme channels.
const MOUTH_OPEN: &str = "mouthOpen";

/// Channels of the legacy blend-shape scheme.
const LEGACY_CHANNELS: [&str; 5] = [
    "mouthOpen",
    "jawOpen",
    "mouthClose",
    "jawClose",
    "teethOpen",
];

/// Per-code rows for the legacy scheme, tuned per phonetic category:
/// {mouthOpen, jawOpen, mouthClose, jawClose, teethOpen}.
const LEGACY_TABLE: [(Viseme, [f32; 5]); 15] = [
    (Viseme::Sil, [0.0, 0.0, 1.0, 1.0, 0.0]),
    // open vowel: jaw fully open
    (Viseme::Aa, [0.0, 1.0, 0.0, 0.0, 0.0]),
    (Viseme::I, [0.7, 0.6, 0.0, 0.0, 0.5]),
    (Viseme::E, [0.8, 0.7, 0.0, 0.0, 0.6]),
    (Viseme::O, [0.9, 0.8, 0.0, 0.0, 0.7]),
    (Viseme::U, [0.7, 0.6, 0.0, 0.0, 0.5]),
    // stops close the mouth almost fully
    (Viseme::DD, [0.1, 0.1, 0.9, 0.9, 0.1]),
    (Viseme::PP, [0.0, 0.0, 1.0, 1.0, 0.0]),
    (Viseme::FF, [0.2, 0.2, 0.7, 0.7, 0.2]),
    (Viseme::TH, [0.3, 0.2, 0.0, 0.0, 0.3]),
    (Viseme::Kk, [0.2, 0.2, 0.8, 0.8, 0.1]),
    (Viseme::CH, [0.3, 0.2, 0.0, 0.0, 0.3]),
    (Viseme::SS, [0.2, 0.2, 0.7, 0.7, 0.2]),
    (Viseme::Nn, [0.1, 0.1, 0.8, 0.8, 0.1]),
    (Viseme::RR, [0.3, 0.2, 0.0, 0.0, 0.3]),
];

/// Weights for a code under the given scheme.
pub fn weights(scheme: MorphScheme, viseme: Viseme) -> MorphWeights {
    match scheme {
        MorphScheme::Direct => direct_weights(viseme),
        MorphScheme::LegacyBlend => legacy_weights(viseme),
    }
}

/// Direct scheme: exactly one viseme channel at weight 1, all others at
/// 0, plus the `mouthOpen` compatibility scalar (0 when silent, a
/// constant 0.5 otherwise; deliberately not loudness-scaled).
pub fn direct_weights(viseme: Viseme) -> MorphWeights {
    let mut out = MorphWeights::with_capacity(Viseme::all().len() + 1);
    for code in Viseme::all() {
        out.insert(code.channel(), 0.0);
    }
    out.insert(viseme.channel(), 1.0);
    out.insert(MOUTH_OPEN, if viseme.is_silence() { 0.0 } else { 0.5 });
    out
}

/// Legacy scheme: five shared blend channels looked up from the static
/// table. Codes without a row fall back to the silence row.
pub fn legacy_weights(viseme: Viseme) -> MorphWeights {
    let row = LEGACY_TABLE
        .iter()
        .find(|(code, _)| *code == viseme)
        .or_else(|| LEGACY_TABLE.iter().find(|(code, _)| *code == Viseme::Sil))
        .map(|(_, row)| *row)
        .unwrap_or([0.0, 0.0, 1.0, 1.0, 0.0]);

    LEGACY_CHANNELS.iter().copied().zip(row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_scheme_is_one_hot() {
        for &code in Viseme::all() {
            let weights = direct_weights(code);
            let viseme_sum: f32 = Viseme::all().iter().map(|v| weights[v.channel()]).sum();
            assert_eq!(viseme_sum, 1.0, "{code}");
            assert_eq!(weights[code.channel()], 1.0);
        }
    }

    #[test]
    fn direct_scheme_mouth_open_compat() {
        assert_eq!(direct_weights(Viseme::Sil)["mouthOpen"], 0.0);
        assert_eq!(direct_weights(Viseme::Aa)["mouthOpen"], 0.5);
        assert_eq!(direct_weights(Viseme::SS)["mouthOpen"], 0.5);
    }

    #[test]
    fn legacy_rows_cover_all_codes_within_range() {
        for &code in Viseme::all() {
            let weights = legacy_weights(code);
            assert_eq!(weights.len(), 5, "{code}");
            for channel in LEGACY_CHANNELS {
                let weight = weights[channel];
                assert!((0.0..=1.0).contains(&weight), "{code}/{channel}: {weight}");
            }
        }
    }

    #[test]
    fn legacy_extremes_match_phonetics() {
        let silence = legacy_weights(Viseme::Sil);
        assert_eq!(silence["mouthClose"], 1.0);
        assert_eq!(silence["jawOpen"], 0.0);

        let open = legacy_weights(Viseme::Aa);
        assert_eq!(open["jawOpen"], 1.0);
        assert_eq!(open["mouthClose"], 0.0);

        let bilabial = legacy_weights(Viseme::PP);
        assert_eq!(bilabial["mouthClose"], 1.0);
    }

    #[test]
    fn scheme_dispatch_matches_free_functions() {
        assert_eq!(
            weights(MorphScheme::Direct, Viseme::O),
            direct_weights(Viseme::O)
        );
        assert_eq!(
            weights(MorphScheme::LegacyBlend, Viseme::O),
            legacy_weights(Viseme::O)
        );
    }
}
