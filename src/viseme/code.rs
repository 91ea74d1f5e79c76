//! The closed viseme vocabulary

use serde::{Deserialize, Serialize};

/// Discrete visual mouth-shape category.
///
/// The fifteen codes follow the common avatar morph-channel convention
/// (`viseme_sil` through `viseme_U`): one silence shape, nine consonant
/// groups, five vowels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Viseme {
    /// Closed resting mouth
    #[default]
    #[serde(rename = "sil")]
    Sil,
    /// Bilabials: p, b, m
    #[serde(rename = "PP")]
    PP,
    /// Labiodentals: f, v
    #[serde(rename = "FF")]
    FF,
    /// Dentals: th
    #[serde(rename = "TH")]
    TH,
    /// Alveolars: d, t
    #[serde(rename = "DD")]
    DD,
    /// Velars: k, g
    #[serde(rename = "kk")]
    Kk,
    /// Postalveolar affricates: ch, j, sh
    #[serde(rename = "CH")]
    CH,
    /// Sibilants: s, z
    #[serde(rename = "SS")]
    SS,
    /// Nasals: n, l
    #[serde(rename = "nn")]
    Nn,
    /// Rhotics: r
    #[serde(rename = "RR")]
    RR,
    /// Open vowel, as in "father"
    #[serde(rename = "aa")]
    Aa,
    /// Mid vowel, as in "bed"
    #[serde(rename = "E")]
    E,
    /// High vowel, as in "fleece"
    #[serde(rename = "I")]
    I,
    /// Back vowel, as in "thought"
    #[serde(rename = "O")]
    O,
    /// Closed vowel, as in "goose"
    #[serde(rename = "U")]
    U,
}

/// Coarse grouping of the vocabulary, useful for animation pacing
/// (vowels are typically held longer than consonants).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisemeCategory {
    Silence,
    Vowel,
    Consonant,
}

impl Viseme {
    /// All codes, silence first.
    pub fn all() -> &'static [Viseme; 15] {
        &[
            Viseme::Sil,
            Viseme::PP,
            Viseme::FF,
            Viseme::TH,
            Viseme::DD,
            Viseme::Kk,
            Viseme::CH,
            Viseme::SS,
            Viseme::Nn,
            Viseme::RR,
            Viseme::Aa,
            Viseme::E,
            Viseme::I,
            Viseme::O,
            Viseme::U,
        ]
    }

    /// Canonical short code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Viseme::Sil => "sil",
            Viseme::PP => "PP",
            Viseme::FF => "FF",
            Viseme::TH => "TH",
            Viseme::DD => "DD",
            Viseme::Kk => "kk",
            Viseme::CH => "CH",
            Viseme::SS => "SS",
            Viseme::Nn => "nn",
            Viseme::RR => "RR",
            Viseme::Aa => "aa",
            Viseme::E => "E",
            Viseme::I => "I",
            Viseme::O => "O",
            Viseme::U => "U",
        }
    }

    /// Morph channel name on rigs with per-viseme targets.
    pub fn channel(&self) -> &'static str {
        match self {
            Viseme::Sil => "viseme_sil",
            Viseme::PP => "viseme_PP",
            Viseme::FF => "viseme_FF",
            Viseme::TH => "viseme_TH",
            Viseme::DD => "viseme_DD",
            Viseme::Kk => "viseme_kk",
            Viseme::CH => "viseme_CH",
            Viseme::SS => "viseme_SS",
            Viseme::Nn => "viseme_nn",
            Viseme::RR => "viseme_RR",
            Viseme::Aa => "viseme_aa",
            Viseme::E => "viseme_E",
            Viseme::I => "viseme_I",
            Viseme::O => "viseme_O",
            Viseme::U => "viseme_U",
        }
    }

    pub fn is_silence(&self) -> bool {
        *self == Viseme::Sil
    }

    pub fn is_vowel(&self) -> bool {
        matches!(self, Viseme::Aa | Viseme::E | Viseme::I | Viseme::O | Viseme::U)
    }

    pub fn category(&self) -> VisemeCategory {
        if self.is_silence() {
            VisemeCategory::Silence
        } else if self.is_vowel() {
            VisemeCategory::Vowel
        } else {
            VisemeCategory::Consonant
        }
    }
}

impl std::fmt::Display for Viseme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
