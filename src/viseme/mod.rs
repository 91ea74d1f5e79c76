//! Viseme classification, smoothing, and morph-target mapping

mod classifier;
mod code;
mod morph;
mod smoother;

// Re-export public API
pub use classifier::{classify, ClassificationResult};
pub use code::{Viseme, VisemeCategory};
pub use morph::{direct_weights, legacy_weights, weights, MorphWeights};
pub use smoother::{SmoothedResult, TemporalSmoother};
