//! Real-time viseme inference for avatar mouth animation.
//!
//! Converts a live audio signal into a continuous sequence of discrete
//! mouth-shape codes (visemes) plus loudness, at animation-frame rate,
//! using a cheap deterministic heuristic instead of speech recognition.
//! Works identically for a decoded playback source (volume-only feature
//! access) and a live real-time stream (full frequency-bin analysis).
//!
//! ```no_run
//! use avatar_lipsync::{AudioSource, EngineConfig, LipsyncEngine, SystemCapture};
//!
//! # fn main() -> Result<(), avatar_lipsync::LipsyncError> {
//! let capture = SystemCapture::new()?;
//! capture.start()?;
//!
//! let mut engine = LipsyncEngine::new(EngineConfig::default());
//! engine.set_publish_callback(|result| println!("{} {:.3}", result.viseme, result.volume));
//! engine.bind(AudioSource::LiveStream(capture.handle()))?;
//! engine.start();
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod viseme;

// Re-export public API
pub use audio::{
    AnalyserNode, AudioFrame, AudioSource, BandEnergy, FormantBand, LiveStreamHandle,
    PlaybackHandle, SpectralAnalyzer, SystemCapture,
};
pub use config::{EngineConfig, MorphScheme};
pub use engine::{LipsyncEngine, PublishCallback};
pub use error::LipsyncError;
pub use viseme::{
    classify, direct_weights, legacy_weights, weights, ClassificationResult, MorphWeights,
    SmoothedResult, TemporalSmoother, Viseme, VisemeCategory,
};
