//! Audio sources, capture, and spectral analysis
//!
//! Provides the bindable source handles, the microphone capture
//! producer, the frequency-domain analyser node for live streams, and
//! the reduction into formant-band energy.

mod analyser;
mod capture;
mod source;
mod spectral;
mod types;

// Re-export public API
pub use analyser::AnalyserNode;
pub use capture::SystemCapture;
pub use source::{AudioSource, LiveStreamHandle, PlaybackHandle, SampleRing};
pub use spectral::SpectralAnalyzer;
pub use types::{AudioFrame, BandEnergy, FormantBand};
