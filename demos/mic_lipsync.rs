//! Capture the default microphone and log viseme transitions.
//!
//! Run with `cargo run --example mic_lipsync`; speak into the mic and
//! watch the published codes change.

use avatar_lipsync::{AudioSource, EngineConfig, LipsyncEngine, SystemCapture, Viseme};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let capture = SystemCapture::new()?;
    capture.start()?;
    tracing::info!("listening on '{}'", capture.device_name());

    let mut engine = LipsyncEngine::new(EngineConfig::default());

    let previous = Arc::new(Mutex::new(Viseme::Sil));
    engine.set_publish_callback(move |result| {
        let mut last = previous.lock().unwrap();
        if *last != result.viseme {
            tracing::info!(
                viseme = result.viseme.as_str(),
                volume = result.volume,
                active = result.is_active,
                "viseme changed"
            );
            *last = result.viseme;
        }
    });

    engine.bind(AudioSource::LiveStream(capture.handle()))?;
    engine.start();

    std::thread::sleep(Duration::from_secs(15));

    engine.stop();
    capture.stop();
    Ok(())
}
