//! The lip-sync engine: source binding, per-tick pipeline, scheduling
//!
//! One engine instance owns one source binding, one analyser node, and
//! one set of smoothing state. Data flows strictly downward each tick:
//! source -> spectral reduction -> classifier -> smoother -> publish.
//! Binding and start/stop are the only external triggers that touch
//! state outside the tick.

use crate::audio::{AnalyserNode, AudioSource, BandEnergy, SpectralAnalyzer};
use crate::config::EngineConfig;
use crate::error::LipsyncError;
use crate::viseme::{classify, weights, MorphWeights, SmoothedResult, TemporalSmoother};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Callback receiving the published result once per tick.
pub type PublishCallback = Box<dyn FnMut(&SmoothedResult) + Send + 'static>;

struct EngineState {
    source: Option<AudioSource>,
    /// Allocated only while a live-stream source is bound
    analyser: Option<AnalyserNode>,
    spectral: SpectralAnalyzer,
    smoother: TemporalSmoother,
    callback: Option<PublishCallback>,
    last_result: SmoothedResult,
    config: EngineConfig,
}

impl EngineState {
    /// Reset all analysis state back to initial values. Always resets
    /// the spectral volume and the smoother together.
    fn reset_analysis(&mut self) {
        self.spectral.reset();
        self.smoother.reset();
        if let Some(analyser) = self.analyser.as_mut() {
            analyser.reset();
        }
        self.last_result = SmoothedResult::default();
    }

    /// One pipeline pass. Never fails: with no source bound the last
    /// known result is republished, and degenerate input falls through
    /// to the silence fallback inside the stages.
    fn tick(&mut self, now: Instant) {
        let result = match &self.source {
            None => self.last_result.clone(),
            Some(AudioSource::LiveStream(handle)) => match self.analyser.as_mut() {
                Some(analyser) => {
                    let frame = analyser.snapshot(handle, now);
                    let (bands, volume) = self.spectral.reduce(&frame);
                    let raw = classify(bands, volume, self.smoother.last_viseme(), &self.config);
                    self.smoother.advance(&raw, now)
                }
                // the analyser is allocated at bind time; without one
                // the tick degrades to silence
                None => {
                    let raw = classify(
                        BandEnergy::default(),
                        0.0,
                        self.smoother.last_viseme(),
                        &self.config,
                    );
                    self.smoother.advance(&raw, now)
                }
            },
            Some(AudioSource::Playback(handle)) => {
                // volume-only degradation: playback sources expose no
                // frequency bins, so band rules see zero energy
                let volume = self.spectral.smooth_volume(handle.volume());
                let raw = classify(
                    BandEnergy::default(),
                    volume,
                    self.smoother.last_viseme(),
                    &self.config,
                );
                self.smoother.advance(&raw, now)
            }
        };

        self.last_result = result;
        if let Some(callback) = self.callback.as_mut() {
            callback(&self.last_result);
        }
    }
}

/// Viseme inference engine driving mouth animation for one avatar.
///
/// Encapsulates the source binder, analysis state, and frame scheduler
/// behind explicit `bind`/`unbind`/`start`/`stop`; multiple engines can
/// coexist, each fully isolated.
pub struct LipsyncEngine {
    config: EngineConfig,
    state: Arc<Mutex<EngineState>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl LipsyncEngine {
    pub fn new(config: EngineConfig) -> Self {
        let state = EngineState {
            source: None,
            analyser: None,
            spectral: SpectralAnalyzer::new(),
            smoother: TemporalSmoother::new(&config),
            callback: None,
            last_result: SmoothedResult::default(),
            config: config.clone(),
        };
        Self {
            config,
            state: Arc::new(Mutex::new(state)),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Bind an audio source, tearing down any previous binding first.
    ///
    /// Rebinding the same source is a no-op. Binding a live stream
    /// allocates the analyser node; on failure the engine remains
    /// unbound and the error is recoverable.
    pub fn bind(&self, source: AudioSource) -> Result<(), LipsyncError> {
        let mut state = self.state.lock().unwrap();

        if let Some(current) = &state.source {
            if current.same_source(&source) {
                return Ok(());
            }
        }

        // strict ordering: fully release the previous binding before
        // any new state exists
        state.source = None;
        state.analyser = None;
        state.reset_analysis();

        let analyser = match &source {
            AudioSource::LiveStream(handle) => {
                match AnalyserNode::new(&state.config, handle.sample_rate()) {
                    Ok(analyser) => Some(analyser),
                    Err(e) => {
                        tracing::warn!("failed to allocate analysis node: {e}");
                        return Err(e);
                    }
                }
            }
            AudioSource::Playback(_) => None,
        };

        tracing::info!("bound {} source", source.display_name());
        state.analyser = analyser;
        state.source = Some(source);
        Ok(())
    }

    /// Release the current source and reset dependent analysis state.
    pub fn unbind(&self) {
        let mut state = self.state.lock().unwrap();
        if state.source.take().is_some() {
            tracing::info!("unbound audio source");
        }
        state.analyser = None;
        state.reset_analysis();
    }

    /// Register the callback that receives each published result.
    pub fn set_publish_callback<F>(&self, callback: F)
    where
        F: FnMut(&SmoothedResult) + Send + 'static,
    {
        self.state.lock().unwrap().callback = Some(Box::new(callback));
    }

    /// Run one pipeline tick synchronously, for hosts that drive their
    /// own frame loop instead of using the built-in scheduler.
    pub fn update(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.tick(Instant::now());
        }
    }

    /// Start the built-in frame scheduler. Idempotent: calling while
    /// already running is a no-op.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let interval = Duration::from_secs_f64(1.0 / self.config.target_fps.max(1) as f64);

        tracing::info!("lip-sync scheduler started at {} fps", self.config.target_fps);
        self.worker = Some(std::thread::spawn(move || {
            // cooperative cancellation: the flag is checked at the top
            // of each tick, no tick is aborted in flight
            while running.load(Ordering::Acquire) {
                let started = Instant::now();
                if let Ok(mut guard) = state.lock() {
                    guard.tick(started);
                }
                let elapsed = started.elapsed();
                if elapsed < interval {
                    std::thread::sleep(interval - elapsed);
                }
            }
        }));
    }

    /// Stop the frame scheduler. Idempotent. Smoother state survives a
    /// stop; it is only reset on rebind or an explicit [`reset`].
    ///
    /// [`reset`]: LipsyncEngine::reset
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        tracing::info!("lip-sync scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Explicitly reset analysis state (history, timestamps, smoothed
    /// volume) without touching the binding.
    pub fn reset(&self) {
        self.state.lock().unwrap().reset_analysis();
    }

    /// The most recently published result. Stable between ticks.
    pub fn last_result(&self) -> SmoothedResult {
        self.state.lock().unwrap().last_result.clone()
    }

    /// Morph weights for the currently published viseme under the
    /// configured scheme.
    pub fn morph_weights(&self) -> MorphWeights {
        weights(self.config.morph_scheme, self.last_result().viseme)
    }
}

impl Drop for LipsyncEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
