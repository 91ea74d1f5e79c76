//! System microphone capture via cpal
//!
//! A convenience producer for live-stream sources: anything that owns a
//! [`LiveStreamHandle`] can push samples, this just wires the default
//! input device to one.

use super::source::LiveStreamHandle;
use crate::error::LipsyncError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::Mutex;

/// Wrapper for cpal::Stream that implements Send
/// Safety: the stream is only accessed from the thread that owns the
/// capture; the audio callback only touches the shared ring buffer,
/// which is thread-safe.
struct StreamWrapper(cpal::Stream);

unsafe impl Send for StreamWrapper {}
unsafe impl Sync for StreamWrapper {}

/// Microphone capture feeding a [`LiveStreamHandle`].
pub struct SystemCapture {
    handle: LiveStreamHandle,
    stream: Mutex<Option<StreamWrapper>>,
    device_name: String,
    requested_device: Option<String>,
}

impl SystemCapture {
    /// Create capture on the default input device.
    pub fn new() -> Result<Self, LipsyncError> {
        Self::with_device(None)
    }

    /// Create capture on a specific input device (None = default).
    pub fn with_device(device_name: Option<&str>) -> Result<Self, LipsyncError> {
        let device = find_device(device_name)?;
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let config = device
            .default_input_config()
            .map_err(|e| LipsyncError::SourceBind(format!("failed to get input config: {e}")))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as u32;

        tracing::info!(
            "SystemCapture: {} @ {}Hz, {} channels",
            name,
            sample_rate,
            channels
        );

        Ok(Self {
            handle: LiveStreamHandle::new(sample_rate, channels),
            stream: Mutex::new(None),
            device_name: name,
            requested_device: device_name.map(str::to_string),
        })
    }

    /// The live-stream handle fed by this capture.
    pub fn handle(&self) -> LiveStreamHandle {
        self.handle.clone()
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// List available input devices
    pub fn list_devices() -> Vec<String> {
        let host = cpal::default_host();
        host.input_devices()
            .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
            .unwrap_or_default()
    }

    /// Get the default input device name
    pub fn default_device_name() -> Option<String> {
        let host = cpal::default_host();
        host.default_input_device().and_then(|d| d.name().ok())
    }

    /// Start capturing into the handle. Builds the stream on first call.
    pub fn start(&self) -> Result<(), LipsyncError> {
        {
            let mut guard = self
                .stream
                .lock()
                .map_err(|_| LipsyncError::SourceBind("capture state poisoned".to_string()))?;
            if guard.is_none() {
                *guard = Some(self.build_stream()?);
            }
            if let Some(ref wrapper) = *guard {
                wrapper
                    .0
                    .play()
                    .map_err(|e| LipsyncError::SourceBind(format!("failed to start stream: {e}")))?;
            }
        }
        self.handle.set_active(true);
        Ok(())
    }

    /// Pause capturing. The handle stays valid for later restarts.
    pub fn stop(&self) {
        self.handle.set_active(false);
        if let Ok(guard) = self.stream.lock() {
            if let Some(ref wrapper) = *guard {
                let _ = wrapper.0.pause();
            }
        }
    }

    fn build_stream(&self) -> Result<StreamWrapper, LipsyncError> {
        let device = find_device(self.requested_device.as_deref())?;
        let config = device
            .default_input_config()
            .map_err(|e| LipsyncError::SourceBind(format!("failed to get input config: {e}")))?;

        let err_fn = |err| tracing::error!("audio input error: {}", err);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                let handle = self.handle.clone();
                device.build_input_stream(
                    &config.into(),
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        handle.push_samples(data);
                    },
                    err_fn,
                    None,
                )
            }
            cpal::SampleFormat::I16 => {
                let handle = self.handle.clone();
                device.build_input_stream(
                    &config.into(),
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let float_data: Vec<f32> =
                            data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                        handle.push_samples(&float_data);
                    },
                    err_fn,
                    None,
                )
            }
            cpal::SampleFormat::U16 => {
                let handle = self.handle.clone();
                device.build_input_stream(
                    &config.into(),
                    move |data: &[u16], _: &cpal::InputCallbackInfo| {
                        let float_data: Vec<f32> = data
                            .iter()
                            .map(|&s| (s as f32 / u16::MAX as f32) * 2.0 - 1.0)
                            .collect();
                        handle.push_samples(&float_data);
                    },
                    err_fn,
                    None,
                )
            }
            other => {
                return Err(LipsyncError::SourceBind(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        }
        .map_err(|e| LipsyncError::SourceBind(format!("failed to build stream: {e}")))?;

        Ok(StreamWrapper(stream))
    }
}

impl Drop for SystemCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

fn find_device(device_name: Option<&str>) -> Result<cpal::Device, LipsyncError> {
    let host = cpal::default_host();
    if let Some(name) = device_name {
        host.input_devices()
            .map_err(|e| LipsyncError::SourceBind(format!("failed to enumerate devices: {e}")))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| LipsyncError::SourceBind(format!("device '{name}' not found")))
    } else {
        host.default_input_device()
            .ok_or_else(|| LipsyncError::SourceBind("no default input device".to_string()))
    }
}
