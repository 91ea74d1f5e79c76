//! Audio source handles and the shared sample feed

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Capacity of the live-stream sample ring in mono samples (~340ms at
/// 48kHz, several analyser windows).
const RING_CAPACITY: usize = 16384;

/// A bindable audio source, tagged by capability.
///
/// A playback source only exposes its own loudness feature; a live
/// stream exposes raw samples for full frequency-bin analysis.
#[derive(Clone)]
pub enum AudioSource {
    /// Decoded playback handle (volume-only feature access)
    Playback(PlaybackHandle),
    /// Live real-time stream (full frequency-bin access)
    LiveStream(LiveStreamHandle),
}

impl AudioSource {
    pub fn is_live_stream(&self) -> bool {
        matches!(self, AudioSource::LiveStream(_))
    }

    /// Human-readable source kind
    pub fn display_name(&self) -> &'static str {
        match self {
            AudioSource::Playback(_) => "playback",
            AudioSource::LiveStream(_) => "live stream",
        }
    }

    /// Handle identity. Rebinding the same source is a no-op, so the
    /// binder compares the underlying shared state, not the wrapper.
    pub fn same_source(&self, other: &AudioSource) -> bool {
        match (self, other) {
            (AudioSource::Playback(a), AudioSource::Playback(b)) => {
                Arc::ptr_eq(&a.shared, &b.shared)
            }
            (AudioSource::LiveStream(a), AudioSource::LiveStream(b)) => {
                Arc::ptr_eq(&a.shared, &b.shared)
            }
            _ => false,
        }
    }
}

struct PlaybackShared {
    /// Current loudness in [0,1], stored as raw f32 bits
    level: AtomicU32,
    playing: AtomicBool,
}

/// Handle to a decoded playback source.
///
/// The player side feeds the current loudness via [`set_volume`]; the
/// engine reads it once per tick. Clones share the same state.
///
/// [`set_volume`]: PlaybackHandle::set_volume
#[derive(Clone)]
pub struct PlaybackHandle {
    shared: Arc<PlaybackShared>,
}

impl PlaybackHandle {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(PlaybackShared {
                level: AtomicU32::new(0.0f32.to_bits()),
                playing: AtomicBool::new(false),
            }),
        }
    }

    /// Producer side: publish the source's current loudness.
    pub fn set_volume(&self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        self.shared.level.store(clamped.to_bits(), Ordering::Release);
    }

    /// Current loudness in [0,1].
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.shared.level.load(Ordering::Acquire))
    }

    pub fn set_playing(&self, playing: bool) {
        self.shared.playing.store(playing, Ordering::Release);
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Acquire)
    }
}

impl Default for PlaybackHandle {
    fn default() -> Self {
        Self::new()
    }
}

struct StreamShared {
    ring: Mutex<SampleRing>,
    /// Whether the producer is currently delivering data
    active: AtomicBool,
}

/// Handle to a live real-time stream.
///
/// Producers (capture callbacks, network receivers, decoders) push
/// interleaved samples; the engine's analyser reads a sliding window of
/// the most recent samples without draining. Clones share the same
/// buffer.
#[derive(Clone)]
pub struct LiveStreamHandle {
    shared: Arc<StreamShared>,
}

impl LiveStreamHandle {
    pub fn new(sample_rate: u32, channels: u32) -> Self {
        Self {
            shared: Arc::new(StreamShared {
                ring: Mutex::new(SampleRing::new(RING_CAPACITY, sample_rate, channels)),
                active: AtomicBool::new(false),
            }),
        }
    }

    /// Producer side: append interleaved samples. Multi-channel input is
    /// downmixed to mono before buffering.
    pub fn push_samples(&self, interleaved: &[f32]) {
        if let Ok(mut ring) = self.shared.ring.lock() {
            let channels = ring.channels() as usize;
            if channels <= 1 {
                ring.write(interleaved);
            } else {
                let mono: Vec<f32> = interleaved
                    .chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                    .collect();
                ring.write(&mono);
            }
        }
        self.shared.active.store(true, Ordering::Release);
    }

    pub fn sample_rate(&self) -> u32 {
        self.shared
            .ring
            .lock()
            .map(|ring| ring.sample_rate())
            .unwrap_or(48000)
    }

    pub fn channels(&self) -> u32 {
        self.shared
            .ring
            .lock()
            .map(|ring| ring.channels())
            .unwrap_or(1)
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::Acquire)
    }

    pub fn set_active(&self, active: bool) {
        self.shared.active.store(active, Ordering::Release);
    }

    /// Number of buffered mono samples.
    pub fn available(&self) -> usize {
        self.shared
            .ring
            .lock()
            .map(|ring| ring.available())
            .unwrap_or(0)
    }

    /// Engine side: copy the newest `out.len()` samples into `out`,
    /// most recent last, zero-filling the front when the buffer holds
    /// fewer. Non-draining.
    pub(crate) fn copy_latest(&self, out: &mut [f32]) -> usize {
        match self.shared.ring.lock() {
            Ok(ring) => ring.copy_latest(out),
            Err(_) => {
                out.fill(0.0);
                0
            }
        }
    }
}

/// Fixed-capacity ring holding the most recent mono samples.
pub struct SampleRing {
    data: Vec<f32>,
    write_pos: usize,
    /// How many valid samples the ring holds, capped at capacity
    filled: usize,
    sample_rate: u32,
    channels: u32,
}

impl SampleRing {
    pub fn new(capacity: usize, sample_rate: u32, channels: u32) -> Self {
        Self {
            data: vec![0.0; capacity.max(1)],
            write_pos: 0,
            filled: 0,
            sample_rate,
            channels,
        }
    }

    pub fn set_format(&mut self, sample_rate: u32, channels: u32) {
        self.sample_rate = sample_rate;
        self.channels = channels;
    }

    /// Write samples, overwriting the oldest once full.
    pub fn write(&mut self, samples: &[f32]) {
        let capacity = self.data.len();
        for &sample in samples {
            self.data[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % capacity;
            if self.filled < capacity {
                self.filled += 1;
            }
        }
    }

    /// Copy the newest `out.len()` samples into `out`, most recent last.
    /// Zero-fills the front when fewer samples have been written.
    /// Returns the number of real samples copied.
    pub fn copy_latest(&self, out: &mut [f32]) -> usize {
        let capacity = self.data.len();
        let count = out.len().min(self.filled);
        let pad = out.len() - count;
        for slot in &mut out[..pad] {
            *slot = 0.0;
        }
        // the oldest of the newest `count` sits `count` steps behind the
        // write position
        let mut index = (self.write_pos + capacity - count) % capacity;
        for slot in &mut out[pad..] {
            *slot = self.data[index];
            index = (index + 1) % capacity;
        }
        count
    }

    pub fn available(&self) -> usize {
        self.filled
    }

    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.filled = 0;
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_copies_latest_window() {
        let mut ring = SampleRing::new(8, 48000, 1);
        ring.write(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let mut out = [0.0; 3];
        let copied = ring.copy_latest(&mut out);
        assert_eq!(copied, 3);
        assert_eq!(out, [3.0, 4.0, 5.0]);
        // non-draining: a second read sees the same window
        ring.copy_latest(&mut out);
        assert_eq!(out, [3.0, 4.0, 5.0]);
    }

    #[test]
    fn ring_zero_pads_short_feeds() {
        let mut ring = SampleRing::new(8, 48000, 1);
        ring.write(&[7.0, 8.0]);

        let mut out = [9.0; 4];
        let copied = ring.copy_latest(&mut out);
        assert_eq!(copied, 2);
        assert_eq!(out, [0.0, 0.0, 7.0, 8.0]);
    }

    #[test]
    fn ring_overwrites_oldest_when_full() {
        let mut ring = SampleRing::new(4, 48000, 1);
        ring.write(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(ring.available(), 4);

        let mut out = [0.0; 4];
        ring.copy_latest(&mut out);
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn live_stream_downmixes_to_mono() {
        let handle = LiveStreamHandle::new(48000, 2);
        handle.push_samples(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0]);

        let mut out = [0.0; 3];
        handle.copy_latest(&mut out);
        assert_eq!(out, [0.5, 0.5, 0.0]);
        assert!(handle.is_active());
    }

    #[test]
    fn playback_volume_is_clamped() {
        let handle = PlaybackHandle::new();
        handle.set_volume(1.7);
        assert_eq!(handle.volume(), 1.0);
        handle.set_volume(-0.3);
        assert_eq!(handle.volume(), 0.0);
    }

    #[test]
    fn same_source_is_handle_identity() {
        let stream = LiveStreamHandle::new(48000, 1);
        let a = AudioSource::LiveStream(stream.clone());
        let b = AudioSource::LiveStream(stream);
        let c = AudioSource::LiveStream(LiveStreamHandle::new(48000, 1));
        let d = AudioSource::Playback(PlaybackHandle::new());

        assert!(a.same_source(&b));
        assert!(!a.same_source(&c));
        assert!(!a.same_source(&d));
    }
}
