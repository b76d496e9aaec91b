//! Thread-safe mixer facade.
//!
//! A [`Mixer`] is built once at startup and cloned into every subsystem that
//! plays sound; clones share the same channel table. Control calls may come
//! from any thread. The platform backend calls [`Mixer::render`] once per
//! output buffer from its real-time thread.
//!
//! Control calls never fail: a stale handle, an unknown id or a duplicate id
//! is a silent no-op, and out-of-range volumes are clamped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::info;

use crate::audio::stream::AudioStream;
use crate::audio::timestamp::Timestamp;
use crate::settings::MixerSettings;

mod channel;
mod engine;
mod handle;
mod render;
pub mod sound_type;

pub use channel::{ChannelStream, SharedStream, MAX_BALANCE, MAX_CHANNEL_VOLUME};
pub use handle::{raw_or_invalid, SoundHandle};
pub(crate) use handle::INDEX_BITS;
pub use sound_type::{SoundType, MAX_MIXER_VOLUME};

use engine::MixerEngine;

/// Per-sound options for [`Mixer::play_stream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOptions {
    /// Caller-chosen id; at most one active sound may use a given id.
    /// `Some(-1)` is treated as no id.
    pub id: Option<i32>,
    /// Channel volume, clamped to `0..=255`.
    pub volume: i32,
    /// Stereo balance, clamped to `-127..=127`.
    pub balance: i32,
    /// Survives [`Mixer::stop_all`].
    pub permanent: bool,
    /// Swap the left and right channels.
    pub reverse_stereo: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            id: None,
            volume: MAX_CHANNEL_VOLUME as i32,
            balance: 0,
            permanent: false,
            reverse_stereo: false,
        }
    }
}

impl PlayOptions {
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_volume(mut self, volume: i32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_balance(mut self, balance: i32) -> Self {
        self.balance = balance;
        self
    }

    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }

    pub fn reverse_stereo(mut self) -> Self {
        self.reverse_stereo = true;
        self
    }

    fn normalized_id(&self) -> Option<i32> {
        self.id.filter(|id| *id != -1)
    }
}

/// Shared handle to the software mixer.
#[derive(Clone)]
pub struct Mixer {
    engine: Arc<Mutex<MixerEngine>>,
    ready: Arc<AtomicBool>,
    output_rate: u32,
    buffer_frames: usize,
}

impl Mixer {
    /// Build a mixer. It reports not ready until a backend calls
    /// [`Mixer::set_ready`].
    pub fn new(settings: MixerSettings) -> Self {
        let settings = settings.sanitized();
        info!(
            "mixer: {} Hz, {} channels, {} frame buffers",
            settings.output_rate, settings.channel_count, settings.buffer_frames
        );
        Self {
            engine: Arc::new(Mutex::new(MixerEngine::new(&settings))),
            ready: Arc::new(AtomicBool::new(false)),
            output_rate: settings.output_rate,
            buffer_frames: settings.buffer_frames,
        }
    }

    fn engine(&self) -> MutexGuard<'_, MixerEngine> {
        // A panic while holding the lock leaves the table consistent enough to
        // keep mixing; never take the render thread down with it.
        self.engine.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Start playing `stream` as a `sound_type` sound.
    ///
    /// Returns `None` without starting anything when `options.id` is already
    /// playing or every channel is busy. An owned stream is dropped in that
    /// case. The stream is first pulled by the next [`Mixer::render`].
    pub fn play_stream(
        &self,
        sound_type: SoundType,
        stream: ChannelStream,
        options: PlayOptions,
    ) -> Option<SoundHandle> {
        // A shared stream is locked here, never while the engine is held.
        let format = stream.format();
        self.engine().play_stream(sound_type, stream, format, options)
    }

    /// Play an owned stream with default options.
    pub fn play<S: AudioStream + 'static>(
        &self,
        sound_type: SoundType,
        stream: S,
    ) -> Option<SoundHandle> {
        self.play_stream(sound_type, ChannelStream::owned(stream), PlayOptions::default())
    }

    /// Stop every sound that is not permanent.
    pub fn stop_all(&self) {
        self.engine().stop_all();
    }

    pub fn stop_id(&self, id: i32) {
        self.engine().stop_id(id);
    }

    pub fn stop_handle(&self, handle: SoundHandle) {
        self.engine().stop_handle(handle);
    }

    /// Stop every sound of `sound_type`, permanent ones included.
    pub fn stop_sound_type(&self, sound_type: SoundType) {
        self.engine().stop_sound_type(sound_type);
    }

    /// Pause or resume every sound, permanent ones included.
    pub fn pause_all(&self, paused: bool) {
        self.engine().pause_all(paused);
    }

    pub fn pause_id(&self, id: i32, paused: bool) {
        self.engine().pause_id(id, paused);
    }

    pub fn pause_handle(&self, handle: SoundHandle, paused: bool) {
        self.engine().pause_handle(handle, paused);
    }

    pub fn pause_sound_type(&self, sound_type: SoundType, paused: bool) {
        self.engine().pause_sound_type(sound_type, paused);
    }

    pub fn is_sound_id_active(&self, id: i32) -> bool {
        self.engine().find_id(id).is_some()
    }

    pub fn is_sound_handle_active(&self, handle: SoundHandle) -> bool {
        self.engine().channel(handle).is_some()
    }

    /// Id the sound was started with; `None` for stale handles or sounds without one.
    pub fn get_sound_id(&self, handle: SoundHandle) -> Option<i32> {
        self.engine().channel(handle).and_then(|ch| ch.id)
    }

    /// Silence a group without stopping it; its sounds keep advancing.
    pub fn mute_sound_type(&self, sound_type: SoundType, mute: bool) {
        self.engine().types.set_muted(sound_type, mute);
    }

    pub fn is_sound_type_muted(&self, sound_type: SoundType) -> bool {
        self.engine().types.is_muted(sound_type)
    }

    /// Set a sound's volume, clamped to `0..=255`.
    pub fn set_channel_volume(&self, handle: SoundHandle, volume: i32) {
        if let Some(channel) = self.engine().channel_mut(handle) {
            channel.set_volume(volume);
        }
    }

    /// A sound's volume, or `0` for a stale handle.
    pub fn get_channel_volume(&self, handle: SoundHandle) -> u8 {
        self.engine().channel(handle).map_or(0, |ch| ch.volume())
    }

    /// Set a sound's balance, clamped to `-127..=127`.
    pub fn set_channel_balance(&self, handle: SoundHandle, balance: i32) {
        if let Some(channel) = self.engine().channel_mut(handle) {
            channel.set_balance(balance);
        }
    }

    /// A sound's balance, or `0` for a stale handle.
    pub fn get_channel_balance(&self, handle: SoundHandle) -> i8 {
        self.engine().channel(handle).map_or(0, |ch| ch.balance())
    }

    /// Elapsed play time in milliseconds; `0` for a stale handle.
    pub fn get_sound_elapsed_time(&self, handle: SoundHandle) -> u32 {
        let msecs = self.get_elapsed_time(handle).msecs();
        msecs.min(u32::MAX as u64) as u32
    }

    /// Elapsed play time measured in source frames at the stream's own rate.
    ///
    /// A stale handle yields a zero timestamp at the output rate.
    pub fn get_elapsed_time(&self, handle: SoundHandle) -> Timestamp {
        self.engine().elapsed_time(handle)
    }

    pub fn has_active_channel_of_type(&self, sound_type: SoundType) -> bool {
        self.engine().has_active_channel_of_type(sound_type)
    }

    /// Set a group's volume, clamped to `0..=256`.
    pub fn set_volume_for_sound_type(&self, sound_type: SoundType, volume: i32) {
        self.engine().types.set_volume(sound_type, volume);
    }

    pub fn get_volume_for_sound_type(&self, sound_type: SoundType) -> u16 {
        self.engine().types.volume(sound_type)
    }

    /// Output rate in Hz; fixed for the mixer's lifetime.
    pub fn get_output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Frames per backend pull, as configured.
    pub fn buffer_frames(&self) -> usize {
        self.buffer_frames
    }

    /// Size of the channel table.
    pub fn channel_count(&self) -> usize {
        self.engine().slots.len()
    }

    pub fn active_channel_count(&self) -> usize {
        self.engine().active_channel_count()
    }

    /// Whether an output device is driving the mixer. Code that times itself
    /// against audio must check this instead of waiting for a device.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    /// Mix all active sounds into `out`, interleaved stereo.
    ///
    /// Called by the backend once per output buffer. Returns the number of
    /// frames that carried sound; `0` when nothing is playing.
    pub fn render(&self, out: &mut [i16]) -> usize {
        self.engine().render(out)
    }
}
