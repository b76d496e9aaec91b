//! Runtime state of one playing stream.

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use crate::audio::rate::RateConverter;
use crate::audio::stream::AudioStream;
use crate::audio::timestamp::Timestamp;

use super::sound_type::SoundType;

/// Highest per-channel volume.
pub const MAX_CHANNEL_VOLUME: u8 = 255;
/// Balance bound in either direction; `-127` is full left, `127` full right.
pub const MAX_BALANCE: i8 = 127;

/// A stream the caller keeps ownership of while a channel borrows it.
pub type SharedStream = Arc<Mutex<dyn AudioStream>>;

/// Who owns a channel's stream.
pub enum ChannelStream {
    /// The channel owns the stream and drops it when the sound ends or is stopped.
    Owned(Box<dyn AudioStream>),
    /// The caller owns the stream. The channel only reads from it while active,
    /// so the caller must not touch it until the sound has ended or been stopped.
    Shared(SharedStream),
}

impl ChannelStream {
    pub fn owned<S: AudioStream + 'static>(stream: S) -> Self {
        Self::Owned(Box::new(stream))
    }

    pub fn shared(stream: SharedStream) -> Self {
        Self::Shared(stream)
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// Rate and layout of the wrapped stream. Blocks on a shared stream's lock.
    pub(crate) fn format(&self) -> StreamFormat {
        let (rate, stereo) = match self {
            Self::Owned(stream) => (stream.rate(), stream.is_stereo()),
            Self::Shared(stream) => {
                let stream = lock_stream(stream);
                (stream.rate(), stream.is_stereo())
            }
        };
        StreamFormat { rate, stereo }
    }
}

fn lock_stream(stream: &SharedStream) -> MutexGuard<'_, dyn AudioStream + 'static> {
    stream.lock().unwrap_or_else(|err| err.into_inner())
}

/// Rate and layout read from a stream when its channel is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StreamFormat {
    pub(crate) rate: u32,
    pub(crate) stereo: bool,
}

/// Clamp a requested channel volume into `0..=255`.
pub(crate) fn clamp_volume(volume: i32) -> u8 {
    volume.clamp(0, MAX_CHANNEL_VOLUME as i32) as u8
}

/// Clamp a requested balance into `-127..=127`.
pub(crate) fn clamp_balance(balance: i32) -> i8 {
    balance.clamp(-(MAX_BALANCE as i32), MAX_BALANCE as i32) as i8
}

pub(crate) struct Channel {
    pub(crate) sound_type: SoundType,
    pub(crate) id: Option<i32>,
    pub(crate) paused: bool,
    pub(crate) permanent: bool,
    volume: u8,
    balance: i8,
    stream: ChannelStream,
    converter: RateConverter,
    stream_rate: u32,
    consumed_frames: u64,
}

impl Channel {
    pub(crate) fn new(
        sound_type: SoundType,
        stream: ChannelStream,
        format: StreamFormat,
        output_rate: u32,
        id: Option<i32>,
        permanent: bool,
        reverse_stereo: bool,
    ) -> Self {
        let StreamFormat { rate: stream_rate, stereo } = format;
        Self {
            sound_type,
            id,
            paused: false,
            permanent,
            volume: MAX_CHANNEL_VOLUME,
            balance: 0,
            converter: RateConverter::new(stream_rate, output_rate, stereo, reverse_stereo),
            stream,
            stream_rate,
            consumed_frames: 0,
        }
    }

    pub(crate) fn volume(&self) -> u8 {
        self.volume
    }

    pub(crate) fn set_volume(&mut self, volume: i32) {
        self.volume = clamp_volume(volume);
    }

    pub(crate) fn balance(&self) -> i8 {
        self.balance
    }

    pub(crate) fn set_balance(&mut self, balance: i32) {
        self.balance = clamp_balance(balance);
    }

    /// Left/right gain (0..=256) for a group volume of `type_volume`.
    pub(crate) fn side_volumes(&self, type_volume: u16) -> (i32, i32) {
        let max = MAX_CHANNEL_VOLUME as i32;
        let span = MAX_BALANCE as i32;
        let vol = type_volume as i32 * self.volume as i32;
        let balance = self.balance as i32;
        if balance == 0 {
            (vol / max, vol / max)
        } else if balance < 0 {
            (vol / max, ((span + balance) * vol) / (max * span))
        } else {
            (((span - balance) * vol) / (max * span), vol / max)
        }
    }

    /// Mix up to `out.len() / 2` frames into the accumulator.
    ///
    /// Returns the frames produced; a shared stream that is busy elsewhere
    /// contributes nothing this time round.
    pub(crate) fn mix(&mut self, out: &mut [i32], vol_l: i32, vol_r: i32) -> usize {
        let flow = match &mut self.stream {
            ChannelStream::Owned(stream) => self.converter.flow(stream.as_mut(), out, vol_l, vol_r),
            ChannelStream::Shared(stream) => match stream.try_lock() {
                Ok(mut stream) => self.converter.flow(&mut *stream, out, vol_l, vol_r),
                Err(TryLockError::WouldBlock) => return 0,
                Err(TryLockError::Poisoned(err)) => {
                    let mut stream = err.into_inner();
                    self.converter.flow(&mut *stream, out, vol_l, vol_r)
                }
            },
        };
        self.consumed_frames += flow.consumed as u64;
        flow.produced
    }

    /// The stream has ended and nothing is left inside the converter.
    pub(crate) fn is_finished(&self) -> bool {
        if !self.converter.is_drained() {
            return false;
        }
        match &self.stream {
            ChannelStream::Owned(stream) => stream.end_of_stream(),
            ChannelStream::Shared(stream) => match stream.try_lock() {
                Ok(stream) => stream.end_of_stream(),
                Err(TryLockError::WouldBlock) => false,
                Err(TryLockError::Poisoned(err)) => err.into_inner().end_of_stream(),
            },
        }
    }

    /// Elapsed play time from consumed source frames at the stream's native rate.
    pub(crate) fn elapsed(&self) -> Timestamp {
        Timestamp::new(self.consumed_frames, self.stream_rate)
    }

    pub(crate) fn is_stream_owned(&self) -> bool {
        self.stream.is_owned()
    }
}
