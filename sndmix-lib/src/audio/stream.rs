//! Pull-based PCM producer contract consumed by the mixer.
//!
//! Codec and driver code implement [`AudioStream`]; the mixer only ever pulls
//! interleaved signed 16-bit samples from it on the render thread.

/// A lazy source of interleaved signed 16-bit PCM samples.
///
/// Implementations must never block inside [`AudioStream::read_buffer`]: it is
/// called while the mixer holds its lock on the real-time render thread.
pub trait AudioStream: Send {
    /// Fill `buffer` with up to `buffer.len()` interleaved samples.
    ///
    /// Returns the number of samples written, which for stereo streams is
    /// always even. Returning `0` is legal without being at end of data
    /// (for example a queue that is momentarily empty).
    fn read_buffer(&mut self, buffer: &mut [i16]) -> usize;

    /// Whether samples are interleaved left/right pairs.
    fn is_stereo(&self) -> bool;

    /// Native sample rate in frames per second.
    fn rate(&self) -> u32;

    /// No more samples are available right now.
    fn end_of_data(&self) -> bool;

    /// No more samples will ever be available.
    ///
    /// The mixer retires a channel once this reports `true`.
    fn end_of_stream(&self) -> bool {
        self.end_of_data()
    }

    /// Number of interleaved channels, derived from [`AudioStream::is_stereo`].
    fn channels(&self) -> usize {
        if self.is_stereo() {
            2
        } else {
            1
        }
    }
}

/// A stream that can restart from its first sample.
pub trait RewindableAudioStream: AudioStream {
    /// Rewind to the beginning. Returns `false` when the stream cannot restart.
    fn rewind(&mut self) -> bool;
}

impl<S: AudioStream + ?Sized> AudioStream for Box<S> {
    fn read_buffer(&mut self, buffer: &mut [i16]) -> usize {
        (**self).read_buffer(buffer)
    }

    fn is_stereo(&self) -> bool {
        (**self).is_stereo()
    }

    fn rate(&self) -> u32 {
        (**self).rate()
    }

    fn end_of_data(&self) -> bool {
        (**self).end_of_data()
    }

    fn end_of_stream(&self) -> bool {
        (**self).end_of_stream()
    }
}

impl<S: RewindableAudioStream + ?Sized> RewindableAudioStream for Box<S> {
    fn rewind(&mut self) -> bool {
        (**self).rewind()
    }
}
