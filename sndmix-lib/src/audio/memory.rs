//! In-memory PCM stream.

use super::stream::{AudioStream, RewindableAudioStream};

/// Interleaved PCM held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryStream {
    samples: Vec<i16>,
    position: usize,
    rate: u32,
    stereo: bool,
}

impl MemoryStream {
    /// Wrap `samples` as a stream at `rate` Hz.
    ///
    /// A trailing half frame on a stereo buffer is dropped so reads always
    /// return whole frames.
    pub fn new(mut samples: Vec<i16>, rate: u32, stereo: bool) -> Self {
        if stereo && samples.len() % 2 != 0 {
            samples.pop();
        }
        Self {
            samples,
            position: 0,
            rate,
            stereo,
        }
    }

    /// Total length in frames.
    pub fn len_frames(&self) -> usize {
        self.samples.len() / self.channels()
    }

    /// Frames not yet read.
    pub fn remaining_frames(&self) -> usize {
        (self.samples.len() - self.position) / self.channels()
    }
}

impl AudioStream for MemoryStream {
    fn read_buffer(&mut self, buffer: &mut [i16]) -> usize {
        let channels = self.channels();
        let wanted = buffer.len() - buffer.len() % channels;
        let count = wanted.min(self.samples.len() - self.position);
        buffer[..count].copy_from_slice(&self.samples[self.position..self.position + count]);
        self.position += count;
        count
    }

    fn is_stereo(&self) -> bool {
        self.stereo
    }

    fn rate(&self) -> u32 {
        self.rate
    }

    fn end_of_data(&self) -> bool {
        self.position >= self.samples.len()
    }
}

impl RewindableAudioStream for MemoryStream {
    fn rewind(&mut self) -> bool {
        self.position = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_until_exhausted() {
        let mut stream = MemoryStream::new(vec![1, 2, 3, 4, 5], 8_000, false);
        let mut buf = [0_i16; 3];
        assert_eq!(stream.read_buffer(&mut buf), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert!(!stream.end_of_data());
        assert_eq!(stream.read_buffer(&mut buf), 2);
        assert_eq!(&buf[..2], &[4, 5]);
        assert!(stream.end_of_stream());
        assert_eq!(stream.read_buffer(&mut buf), 0);
    }

    #[test]
    fn stereo_reads_whole_frames() {
        let mut stream = MemoryStream::new(vec![1, -1, 2, -2, 3], 8_000, true);
        assert_eq!(stream.len_frames(), 2);
        let mut buf = [0_i16; 3];
        assert_eq!(stream.read_buffer(&mut buf), 2);
        assert_eq!(stream.remaining_frames(), 1);
    }

    #[test]
    fn rewind_restarts() {
        let mut stream = MemoryStream::new(vec![7, 8], 8_000, false);
        let mut buf = [0_i16; 4];
        stream.read_buffer(&mut buf);
        assert!(stream.end_of_data());
        assert!(stream.rewind());
        assert_eq!(stream.read_buffer(&mut buf), 2);
        assert_eq!(&buf[..2], &[7, 8]);
    }
}
