//! Repeat a rewindable stream a fixed or unbounded number of times.

use log::warn;

use super::stream::{AudioStream, RewindableAudioStream};

/// Plays `inner` `loops` times, or forever when `loops == 0`.
pub struct LoopingStream<S: RewindableAudioStream> {
    inner: S,
    loops: u32,
    completed: u32,
    exhausted: bool,
}

impl<S: RewindableAudioStream> LoopingStream<S> {
    pub fn new(inner: S, loops: u32) -> Self {
        let exhausted = inner.end_of_stream() && loops != 1;
        if exhausted {
            warn!("looping stream created around an empty stream");
        }
        Self {
            inner,
            loops,
            completed: 0,
            exhausted,
        }
    }

    /// Number of full passes over the inner stream so far.
    pub fn completed_loops(&self) -> u32 {
        self.completed
    }

    fn finish_pass(&mut self) {
        self.completed = self.completed.saturating_add(1);
        if self.loops != 0 && self.completed >= self.loops {
            self.exhausted = true;
            return;
        }
        if !self.inner.rewind() {
            self.exhausted = true;
        }
    }
}

impl<S: RewindableAudioStream> AudioStream for LoopingStream<S> {
    fn read_buffer(&mut self, buffer: &mut [i16]) -> usize {
        let mut filled = 0;
        while filled < buffer.len() && !self.exhausted {
            let read = self.inner.read_buffer(&mut buffer[filled..]);
            filled += read;
            if self.inner.end_of_stream() {
                self.finish_pass();
                if read == 0 && self.inner.end_of_stream() {
                    // Rewound onto nothing; avoid spinning.
                    self.exhausted = true;
                }
            } else if read == 0 {
                break;
            }
        }
        filled
    }

    fn is_stereo(&self) -> bool {
        self.inner.is_stereo()
    }

    fn rate(&self) -> u32 {
        self.inner.rate()
    }

    fn end_of_data(&self) -> bool {
        self.exhausted || (self.inner.end_of_data() && !self.inner.end_of_stream())
    }

    fn end_of_stream(&self) -> bool {
        self.exhausted
    }
}
