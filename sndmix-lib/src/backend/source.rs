//! `rodio::Source` adapter over the mixer.

use std::time::Duration;

use rodio::source::{SeekError, Source};

use crate::mixer::Mixer;

/// Endless stereo source that renders one mixer buffer at a time.
pub struct MixerSource {
    mixer: Mixer,
    buffer: Vec<i16>,
    pos: usize,
}

impl MixerSource {
    pub fn new(mixer: Mixer) -> Self {
        let buffer = vec![0; mixer.buffer_frames() * 2];
        let pos = buffer.len();
        Self { mixer, buffer, pos }
    }
}

impl Iterator for MixerSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.buffer.len() {
            self.mixer.render(&mut self.buffer);
            self.pos = 0;
        }
        let sample = self.buffer[self.pos];
        self.pos += 1;
        Some(sample as f32 / 32768.0)
    }
}

impl Source for MixerSource {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        2
    }

    fn sample_rate(&self) -> u32 {
        self.mixer.get_output_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }

    fn try_seek(&mut self, _pos: Duration) -> Result<(), SeekError> {
        Err(SeekError::NotSupported {
            underlying_source: "MixerSource",
        })
    }
}
