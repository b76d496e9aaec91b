//! Sine tone generator.

use std::f64::consts::TAU;

use super::stream::{AudioStream, RewindableAudioStream};

/// Mono sine wave at a fixed frequency and amplitude.
#[derive(Debug, Clone)]
pub struct ToneStream {
    frequency: f64,
    amplitude: f64,
    rate: u32,
    frame: u64,
    limit: Option<u64>,
}

impl ToneStream {
    /// An endless tone. `amplitude` is a fraction of full scale, clamped to 0..=1.
    pub fn new(frequency: f32, amplitude: f32, rate: u32) -> Self {
        Self {
            frequency: frequency.max(0.0) as f64,
            amplitude: amplitude.clamp(0.0, 1.0) as f64,
            rate: rate.max(1),
            frame: 0,
            limit: None,
        }
    }

    /// Stop after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    fn sample_at(&self, frame: u64) -> i16 {
        let phase = TAU * self.frequency * frame as f64 / self.rate as f64;
        (phase.sin() * self.amplitude * i16::MAX as f64).round() as i16
    }
}

impl AudioStream for ToneStream {
    fn read_buffer(&mut self, buffer: &mut [i16]) -> usize {
        let available = match self.limit {
            Some(limit) => limit.saturating_sub(self.frame).min(buffer.len() as u64) as usize,
            None => buffer.len(),
        };
        for slot in buffer[..available].iter_mut() {
            *slot = self.sample_at(self.frame);
            self.frame += 1;
        }
        available
    }

    fn is_stereo(&self) -> bool {
        false
    }

    fn rate(&self) -> u32 {
        self.rate
    }

    fn end_of_data(&self) -> bool {
        self.limit.is_some_and(|limit| self.frame >= limit)
    }
}

impl RewindableAudioStream for ToneStream {
    fn rewind(&mut self) -> bool {
        self.frame = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limited_tone_ends() {
        let mut tone = ToneStream::new(440.0, 0.5, 8_000).with_frame_limit(10);
        let mut buf = [0_i16; 16];
        assert_eq!(tone.read_buffer(&mut buf), 10);
        assert!(tone.end_of_stream());
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn quarter_period_hits_amplitude() {
        let mut tone = ToneStream::new(1_000.0, 1.0, 4_000);
        let mut buf = [0_i16; 4];
        tone.read_buffer(&mut buf);
        assert_eq!(buf[1], i16::MAX);
        assert_eq!(buf[3], -i16::MAX);
    }
}
