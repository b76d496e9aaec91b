//! Per-channel rate conversion and accumulation.
//!
//! A converter pulls frames from a stream at its native rate, produces frames
//! at the mixer output rate, scales them by the channel's left/right volume
//! (0..=256, where 256 is unity) and adds them into an `i32` stereo
//! accumulator. Scratch space is allocated once when the converter is built;
//! [`RateConverter::flow`] itself never allocates.

use super::stream::AudioStream;

/// Samples of scratch space per converter.
const SCRATCH_SAMPLES: usize = 512;

const FRAC_BITS: u32 = 16;
const FRAC_ONE: u64 = 1 << FRAC_BITS;

/// Unity gain for the per-side volume passed to [`RateConverter::flow`].
pub const UNITY_VOLUME: i32 = 256;

/// Frame counts reported by one [`RateConverter::flow`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flow {
    /// Output frames written into the accumulator.
    pub produced: usize,
    /// Source frames taken from the stream.
    pub consumed: usize,
}

/// Converts one stream to the output rate.
pub enum RateConverter {
    /// Source already runs at the output rate.
    Copy(CopyConverter),
    /// Linear interpolation between neighbouring source frames.
    Linear(LinearConverter),
}

impl RateConverter {
    /// Pick a converter for a stream at `in_rate` feeding `out_rate`.
    pub fn new(in_rate: u32, out_rate: u32, stereo: bool, reverse_stereo: bool) -> Self {
        let channels = if stereo { 2 } else { 1 };
        if in_rate == out_rate || in_rate == 0 || out_rate == 0 {
            Self::Copy(CopyConverter::new(channels, reverse_stereo))
        } else {
            Self::Linear(LinearConverter::new(in_rate, out_rate, channels, reverse_stereo))
        }
    }

    /// Mix up to `out.len() / 2` frames from `stream` into `out`.
    pub fn flow(
        &mut self,
        stream: &mut dyn AudioStream,
        out: &mut [i32],
        vol_l: i32,
        vol_r: i32,
    ) -> Flow {
        match self {
            Self::Copy(converter) => converter.flow(stream, out, vol_l, vol_r),
            Self::Linear(converter) => converter.flow(stream, out, vol_l, vol_r),
        }
    }

    /// True when no source frames are held back inside the converter.
    pub fn is_drained(&self) -> bool {
        match self {
            Self::Copy(_) => true,
            Self::Linear(converter) => converter.is_drained(),
        }
    }
}

/// Frame split into left/right, with mono duplicated and reverse stereo applied.
#[inline]
fn frame_at(samples: &[i16], channels: usize, reverse_stereo: bool) -> (i32, i32) {
    let left = samples[0] as i32;
    let right = if channels == 2 { samples[1] as i32 } else { left };
    if reverse_stereo {
        (right, left)
    } else {
        (left, right)
    }
}

#[inline]
fn accumulate(out: &mut [i32], frame: usize, left: i32, right: i32, vol_l: i32, vol_r: i32) {
    out[frame * 2] += left * vol_l / UNITY_VOLUME;
    out[frame * 2 + 1] += right * vol_r / UNITY_VOLUME;
}

pub struct CopyConverter {
    scratch: Vec<i16>,
    channels: usize,
    reverse_stereo: bool,
}

impl CopyConverter {
    fn new(channels: usize, reverse_stereo: bool) -> Self {
        Self {
            scratch: vec![0; SCRATCH_SAMPLES],
            channels,
            reverse_stereo,
        }
    }

    fn flow(&mut self, stream: &mut dyn AudioStream, out: &mut [i32], vol_l: i32, vol_r: i32) -> Flow {
        let frames = out.len() / 2;
        let mut produced = 0;
        while produced < frames {
            let want = ((frames - produced) * self.channels).min(self.scratch.len());
            let read = stream.read_buffer(&mut self.scratch[..want]);
            let read_frames = read / self.channels;
            for i in 0..read_frames {
                let start = i * self.channels;
                let (left, right) =
                    frame_at(&self.scratch[start..], self.channels, self.reverse_stereo);
                accumulate(out, produced + i, left, right, vol_l, vol_r);
            }
            produced += read_frames;
            if read_frames == 0 {
                break;
            }
        }
        Flow {
            produced,
            consumed: produced,
        }
    }
}

pub struct LinearConverter {
    scratch: Vec<i16>,
    pos: usize,
    len: usize,
    channels: usize,
    reverse_stereo: bool,
    /// Source step per output frame, 16.16 fixed point.
    step: u64,
    /// Position between `prev` and `next`, 16.16 fixed point.
    frac: u64,
    prev: (i32, i32),
    next: (i32, i32),
    primed: u8,
    /// The source has ended and `next` is being played out as the last frame.
    tail: bool,
    /// The last frame has been played out.
    done: bool,
}

impl LinearConverter {
    fn new(in_rate: u32, out_rate: u32, channels: usize, reverse_stereo: bool) -> Self {
        Self {
            scratch: vec![0; SCRATCH_SAMPLES],
            pos: 0,
            len: 0,
            channels,
            reverse_stereo,
            step: ((in_rate as u64) << FRAC_BITS) / out_rate as u64,
            frac: 0,
            prev: (0, 0),
            next: (0, 0),
            primed: 0,
            tail: false,
            done: false,
        }
    }

    fn is_drained(&self) -> bool {
        self.pos >= self.len && (self.primed == 0 || self.done)
    }

    fn fetch(&mut self, stream: &mut dyn AudioStream) -> Option<(i32, i32)> {
        if self.pos >= self.len {
            self.pos = 0;
            self.len = stream.read_buffer(&mut self.scratch);
            self.len -= self.len % self.channels;
            if self.len == 0 {
                return None;
            }
        }
        let frame = frame_at(&self.scratch[self.pos..], self.channels, self.reverse_stereo);
        self.pos += self.channels;
        Some(frame)
    }

    fn advance(&mut self, stream: &mut dyn AudioStream) -> bool {
        match self.fetch(stream) {
            Some(frame) => {
                self.prev = self.next;
                self.next = frame;
                true
            }
            None => false,
        }
    }

    /// Move one source frame forward. Once the source has ended, the held
    /// `next` frame gets one more step so it is still played.
    fn step_source(&mut self, stream: &mut dyn AudioStream, flow: &mut Flow) -> bool {
        if self.tail {
            self.done = true;
            return false;
        }
        if self.advance(stream) {
            flow.consumed += 1;
            return true;
        }
        if self.primed > 0 && stream.end_of_stream() {
            self.prev = self.next;
            self.tail = true;
            return true;
        }
        false
    }

    fn flow(&mut self, stream: &mut dyn AudioStream, out: &mut [i32], vol_l: i32, vol_r: i32) -> Flow {
        let frames = out.len() / 2;
        let mut flow = Flow::default();
        while flow.produced < frames && !self.done {
            while self.primed < 2 {
                if !self.step_source(stream, &mut flow) {
                    return flow;
                }
                self.primed += 1;
            }
            while self.frac >= FRAC_ONE {
                if !self.step_source(stream, &mut flow) {
                    return flow;
                }
                self.frac -= FRAC_ONE;
            }
            let frac = self.frac as i64;
            let one = FRAC_ONE as i64;
            let left = self.prev.0 as i64 + (self.next.0 - self.prev.0) as i64 * frac / one;
            let right = self.prev.1 as i64 + (self.next.1 - self.prev.1) as i64 * frac / one;
            accumulate(out, flow.produced, left as i32, right as i32, vol_l, vol_r);
            flow.produced += 1;
            self.frac += self.step;
        }
        flow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::memory::MemoryStream;
    use crate::audio::queue::queued_stream;

    #[test]
    fn copy_applies_volume_and_duplicates_mono() {
        let mut stream = MemoryStream::new(vec![1000, -1000], 22_050, false);
        let mut converter = RateConverter::new(22_050, 22_050, false, false);
        let mut out = [0_i32; 6];
        let flow = converter.flow(&mut stream, &mut out, UNITY_VOLUME, 128);
        assert_eq!(flow, Flow { produced: 2, consumed: 2 });
        assert_eq!(out, [1000, 500, -1000, -500, 0, 0]);
    }

    #[test]
    fn copy_reverse_stereo_swaps_sides() {
        let mut stream = MemoryStream::new(vec![10, 20], 22_050, true);
        let mut converter = RateConverter::new(22_050, 22_050, true, true);
        let mut out = [0_i32; 2];
        converter.flow(&mut stream, &mut out, UNITY_VOLUME, UNITY_VOLUME);
        assert_eq!(out, [20, 10]);
    }

    #[test]
    fn copy_accumulates_on_top_of_existing_values() {
        let mut stream = MemoryStream::new(vec![i16::MAX], 22_050, false);
        let mut converter = RateConverter::new(22_050, 22_050, false, false);
        let mut out = [i16::MAX as i32, i16::MAX as i32];
        converter.flow(&mut stream, &mut out, UNITY_VOLUME, UNITY_VOLUME);
        assert_eq!(out, [65_534, 65_534]);
    }

    #[test]
    fn upsampling_interpolates_and_counts_source_frames() {
        let mut stream = MemoryStream::new(vec![0, 100, 200], 11_025, false);
        let mut converter = RateConverter::new(11_025, 22_050, false, false);
        let mut out = [0_i32; 8];
        let flow = converter.flow(&mut stream, &mut out, UNITY_VOLUME, UNITY_VOLUME);
        assert_eq!(flow.produced, 4);
        assert_eq!(flow.consumed, 3);
        assert_eq!(out, [0, 0, 50, 50, 100, 100, 150, 150]);
    }

    #[test]
    fn downsampling_skips_source_frames() {
        let samples: Vec<i16> = (0..8).map(|v| v * 10).collect();
        let mut stream = MemoryStream::new(samples, 44_100, false);
        let mut converter = RateConverter::new(44_100, 22_050, false, false);
        let mut out = [0_i32; 6];
        let flow = converter.flow(&mut stream, &mut out, UNITY_VOLUME, UNITY_VOLUME);
        assert_eq!(flow.produced, 3);
        assert_eq!(flow.consumed, 6);
        assert_eq!(out, [0, 0, 20, 20, 40, 40]);
        assert!(!converter.is_drained());
    }

    #[test]
    fn upsampling_plays_out_the_last_frame() {
        let mut stream = MemoryStream::new(vec![1000, 2000, 3000], 11_025, false);
        let mut converter = RateConverter::new(11_025, 22_050, false, false);
        let mut out = [0_i32; 20];
        let flow = converter.flow(&mut stream, &mut out, UNITY_VOLUME, 0);
        assert_eq!(flow, Flow { produced: 6, consumed: 3 });
        let left: Vec<i32> = out.iter().step_by(2).copied().collect();
        assert_eq!(left, [1000, 1500, 2000, 2500, 3000, 3000, 0, 0, 0, 0]);
        assert!(converter.is_drained());
    }

    #[test]
    fn single_frame_stream_is_not_lost() {
        let mut stream = MemoryStream::new(vec![500], 11_025, false);
        let mut converter = RateConverter::new(11_025, 22_050, false, false);
        let mut out = [0_i32; 8];
        let flow = converter.flow(&mut stream, &mut out, UNITY_VOLUME, UNITY_VOLUME);
        assert_eq!(flow, Flow { produced: 2, consumed: 1 });
        assert_eq!(out, [500, 500, 500, 500, 0, 0, 0, 0]);
        assert!(converter.is_drained());
    }

    #[test]
    fn starved_source_is_held_until_more_data() {
        let (writer, mut stream) = queued_stream(11_025, false, 16);
        let mut converter = RateConverter::new(11_025, 22_050, false, false);
        writer.push(&[100, 200]);
        let mut out = [0_i32; 8];
        let flow = converter.flow(&mut stream, &mut out, UNITY_VOLUME, UNITY_VOLUME);
        assert_eq!(flow.produced, 2);
        assert!(!converter.is_drained());

        writer.finish();
        let mut out = [0_i32; 8];
        let flow = converter.flow(&mut stream, &mut out, UNITY_VOLUME, UNITY_VOLUME);
        assert_eq!(flow.produced, 2);
        assert_eq!(out[..4], [200, 200, 200, 200]);
        assert!(converter.is_drained());
    }
}
