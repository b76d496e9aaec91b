//! Frame-accurate playback positions.

/// A position expressed as a frame count at a given frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    frames: u64,
    rate: u32,
}

impl Timestamp {
    /// Create a timestamp of `frames` frames at `rate` frames per second.
    ///
    /// A zero rate is bumped to `1` so the conversions below never divide by zero.
    pub fn new(frames: u64, rate: u32) -> Self {
        Self {
            frames,
            rate: rate.max(1),
        }
    }

    /// The zero position at `rate`.
    pub fn zero(rate: u32) -> Self {
        Self::new(0, rate)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Return a copy advanced by `frames` frames.
    pub fn add_frames(&self, frames: u64) -> Self {
        Self::new(self.frames.saturating_add(frames), self.rate)
    }

    /// Whole milliseconds, rounded down.
    pub fn msecs(&self) -> u64 {
        (self.frames as u128 * 1000 / self.rate as u128) as u64
    }

    /// Seconds as a float, for display.
    pub fn secs(&self) -> f64 {
        self.frames as f64 / self.rate as f64
    }

    /// Re-express this position at another rate, rounding down.
    pub fn convert_to_rate(&self, rate: u32) -> Self {
        let rate = rate.max(1);
        let frames = (self.frames as u128 * rate as u128 / self.rate as u128) as u64;
        Self::new(frames, rate)
    }
}
