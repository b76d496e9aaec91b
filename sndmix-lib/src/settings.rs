//! Startup configuration for the mixer.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::MixerError;
use crate::mixer::sound_type::MAX_MIXER_VOLUME;
use crate::mixer::INDEX_BITS;

const DEFAULT_OUTPUT_RATE: u32 = 44_100;
const DEFAULT_CHANNEL_COUNT: usize = 32;
const DEFAULT_BUFFER_FRAMES: usize = 1024;

const MAX_CHANNEL_COUNT: usize = 1 << INDEX_BITS;
const MIN_BUFFER_FRAMES: usize = 64;
const MAX_BUFFER_FRAMES: usize = 16_384;

/// Initial per-type group volumes (0..=256).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeVolumes {
    pub plain: u16,
    pub music: u16,
    pub sfx: u16,
    pub speech: u16,
}

impl Default for TypeVolumes {
    fn default() -> Self {
        Self {
            plain: MAX_MIXER_VOLUME,
            music: MAX_MIXER_VOLUME,
            sfx: MAX_MIXER_VOLUME,
            speech: MAX_MIXER_VOLUME,
        }
    }
}

/// Serialized mixer configuration.
///
/// Out-of-range values are clamped by [`MixerSettings::sanitized`] rather than
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerSettings {
    /// Output rate in Hz, fixed for the mixer's lifetime.
    pub output_rate: u32,
    /// Size of the channel table.
    pub channel_count: usize,
    /// Frames rendered per backend pull; also sizes the render accumulator.
    pub buffer_frames: usize,
    pub volumes: TypeVolumes,
}

impl Default for MixerSettings {
    fn default() -> Self {
        Self {
            output_rate: DEFAULT_OUTPUT_RATE,
            channel_count: DEFAULT_CHANNEL_COUNT,
            buffer_frames: DEFAULT_BUFFER_FRAMES,
            volumes: TypeVolumes::default(),
        }
    }
}

impl MixerSettings {
    /// Default settings at the given output rate.
    pub fn with_output_rate(output_rate: u32) -> Self {
        Self {
            output_rate,
            ..Self::default()
        }
        .sanitized()
    }

    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, MixerError> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Read and parse a JSON settings file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, MixerError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Pretty JSON form, e.g. for writing a template file.
    pub fn to_json_string(&self) -> Result<String, MixerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp every field into its supported range.
    pub fn sanitized(mut self) -> Self {
        if self.output_rate == 0 {
            self.output_rate = DEFAULT_OUTPUT_RATE;
        }
        self.channel_count = self.channel_count.clamp(1, MAX_CHANNEL_COUNT);
        self.buffer_frames = self.buffer_frames.clamp(MIN_BUFFER_FRAMES, MAX_BUFFER_FRAMES);
        let volumes = &mut self.volumes;
        for volume in [
            &mut volumes.plain,
            &mut volumes.music,
            &mut volumes.sfx,
            &mut volumes.speech,
        ] {
            *volume = (*volume).min(MAX_MIXER_VOLUME);
        }
        self
    }
}
