//! Sound groups and their global volume/mute table.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::settings::TypeVolumes;

/// Highest per-type group volume; unity gain.
pub const MAX_MIXER_VOLUME: u16 = 256;

/// Classification used for independent group volume and mute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    Plain,
    Music,
    Sfx,
    Speech,
}

impl SoundType {
    pub const ALL: [SoundType; 4] = [
        SoundType::Plain,
        SoundType::Music,
        SoundType::Sfx,
        SoundType::Speech,
    ];

    fn index(self) -> usize {
        match self {
            Self::Plain => 0,
            Self::Music => 1,
            Self::Sfx => 2,
            Self::Speech => 3,
        }
    }
}

impl Display for SoundType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Plain => "plain",
            Self::Music => "music",
            Self::Sfx => "sfx",
            Self::Speech => "speech",
        };
        f.write_str(name)
    }
}

impl FromStr for SoundType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "music" => Ok(Self::Music),
            "sfx" => Ok(Self::Sfx),
            "speech" => Ok(Self::Speech),
            other => Err(format!("unknown sound type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TypeSettings {
    volume: u16,
    muted: bool,
}

/// Per-type group volume and mute flags.
#[derive(Debug, Clone)]
pub(crate) struct SoundTypeTable {
    settings: [TypeSettings; 4],
}

impl SoundTypeTable {
    pub(crate) fn new(volumes: &TypeVolumes) -> Self {
        let entry = |volume: u16| TypeSettings {
            volume: volume.min(MAX_MIXER_VOLUME),
            muted: false,
        };
        Self {
            settings: [
                entry(volumes.plain),
                entry(volumes.music),
                entry(volumes.sfx),
                entry(volumes.speech),
            ],
        }
    }

    pub(crate) fn volume(&self, sound_type: SoundType) -> u16 {
        self.settings[sound_type.index()].volume
    }

    /// Store `volume` clamped to `0..=MAX_MIXER_VOLUME`.
    pub(crate) fn set_volume(&mut self, sound_type: SoundType, volume: i32) {
        let volume = volume.clamp(0, MAX_MIXER_VOLUME as i32) as u16;
        self.settings[sound_type.index()].volume = volume;
    }

    pub(crate) fn is_muted(&self, sound_type: SoundType) -> bool {
        self.settings[sound_type.index()].muted
    }

    pub(crate) fn set_muted(&mut self, sound_type: SoundType, muted: bool) {
        self.settings[sound_type.index()].muted = muted;
    }

    /// Group volume as heard, i.e. `0` while muted.
    pub(crate) fn effective_volume(&self, sound_type: SoundType) -> u16 {
        let settings = self.settings[sound_type.index()];
        if settings.muted {
            0
        } else {
            settings.volume
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volumes_are_clamped() {
        let mut table = SoundTypeTable::new(&TypeVolumes::default());
        table.set_volume(SoundType::Music, 1_000);
        assert_eq!(table.volume(SoundType::Music), MAX_MIXER_VOLUME);
        table.set_volume(SoundType::Music, -5);
        assert_eq!(table.volume(SoundType::Music), 0);
        assert_eq!(table.volume(SoundType::Sfx), MAX_MIXER_VOLUME);
    }

    #[test]
    fn mute_keeps_stored_volume() {
        let mut table = SoundTypeTable::new(&TypeVolumes::default());
        table.set_volume(SoundType::Speech, 100);
        table.set_muted(SoundType::Speech, true);
        assert_eq!(table.effective_volume(SoundType::Speech), 0);
        assert_eq!(table.volume(SoundType::Speech), 100);
        table.set_muted(SoundType::Speech, false);
        assert_eq!(table.effective_volume(SoundType::Speech), 100);
    }

    #[test]
    fn parses_names() {
        assert_eq!("SFX".parse::<SoundType>(), Ok(SoundType::Sfx));
        assert!("noise".parse::<SoundType>().is_err());
        assert_eq!(SoundType::Speech.to_string(), "speech");
    }
}
