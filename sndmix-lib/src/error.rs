use std::fmt::{Display, Formatter};

/// Error type for the fallible edges around the mixer: file decoding, output
/// device setup and settings parsing. Mixer control calls and rendering never
/// return errors.
#[derive(Debug)]
pub enum MixerError {
    Io(std::io::Error),
    Decode(String),
    Device(String),
    Settings(String),
}

impl Display for MixerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Decode(err) => write!(f, "decode error: {}", err),
            Self::Device(err) => write!(f, "audio device error: {}", err),
            Self::Settings(err) => write!(f, "invalid mixer settings: {}", err),
        }
    }
}

impl std::error::Error for MixerError {}

impl From<std::io::Error> for MixerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for MixerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Settings(value.to_string())
    }
}

impl From<symphonia::core::errors::Error> for MixerError {
    fn from(value: symphonia::core::errors::Error) -> Self {
        match value {
            symphonia::core::errors::Error::IoError(err) => Self::Io(err),
            other => Self::Decode(other.to_string()),
        }
    }
}
