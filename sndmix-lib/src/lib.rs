//! # Sndmix Library
//!
//! A real-time software mixer for game and media engines. Sounds are pulled
//! from [`AudioStream`]s, mixed with per-sound and per-group volume into one
//! interleaved 16-bit stereo stream, and handed to an output backend.
//!
//! ```no_run
//! use sndmix_lib::audio::ToneStream;
//! use sndmix_lib::{Mixer, MixerSettings, SoundType};
//!
//! let mixer = Mixer::new(MixerSettings::default());
//! let tone = ToneStream::new(440.0, 0.5, mixer.get_output_rate());
//! let handle = mixer.play(SoundType::Sfx, tone);
//!
//! let mut out = vec![0_i16; 2048];
//! mixer.render(&mut out);
//! # let _ = handle;
//! ```

pub mod audio;
pub mod backend;
pub mod error;
pub mod mixer;
pub mod settings;

pub use audio::AudioStream;
pub use error::MixerError;
pub use mixer::{ChannelStream, Mixer, PlayOptions, SoundHandle, SoundType};
pub use settings::MixerSettings;
