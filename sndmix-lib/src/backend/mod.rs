//! Platform output for the mixer.
//!
//! The mixer itself knows nothing about audio devices. A backend pulls
//! [`Mixer::render`](crate::mixer::Mixer::render) from its real-time thread
//! and flips the ready flag once it is running.

mod output;
mod source;

pub use output::OutputDevice;
pub use source::MixerSource;
