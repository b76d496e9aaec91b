//! Default output device driving the mixer through rodio.

use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};
use rodio::{OutputStream, OutputStreamBuilder, StreamError};

use crate::error::MixerError;
use crate::mixer::Mixer;

use super::source::MixerSource;

const OUTPUT_STREAM_OPEN_RETRIES: usize = 20;
const OUTPUT_STREAM_OPEN_RETRY_MS: u64 = 100;

/// An open output stream with the mixer attached.
///
/// The mixer reports ready for as long as this value lives.
pub struct OutputDevice {
    mixer: Mixer,
    _stream: OutputStream,
}

impl OutputDevice {
    /// Open the system's default output and start pulling from `mixer`.
    ///
    /// On failure the mixer stays not ready and callers can keep using it
    /// without sound.
    pub fn open_default(mixer: &Mixer) -> Result<Self, MixerError> {
        let mut stream = open_output_stream_with_retry(mixer.get_output_rate())?;
        stream.log_on_drop(false);
        stream.mixer().add(MixerSource::new(mixer.clone()));
        mixer.set_ready(true);
        info!("output device open for a {} Hz mixer", mixer.get_output_rate());
        Ok(Self {
            mixer: mixer.clone(),
            _stream: stream,
        })
    }
}

impl Drop for OutputDevice {
    fn drop(&mut self) {
        self.mixer.set_ready(false);
    }
}

/// Open the default device at the mixer's rate, or at the device's own rate
/// when it refuses; rodio resamples in the latter case.
fn open_output_stream(sample_rate: u32) -> Result<OutputStream, StreamError> {
    OutputStreamBuilder::from_default_device()
        .and_then(|builder| builder.with_sample_rate(sample_rate).open_stream())
        .or_else(|err| {
            debug!("default device refused {} Hz: {}", sample_rate, err);
            OutputStreamBuilder::open_default_stream()
        })
}

fn open_output_stream_with_retry(sample_rate: u32) -> Result<OutputStream, MixerError> {
    let mut last_error = String::new();
    for attempt in 1..=OUTPUT_STREAM_OPEN_RETRIES {
        match open_output_stream(sample_rate) {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                warn!(
                    "open_default_stream attempt {}/{} failed: {}",
                    attempt, OUTPUT_STREAM_OPEN_RETRIES, err
                );
                last_error = err.to_string();
                if attempt < OUTPUT_STREAM_OPEN_RETRIES {
                    thread::sleep(Duration::from_millis(OUTPUT_STREAM_OPEN_RETRY_MS));
                }
            }
        }
    }
    error!(
        "failed to open default output stream after {} attempts",
        OUTPUT_STREAM_OPEN_RETRIES
    );
    Err(MixerError::Device(last_error))
}
