//! Symphonia helpers for decoding audio files into in-memory streams.
//!
//! Decoding happens up front on the caller's thread; the mixer only ever sees
//! the resulting [`MemoryStream`].

use log::{debug, warn};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::MixerError;

use super::memory::MemoryStream;

/// Decode the first audio track of `path` into a [`MemoryStream`].
///
/// Mono sources stay mono; sources with more than two channels keep only the
/// first two.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<MemoryStream, MixerError> {
    let path = path.as_ref();
    let mut format = open_reader(path)?;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| MixerError::Decode(format!("no audio track in {}", path.display())))?;
    let track_id = track.id;
    let rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| MixerError::Decode("track has no sample rate".to_string()))?;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<i16> = Vec::new();
    let mut stereo = false;
    let mut sample_buffer: Option<SampleBuffer<i16>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(Error::DecodeError(err)) => {
                warn!("decode error: {}", err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        stereo = channels >= 2;

        let needs_new = sample_buffer
            .as_ref()
            .map_or(true, |buf| buf.capacity() < decoded.capacity() * channels);
        if needs_new {
            sample_buffer = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        let Some(buf) = sample_buffer.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        if channels <= 2 {
            samples.extend_from_slice(buf.samples());
        } else {
            for frame in buf.samples().chunks_exact(channels) {
                samples.push(frame[0]);
                samples.push(frame[1]);
            }
        }
    }

    debug!(
        "decoded {} ({} samples, {} Hz, stereo: {})",
        path.display(),
        samples.len(),
        rate,
        stereo
    );

    Ok(MemoryStream::new(samples, rate, stereo))
}

fn open_reader(path: &Path) -> Result<Box<dyn FormatReader>, MixerError> {
    let src = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    Ok(probed.format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file("/definitely/not/here.wav").unwrap_err();
        assert!(matches!(err, MixerError::Io(_)));
    }
}
