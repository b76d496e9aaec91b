use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use clap::ArgMatches;
use hound::{SampleFormat, WavSpec, WavWriter};
use log::{info, warn};
use serde_json::json;
use sndmix_lib::audio::{load_file, LoopingStream, ToneStream};
use sndmix_lib::backend::OutputDevice;
use sndmix_lib::{ChannelStream, Mixer, MixerError, MixerSettings, PlayOptions, SoundType};

/// Tones with no explicit length play this long.
const DEFAULT_TONE_SECONDS: f64 = 1.0;
/// Upper bound on an open-ended offline render.
const MAX_RENDER_SECONDS: f64 = 600.0;
const TONE_AMPLITUDE: f32 = 0.5;
const PLAY_POLL_MS: u64 = 50;

pub fn run(args: &ArgMatches) -> Result<i32, MixerError> {
    let settings = load_settings(args)?;
    match args.subcommand() {
        Some(("settings", _)) => {
            println!("{}", settings.to_json_string()?);
            Ok(0)
        }
        Some(("render", sub)) => render(settings, sub),
        Some(("play", sub)) => play(settings, sub),
        _ => Ok(2),
    }
}

fn load_settings(args: &ArgMatches) -> Result<MixerSettings, MixerError> {
    let path = args
        .subcommand()
        .and_then(|(_, sub)| sub.get_one::<String>("settings"))
        .or_else(|| args.get_one::<String>("settings"));
    let settings = match path {
        Some(path) => MixerSettings::from_path(path)?,
        None => MixerSettings::default(),
    };
    Ok(settings.sanitized())
}

/// Start every tone and file named on the command line. Returns the number
/// of sounds that found a free channel.
fn start_sources(mixer: &Mixer, args: &ArgMatches) -> Result<usize, MixerError> {
    let sound_type = args
        .get_one::<SoundType>("type")
        .copied()
        .unwrap_or(SoundType::Sfx);
    let options = PlayOptions::default()
        .with_volume(args.get_one::<i32>("volume").copied().unwrap_or(255))
        .with_balance(args.get_one::<i32>("balance").copied().unwrap_or(0));
    let loops = args.get_one::<u32>("loops").copied().unwrap_or(1);
    let tone_seconds = args
        .get_one::<f64>("seconds")
        .copied()
        .unwrap_or(DEFAULT_TONE_SECONDS);

    let mut started = 0;
    let mut start = |stream: ChannelStream| {
        if mixer.play_stream(sound_type, stream, options).is_some() {
            started += 1;
        } else {
            warn!("no free channel; sound skipped");
        }
    };

    if let Some(tones) = args.get_many::<f32>("tone") {
        let rate = mixer.get_output_rate();
        let frames = (tone_seconds.max(0.0) * rate as f64) as u64;
        for &frequency in tones {
            let tone = ToneStream::new(frequency, TONE_AMPLITUDE, rate).with_frame_limit(frames);
            start(ChannelStream::owned(tone));
        }
    }

    if let Some(inputs) = args.get_many::<String>("INPUT") {
        for input in inputs {
            let stream = load_file(input)?;
            info!("loaded {} ({} frames)", input, stream.len_frames());
            start(ChannelStream::owned(LoopingStream::new(stream, loops)));
        }
    }

    Ok(started)
}

fn render(settings: MixerSettings, args: &ArgMatches) -> Result<i32, MixerError> {
    let out = args
        .get_one::<String>("out")
        .ok_or_else(|| MixerError::Settings("missing --out".to_string()))?;
    let mixer = Mixer::new(settings);
    let started = start_sources(&mixer, args)?;
    if started == 0 {
        warn!("nothing to render");
    }

    let rate = mixer.get_output_rate();
    let seconds = args.get_one::<f64>("seconds").copied();
    let limit = (seconds.unwrap_or(MAX_RENDER_SECONDS).max(0.0) * rate as f64) as usize;
    let frames = render_to_wav(&mixer, Path::new(out), limit, seconds.is_none())?;

    let summary = json!({
        "path": out,
        "frames": frames,
        "sample_rate": rate,
        "seconds": frames as f64 / rate as f64,
    });
    println!("{}", summary);
    Ok(0)
}

/// Pull `limit` frames from the mixer into a 16-bit stereo WAV. With
/// `until_idle`, stop early once no sounds remain.
fn render_to_wav(
    mixer: &Mixer,
    path: &Path,
    limit: usize,
    until_idle: bool,
) -> Result<usize, MixerError> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: mixer.get_output_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).map_err(wav_error)?;
    let mut buffer = vec![0_i16; mixer.buffer_frames() * 2];
    let mut total = 0;

    while total < limit {
        if until_idle && mixer.active_channel_count() == 0 {
            break;
        }
        let frames = (limit - total).min(mixer.buffer_frames());
        let block = &mut buffer[..frames * 2];
        let written = mixer.render(block);
        let keep = if until_idle && mixer.active_channel_count() == 0 {
            written
        } else {
            frames
        };
        for &sample in &block[..keep * 2] {
            writer.write_sample(sample).map_err(wav_error)?;
        }
        total += keep;
    }

    writer.finalize().map_err(wav_error)?;
    info!("rendered {} frames to {}", total, path.display());
    Ok(total)
}

fn wav_error(err: hound::Error) -> MixerError {
    match err {
        hound::Error::IoError(err) => MixerError::Io(err),
        other => MixerError::Io(io::Error::new(io::ErrorKind::Other, other.to_string())),
    }
}

fn play(settings: MixerSettings, args: &ArgMatches) -> Result<i32, MixerError> {
    let mixer = Mixer::new(settings);
    let device = OutputDevice::open_default(&mixer)?;
    if start_sources(&mixer, args)? == 0 {
        warn!("nothing to play");
        return Ok(0);
    }

    let deadline = args
        .get_one::<f64>("seconds")
        .map(|seconds| Duration::from_secs_f64(seconds.max(0.0)));
    let mut waited = Duration::ZERO;
    while mixer.active_channel_count() > 0 {
        if deadline.is_some_and(|deadline| waited >= deadline) {
            mixer.stop_all();
            break;
        }
        sleep(Duration::from_millis(PLAY_POLL_MS));
        waited += Duration::from_millis(PLAY_POLL_MS);
    }

    drop(device);
    Ok(0)
}
