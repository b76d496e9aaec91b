//! CLI argument definitions for `sndmix`.

use clap::{value_parser, Arg, ArgAction, Command};
use sndmix_lib::SoundType;

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    Command::new("sndmix")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Adam Howard <adam.thomas.howard@gmail.com>")
        .about("Mix sounds with the sndmix software mixer")
        .arg_required_else_help(true)
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_name("PATH")
                .global(true)
                .help("Path to a JSON file with mixer settings"),
        )
        .subcommand(source_args(
            Command::new("play").about("Play sounds through the default output device"),
        ))
        .subcommand(
            source_args(Command::new("render").about("Mix sounds offline into a WAV file")).arg(
                Arg::new("out")
                    .long("out")
                    .short('o')
                    .value_name("PATH")
                    .required(true)
                    .help("Output WAV path"),
            ),
        )
        .subcommand(Command::new("settings").about("Print the effective mixer settings as JSON"))
}

/// Arguments shared by every subcommand that starts sounds.
fn source_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("INPUT")
                .help("Audio files to start together")
                .num_args(0..)
                .index(1),
        )
        .arg(
            Arg::new("tone")
                .long("tone")
                .value_name("HZ")
                .action(ArgAction::Append)
                .value_parser(value_parser!(f32))
                .help("Add a sine tone at the given frequency; may repeat"),
        )
        .arg(
            Arg::new("seconds")
                .long("seconds")
                .short('s')
                .value_name("SECONDS")
                .value_parser(value_parser!(f64))
                .help("Length of the mix; tones default to one second"),
        )
        .arg(
            Arg::new("type")
                .long("type")
                .short('t')
                .value_name("TYPE")
                .default_value("sfx")
                .value_parser(|value: &str| value.parse::<SoundType>())
                .help("Sound type: plain, music, sfx or speech"),
        )
        .arg(
            Arg::new("volume")
                .long("volume")
                .short('v')
                .value_name("VOLUME")
                .default_value("255")
                .value_parser(value_parser!(i32))
                .help("Channel volume for every sound (0-255)"),
        )
        .arg(
            Arg::new("balance")
                .long("balance")
                .short('b')
                .value_name("BALANCE")
                .default_value("0")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i32))
                .help("Stereo balance for every sound (-127 left to 127 right)"),
        )
        .arg(
            Arg::new("loops")
                .long("loops")
                .value_name("COUNT")
                .default_value("1")
                .value_parser(value_parser!(u32))
                .help("Times to play each file; 0 loops forever"),
        )
}
