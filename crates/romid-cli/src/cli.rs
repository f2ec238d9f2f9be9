use std::ffi::OsString;

use clap::{CommandFactory, FromArgMatches, Parser};

use romid_core::RomSpec;

/// Program the mask ROM ID of a Panamax project.
#[derive(Parser, Debug, Default, PartialEq)]
#[command(disable_version_flag = true)]
pub struct Args {
    /// [<id_value>] [<path_to_project>]
    #[arg(value_name = "ARG", value_parser = clap::value_parser!(OsString))]
    pub positional: Vec<OsString>,

    /// Print per-bit via coordinates and rewrite strings
    #[arg(long)]
    pub debug: bool,

    /// Print the programmed value and exit without changing any file
    #[arg(long)]
    pub report: bool,

    /// With --report, print a JSON object instead of the bare value
    #[arg(long)]
    pub json: bool,
}

/// Options understood in the tools' single-dash spelling.
const LONG_OPTIONS: [&str; 4] = ["debug", "report", "json", "help"];

/// Split raw arguments into clap-ready ones and the dash options that are
/// not recognised. `-debug` and `--debug` are the same option.
pub fn normalize<I, T>(raw: I) -> (Vec<OsString>, Vec<OsString>)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = Vec::new();
    let mut ignored = Vec::new();
    for arg in raw {
        let arg: OsString = arg.into();
        let option = match arg.to_str() {
            Some("-h") => None,
            Some(text) => text.strip_prefix("--").or_else(|| text.strip_prefix('-')),
            None if arg.as_encoded_bytes().starts_with(b"-") => Some(""),
            None => None,
        };
        match option {
            Some(name) if LONG_OPTIONS.contains(&name) => args.push(OsString::from(format!("--{name}"))),
            Some(_) => ignored.push(arg),
            None => args.push(arg),
        }
    }
    (args, ignored)
}

/// Clap command carrying the tool's own name and usage notes.
pub fn command(tool: &'static str, rom: &RomSpec) -> clap::Command {
    let digits = rom.width.hex_digits();
    Args::command()
        .name(tool)
        .bin_name(tool)
        .args_override_self(true)
        .override_usage(format!("{tool} [<{0}_value>] [<path_to_project>] [-debug] [-report]", rom.signal))
        .after_help(format!(
            "<{0}_value> is a character string of {digits} hex digits, and <path_to_project> \
             is the path to the project top level directory.\n\n\
             If <{0}_value> is not given, then it must exist in the info.yaml file.\n\
             If <path_to_project> is not given, then it is assumed to be the cwd.",
            rom.signal
        ))
}

/// Parse normalised arguments (without the program name).
pub fn parse(tool: &'static str, rom: &RomSpec, args: Vec<OsString>) -> Result<Args, clap::Error> {
    let matches = command(tool, rom).try_get_matches_from(std::iter::once(OsString::from(tool)).chain(args))?;
    Args::from_arg_matches(&matches)
}

pub fn usage(tool: &'static str, rom: &RomSpec) -> String {
    command(tool, rom).render_help().to_string()
}
