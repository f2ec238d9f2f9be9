//! # romid CLI
//!
//! Shared driver behind `set_product_id` and `set_project_id`. Both tools
//! resolve a value, then program it into the layout, RTL, gate-level
//! netlist and (32-bit only) the text block, printing progress to stdout.
//! Exit status is 0 on success, in report mode, for `--help` and for the
//! wrong number of arguments, and 1 for any failure.

pub mod cli;

use std::ffi::OsString;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use romid_core::{PatchError, RomSpec};
use romid_io::{
    resolve_value, IdSource, PatchContext, PatchPlan, ProjectPaths, Resolved, RomIdError,
    StepEvent, StepOutcome, Target,
};

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Failures of one tool invocation.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    RomId(#[from] RomIdError),

    #[error("Cannot encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Initialise `env_logger`, honouring `RUST_LOG` when set.
pub fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    // `run` may be called more than once per process.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

/// Run one tool invocation. `raw_args` excludes the program name.
pub fn run<I, T>(tool: &'static str, rom: &RomSpec, raw_args: I, cwd: &Path) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let (args, ignored) = cli::normalize(raw_args);
    let args = match cli::parse(tool, rom, args) {
        Ok(args) => args,
        Err(e) if e.kind() == clap::error::ErrorKind::DisplayHelp => {
            print!("{}", e.render());
            return EXIT_OK;
        }
        Err(e) => {
            println!("{}", e.render());
            return EXIT_FAILURE;
        }
    };

    init_logging(args.debug);
    for option in &ignored {
        log::warn!("ignoring unknown option {}", option.to_string_lossy());
    }

    if args.positional.len() > 2 {
        println!("Wrong number of arguments given to {tool}.");
        print!("{}", cli::usage(tool, rom));
        return EXIT_OK;
    }

    match execute(rom, &args, cwd) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            report_error(&e);
            EXIT_FAILURE
        }
    }
}

fn execute(rom: &RomSpec, args: &cli::Args, cwd: &Path) -> Result<(), CliError> {
    let target = Target::from_args(&args.positional, rom, cwd)?;
    let paths = ProjectPaths::open(&target.root)?;
    let resolved = resolve_value(&paths, rom, target.explicit, args.report)?;

    if args.report {
        println!("{}", report_line(rom, &resolved, args.json)?);
        return Ok(());
    }

    let value = resolved.require_nonzero(rom)?;
    println!("Setting {} to: {}", rom.label, value);
    paths.check_source_dirs()?;

    let ctx = PatchContext {
        paths: &paths,
        rom,
        value,
    };
    let mut plan = PatchPlan::for_rom(rom);
    plan.run(&ctx, |event| match event {
        StepEvent::Started { index, description } => {
            println!("Step {}:  {}", index + 1, description);
            if index == 0 && args.debug {
                for line in via_diagnostics(&ctx) {
                    println!("{line}");
                }
            }
        }
        StepEvent::Finished { outcome, .. } => match outcome {
            StepOutcome::Done => println!("Done!"),
            StepOutcome::Incomplete(message) => println!("Error:  {message}"),
        },
    })?;
    Ok(())
}

/// The report printed in `-report` mode.
#[derive(Debug, Serialize)]
pub struct Report {
    pub rom: &'static str,
    pub value: u32,
    pub hex: String,
    pub source: IdSource,
}

pub fn report_line(rom: &RomSpec, resolved: &Resolved, json: bool) -> Result<String, serde_json::Error> {
    if !json {
        return Ok(resolved.value.value().to_string());
    }
    let report = Report {
        rom: rom.cell,
        value: resolved.value.value(),
        hex: resolved.value.to_hex(),
        source: resolved.source,
    };
    serde_json::to_string(&report)
}

/// Per-bit via coordinates and rewrite strings shown with `-debug`.
pub fn via_diagnostics(ctx: &PatchContext<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    for bit in ctx.value.set_bits() {
        let Some(p) = ctx.rom.placement(bit) else {
            continue;
        };
        lines.push(format!("Bit {bit}:"));
        lines.push(format!(
            "Via position ({:3.2}, {:3.2}) to ({:3.2}, {:3.2})",
            p.zero_um.min.x, p.zero_um.min.y, p.zero_um.max.x, p.zero_um.max.y
        ));
        lines.push(format!("Old string = \"{}\"", p.zero));
        lines.push(format!("New string = \"{}\"", p.one));
    }
    lines
}

fn report_error(e: &CliError) {
    match e {
        CliError::RomId(RomIdError::Patch {
            source: PatchError::ViasNotFound { bits },
            ..
        }) => {
            for bit in bits {
                println!("Error: via not found for bit position {bit}");
            }
            println!("There were {} errors in processing.  No file written.", bits.len());
            println!("Ending process.");
        }
        CliError::RomId(RomIdError::Patch { .. }) => {
            println!("Error:  {e}");
            println!("Ending process.");
        }
        _ => println!("Error:  {e}"),
    }
    log::debug!("{e:?}");
}
