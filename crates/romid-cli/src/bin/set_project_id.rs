//! Program the 32-bit project ID ROM of a Panamax project.

use std::process::ExitCode;

use romid_core::PROJECT_ID_ROM;

fn main() -> ExitCode {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            println!("Error:  Cannot determine the current directory: {e}");
            return ExitCode::from(romid_cli::EXIT_FAILURE);
        }
    };
    let args = std::env::args_os().skip(1);
    ExitCode::from(romid_cli::run("set_project_id", &PROJECT_ID_ROM, args, &cwd))
}
