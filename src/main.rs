//! Threat model:
//! - The attacker can read the locker file at rest and mount offline attacks.
//! - The attacker does not have code execution on the host while the
//!   plaintext binary is staged or running; staging to a temp file is
//!   access control, not a sandbox.
//!
//! Design choices favor authenticated, all-or-nothing decryption and
//! guaranteed cleanup of the staged executable over convenience.

mod cli;
mod commands;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match commands::run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}
