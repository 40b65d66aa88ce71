use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lockrun", version)]
#[command(about = "Encrypt an executable into a password-protected locker file and run it on demand.")]
pub struct Cli {
    /// Read the password from stdin instead of prompting (two lines for
    /// lock: password and confirmation).
    #[arg(long, global = true)]
    pub password_stdin: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encrypt an executable into a locker file.
    Lock {
        input: PathBuf,
        output: PathBuf,
        /// Legacy key derivation: password padded to 32 bytes, no salt.
        #[arg(long)]
        padded_key: bool,
        /// Emit the legacy tag-less layout for byte-exact interop.
        #[arg(long)]
        compat: bool,
        #[arg(long)]
        force: bool,
    },
    /// Decrypt a locker file and run the recovered executable.
    Run {
        artifact: PathBuf,
        /// The artifact uses the legacy padded-key derivation
        /// (only meaningful with --compat; tagged artifacts self-describe).
        #[arg(long)]
        padded_key: bool,
        /// The artifact uses the legacy tag-less layout.
        #[arg(long)]
        compat: bool,
        /// Print staging paths, byte counts, and hex previews to stderr.
        #[arg(long)]
        debug: bool,
        /// Kill the protected binary after this many seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Arguments passed through to the protected binary.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
}
