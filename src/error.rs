use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid arguments: {0}")]
    InvalidArgs(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cryptographic failure")]
    Crypto,

    #[error("system entropy source unavailable")]
    Randomness,

    #[error("authentication failed: wrong password or corrupted locker file")]
    Authentication,

    #[error("locker format error: {0}")]
    Format(&'static str),

    #[error("refusing to overwrite existing path: {0}")]
    WouldOverwrite(PathBuf),

    #[error("password policy violation: {0}")]
    PasswordPolicy(&'static str),

    #[error("failed to run protected binary: {0}")]
    Execution(#[source] std::io::Error),

    #[error("protected binary exceeded the {0:?} time limit")]
    Timeout(Duration),
}
