//! lockrun library API
//!
//! Exposes the crypto envelope, artifact format, and protected-execution
//! runner for testing and embedding. The CLI lives in main.rs.

pub mod diag;
pub mod envelope;
pub mod error;
pub mod format;
pub mod kdf;
pub mod runner;
pub mod securemem;

pub use error::Error;
pub use format::KdfMode;
