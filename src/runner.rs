//! Staged-executable lifecycle: materialize decrypted bytes as a temporary
//! executable, run it, and remove it on every exit path.

use crate::diag::{self, Diag};
use crate::error::Error;
use rand_core::{OsRng, RngCore};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{Duration, Instant};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Default)]
pub struct RunOptions {
    /// Argument vector passed through to the protected binary.
    pub args: Vec<OsString>,
    /// Bound on the child's run time. `None` blocks until exit.
    pub timeout: Option<Duration>,
}

/// Stage `plaintext` as a temporary executable and run it.
///
/// The child inherits stdin/stdout/stderr and runs with its working
/// directory set to the directory containing `artifact_path`, so a protected
/// binary resolves relative paths as if invoked from where the locker file
/// lives. The staged file is removed whether the run succeeds, fails to
/// spawn, or times out.
pub fn run_protected(
    plaintext: &[u8],
    artifact_path: &Path,
    options: &RunOptions,
    diag: &Diag,
) -> Result<ExitStatus, Error> {
    let staged_path = staging_path()?;
    diag.log(&format!("staging executable: {}", staged_path.display()));

    // Armed before the write so a partial write is cleaned up too.
    let _cleanup = StagedCleanup::new(&staged_path);

    write_executable(&staged_path, plaintext)?;
    diag.log(&format!("staged {} bytes", plaintext.len()));

    let workdir = artifact_dir(artifact_path);
    diag.log(&format!("working directory: {}", workdir.display()));

    let mut child = Command::new(&staged_path)
        .args(&options.args)
        .current_dir(&workdir)
        .spawn()
        .map_err(Error::Execution)?;

    let status = match options.timeout {
        None => child.wait().map_err(Error::Execution)?,
        Some(limit) => {
            let started = Instant::now();
            loop {
                if let Some(status) = child.try_wait().map_err(Error::Execution)? {
                    break status;
                }
                if started.elapsed() >= limit {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::Timeout(limit));
                }
                std::thread::sleep(WAIT_POLL_INTERVAL);
            }
        }
    };

    diag.log(&format!("protected binary exited: {status}"));
    Ok(status)
}

/// Pick an unused staging path in the platform temp directory. The name
/// carries a random suffix rather than the process id, so it is neither
/// predictable nor reusable across invocations.
fn staging_path() -> Result<PathBuf, Error> {
    let ext = if cfg!(windows) { ".exe" } else { "" };
    let dir = env::temp_dir();
    for _ in 0..32 {
        let mut rnd = [0u8; 8];
        OsRng
            .try_fill_bytes(&mut rnd)
            .map_err(|_| Error::Randomness)?;
        let candidate = dir.join(format!("lockrun-{}{ext}", diag::hex(&rnd)));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        "could not pick a staging path",
    )
    .into())
}

fn artifact_dir(artifact_path: &Path) -> PathBuf {
    match artifact_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn write_executable(path: &Path, contents: &[u8]) -> Result<(), Error> {
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o755)
            .open(path)?;
        file.write_all(contents)?;
        drop(file);
        // The requested mode is subject to the umask; re-apply it so the
        // execute bit is actually set.
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
        Ok(())
    }
    #[cfg(not(unix))]
    {
        fs::write(path, contents)?;
        Ok(())
    }
}

/// Removes the staged executable when dropped, on every exit path of
/// `run_protected`.
struct StagedCleanup {
    path: PathBuf,
}

impl StagedCleanup {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl Drop for StagedCleanup {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
