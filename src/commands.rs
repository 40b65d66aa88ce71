use crate::cli::{Cli, Command};
use lockrun::diag::{self, Diag};
use lockrun::envelope;
use lockrun::error::Error;
use lockrun::format::KdfMode;
use lockrun::runner::{self, RunOptions};
use lockrun::{kdf, securemem::MemoryLock};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use zeroize::Zeroizing;

pub fn run(cli: Cli) -> Result<ExitCode, Error> {
    match cli.command {
        Command::Lock {
            input,
            output,
            padded_key,
            compat,
            force,
        } => {
            lock(&input, &output, mode_for(padded_key), compat, force, cli.password_stdin)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            artifact,
            padded_key,
            compat,
            debug,
            timeout,
            args,
        } => {
            if padded_key && !compat {
                return Err(Error::InvalidArgs(
                    "--padded-key only applies to --compat artifacts; tagged lockers self-describe",
                ));
            }
            let options = RunOptions {
                args,
                timeout: timeout.map(Duration::from_secs),
            };
            run_locker(
                &artifact,
                compat.then(|| mode_for(padded_key)),
                &options,
                debug,
                cli.password_stdin,
            )
        }
    }
}

fn mode_for(padded_key: bool) -> KdfMode {
    if padded_key {
        KdfMode::PaddedKey
    } else {
        KdfMode::Salted
    }
}

fn lock(
    input: &Path,
    output: &Path,
    mode: KdfMode,
    compat: bool,
    force: bool,
    password_stdin: bool,
) -> Result<(), Error> {
    let meta = fs::metadata(input)?;
    if !meta.is_file() {
        return Err(Error::InvalidArgs("input must be a regular file"));
    }

    let output = ensure_locker_extension(output);
    let password = read_password(password_stdin, true)?;
    let _pw_guard = MemoryLock::lock(&password);

    let plaintext = Zeroizing::new(fs::read(input)?);
    let artifact = if compat {
        envelope::lock_untagged(&plaintext, &password, mode)?
    } else {
        envelope::lock(&plaintext, &password, mode)?
    };

    let mut out = open_new_file(&output, force)?;
    out.write_all(&artifact)?;
    eprintln!("Locked: {}", output.display());
    Ok(())
}

fn run_locker(
    artifact_path: &Path,
    compat_mode: Option<KdfMode>,
    options: &RunOptions,
    debug: bool,
    password_stdin: bool,
) -> Result<ExitCode, Error> {
    let diag = Diag::new(debug);

    diag.log(&format!("reading locker file: {}", artifact_path.display()));
    let artifact = fs::read(artifact_path)?;
    diag.log(&format!("locker file size: {} bytes", artifact.len()));
    diag.log(&format!(
        "first bytes of locker file: {}",
        diag::hex_preview(&artifact)
    ));

    let password = read_password(password_stdin, false)?;
    let _pw_guard = MemoryLock::lock(&password);

    let plaintext = match compat_mode {
        Some(mode) => envelope::unlock_untagged(&artifact, &password, mode)?,
        None => envelope::unlock(&artifact, &password)?,
    };
    diag.log(&format!("decrypted binary size: {} bytes", plaintext.len()));
    diag.log(&format!(
        "first bytes of decrypted binary: {}",
        diag::hex_preview(&plaintext)
    ));

    let status = runner::run_protected(&plaintext, artifact_path, options, &diag)?;
    Ok(ExitCode::from(
        status.code().map(|code| code as u8).unwrap_or(1),
    ))
}

fn ensure_locker_extension(output: &Path) -> PathBuf {
    if output.extension().and_then(|s| s.to_str()) == Some("lkr") {
        output.to_path_buf()
    } else {
        let mut path = output.to_path_buf();
        path.set_extension("lkr");
        path
    }
}

fn open_new_file(path: &Path, force: bool) -> Result<File, Error> {
    if path.exists() && !force {
        return Err(Error::WouldOverwrite(path.to_path_buf()));
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let mut oo = OpenOptions::new();
        oo.write(true).create(true).truncate(true).mode(0o600);
        return Ok(oo.open(path)?);
    }
    #[cfg(not(unix))]
    {
        let mut oo = OpenOptions::new();
        oo.write(true).create(true).truncate(true);
        return Ok(oo.open(path)?);
    }
}

fn read_password(from_stdin: bool, confirm: bool) -> Result<Zeroizing<Vec<u8>>, Error> {
    if from_stdin {
        let pw = read_password_line()?;
        kdf::enforce_password_policy(&pw)?;
        if confirm {
            let pw2 = read_password_line()?;
            if pw.as_slice() != pw2.as_slice() {
                return Err(Error::PasswordPolicy("passwords did not match"));
            }
        }
        return Ok(pw);
    }

    let pw = rpassword::prompt_password("Password: ")
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "password input failed"))?;
    let pw = Zeroizing::new(pw.into_bytes());
    kdf::enforce_password_policy(&pw)?;
    if confirm {
        let pw2 = rpassword::prompt_password("Confirm password: ")
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "password input failed"))?;
        let pw2 = Zeroizing::new(pw2.into_bytes());
        if pw.as_slice() != pw2.as_slice() {
            return Err(Error::PasswordPolicy("passwords did not match"));
        }
    }
    Ok(pw)
}

fn read_password_line() -> Result<Zeroizing<Vec<u8>>, Error> {
    let mut line = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\r', '\n']);
    Ok(Zeroizing::new(trimmed.as_bytes().to_vec()))
}
