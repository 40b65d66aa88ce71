//! AES-256-GCM envelope over a whole file's bytes.
//!
//! Decryption is all-or-nothing: GCM verifies the authentication tag before
//! releasing any plaintext, so a wrong password and a tampered artifact are
//! indistinguishable by design.

use crate::error::Error;
use crate::format::{self, Envelope, KdfMode, SALT_LEN};
use crate::kdf;
use crate::securemem::MemoryLock;
use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use std::fs;
use std::path::Path;
use zeroize::Zeroizing;

/// Encrypt `plaintext` into a canonical (tagged) locker artifact.
pub fn lock(plaintext: &[u8], password: &[u8], mode: KdfMode) -> Result<Vec<u8>, Error> {
    let (salt, nonce, ciphertext) = seal(plaintext, password, mode)?;
    Ok(format::encode(mode, salt.as_ref(), &nonce, &ciphertext))
}

/// Encrypt into the legacy tag-less layout, byte-compatible with artifacts
/// produced before the mode tag existed.
pub fn lock_untagged(plaintext: &[u8], password: &[u8], mode: KdfMode) -> Result<Vec<u8>, Error> {
    let (salt, nonce, ciphertext) = seal(plaintext, password, mode)?;
    Ok(format::encode_untagged(salt.as_ref(), &nonce, &ciphertext))
}

/// Decrypt a canonical artifact. The leading mode tag selects the layout, so
/// no out-of-band knowledge is needed.
pub fn unlock(artifact: &[u8], password: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
    kdf::enforce_password_policy(password)?;
    open(format::parse(artifact)?, password)
}

/// Decrypt a legacy tag-less artifact. The caller must know which mode
/// produced it; the bytes alone cannot tell.
pub fn unlock_untagged(
    artifact: &[u8],
    password: &[u8],
    mode: KdfMode,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    kdf::enforce_password_policy(password)?;
    open(format::parse_untagged(artifact, mode)?, password)
}

/// Persist a locker artifact. A plain overwrite is acceptable for this
/// threat model; the CLI layer adds overwrite refusal on top.
pub fn write_artifact(path: &Path, artifact: &[u8]) -> Result<(), Error> {
    fs::write(path, artifact)?;
    Ok(())
}

fn seal(
    plaintext: &[u8],
    password: &[u8],
    mode: KdfMode,
) -> Result<(Option<[u8; SALT_LEN]>, [u8; format::NONCE_LEN], Vec<u8>), Error> {
    kdf::enforce_password_policy(password)?;
    let _pw_guard = MemoryLock::lock(password);

    let (salt, key) = match mode {
        KdfMode::Salted => {
            let salt = kdf::random_salt()?;
            let key = kdf::derive_key(password, &salt)?;
            (Some(salt), key)
        }
        KdfMode::PaddedKey => (None, kdf::pad_password(password)),
    };
    let _key_guard = MemoryLock::lock(key.as_ref());

    let nonce = kdf::random_nonce()?;
    let cipher = Aes256Gcm::new_from_slice(key.as_ref()).map_err(|_| Error::Crypto)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| Error::Crypto)?;
    Ok((salt, nonce, ciphertext))
}

fn open(envelope: Envelope<'_>, password: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
    let _pw_guard = MemoryLock::lock(password);

    let (key, nonce, ciphertext) = match envelope {
        Envelope::Salted {
            salt,
            nonce,
            ciphertext,
        } => (kdf::derive_key(password, salt)?, nonce, ciphertext),
        Envelope::Padded { nonce, ciphertext } => (kdf::pad_password(password), nonce, ciphertext),
    };
    let _key_guard = MemoryLock::lock(key.as_ref());

    let cipher = Aes256Gcm::new_from_slice(key.as_ref()).map_err(|_| Error::Crypto)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| Error::Authentication)?;
    Ok(Zeroizing::new(plaintext))
}
