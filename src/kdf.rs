use crate::error::Error;
use crate::format::{KEY_LEN, NONCE_LEN, PBKDF2_ITERATIONS, SALT_LEN};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroizing;

pub fn enforce_password_policy(password: &[u8]) -> Result<(), Error> {
    if password.is_empty() {
        return Err(Error::PasswordPolicy("password must not be empty"));
    }
    Ok(())
}

pub fn random_salt() -> Result<[u8; SALT_LEN], Error> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|_| Error::Randomness)?;
    Ok(salt)
}

pub fn random_nonce() -> Result<[u8; NONCE_LEN], Error> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| Error::Randomness)?;
    Ok(nonce)
}

/// Legacy key rule: password bytes truncated or zero-padded to exactly
/// 32 bytes. Passwords agreeing on their first 32 bytes are therefore
/// interchangeable, which is why this mode is never the default.
pub fn pad_password(password: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    let take = password.len().min(KEY_LEN);
    key[..take].copy_from_slice(&password[..take]);
    key
}

/// Derive the AES-256 key via PBKDF2-HMAC-SHA256 with the fixed iteration
/// count. Both the hash and the count are part of the artifact contract.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, Error> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::<Hmac<Sha256>>(password, salt, PBKDF2_ITERATIONS, key.as_mut())
        .map_err(|_| Error::Crypto)?;
    Ok(key)
}
