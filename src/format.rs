use crate::error::Error;

pub const SALT_LEN: usize = 32;
pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;
/// AES-GCM appends a 16-byte authentication tag to every ciphertext.
pub const GCM_TAG_LEN: usize = 16;

/// PBKDF2-HMAC-SHA256 iteration count. Fixed: changing it breaks every
/// existing salted locker file.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

// Canonical artifacts start with a one-byte mode tag so unlock never has to
// guess the layout. Tag-less artifacts are a compatibility mode only.
pub const MODE_TAG_SALTED: u8 = 0x01;
pub const MODE_TAG_PADDED: u8 = 0x02;

/// How the 32-byte AES key is obtained from the password.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KdfMode {
    /// PBKDF2-HMAC-SHA256 over password + random 32-byte salt.
    Salted,
    /// Password truncated/zero-padded to 32 bytes. Legacy, materially weaker;
    /// kept for interop and never the default.
    PaddedKey,
}

impl KdfMode {
    pub fn tag(self) -> u8 {
        match self {
            KdfMode::Salted => MODE_TAG_SALTED,
            KdfMode::PaddedKey => MODE_TAG_PADDED,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, Error> {
        match tag {
            MODE_TAG_SALTED => Ok(KdfMode::Salted),
            MODE_TAG_PADDED => Ok(KdfMode::PaddedKey),
            _ => Err(Error::Format("unknown mode tag")),
        }
    }
}

/// Borrowed view of a locker artifact split into its regions.
#[derive(Debug)]
pub enum Envelope<'a> {
    Salted {
        salt: &'a [u8],
        nonce: &'a [u8],
        ciphertext: &'a [u8],
    },
    Padded {
        nonce: &'a [u8],
        ciphertext: &'a [u8],
    },
}

/// Encode a canonical (tagged) artifact.
pub fn encode(mode: KdfMode, salt: Option<&[u8; SALT_LEN]>, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Vec<u8> {
    let salt_len = salt.map(|s| s.len()).unwrap_or(0);
    let mut out = Vec::with_capacity(1 + salt_len + NONCE_LEN + ciphertext.len());
    out.push(mode.tag());
    if let Some(salt) = salt {
        out.extend_from_slice(salt);
    }
    out.extend_from_slice(nonce);
    out.extend_from_slice(ciphertext);
    out
}

/// Encode a legacy tag-less artifact, byte-compatible with the original
/// locker layout.
pub fn encode_untagged(salt: Option<&[u8; SALT_LEN]>, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Vec<u8> {
    let salt_len = salt.map(|s| s.len()).unwrap_or(0);
    let mut out = Vec::with_capacity(salt_len + NONCE_LEN + ciphertext.len());
    if let Some(salt) = salt {
        out.extend_from_slice(salt);
    }
    out.extend_from_slice(nonce);
    out.extend_from_slice(ciphertext);
    out
}

/// Parse a canonical artifact, dispatching on the leading mode tag.
pub fn parse(buf: &[u8]) -> Result<Envelope<'_>, Error> {
    let (&tag, body) = buf
        .split_first()
        .ok_or(Error::Format("empty locker file"))?;
    let mode = KdfMode::from_tag(tag)?;
    parse_body(body, mode)
}

/// Parse a legacy tag-less artifact. The caller supplies the mode out of
/// band; the layout itself carries no discriminator.
pub fn parse_untagged(buf: &[u8], mode: KdfMode) -> Result<Envelope<'_>, Error> {
    parse_body(buf, mode)
}

fn parse_body(body: &[u8], mode: KdfMode) -> Result<Envelope<'_>, Error> {
    match mode {
        KdfMode::Salted => {
            if body.len() < SALT_LEN + NONCE_LEN {
                return Err(Error::Format("locker file too short for salted layout"));
            }
            let (salt, rest) = body.split_at(SALT_LEN);
            let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
            Ok(Envelope::Salted {
                salt,
                nonce,
                ciphertext,
            })
        }
        KdfMode::PaddedKey => {
            if body.len() < NONCE_LEN {
                return Err(Error::Format("locker file too short for nonce"));
            }
            let (nonce, ciphertext) = body.split_at(NONCE_LEN);
            Ok(Envelope::Padded { nonce, ciphertext })
        }
    }
}
