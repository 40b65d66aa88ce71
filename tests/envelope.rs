use lockrun::envelope;
use lockrun::error::Error;
use lockrun::format::{self, KdfMode, GCM_TAG_LEN, NONCE_LEN, SALT_LEN};
use lockrun::kdf;

const PASSWORD: &[u8] = b"correct horse battery staple";

#[test]
fn salted_roundtrip() {
    let plaintext = b"#!/bin/sh\necho protected payload\n";
    let artifact = envelope::lock(plaintext, PASSWORD, KdfMode::Salted).unwrap();
    let recovered = envelope::unlock(&artifact, PASSWORD).unwrap();
    assert_eq!(recovered.as_slice(), plaintext);
}

#[test]
fn padded_key_roundtrip() {
    let plaintext = [0u8, 1, 2, 255, 254, 253];
    let artifact = envelope::lock(&plaintext, PASSWORD, KdfMode::PaddedKey).unwrap();
    let recovered = envelope::unlock(&artifact, PASSWORD).unwrap();
    assert_eq!(recovered.as_slice(), &plaintext);
}

#[test]
fn untagged_roundtrip_both_modes() {
    let plaintext = b"binary contents";
    for mode in [KdfMode::Salted, KdfMode::PaddedKey] {
        let artifact = envelope::lock_untagged(plaintext, PASSWORD, mode).unwrap();
        let recovered = envelope::unlock_untagged(&artifact, PASSWORD, mode).unwrap();
        assert_eq!(recovered.as_slice(), plaintext, "mode {mode:?}");
    }
}

#[test]
fn mode_tag_selects_layout_without_out_of_band_knowledge() {
    let plaintext = b"self-describing";
    let artifact = envelope::lock(plaintext, PASSWORD, KdfMode::PaddedKey).unwrap();
    assert_eq!(artifact[0], format::MODE_TAG_PADDED);
    // No mode argument needed: the tag carries it.
    let recovered = envelope::unlock(&artifact, PASSWORD).unwrap();
    assert_eq!(recovered.as_slice(), plaintext);
}

#[test]
fn wrong_password_fails_authentication_in_both_modes() {
    let plaintext = b"secret program";
    for mode in [KdfMode::Salted, KdfMode::PaddedKey] {
        let artifact = envelope::lock(plaintext, PASSWORD, mode).unwrap();
        let err = envelope::unlock(&artifact, b"not the password").unwrap_err();
        assert!(matches!(err, Error::Authentication), "mode {mode:?}: {err}");
    }
}

#[test]
fn bit_flips_in_ciphertext_are_rejected() {
    let plaintext = b"tamper target";
    let artifact = envelope::lock(plaintext, PASSWORD, KdfMode::Salted).unwrap();
    let ciphertext_start = 1 + SALT_LEN + NONCE_LEN;

    // Flip one bit at a time across the ciphertext+tag region; none may
    // yield plaintext.
    for offset in ciphertext_start..artifact.len() {
        let mut corrupted = artifact.clone();
        corrupted[offset] ^= 0x01;
        let err = envelope::unlock(&corrupted, PASSWORD).unwrap_err();
        assert!(
            matches!(err, Error::Authentication),
            "offset {offset}: {err}"
        );
    }
}

#[test]
fn short_inputs_fail_with_format_errors() {
    // Tagged salted: tag + salt + nonce is the minimum frame.
    let short = vec![format::MODE_TAG_SALTED; 1 + SALT_LEN + NONCE_LEN - 1];
    assert!(matches!(
        envelope::unlock(&short, PASSWORD),
        Err(Error::Format(_))
    ));

    // Tagged padded: tag + nonce.
    let short = vec![format::MODE_TAG_PADDED; NONCE_LEN];
    assert!(matches!(
        envelope::unlock(&short, PASSWORD),
        Err(Error::Format(_))
    ));

    // Untagged salted: anything under 44 bytes cannot hold salt + nonce.
    let short = vec![0u8; SALT_LEN + NONCE_LEN - 1];
    assert!(matches!(
        envelope::unlock_untagged(&short, PASSWORD, KdfMode::Salted),
        Err(Error::Format(_))
    ));

    // Untagged padded: anything under the GCM nonce size.
    let short = vec![0u8; NONCE_LEN - 1];
    assert!(matches!(
        envelope::unlock_untagged(&short, PASSWORD, KdfMode::PaddedKey),
        Err(Error::Format(_))
    ));

    assert!(matches!(
        envelope::unlock(&[], PASSWORD),
        Err(Error::Format(_))
    ));
}

#[test]
fn unknown_mode_tag_is_rejected() {
    let plaintext = b"payload";
    let mut artifact = envelope::lock(plaintext, PASSWORD, KdfMode::Salted).unwrap();
    artifact[0] = 0x7f;
    assert!(matches!(
        envelope::unlock(&artifact, PASSWORD),
        Err(Error::Format(_))
    ));
}

#[test]
fn empty_password_is_rejected() {
    assert!(matches!(
        envelope::lock(b"data", b"", KdfMode::Salted),
        Err(Error::PasswordPolicy(_))
    ));
    let artifact = envelope::lock(b"data", PASSWORD, KdfMode::Salted).unwrap();
    assert!(matches!(
        envelope::unlock(&artifact, b""),
        Err(Error::PasswordPolicy(_))
    ));
}

#[test]
fn padded_key_truncates_at_32_bytes() {
    let long_a = b"0123456789abcdef0123456789abcdefTRAILING";
    let long_b = b"0123456789abcdef0123456789abcdefDIFFERENT";
    assert_eq!(*kdf::pad_password(long_a), *kdf::pad_password(long_b));

    // The truncation makes the two passwords interchangeable on the wire.
    let artifact = envelope::lock_untagged(b"payload", long_a, KdfMode::PaddedKey).unwrap();
    let recovered = envelope::unlock_untagged(&artifact, long_b, KdfMode::PaddedKey).unwrap();
    assert_eq!(recovered.as_slice(), b"payload");
}

#[test]
fn padded_key_zero_pads_short_passwords() {
    let key = kdf::pad_password(b"abc");
    assert_eq!(&key[..3], b"abc");
    assert!(key[3..].iter().all(|&b| b == 0));
}

#[test]
fn pbkdf2_is_deterministic_and_salt_sensitive() {
    let salt_a = [7u8; SALT_LEN];
    let salt_b = [8u8; SALT_LEN];
    let key_1 = kdf::derive_key(PASSWORD, &salt_a).unwrap();
    let key_2 = kdf::derive_key(PASSWORD, &salt_a).unwrap();
    let key_3 = kdf::derive_key(PASSWORD, &salt_b).unwrap();
    assert_eq!(*key_1, *key_2);
    assert_ne!(*key_1, *key_3);
}

#[test]
fn legacy_salted_helloworld_is_seventy_bytes() {
    // Interop fixture: the original locker produced
    // salt(32) || nonce(12) || ciphertext+tag for exactly this size.
    let artifact = envelope::lock_untagged(b"HELLOWORLD", b"secret", KdfMode::Salted).unwrap();
    assert_eq!(artifact.len(), SALT_LEN + NONCE_LEN + 10 + GCM_TAG_LEN);
    assert_eq!(artifact.len(), 70);

    let recovered = envelope::unlock_untagged(&artifact, b"secret", KdfMode::Salted).unwrap();
    assert_eq!(recovered.as_slice(), b"HELLOWORLD");

    assert!(matches!(
        envelope::unlock_untagged(&artifact, b"wrong", KdfMode::Salted),
        Err(Error::Authentication)
    ));
}

#[test]
fn salted_artifacts_differ_per_lock() {
    // Fresh salt and nonce every call: identical inputs must not produce
    // identical artifacts.
    let a = envelope::lock(b"same input", PASSWORD, KdfMode::Salted).unwrap();
    let b = envelope::lock(b"same input", PASSWORD, KdfMode::Salted).unwrap();
    assert_ne!(a, b);
}

#[test]
fn write_artifact_persists_bytes() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("lockrun-envelope-test-{}", std::process::id()));
    let artifact = envelope::lock(b"persisted", PASSWORD, KdfMode::Salted).unwrap();
    envelope::write_artifact(&path, &artifact).unwrap();
    let read_back = std::fs::read(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(read_back, artifact);
}
