//! Authenticated encryption with AES-256-GCM
//!
//! The sealed output is the ciphertext followed by the 16-byte GCM tag.
//! No associated data is used. Callers supply a fresh nonce per call.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, Result, WeakryptError};
use crate::kdf::KEY_LEN;

/// Length of nonce in bytes
pub const NONCE_LEN: usize = 12;

/// Length of the GCM authentication tag in bytes
pub const TAG_LEN: usize = 16;

/// The one message for every decryption failure.
const AUTH_FAILED_MSG: &str = "authentication failed: wrong password, or corrupted or tampered data";

pub(crate) fn authentication_failed() -> WeakryptError {
    WeakryptError::with_kind(
        ErrorCategory::User,
        ErrorKind::AuthenticationFailed,
        AUTH_FAILED_MSG,
    )
}

/// Encrypt `plaintext`, returning ciphertext with the tag appended.
pub fn seal(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| {
            WeakryptError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CipherFailure,
                "AES-GCM encryption failed",
            )
        })
}

/// Decrypt and verify `sealed` (ciphertext followed by tag).
///
/// Every failure, including input too short to hold a tag, is reported as
/// [`ErrorKind::AuthenticationFailed`] with the same message.
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    sealed: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if sealed.len() < TAG_LEN {
        debug!(len = sealed.len(), "sealed input shorter than tag");
        return Err(authentication_failed());
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| {
            debug!(len = sealed.len(), "tag verification failed");
            authentication_failed()
        })?;

    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LEN] = [0x11; KEY_LEN];
    const NONCE: [u8; NONCE_LEN] = [0x22; NONCE_LEN];

    #[test]
    fn test_known_ciphertext() {
        let sealed = seal(&KEY, &NONCE, b"test payload").unwrap();
        assert_eq!(
            hex::encode(&sealed),
            "6392743de0bffe268950bf58fb50350b8eadacfd498ef1c798d2ca48"
        );
        assert_eq!(&open(&KEY, &NONCE, &sealed).unwrap()[..], b"test payload");
    }

    #[test]
    fn test_empty_plaintext_is_only_tag() {
        let sealed = seal(&KEY, &NONCE, b"").unwrap();
        assert_eq!(sealed.len(), TAG_LEN);
        assert_eq!(hex::encode(&sealed), "260eedd2b53aa11680e50715f5205dff");
        assert!(open(&KEY, &NONCE, &sealed).unwrap().is_empty());
    }

    #[test]
    fn test_all_byte_values() {
        let plaintext: Vec<u8> = (0..=255).collect();
        let sealed = seal(&KEY, &NONCE, &plaintext).unwrap();
        assert_eq!(sealed.len(), plaintext.len() + TAG_LEN);
        assert_eq!(&open(&KEY, &NONCE, &sealed).unwrap()[..], &plaintext[..]);
    }

    #[test]
    fn test_wrong_key() {
        let sealed = seal(&KEY, &NONCE, b"secret").unwrap();
        let err = open(&[0x12; KEY_LEN], &NONCE, &sealed).expect_err("expected auth failure");
        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
    }

    #[test]
    fn test_wrong_nonce() {
        let sealed = seal(&KEY, &NONCE, b"secret").unwrap();
        let err = open(&KEY, &[0x23; NONCE_LEN], &sealed).expect_err("expected auth failure");
        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
    }

    #[test]
    fn test_every_bit_flip_detected() {
        let sealed = seal(&KEY, &NONCE, b"hello").unwrap();
        for i in 0..sealed.len() {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                tampered[i] ^= 1 << bit;
                let err = open(&KEY, &NONCE, &tampered).expect_err("tampering must be detected");
                assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
            }
        }
    }

    #[test]
    fn test_truncation_indistinguishable() {
        let sealed = seal(&KEY, &NONCE, b"hello").unwrap();
        let wrong_key = open(&[0u8; KEY_LEN], &NONCE, &sealed).unwrap_err();

        for len in [0, 1, TAG_LEN - 1, TAG_LEN, sealed.len() - 1] {
            let err = open(&KEY, &NONCE, &sealed[..len]).expect_err("truncation must fail");
            assert_eq!(err.kind, wrong_key.kind);
            assert_eq!(err.to_string(), wrong_key.to_string());
        }
    }
}
