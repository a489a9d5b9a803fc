//! Password-based message encryption
//!
//! Composes key stretching, AES-256-GCM and the bundle codec:
//!
//! - encrypt: fresh salt, derive key, fresh nonce, seal, hex-encode
//! - decrypt: check bundle, decode hex, derive key from the stored salt, open
//!
//! A new salt is drawn for every message, so every message is sealed under
//! its own key and a nonce is never reused under a key.

use tracing::debug;

use crate::bundle::{self, CipherBundle, Separator};
use crate::cipher::{self, NONCE_LEN};
use crate::codec::{bytes_to_hex, hex_to_array, hex_to_bytes};
use crate::error::{ErrorCategory, ErrorKind, Result, WeakryptError};
use crate::kdf::{self, SALT_LEN};
use crate::random::{OsRandom, SecureRandom, random_array};

/// Encrypts and decrypts text messages with a password.
///
/// Holds no per-message state; a single instance can be shared between
/// threads as long as its random source can.
#[derive(Debug, Clone)]
pub struct Crypter<R = OsRandom> {
    random: R,
    separator: Separator,
}

impl Crypter<OsRandom> {
    /// A crypter backed by the OS generator, using the default separator.
    pub fn system() -> Result<Self> {
        Self::system_with_separator(Separator::default())
    }

    pub fn system_with_separator(separator: Separator) -> Result<Self> {
        Ok(Self::new(OsRandom::probe()?, separator))
    }
}

impl<R: SecureRandom> Crypter<R> {
    pub fn new(random: R, separator: Separator) -> Self {
        Self { random, separator }
    }

    pub fn separator(&self) -> Separator {
        self.separator
    }

    /// Encrypt `plaintext` under `password`, returning the hex bundle.
    pub fn encrypt_message(&self, password: &str, plaintext: &str) -> Result<CipherBundle> {
        let salt: [u8; SALT_LEN] = random_array(&self.random)?;
        let key = kdf::derive_key(password.as_bytes(), &salt);
        let nonce: [u8; NONCE_LEN] = random_array(&self.random)?;

        let sealed = cipher::seal(&key, &nonce, plaintext.as_bytes())?;
        debug!(
            plaintext_len = plaintext.len(),
            sealed_len = sealed.len(),
            "message sealed"
        );

        Ok(CipherBundle::new(
            bytes_to_hex(&salt),
            bytes_to_hex(&nonce),
            bytes_to_hex(&sealed),
        ))
    }

    /// Decrypt a bundle produced by [`Crypter::encrypt_message`].
    ///
    /// Bundle problems (absent field, bad hex, wrong salt/nonce length)
    /// fail with [`ErrorKind::MalformedBundle`] before any key derivation.
    /// Everything the cipher rejects is [`ErrorKind::AuthenticationFailed`].
    pub fn decrypt_message(&self, password: &str, bundle: &CipherBundle) -> Result<String> {
        let (salt_hex, nonce_hex, ciphertext_hex) = bundle.fields()?;
        let salt: [u8; SALT_LEN] = hex_to_array(salt_hex, "salt")?;
        let nonce: [u8; NONCE_LEN] = hex_to_array(nonce_hex, "nonce")?;
        let sealed = hex_to_bytes(ciphertext_hex).map_err(|e| e.with_context("invalid ciphertext"))?;

        let key = kdf::derive_key(password.as_bytes(), &salt);
        let plaintext = cipher::open(&key, &nonce, &sealed)?;

        String::from_utf8(plaintext.to_vec()).map_err(|e| {
            WeakryptError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::InvalidPlaintext,
                "decrypted message is not valid UTF-8",
                e.utf8_error(),
            )
        })
    }

    /// Encrypt and serialize with this crypter's separator.
    pub fn encrypt_to_string(&self, password: &str, plaintext: &str) -> Result<String> {
        let bundle = self.encrypt_message(password, plaintext)?;
        Ok(bundle::serialize(&bundle, self.separator))
    }

    /// Parse serialized text with this crypter's separator and decrypt it.
    ///
    /// Text that does not split into exactly three fields fails with
    /// [`ErrorKind::MalformedBundle`].
    pub fn decrypt_from_string(&self, password: &str, text: &str) -> Result<String> {
        let bundle = bundle::parse(text, self.separator)?;
        self.decrypt_message(password, &bundle)
    }
}
