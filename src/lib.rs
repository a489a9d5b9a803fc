//! weakrypt - Password-based text encryption with PBKDF2-HMAC-SHA256 and AES-256-GCM
//!
//! A message is sealed under a key stretched from a password and a fresh
//! salt, and the (salt, nonce, ciphertext) triple travels as one string:
//!
//! ```text
//! <saltHex>g<nonceHex>g<ciphertextHex>
//! ```

#![forbid(unsafe_code)]

pub mod bundle;
pub mod cipher;
pub mod codec;
pub mod crypt;
pub mod error;
pub mod kdf;
pub mod passphrase;
pub mod random;
pub mod text_ops;

pub use bundle::{CipherBundle, Separator, deserialize, serialize};
pub use crypt::Crypter;
pub use error::{ErrorCategory, ErrorKind, Result, WeakryptError};
pub use random::{OsRandom, SecureRandom};
