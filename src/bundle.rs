//! Cipher bundles and their single-string form
//!
//! A bundle is the (salt, nonce, ciphertext) triple, each field hex
//! encoded. The serialized form joins the three fields with a separator
//! character, in that fixed order:
//!
//! ```text
//! <saltHex><sep><nonceHex><sep><ciphertextHex>
//! ```
//!
//! The separator can never be a hex digit, so splitting is unambiguous.

use std::fmt;

use crate::error::{ErrorCategory, ErrorKind, Result, WeakryptError};

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: char = 'g';

/// Number of fields in a serialized bundle.
const FIELD_COUNT: usize = 3;

/// A bundle field separator that cannot appear inside a hex field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separator(char);

impl Separator {
    /// Validates `c` as a separator. ASCII hex digits of either case are
    /// rejected with [`ErrorKind::InvalidSeparator`].
    pub fn new(c: char) -> Result<Self> {
        if c.is_ascii_hexdigit() {
            return Err(WeakryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidSeparator,
                format!("separator {:?} is a hex digit and would be ambiguous", c),
            ));
        }
        Ok(Self(c))
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl Default for Separator {
    fn default() -> Self {
        Self(DEFAULT_SEPARATOR)
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hex-encoded (salt, nonce, ciphertext) triple.
///
/// Fields are optional because [`deserialize`] fills them positionally and
/// leaves missing ones absent. A bundle with an absent field can never be
/// decrypted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CipherBundle {
    pub salt_hex: Option<String>,
    pub nonce_hex: Option<String>,
    pub ciphertext_hex: Option<String>,
}

impl CipherBundle {
    pub fn new(
        salt_hex: impl Into<String>,
        nonce_hex: impl Into<String>,
        ciphertext_hex: impl Into<String>,
    ) -> Self {
        Self {
            salt_hex: Some(salt_hex.into()),
            nonce_hex: Some(nonce_hex.into()),
            ciphertext_hex: Some(ciphertext_hex.into()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.salt_hex.is_some() && self.nonce_hex.is_some() && self.ciphertext_hex.is_some()
    }

    /// Borrow all three fields, or fail with [`ErrorKind::MalformedBundle`]
    /// naming the first absent one.
    pub fn fields(&self) -> Result<(&str, &str, &str)> {
        let salt = self.salt_hex.as_deref().ok_or_else(|| missing("salt"))?;
        let nonce = self.nonce_hex.as_deref().ok_or_else(|| missing("nonce"))?;
        let ciphertext = self
            .ciphertext_hex
            .as_deref()
            .ok_or_else(|| missing("ciphertext"))?;
        Ok((salt, nonce, ciphertext))
    }
}

fn missing(field: &str) -> WeakryptError {
    WeakryptError::malformed(format!("bundle is missing its {} field", field))
}

/// Join the bundle fields in the order salt, nonce, ciphertext.
///
/// Absent fields serialize as empty strings.
pub fn serialize(bundle: &CipherBundle, separator: Separator) -> String {
    let fields = [
        bundle.salt_hex.as_deref().unwrap_or_default(),
        bundle.nonce_hex.as_deref().unwrap_or_default(),
        bundle.ciphertext_hex.as_deref().unwrap_or_default(),
    ];
    let mut buf = [0u8; 4];
    let sep: &str = separator.0.encode_utf8(&mut buf);
    fields.join(sep)
}

/// Split `text` into a bundle, filling fields positionally.
///
/// Never fails: with too few separators the trailing fields stay `None`,
/// and parts past the third are dropped. Use [`parse`] to reject anything
/// that is not exactly three fields.
pub fn deserialize(text: &str, separator: Separator) -> CipherBundle {
    let mut parts = text.split(separator.0).map(str::to_owned);
    CipherBundle {
        salt_hex: parts.next(),
        nonce_hex: parts.next(),
        ciphertext_hex: parts.next(),
    }
}

/// Split `text` into a bundle, requiring exactly three fields.
pub fn parse(text: &str, separator: Separator) -> Result<CipherBundle> {
    let count = text.split(separator.0).count();
    if count != FIELD_COUNT {
        return Err(WeakryptError::malformed(format!(
            "expected {} fields separated by {:?}, found {}",
            FIELD_COUNT, separator.0, count
        )));
    }
    Ok(deserialize(text, separator))
}
