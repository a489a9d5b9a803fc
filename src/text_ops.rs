//! Text encryption/decryption operations for the command line front end
//!
//! Reads a UTF-8 input file, runs it through a [`Crypter`], and writes the
//! result either to stdout or atomically to an output file.

use crate::crypt::Crypter;
use crate::error::{ErrorCategory, ErrorKind, Result, WeakryptError};
use crate::passphrase::PassphraseReader;
use crate::random::SecureRandom;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Encrypt the text in `input_path`.
///
/// The serialized bundle goes to `output_path`, or to stdout followed by a
/// newline when no path is given.
pub fn encrypt_text<R: SecureRandom>(
    input_path: &Path,
    output_path: Option<&Path>,
    passphrase_reader: &mut dyn PassphraseReader,
    crypter: &Crypter<R>,
) -> Result<()> {
    let message = read_text(input_path)?;
    let password = passphrase_reader.read_passphrase()?;
    let serialized = crypter
        .encrypt_to_string(&password, &message)
        .map_err(|e| e.with_context("encryption failed"))?;
    debug!(len = serialized.len(), "writing serialized bundle");

    match output_path {
        Some(path) => write_file_secure(path, serialized.as_bytes())
            .map_err(|e| e.with_context(format!("failed to write to {}", path.display()))),
        None => write_stdout(format!("{}\n", serialized).as_bytes()),
    }
}

/// Decrypt the serialized bundle in `input_path`.
///
/// Surrounding whitespace (such as a final newline) is ignored. The
/// plaintext goes to `output_path`, or to stdout unchanged.
pub fn decrypt_text<R: SecureRandom>(
    input_path: &Path,
    output_path: Option<&Path>,
    passphrase_reader: &mut dyn PassphraseReader,
    crypter: &Crypter<R>,
) -> Result<()> {
    let serialized = read_text(input_path)?;
    let password = passphrase_reader.read_passphrase()?;
    let plaintext = crypter
        .decrypt_from_string(&password, serialized.trim())
        .map_err(|e| e.with_context("failed to decrypt"))?;

    match output_path {
        Some(path) => write_file_secure(path, plaintext.as_bytes())
            .map_err(|e| e.with_context(format!("failed to write to {}", path.display()))),
        None => write_stdout(plaintext.as_bytes()),
    }
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| read_error(path, e))?;
    String::from_utf8(bytes).map_err(|e| {
        WeakryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InvalidPlaintext,
            format!("{} is not valid UTF-8", path.display()),
            e.utf8_error(),
        )
    })
}

fn write_stdout(contents: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(contents)
        .and_then(|()| stdout.flush())
        .map_err(|e| {
            WeakryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to write to stdout",
                e,
            )
        })
}

/// Write a file atomically (tempfile + fsync + rename), with mode 0o600 on Unix.
///
/// Either the previous file or the complete new one exists afterwards,
/// never a partial write.
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        WeakryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to create tempfile in {}", dir.display()),
            e,
        )
    })?;

    temp_file.write_all(contents).map_err(|e| {
        WeakryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    temp_file.flush().map_err(|e| {
        WeakryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to flush tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        WeakryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    // tempfile already creates with 0o600 on Unix; make it explicit.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                WeakryptError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }

    temp_file.persist(path).map_err(|e| {
        WeakryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn read_error(path: &Path, err: io::Error) -> WeakryptError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    WeakryptError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
