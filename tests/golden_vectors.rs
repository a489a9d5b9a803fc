//! Golden test vector validation
//!
//! The vectors pin the exact wire format: PBKDF2-HMAC-SHA256 with 100,000
//! rounds, AES-256-GCM with the tag appended, lowercase hex fields joined
//! by the separator.

use std::sync::Mutex;

use serde::Deserialize;
use weakrypt::{
    CipherBundle, Crypter, ErrorCategory, ErrorKind, SecureRandom, Separator, WeakryptError,
};

#[derive(Debug, Deserialize)]
struct GoldenVector {
    plaintext: String,
    passphrase: String,
    salt: String,
    nonce: String,
    separator: char,
    serialized: String,
    comment: String,
}

fn load_golden_vectors() -> serde_json::Result<Vec<GoldenVector>> {
    let json_data = include_str!("../testdata/golden-vectors.json");
    serde_json::from_str(json_data)
}

/// Replays the vector's salt and then its nonce.
struct Replay(Mutex<Vec<u8>>);

impl Replay {
    fn new(salt: &[u8], nonce: &[u8]) -> Self {
        let mut bytes: Vec<u8> = salt.iter().chain(nonce).copied().collect();
        bytes.reverse();
        Self(Mutex::new(bytes))
    }
}

impl SecureRandom for Replay {
    fn fill(&self, buf: &mut [u8]) -> weakrypt::Result<()> {
        let mut left = self.0.lock().unwrap();
        for b in buf.iter_mut() {
            *b = left.pop().ok_or_else(|| {
                WeakryptError::with_kind(
                    ErrorCategory::Internal,
                    ErrorKind::PlatformUnavailable,
                    "replay exhausted",
                )
            })?;
        }
        Ok(())
    }
}

/// Run golden vector tests on specified indices
///
/// If `indices` is None, tests all vectors. Otherwise tests only
/// the specified indices.
fn run_golden_vector_tests(indices: Option<&[usize]>) {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");

    if let Some(idx) = indices {
        for &i in idx {
            assert!(
                i < vectors.len(),
                "Index {} is out of bounds (only {} vectors available)",
                i,
                vectors.len()
            );
        }
    }

    let selected: Vec<(usize, &GoldenVector)> = match indices {
        Some(idx) => idx.iter().map(|&i| (i, &vectors[i])).collect(),
        None => vectors.iter().enumerate().collect(),
    };
    println!("Testing {} golden vectors", selected.len());

    let mut passed = 0;
    let mut failed = 0;

    for (i, vector) in selected {
        let separator = Separator::new(vector.separator).expect("vector separator is valid");
        let salt = hex::decode(&vector.salt).expect("failed to decode salt");
        let nonce = hex::decode(&vector.nonce).expect("failed to decode nonce");

        // Deterministic encryption must produce the exact serialized string.
        let crypter = Crypter::new(Replay::new(&salt, &nonce), separator);
        let serialized = match crypter.encrypt_to_string(&vector.passphrase, &vector.plaintext) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Vector {}: FAILED to encrypt - {}", i, e);
                eprintln!("  Comment: {}", vector.comment);
                failed += 1;
                continue;
            }
        };
        if serialized != vector.serialized {
            eprintln!("Vector {}: FAILED - serialized mismatch", i);
            eprintln!("  Comment: {}", vector.comment);
            eprintln!("  Expected: {}", vector.serialized);
            eprintln!("  Actual:   {}", serialized);
            failed += 1;
            continue;
        }

        // And the stored string must decrypt with a normal crypter.
        let system = Crypter::system_with_separator(separator).expect("OS random available");
        match system.decrypt_from_string(&vector.passphrase, &vector.serialized) {
            Ok(plaintext) if plaintext == vector.plaintext => passed += 1,
            Ok(plaintext) => {
                eprintln!("Vector {}: FAILED - plaintext mismatch", i);
                eprintln!("  Comment: {}", vector.comment);
                eprintln!("  Expected length: {}", vector.plaintext.len());
                eprintln!("  Actual length: {}", plaintext.len());
                failed += 1;
            }
            Err(e) => {
                eprintln!("Vector {}: FAILED to decrypt - {}", i, e);
                eprintln!("  Comment: {}", vector.comment);
                failed += 1;
            }
        }
    }

    println!("Results: {} passed, {} failed", passed, failed);

    assert_eq!(failed, 0, "Some golden vectors failed validation");
    assert!(passed > 0, "No golden vectors were tested");
}

#[test]
fn test_all_golden_vectors() {
    run_golden_vector_tests(None);
}

#[test]
fn test_golden_vector_fields_split_as_expected() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    for vector in &vectors {
        let separator = Separator::new(vector.separator).unwrap();
        let bundle = weakrypt::deserialize(&vector.serialized, separator);
        assert_eq!(bundle.salt_hex.as_deref(), Some(vector.salt.as_str()));
        assert_eq!(bundle.nonce_hex.as_deref(), Some(vector.nonce.as_str()));
        assert_eq!(
            weakrypt::serialize(&bundle, separator),
            vector.serialized,
            "{}",
            vector.comment
        );
    }
}

#[test]
fn test_golden_vector_wrong_password() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    let vector = &vectors[0];
    let crypter = Crypter::system().unwrap();

    let err = crypter
        .decrypt_from_string("not the password", &vector.serialized)
        .expect_err("expected authentication failure");
    assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
}

#[test]
fn test_golden_vector_truncated_ciphertext() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    let vector = &vectors[0];
    let crypter = Crypter::system().unwrap();
    let bundle = weakrypt::deserialize(&vector.serialized, Separator::default());

    let ciphertext = bundle.ciphertext_hex.as_deref().unwrap();
    let truncated = CipherBundle {
        ciphertext_hex: Some(ciphertext[..ciphertext.len() - 2].to_string()),
        ..bundle.clone()
    };
    let err = crypter
        .decrypt_message(&vector.passphrase, &truncated)
        .expect_err("expected authentication failure");
    assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
}
