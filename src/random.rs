//! Secure random sources
//!
//! Salt and nonce generation go through the [`SecureRandom`] capability so
//! the composition root decides, once, where randomness comes from.

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{ErrorCategory, ErrorKind, Result, WeakryptError};

/// A cryptographically secure source of random bytes.
///
/// Implementations must be safe to share between threads; no locking is
/// done around calls.
pub trait SecureRandom: Send + Sync {
    /// Fill `buf` entirely with random bytes, or fail with
    /// [`ErrorKind::PlatformUnavailable`].
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}

impl<T: SecureRandom + ?Sized> SecureRandom for &T {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        (**self).fill(buf)
    }
}

/// The operating system's generator.
#[derive(Debug, Clone, Copy)]
pub struct OsRandom {
    _probed: (),
}

impl OsRandom {
    /// Checks that the OS generator works before handing out a source.
    ///
    /// There is no weaker fallback: if this fails, encryption is refused.
    pub fn probe() -> Result<Self> {
        let source = Self { _probed: () };
        let mut scratch = [0u8; 1];
        source
            .fill(&mut scratch)
            .map_err(|e| e.with_context("secure random source failed its startup probe"))?;
        Ok(source)
    }
}

impl SecureRandom for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng.try_fill_bytes(buf).map_err(|e| {
            WeakryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PlatformUnavailable,
                format!("OS random generator unavailable: {}", e),
                e,
            )
        })
    }
}

/// Draw an `N`-byte array from `random`.
pub(crate) fn random_array<const N: usize>(random: &dyn SecureRandom) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    random.fill(&mut out)?;
    Ok(out)
}
