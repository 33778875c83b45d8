// Secret module - generates base signing secrets

use anyhow::{bail, Result};
use rand::RngCore;

/// Smallest secret we are willing to generate, in bytes.
pub const MIN_SECRET_BYTES: usize = 16;

/// Largest secret we are willing to generate, in bytes.
pub const MAX_SECRET_BYTES: usize = 128;

/// Generates a random secret of `bytes` bytes, hex-encoded.
///
/// # Arguments
/// * `bytes` - Number of random bytes, between 16 and 128
///
/// # Returns
/// A lowercase hex string twice as long as `bytes`
pub fn generate_secret(bytes: usize) -> Result<String> {
    if !(MIN_SECRET_BYTES..=MAX_SECRET_BYTES).contains(&bytes) {
        bail!(
            "Secret length must be between {} and {} bytes, got {}",
            MIN_SECRET_BYTES,
            MAX_SECRET_BYTES,
            bytes
        );
    }

    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    Ok(hex::encode(buf))
}
