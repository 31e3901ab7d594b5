use std::fmt::Write;

use chapterdesk_core::{AppError, AppResult};
use sha2::{Digest, Sha256};

/// Generates a random token and its SHA-256 hash as `(raw_hex, hash_hex)`.
pub(super) fn generate_token() -> AppResult<(String, String)> {
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to generate session token: {error}")))?;

    let raw_token = to_hex(&bytes);
    let hash = hash_token(&raw_token);
    Ok((raw_token, hash))
}

/// Computes the storage hash of a raw token.
pub(super) fn hash_token(raw_token: &str) -> String {
    to_hex(&Sha256::digest(raw_token.as_bytes()))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut encoded, byte| {
            let _ = write!(encoded, "{byte:02x}");
            encoded
        })
}
