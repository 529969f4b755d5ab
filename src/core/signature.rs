// Content signatures used as cache keys and as seeds for generated table names.
use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use getrandom::fill as fill_random;
use sha2::{Digest, Sha256};

use crate::core::error::{Error, ErrorKind};

pub const NAME_PREFIX: &str = "stencila_";
const NAME_SIGNATURE_CHARS: usize = 32;

/// Stable lowercase hex SHA-256 of `bytes`.
pub fn signature_of(bytes: impl AsRef<[u8]>) -> String {
    hex(&Sha256::digest(bytes.as_ref()))
}

/// Signature with no stable content behind it: random bytes salted with time and pid.
pub fn fresh_signature() -> Result<String, Error> {
    let mut seed = [0u8; 16];
    fill_random(&mut seed).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message(format!("failed to gather entropy: {err}"))
    })?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(nanos.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    Ok(hex(&hasher.finalize()))
}

/// Physical table name derived from a signature.
pub fn table_name_for(signature: &str) -> String {
    let end = signature.len().min(NAME_SIGNATURE_CHARS);
    format!("{NAME_PREFIX}{}", &signature[..end])
}

fn hex(digest: &[u8]) -> String {
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
