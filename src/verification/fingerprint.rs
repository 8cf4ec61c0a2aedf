use crate::utils::Result;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

static PROCESS_FINGERPRINT: OnceLock<String> = OnceLock::new();

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// SHA-256 of the running executable, sent with every request so the service
/// can tell which build is calling. Computed on first use and reused for the
/// life of the process.
pub fn process_fingerprint() -> Result<&'static str> {
    if let Some(hash) = PROCESS_FINGERPRINT.get() {
        return Ok(hash);
    }

    let exe = std::env::current_exe()?;
    let bytes = std::fs::read(&exe)?;
    let hash = sha256_hex(&bytes);
    tracing::debug!(exe = %exe.display(), hash = %hash, "Computed process fingerprint");

    Ok(PROCESS_FINGERPRINT.get_or_init(|| hash))
}
