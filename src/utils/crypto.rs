use crate::error::{BlockchainError, Result};
use data_encoding::HEXLOWER;
use ring::digest::{Context, SHA256};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Milliseconds since the Unix epoch
pub fn current_timestamp() -> Result<i64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| BlockchainError::InvariantViolation(format!("System time error: {e}")))?
        .as_millis();

    i64::try_from(duration)
        .map_err(|_| BlockchainError::InvariantViolation("Timestamp overflow".to_string()))
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

/// SHA-256 as 64 lowercase hex characters
pub fn sha256_hex(data: &[u8]) -> String {
    HEXLOWER.encode(&sha256_digest(data))
}

/// Random identifier: a v4 UUID without dashes
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}
