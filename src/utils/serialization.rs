// Binary payloads for blocks and transactions carried inside wire packages
use crate::error::{BlockchainError, Result};

/// Largest payload a peer may make us decode. Length prefixes beyond it fail
/// before anything is allocated.
pub const MAX_PAYLOAD_BYTES: usize = 8 * 1024 * 1024;

pub fn serialize<T: bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    bincode::encode_to_vec(data, config)
        .map_err(|e| BlockchainError::Serialization(format!("Serialization failed: {e}")))
}

/// Decode a payload, refusing trailing bytes
pub fn deserialize<T: bincode::Decode<()>>(bytes: &[u8]) -> Result<T> {
    let config = bincode::config::standard().with_limit::<MAX_PAYLOAD_BYTES>();
    let (data, read) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| BlockchainError::Serialization(format!("Deserialization failed: {e}")))?;
    if read != bytes.len() {
        return Err(BlockchainError::Serialization(format!(
            "Trailing bytes in payload: read {read} of {}",
            bytes.len()
        )));
    }
    Ok(data)
}
