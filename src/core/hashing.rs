use crate::core::BlockData;
use crate::utils::sha256_hex;

fn push_str(bytes: &mut Vec<u8>, value: &str) {
    // Length prefix keeps "ab"+"c" and "a"+"bc" apart
    bytes.extend((value.len() as u64).to_be_bytes());
    bytes.extend(value.as_bytes());
}

/// Canonical byte layout of everything a block hash commits to
pub fn prepare_data(previous_hash: &str, block_data: &BlockData, nonce: u64) -> Vec<u8> {
    let mut bytes = vec![];
    push_str(&mut bytes, previous_hash);
    bytes.extend(block_data.index.to_be_bytes());
    bytes.extend((block_data.transactions.len() as u64).to_be_bytes());
    for tx in &block_data.transactions {
        push_str(&mut bytes, tx.get_id());
        push_str(&mut bytes, tx.get_sender());
        push_str(&mut bytes, tx.get_recipient());
        bytes.extend(tx.get_amount().to_be_bytes());
    }
    bytes.extend(nonce.to_be_bytes());
    bytes
}

/// Digest of `(previous_hash, block_data, nonce)` as lowercase hex
pub fn hash_block(previous_hash: &str, block_data: &BlockData, nonce: u64) -> String {
    sha256_hex(&prepare_data(previous_hash, block_data, nonce))
}
