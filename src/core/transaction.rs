// A transaction is a plain value transfer between two address strings.
// There are no inputs, outputs or signatures; the id is what keeps two identical
// transfers apart.

use crate::core::monetary::{conversions, REWARD_SENDER};
use crate::error::Result;
use crate::utils::{deserialize, new_id, serialize};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Transaction {
    amount: u64, // in units, see monetary::UNITS_PER_COIN
    sender: String,
    recipient: String,
    id: String,
}

impl Transaction {
    /// Create a transaction with a fresh id
    pub fn new(amount: u64, sender: &str, recipient: &str) -> Transaction {
        Transaction {
            amount,
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            id: new_id(),
        }
    }

    /// Create a transaction from a decimal coin amount as clients send it
    pub fn from_coins(amount: f64, sender: &str, recipient: &str) -> Result<Transaction> {
        let units = conversions::coins_to_units(amount)?;
        Ok(Transaction::new(units, sender, recipient))
    }

    /// Mining reward paid by the system sender
    pub fn new_reward(recipient: &str, amount: u64) -> Transaction {
        Transaction::new(amount, REWARD_SENDER, recipient)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == REWARD_SENDER
    }

    pub fn get_amount(&self) -> u64 {
        self.amount
    }

    pub fn get_sender(&self) -> &str {
        self.sender.as_str()
    }

    pub fn get_recipient(&self) -> &str {
        self.recipient.as_str()
    }

    pub fn get_id(&self) -> &str {
        self.id.as_str()
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Transaction> {
        deserialize::<Transaction>(bytes)
    }
}
