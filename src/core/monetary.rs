/// Ledger monetary system
///
/// Amounts are carried as integer minor units everywhere inside the node. Clients
/// may present decimal coins; they are rounded to the nearest unit once, on entry,
/// so repeated mining rewards never drift.
///
/// Number of units in one coin
pub const UNITS_PER_COIN: u64 = 100_000_000;

/// Mining reward in units (12.5 coins)
pub const MINING_REWARD: u64 = 12 * UNITS_PER_COIN + UNITS_PER_COIN / 2;

/// Sender address of system-minted transactions
pub const REWARD_SENDER: &str = "00";

pub mod conversions {
    use super::*;
    use crate::error::{BlockchainError, Result};

    /// Convert decimal coins to units, rejecting negative and non-finite input
    ///
    /// ```
    /// use peer_ledger::core::monetary::conversions::coins_to_units;
    /// assert_eq!(coins_to_units(12.5).unwrap(), 1_250_000_000);
    /// assert!(coins_to_units(-1.0).is_err());
    /// ```
    pub fn coins_to_units(coins: f64) -> Result<u64> {
        if !coins.is_finite() || coins < 0.0 {
            return Err(BlockchainError::Transaction(format!(
                "Amount must be a non-negative number, got {coins}"
            )));
        }
        let units = (coins * UNITS_PER_COIN as f64).round();
        // u64::MAX as f64 rounds up to 2^64, which is already out of range
        if units >= u64::MAX as f64 {
            return Err(BlockchainError::Transaction(format!(
                "Amount too large: {coins}"
            )));
        }
        Ok(units as u64)
    }

    /// Lossy conversion for display
    pub fn units_to_coins(units: u64) -> f64 {
        units as f64 / UNITS_PER_COIN as f64
    }

    /// Exact decimal rendering, e.g. `12.50000000`
    ///
    /// ```
    /// use peer_ledger::core::monetary::conversions::format_units;
    /// assert_eq!(format_units(1_250_000_000), "12.50000000");
    /// ```
    pub fn format_units(units: u64) -> String {
        format!("{}.{:08}", units / UNITS_PER_COIN, units % UNITS_PER_COIN)
    }

    /// Exact rendering of a signed balance
    pub fn format_balance(units: i128) -> String {
        let sign = if units < 0 { "-" } else { "" };
        let magnitude = units.unsigned_abs();
        let per_coin = UNITS_PER_COIN as u128;
        format!("{sign}{}.{:08}", magnitude / per_coin, magnitude % per_coin)
    }
}
