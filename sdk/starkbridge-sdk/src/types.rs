//! Receipt, log and option types shared across the SDK.

use serde::{Deserialize, Serialize};
use starkbridge_types::{Felt, Hash256, SolValue};

/// Raw execution resource counters reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResources {
    #[serde(default)]
    pub steps: u64,
    #[serde(default)]
    pub pedersen: u64,
    #[serde(default)]
    pub range_check: u64,
    #[serde(default)]
    pub ecdsa: u64,
    #[serde(default)]
    pub bitwise: u64,
}

impl ExecutionResources {
    /// Ethereum-gas-equivalent cost of the execution, the weighted sum of
    /// the resource counters.
    pub fn gas_equivalent(&self) -> u64 {
        let gas = 0.05 * self.steps as f64
            + 25.6 * self.ecdsa as f64
            + 0.4 * self.range_check as f64
            + 12.8 * self.bitwise as f64
            + 0.4 * self.pedersen as f64;
        gas.round() as u64
    }
}

/// One decoded log entry out of a call receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog {
    pub address: Felt,
    pub block_number: u64,
    pub block_hash: Felt,
    pub log_index: u64,
    /// Destination-side tag the event was emitted under.
    pub tag: Felt,
    /// Source-side event name.
    pub name: String,
    /// Decoded arguments, name-keyed.
    pub args: SolValue,
    /// Arguments re-encoded as Ethereum ABI bytes.
    pub data: Vec<u8>,
    /// Ethereum topic of the event signature.
    pub topic: Hash256,
}

/// Receipt of a confirmed invoke.
#[derive(Debug, Clone, PartialEq)]
pub struct CallReceipt {
    pub transaction_hash: Felt,
    pub block_number: u64,
    pub block_hash: Felt,
    pub from: Felt,
    /// Gas-equivalent of the consumed execution resources.
    pub gas_used: u64,
    /// Blocks on top of the including block, the including block counts.
    pub confirmations: u64,
    pub events: Vec<EventLog>,
    /// Raw return felts, already consumed by `query` but kept for invokes.
    pub return_data: Vec<Felt>,
    /// Ethereum-ABI form of the submitted call, selector included.
    pub calldata: Vec<u8>,
}

/// Per-call knobs for an invoke.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvokeOptions {
    pub max_fee: Option<u64>,
    pub nonce: Option<u64>,
}

impl InvokeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_fee(mut self, max_fee: u64) -> Self {
        self.max_fee = Some(max_fee);
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_equivalent_weights() {
        let resources = ExecutionResources {
            steps: 100,
            pedersen: 10,
            range_check: 5,
            ecdsa: 1,
            bitwise: 2,
        };
        // 5 + 4 + 2 + 25.6 + 25.6 = 62.2 -> 62
        assert_eq!(resources.gas_equivalent(), 62);
    }

    #[test]
    fn test_invoke_options_builder() {
        let options = InvokeOptions::new().with_max_fee(1000).with_nonce(7);
        assert_eq!(options.max_fee, Some(1000));
        assert_eq!(options.nonce, Some(7));
    }
}
