//! The opaque action a transaction authorizes.

use crate::Address;
use serde::{Deserialize, Serialize};

/// The parameters of the action a transaction authorizes.
///
/// Entirely opaque to the engine: the target, value, and payload are carried
/// through submission and handed to the action executor verbatim at
/// execution time. Interpretation is the executor's concern alone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Where the action is directed.
    pub target: Address,
    /// Value to transfer, in the executor's smallest unit.
    pub value: u128,
    /// Arbitrary call data.
    pub payload: Vec<u8>,
}

impl ActionRequest {
    pub fn new(target: Address, value: u128, payload: Vec<u8>) -> Self {
        Self {
            target,
            value,
            payload,
        }
    }

    /// The payload rendered as a `0x`-prefixed hex string, for logs and RPC.
    pub fn payload_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.payload))
    }
}
