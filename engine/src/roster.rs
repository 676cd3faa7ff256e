//! The immutable owner roster and confirmation threshold.

use crate::error::EngineError;
use covault_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The fixed set of owners and the approval threshold, established once at
/// engine construction and never changed afterwards.
///
/// Nothing outside the engine reads or writes the roster directly; only the
/// derived queries (`is_owner`, `required_approvals`) are exposed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRoster {
    owners: HashSet<Address>,
    required_approvals: usize,
}

impl OwnerRoster {
    /// Build a roster from an owner list and a confirmation threshold.
    ///
    /// Fails if the list is empty, contains a duplicate, or the threshold is
    /// not in `1..=|owners|`.
    pub fn new(owners: Vec<Address>, required_approvals: usize) -> Result<Self, EngineError> {
        if owners.is_empty() {
            return Err(EngineError::EmptyRoster);
        }

        let mut set = HashSet::with_capacity(owners.len());
        for owner in owners {
            if !set.insert(owner.clone()) {
                return Err(EngineError::DuplicateOwner(owner.to_string()));
            }
        }

        if required_approvals == 0 || required_approvals > set.len() {
            return Err(EngineError::ThresholdOutOfRange {
                required: required_approvals,
                owners: set.len(),
            });
        }

        Ok(Self {
            owners: set,
            required_approvals,
        })
    }

    /// Whether the given address is on the roster.
    pub fn is_owner(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    /// Same-polarity votes needed to finalize an approval or rejection.
    pub fn required_approvals(&self) -> usize {
        self.required_approvals
    }

    /// Number of owners on the roster.
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Iterate over the owners, in no particular order.
    pub fn owners(&self) -> impl Iterator<Item = &Address> {
        self.owners.iter()
    }
}
