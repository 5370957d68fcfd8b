//! Recover identifiers from receipt logs.

use alloy_primitives::{Address, Log};
use alloy_sol_types::SolEvent;
use binding::supercluster::ISuperCluster::TokenWithdrawn;
use tracing::trace;

/// An event that belongs to an account and carries an identifier.
pub trait AccountEvent: SolEvent {
    /// Account the event was emitted for.
    fn account(&self) -> Address;

    /// Identifier to hand back to the caller, rendered in decimal.
    fn identifier(&self) -> String;
}

impl AccountEvent for TokenWithdrawn {
    fn account(&self) -> Address {
        self.user
    }

    fn identifier(&self) -> String {
        self.requestId.to_string()
    }
}

/// Identifier from the first `E` log emitted for `account`.
///
/// Logs of other events, or that fail to decode, are skipped.
pub fn resolve_identifier<E: AccountEvent>(logs: &[Log], account: Address) -> Option<String> {
    logs.iter().find_map(|log| match E::decode_log(log) {
        Ok(event) if event.data.account() == account => Some(event.data.identifier()),
        Ok(_) => None,
        Err(e) => {
            trace!(address = %log.address, error = %e, "Skipping log");
            None
        }
    })
}
