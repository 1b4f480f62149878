//! Records exchanged with the metadata resolver and the big-map history store.
//!
//! These are plain data. Typing of the embedded Micheline trees happens in
//! bcd-core; the big-map bridge in bcd-bigmap consumes both.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::micheline::Micheline;

/// Protocol symlink of the pre-Babylon protocol family.
pub const SYMLINK_ALPHA: &str = "alpha";
/// Protocol symlink of every protocol from Babylon on.
pub const SYMLINK_BABYLON: &str = "babylon";

/// Protocol hashes that predate the Babylon storage layout.
const ALPHA_PROTOCOLS: &[&str] = &[
    "Ps9mPmXaRzmzk35gbAYNCAw6UXdE2qoABTHbN2oEEc1qM7CwT9P",
    "PtCJ7pwoxe8JasnHY8YonnLYjcVHmhiARPJvqcC6VfHT5s8k8sY",
    "PsYLVpVvgbLhAhoqAkMFUo6gudkJ9weNXhUYCiLDzcUpFpkk8Wt",
    "PsddFKi32cMJ2qPjf43Qv5GDWLDPZb3T3bF6fLKiF5HtvHNU7aP",
    "Pt24m4xiPbLDhVgVfABUjirbmda3yohdN82Sp1FeuAXJ4eV9otd",
];

/// Bin path every big map lives at under the `alpha` symlink.
pub const ALPHA_BIG_MAP_PATH: &str = "0/0";

/// Map a protocol hash to the symlink under which contract types are stored.
///
/// Protocol hashes are 51-character base58 strings starting with `P`.
/// Anything else has no symlink.
pub fn proto_symlink(protocol: &str) -> Option<&'static str> {
    if ALPHA_PROTOCOLS.contains(&protocol) {
        return Some(SYMLINK_ALPHA);
    }
    if protocol.len() == 51 && protocol.starts_with('P') {
        return Some(SYMLINK_BABYLON);
    }
    None
}

/// Parameter and storage type trees of one contract under one symlink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptTypes {
    pub parameter: Micheline,
    pub storage: Micheline,
}

/// Type trees of a contract across protocol families.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractMetadata {
    pub address: String,
    pub network: String,
    /// Keyed by protocol symlink (`alpha`, `babylon`).
    pub scripts: BTreeMap<String, ScriptTypes>,
}

impl ContractMetadata {
    pub fn storage(&self, symlink: &str) -> Option<&Micheline> {
        self.scripts.get(symlink).map(|s| &s.storage)
    }

    pub fn parameter(&self, symlink: &str) -> Option<&Micheline> {
        self.scripts.get(symlink).map(|s| &s.parameter)
    }
}

/// One big-map cell update as recorded by the indexer.
///
/// A cell whose `value` is `None` records a key removal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BigMapDiffCell {
    pub ptr: i64,
    pub key: Micheline,
    pub key_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Micheline>,
    /// Bin path of the big_map type inside the contract storage type.
    pub bin_path: String,
    pub address: String,
    pub network: String,
    pub protocol: String,
    pub level: i64,
    pub timestamp: String,
}

impl BigMapDiffCell {
    pub fn is_removed(&self) -> bool {
        self.value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symlinks() {
        assert_eq!(
            proto_symlink("PsddFKi32cMJ2qPjf43Qv5GDWLDPZb3T3bF6fLKiF5HtvHNU7aP"),
            Some(SYMLINK_ALPHA)
        );
        assert_eq!(
            proto_symlink("PsBabyM1eUXZseaJdmXFApDSBqj8YBfwELoxZHHW77EMcAbbwAS"),
            Some(SYMLINK_BABYLON)
        );
        assert_eq!(proto_symlink("not-a-protocol"), None);
    }
}
