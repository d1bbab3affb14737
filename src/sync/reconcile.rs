//! Reconciling local commitments against an authoritative node response.

use std::collections::{BTreeMap, HashSet};

use crate::lcd::{UnbondingDelegation, UnbondingEntry};

/// Store a commitment, dropping the key when the value is zero.
pub fn set_committed(map: &mut BTreeMap<String, f64>, key: &str, value: f64) {
    if value == 0.0 {
        map.remove(key);
    } else {
        map.insert(key.to_string(), value);
    }
}

/// Overwrite every key present in `authoritative`; every local key it lacks
/// is a zero commitment and goes away.
pub fn reconcile_commitments(local: &mut BTreeMap<String, f64>, authoritative: &[(String, f64)]) {
    for (key, value) in authoritative {
        set_committed(local, key, *value);
    }
    let present: HashSet<&str> = authoritative.iter().map(|(key, _)| key.as_str()).collect();
    let stale: Vec<String> = local
        .keys()
        .filter(|key| !present.contains(key.as_str()))
        .cloned()
        .collect();
    for key in stale {
        set_committed(local, &key, 0.0);
    }
}

/// validator → entries, leaving out validators with nothing unbonding.
pub fn unbonding_map(unbonding: Vec<UnbondingDelegation>) -> BTreeMap<String, Vec<UnbondingEntry>> {
    let mut map = BTreeMap::new();
    for delegation in unbonding {
        if delegation.entries.is_empty() {
            map.remove(&delegation.validator_address);
        } else {
            map.insert(delegation.validator_address, delegation.entries);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unbonding(validator: &str, entries: usize) -> UnbondingDelegation {
        UnbondingDelegation {
            delegator_address: "cosmos1address".into(),
            validator_address: validator.into(),
            entries: vec![UnbondingEntry::default(); entries],
        }
    }

    #[test]
    fn absent_keys_are_removed_and_present_overwritten() {
        let mut local = BTreeMap::from([("valA".to_string(), 3.0), ("valB".to_string(), 2.0)]);
        reconcile_commitments(&mut local, &[("valA".to_string(), 5.0)]);
        assert_eq!(local, BTreeMap::from([("valA".to_string(), 5.0)]));
    }

    #[test]
    fn empty_response_clears_everything() {
        let mut local = BTreeMap::from([("valA".to_string(), 3.0)]);
        reconcile_commitments(&mut local, &[]);
        assert!(local.is_empty());
    }

    #[test]
    fn zero_in_response_is_not_stored() {
        let mut local = BTreeMap::new();
        reconcile_commitments(&mut local, &[("valA".to_string(), 0.0), ("valB".to_string(), 1.0)]);
        assert!(!local.contains_key("valA"));
        assert_eq!(local.get("valB"), Some(&1.0));
    }

    #[test]
    fn unbonding_map_skips_empty_sequences() {
        let map = unbonding_map(vec![unbonding("valA", 2), unbonding("valB", 0)]);
        assert_eq!(map.len(), 1);
        assert_eq!(map["valA"].len(), 2);
        assert!(map.values().all(|entries| !entries.is_empty()));
    }

    #[test]
    fn later_empty_record_drops_validator() {
        let map = unbonding_map(vec![unbonding("valA", 1), unbonding("valA", 0)]);
        assert!(map.is_empty());
    }
}
