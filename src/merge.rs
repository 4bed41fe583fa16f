//! Board item merge: reconciles a concurrent item-list write against the
//! current server state.
//!
//! The conflict strategy is deliberately asymmetric. A check-in records a
//! physical event (the attendee walked through the door), so a current
//! `checkedIn: true` is monotonic: a stale snapshot re-saved with `false`
//! never reverts it. Every other field is last-write-wins, and the incoming
//! list is authoritative for membership — rows absent from the update are
//! dropped. Clients send full item lists; see DESIGN.md for the policy
//! discussion.

use std::collections::HashMap;

use tracing::debug;

use crate::model::Item;

/// Merge `incoming` over `current`, returning the reconciled item list in
/// incoming order.
pub fn merge_items(current: &[Item], incoming: Vec<Item>) -> Vec<Item> {
    let current_by_uid: HashMap<&str, &Item> =
        current.iter().map(|item| (item.uid.as_str(), item)).collect();

    let mut preserved = 0usize;
    let merged: Vec<Item> = incoming
        .into_iter()
        .map(|mut item| {
            if let Some(existing) = current_by_uid.get(item.uid.as_str()) {
                if existing.checked_in && !item.checked_in {
                    item.checked_in = true;
                    preserved += 1;
                }
            }
            item
        })
        .collect();

    if preserved > 0 {
        debug!(preserved, "kept check-ins a stale write tried to clear");
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn item(uid: &str, checked_in: bool) -> Item {
        Item {
            uid: uid.to_string(),
            checked_in,
            fields: BTreeMap::new(),
        }
    }

    #[test]
    fn positive_check_in_is_never_clobbered() {
        let current = vec![item("u1", true)];
        let merged = merge_items(&current, vec![item("u1", false)]);
        assert!(merged[0].checked_in);
    }

    #[test]
    fn incoming_check_in_is_accepted() {
        let current = vec![item("u1", false)];
        let merged = merge_items(&current, vec![item("u1", true)]);
        assert!(merged[0].checked_in);
    }

    #[test]
    fn other_fields_are_last_write_wins() {
        let mut old = item("u1", true);
        old.fields.insert("Name".to_string(), "Ana".to_string());
        let mut new = item("u1", false);
        new.fields.insert("Name".to_string(), "Ana Maria".to_string());

        let merged = merge_items(&[old], vec![new]);
        assert_eq!(merged[0].fields["Name"], "Ana Maria");
        assert!(merged[0].checked_in);
    }

    #[test]
    fn unknown_uids_are_inserted_as_is() {
        let merged = merge_items(&[item("u1", true)], vec![item("u1", true), item("u2", false)]);
        assert_eq!(merged.len(), 2);
        assert!(!merged[1].checked_in);
    }

    #[test]
    fn incoming_list_owns_membership() {
        let current = vec![item("u1", true), item("u2", false)];
        let merged = merge_items(&current, vec![item("u2", false)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].uid, "u2");
    }

    #[test]
    fn uids_stay_pairwise_distinct() {
        let current = vec![item("u1", false), item("u2", true)];
        let merged = merge_items(&current, vec![item("u2", false), item("u3", false)]);
        let mut uids: Vec<&str> = merged.iter().map(|i| i.uid.as_str()).collect();
        uids.sort_unstable();
        uids.dedup();
        assert_eq!(uids.len(), merged.len());
    }
}
