//! Key-based reconciliation of a remote and a local collection.
//!
//! This is the core of startup sync. Given the remote copy and the local
//! mirror of one collection, it produces their union:
//!
//! 1. Remote records come first, in their original order.
//! 2. Local records whose key is not present remotely are appended, in
//!    their original order.
//! 3. On a key collision the remote record wins outright; there is no
//!    field-level merging and no timestamp comparison.
//!
//! The result ordering is a contract: remote stays the source of truth for
//! display order, local-only additions trail it.
//!
//! Records with a blank identity key are never "present" — they always pass
//! through as additions, which can duplicate them across repeated merges.
//! That permissiveness is intentional and pinned by tests.

use crate::identity::Identity;
use serde_json::Value;
use std::collections::HashSet;

/// Merge local-only records into the remote collection.
///
/// Additive only: cannot delete records that exist remotely, cannot resolve
/// field-level conflicts (remote copy wins for any duplicated key).
pub fn merge_missing(remote: &[Value], local: &[Value], identity: Identity) -> Vec<Value> {
    merge_missing_by(remote, local, |record| identity.key_of(record))
}

/// [`merge_missing`] generalized over an arbitrary key function.
pub fn merge_missing_by<F>(remote: &[Value], local: &[Value], key_fn: F) -> Vec<Value>
where
    F: Fn(&Value) -> String,
{
    let mut seen: HashSet<String> = remote
        .iter()
        .map(&key_fn)
        .filter(|key| !key.is_empty())
        .collect();

    let mut merged = remote.to_vec();
    for record in local {
        let key = key_fn(record);
        if !key.is_empty() && seen.contains(&key) {
            continue;
        }
        merged.push(record.clone());
        if !key.is_empty() {
            seen.insert(key);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn by_id(record: &Value) -> String {
        Identity::Named.key_of(record)
    }

    #[test]
    fn remote_wins_on_collision_and_order_is_preserved() {
        let remote = vec![json!({"id": "1", "v": "a"})];
        let local = vec![json!({"id": "1", "v": "b"}), json!({"id": "2", "v": "c"})];

        let merged = merge_missing_by(&remote, &local, by_id);

        assert_eq!(
            merged,
            vec![json!({"id": "1", "v": "a"}), json!({"id": "2", "v": "c"})]
        );
    }

    #[test]
    fn disjoint_collections_concatenate() {
        let remote = vec![json!({"id": "1"}), json!({"id": "2"})];
        let local = vec![json!({"id": "3"}), json!({"id": "4"})];

        let merged = merge_missing_by(&remote, &local, by_id);

        assert_eq!(merged.len(), 4);
        assert_eq!(merged[..2], remote[..]);
        assert_eq!(merged[2..], local[..]);
    }

    #[test]
    fn duplicate_keys_within_local_are_merged_once() {
        let remote = vec![];
        let local = vec![
            json!({"id": "1", "v": "first"}),
            json!({"id": "1", "v": "second"}),
        ];

        let merged = merge_missing_by(&remote, &local, by_id);

        assert_eq!(merged, vec![json!({"id": "1", "v": "first"})]);
    }

    #[test]
    fn empty_key_records_always_pass_through() {
        let remote = vec![];
        let local = vec![json!({"v": "x"})];

        let merged = merge_missing_by(&remote, &local, by_id);
        assert_eq!(merged, vec![json!({"v": "x"})]);

        // A second pass with the previous result as remote duplicates the
        // keyless record: blank keys are never deduplicated.
        let again = merge_missing_by(&merged, &local, by_id);
        assert_eq!(again, vec![json!({"v": "x"}), json!({"v": "x"})]);
    }

    #[test]
    fn merge_is_idempotent() {
        let remote = vec![json!({"id": "1", "v": "a"}), json!({"id": "2", "v": "b"})];
        let local = vec![json!({"id": "2", "v": "stale"}), json!({"id": "3", "v": "c"})];

        let once = merge_missing_by(&remote, &local, by_id);
        let twice = merge_missing_by(&remote, &once, by_id);

        assert_eq!(once, twice);
    }

    #[test]
    fn empty_inputs() {
        assert!(merge_missing_by(&[], &[], by_id).is_empty());

        let remote = vec![json!({"id": "1"})];
        assert_eq!(merge_missing_by(&remote, &[], by_id), remote);

        let local = vec![json!({"id": "1"})];
        assert_eq!(merge_missing_by(&[], &local, by_id), local);
    }

    #[test]
    fn merge_with_collection_identity() {
        // Employee identity dedupes by normalized CPF when ids are absent.
        let remote = vec![json!({"cpf": "111.222.333-44", "nome": "Ana"})];
        let local = vec![
            json!({"cpf": "11122233344", "nome": "Ana (local)"}),
            json!({"cpf": "555.666.777-88", "nome": "Bia"}),
        ];

        let merged = merge_missing(&remote, &local, Identity::Employee);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0]["nome"], "Ana");
        assert_eq!(merged[1]["nome"], "Bia");
    }
}
