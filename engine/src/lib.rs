//! # Quadro Engine
//!
//! The reconciliation core for Quadro's remote-JSON persistence layer.
//!
//! Quadro stores every collection as a JSON file versioned in a remote Git
//! repository. This crate holds the pure logic that layer is built on:
//! decoding the provider's base64 blobs, computing per-collection identity
//! keys, merging a remote copy with a local mirror, and modeling the queue
//! entries replayed after failed writes.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of files, network, or clocks
//! - **Deterministic**: the same inputs always produce the same outputs
//! - **Schema-agnostic**: records are untyped JSON; callers validate their
//!   own shapes at the boundary
//!
//! ## Core Concepts
//!
//! ### Records and identity
//!
//! A record is any JSON object. Each collection carries an [`Identity`]
//! function that maps a record to a stable deduplication key — `id` when
//! present, a domain-specific composite otherwise, and `""` when the record
//! cannot be identified at all.
//!
//! ### Merge
//!
//! [`merge_missing`] unions a remote collection with a local one: remote
//! records first in their original order, then local-only additions. The
//! remote copy wins every key collision; blank-key records always pass
//! through. It is additive — it never deletes and never merges fields.
//!
//! ### Targets
//!
//! The [`registry`] enumerates the nine synchronized collections with their
//! remote paths, mirror paths, and identity functions. Paths outside the
//! registry are stored remotely but never queued or reconciled.
//!
//! ### Pending writes
//!
//! A [`PendingWrite`] is a full-collection snapshot that failed to reach the
//! remote store, retained until a startup replay succeeds.
//!
//! ## Quick Start
//!
//! ```rust
//! use quadro_engine::{merge_missing, Identity};
//! use serde_json::json;
//!
//! let remote = vec![json!({"id": "1", "nome": "Ana"})];
//! let local = vec![
//!     json!({"id": "1", "nome": "Ana (editada)"}),
//!     json!({"id": "2", "nome": "Bia"}),
//! ];
//!
//! let merged = merge_missing(&remote, &local, Identity::Named);
//!
//! // Remote wins the collision; the local-only record is appended.
//! assert_eq!(merged[0]["nome"], "Ana");
//! assert_eq!(merged[1]["nome"], "Bia");
//! ```

pub mod codec;
pub mod error;
pub mod identity;
pub mod merge;
pub mod pending;
pub mod target;

// Re-export main types at crate root
pub use codec::{decode_records, encode_records, to_pretty_json};
pub use error::Error;
pub use identity::Identity;
pub use merge::{merge_missing, merge_missing_by};
pub use pending::PendingWrite;
pub use target::{is_sync_target, registry, target_for_path, SyncTarget};

/// Type aliases for clarity
pub type Record = serde_json::Value;
pub type RecordKey = String;
pub type VersionToken = String;
