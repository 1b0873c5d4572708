//! Authentication: password hashing, session tokens, request extraction.
//!
//! Users live in `auth.json` in the remote store (not a sync target — a
//! failed credential write is surfaced, never queued). Passwords are stored
//! as SHA-256 hex digests; a successful login issues an opaque session token
//! held in a TTL cache.

mod middleware;
mod sessions;

pub use middleware::AuthUser;
pub use sessions::{SessionStore, SessionUser};

use sha2::{Digest, Sha256};

/// Remote path of the credentials file.
pub const AUTH_FILE_PATH: &str = "auth.json";

/// SHA-256 hex digest used for stored passwords.
pub fn hash_password(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
