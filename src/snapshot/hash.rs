//! Connection fingerprints for snapshot keys.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 of a value's JSON form, as lowercase hex.
///
/// Used to key snapshots by the settings of the connection they came from, so
/// editing a connection invalidates its snapshot.
pub fn fingerprint<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(format!("{:x}", Sha256::digest(&json)))
}
