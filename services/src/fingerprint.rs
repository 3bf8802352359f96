//! Best-effort device identification.
//!
//! The fingerprint is a SHA-256 over headers the client chooses to send, so anyone can
//! change it by changing those headers. It only stops casual reuse of one browser to mark
//! several trainees present.

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Request metadata the fingerprint is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMetadata {
    pub user_agent: String,
    /// Peer address as seen by the server (no port).
    pub remote_addr: String,
    pub accept_language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceFingerprint([u8; 32]);

impl DeviceFingerprint {
    pub fn compute(meta: &ClientMetadata) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(meta.user_agent.as_bytes());
        hasher.update([0x1f]);
        hasher.update(meta.remote_addr.as_bytes());
        hasher.update([0x1f]);
        hasher.update(meta.accept_language.as_bytes());
        Self(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for DeviceFingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
