//! Binary persistence format: fixed header + postcard payload.
//!
//! Layout: 4 magic bytes, a little-endian u16 format version, then the
//! postcard-encoded session. Decoding validates the header before
//! touching the payload, so foreign files fail fast with a clear error.

use crate::error::{StoreError, StoreResult};
use crate::model::AppState;
use crate::policy::Policy;
use serde::{Deserialize, Serialize};

/// File magic for konband databases.
pub const MAGIC: [u8; 4] = *b"KBND";

/// Current binary format version.
pub const FORMAT_VERSION: u16 = 1;

/// Everything one session persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// The full assignment state.
    pub state: AppState,
    /// The policy settings.
    pub policy: Policy,
}

/// Encode a session into the binary file format.
pub fn encode_session(session: &PersistedSession) -> StoreResult<Vec<u8>> {
    let mut bytes = Vec::with_capacity(64);
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    let payload = postcard::to_allocvec(session)?;
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode a session from the binary file format.
pub fn decode_session(bytes: &[u8]) -> StoreResult<PersistedSession> {
    let Some((header, payload)) = bytes.split_at_checked(6) else {
        return Err(StoreError::BadMagic);
    };
    if header[..4] != MAGIC {
        return Err(StoreError::BadMagic);
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion(version));
    }
    Ok(postcard::from_bytes(payload)?)
}

// =============================================================================
// TESTS
// =============================================================================
