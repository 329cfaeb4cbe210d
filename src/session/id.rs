//! Session identifier type.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::SupportDeskError;

/// Unique identifier for a chat session.
///
/// Backed by a random UUID (v4), so identifiers never collide within or
/// across runs. The ID is displayed as `sess-<uuid>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new unique session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Create a SessionId from an existing UUID.
    ///
    /// This is primarily for testing and deserialization.
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sess-{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = SupportDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("sess-")
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .map(SessionId)
            .ok_or_else(|| SupportDeskError::InvalidSessionId(s.into()))
    }
}
