// subnet-types/src/ids.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing a hex-encoded identity fails.
#[derive(Debug, thiserror::Error)]
#[error("invalid identity hex: {0}")]
pub struct IdParseError(String);

/// Opaque 32-byte cryptographic identity of a libp2p endpoint.
///
/// Only the identity value is modeled here; the transport itself is owned
/// by the peer-to-peer layer and out of scope for this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId([u8; 32]);

impl PeerId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for PeerId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| IdParseError(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| IdParseError("expected 32 bytes".into()))?;
        Ok(Self(arr))
    }
}

/// On-chain signing identity used for consensus (the "coldkey"'s
/// delegated hot identity, in the source terminology).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hotkey([u8; 32]);

impl Hotkey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Hotkey {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| IdParseError(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| IdParseError("expected 32 bytes".into()))?;
        Ok(Self(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_id_roundtrips_through_hex() {
        let id = PeerId::new([7u8; 32]);
        let s = id.to_string();
        assert_eq!(PeerId::from_str(&s).unwrap(), id);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(PeerId::from_str("ab").is_err());
    }
}
