//! Opaque ciphertext handles.
//!
//! A handle is a 32-byte reference to a ciphertext held by the homomorphic
//! backend. Handles are never decoded locally. The all-zero handle is the
//! sentinel returned for anything that has never been written.

use std::fmt;

use anchor_lang::prelude::*;

/// Reference to a ciphertext the ledger may compute on.
#[derive(
    AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct OpaqueHandle(pub [u8; 32]);

impl OpaqueHandle {
    /// Sentinel for records and counters that were never written.
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl From<[u8; 32]> for OpaqueHandle {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for OpaqueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueHandle({self})")
    }
}

impl fmt::Display for OpaqueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Handle supplied by a client, not yet admitted by ingestion.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExternalHandle(pub [u8; 32]);

impl From<OpaqueHandle> for ExternalHandle {
    fn from(handle: OpaqueHandle) -> Self {
        Self(handle.0)
    }
}

/// A handle paired with the ledger scope that owns it.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandleScope {
    pub handle: OpaqueHandle,
    pub scope: Pubkey,
}

impl HandleScope {
    pub fn new(handle: OpaqueHandle, scope: Pubkey) -> Self {
        Self { handle, scope }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sentinel_is_default() {
        assert!(OpaqueHandle::default().is_zero());
        assert_eq!(OpaqueHandle::default(), OpaqueHandle::ZERO);
        assert!(!OpaqueHandle([1u8; 32]).is_zero());
    }

    #[test]
    fn display_is_hex() {
        let mut bytes = [0u8; 32];
        bytes[31] = 0xab;
        let shown = OpaqueHandle(bytes).to_string();
        assert!(shown.starts_with("0x00"));
        assert!(shown.ends_with("ab"));
        assert_eq!(shown.len(), 2 + 64);
    }
}
