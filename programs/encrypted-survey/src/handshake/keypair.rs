use std::fmt;

use anchor_lang::prelude::*;
use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey, StaticSecret};

use crate::backend::{random_bytes, SealedValue};
use crate::constants::SEAL_DOMAIN;
use crate::error::SurveyError;
use crate::handle::OpaqueHandle;

/// Single-use x25519 keypair of one handshake. The secret is zeroized on drop.
pub struct EphemeralKeypair {
    secret: StaticSecret,
    public: PublicKey,
}

impl EphemeralKeypair {
    pub fn generate() -> Result<Self> {
        let secret = StaticSecret::from(random_bytes::<32>()?);
        let public = PublicKey::from(&secret);
        Ok(Self { secret, public })
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.public.to_bytes()
    }

    /// Recovers a plaintext sealed to this keypair.
    pub fn open(&self, sealed: &SealedValue) -> Result<u64> {
        let shared = self
            .secret
            .diffie_hellman(&PublicKey::from(sealed.ephemeral_public_key));
        require!(shared.was_contributory(), SurveyError::MalformedResponse);
        let pad = seal_pad(shared.as_bytes(), &sealed.handle);
        Ok(u64::from_le_bytes(xor8(sealed.ciphertext, pad)))
    }
}

impl fmt::Debug for EphemeralKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeypair")
            .field("public", &self.public.as_bytes())
            .finish_non_exhaustive()
    }
}

/// Seals `value` to `recipient` under a fresh backend-side key.
pub fn seal(recipient: &[u8; 32], handle: OpaqueHandle, value: u64) -> Result<SealedValue> {
    let secret = StaticSecret::from(random_bytes::<32>()?);
    let ephemeral_public_key = PublicKey::from(&secret).to_bytes();
    let shared = secret.diffie_hellman(&PublicKey::from(*recipient));
    require!(shared.was_contributory(), SurveyError::Unauthorized);
    let pad = seal_pad(shared.as_bytes(), &handle);
    Ok(SealedValue {
        handle,
        ephemeral_public_key,
        ciphertext: xor8(value.to_le_bytes(), pad),
    })
}

fn seal_pad(shared: &[u8; 32], handle: &OpaqueHandle) -> [u8; 8] {
    let digest = Sha256::new()
        .chain_update(SEAL_DOMAIN)
        .chain_update(shared)
        .chain_update(handle.0)
        .finalize();
    let mut pad = [0u8; 8];
    pad.copy_from_slice(&digest[..8]);
    pad
}

fn xor8(a: [u8; 8], b: [u8; 8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    for i in 0..8 {
        out[i] = a[i] ^ b[i];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_value_opens_only_with_matching_keypair() {
        let keypair = EphemeralKeypair::generate().unwrap();
        let handle = OpaqueHandle([9u8; 32]);
        let sealed = seal(&keypair.public_key(), handle, 1234).unwrap();
        assert_eq!(keypair.open(&sealed).unwrap(), 1234);

        let stranger = EphemeralKeypair::generate().unwrap();
        assert_ne!(stranger.open(&sealed).unwrap(), 1234);
    }

    #[test]
    fn pad_is_bound_to_handle() {
        let keypair = EphemeralKeypair::generate().unwrap();
        let mut sealed = seal(&keypair.public_key(), OpaqueHandle([1u8; 32]), 77).unwrap();
        sealed.handle = OpaqueHandle([2u8; 32]);
        assert_ne!(keypair.open(&sealed).unwrap(), 77);
    }

    #[test]
    fn keypairs_are_fresh() {
        let a = EphemeralKeypair::generate().unwrap();
        let b = EphemeralKeypair::generate().unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn low_order_recipient_is_refused() {
        assert!(seal(&[0u8; 32], OpaqueHandle([1u8; 32]), 1).is_err());
    }
}
