use anchor_lang::prelude::*;
use ed25519_dalek::{Signer as _, SigningKey};

use crate::backend::random_bytes;

/// Signing collaborator holding an identity's key (a wallet, usually).
#[allow(async_fn_in_trait)]
pub trait StatementSigner {
    fn identity(&self) -> Pubkey;

    /// Signs the canonical statement bytes. May suspend on user approval.
    async fn sign(&self, message: &[u8]) -> Result<[u8; 64]>;
}

/// In-process ed25519 wallet.
pub struct LocalWallet {
    key: SigningKey,
}

impl LocalWallet {
    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(&secret),
        }
    }

    pub fn generate() -> Result<Self> {
        Ok(Self::from_secret(random_bytes()?))
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.key.verifying_key().to_bytes())
    }
}

impl StatementSigner for LocalWallet {
    fn identity(&self) -> Pubkey {
        self.pubkey()
    }

    async fn sign(&self, message: &[u8]) -> Result<[u8; 64]> {
        Ok(self.key.sign(message).to_bytes())
    }
}
