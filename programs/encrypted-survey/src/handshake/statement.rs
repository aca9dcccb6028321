use anchor_lang::prelude::*;
use ed25519_dalek::{Signature, VerifyingKey};

use crate::constants::{MAX_DURATION_DAYS, SECONDS_PER_DAY, USER_DECRYPT_DOMAIN};
use crate::error::SurveyError;

/// Typed statement an identity signs to authorize one user decryption.
///
/// Binds the ephemeral public key to the ledger scopes it may read and to a
/// validity window `[start_timestamp, start_timestamp + duration_days)`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationStatement {
    pub public_key: [u8; 32],
    pub scopes: Vec<Pubkey>,
    pub start_timestamp: i64,
    pub duration_days: u32,
}

impl AuthorizationStatement {
    pub fn new(
        public_key: [u8; 32],
        scopes: Vec<Pubkey>,
        start_timestamp: i64,
        duration_days: u32,
    ) -> Result<Self> {
        require!(!scopes.is_empty(), SurveyError::EmptyBatch);
        require!(
            duration_days >= 1 && duration_days <= MAX_DURATION_DAYS,
            SurveyError::InvalidDuration
        );
        Ok(Self {
            public_key,
            scopes,
            start_timestamp,
            duration_days,
        })
    }

    /// Canonical bytes covered by the identity's signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = USER_DECRYPT_DOMAIN.to_vec();
        self.serialize(&mut bytes)
            .map_err(|_| error!(SurveyError::EncodingFailed))?;
        Ok(bytes)
    }

    pub fn verify(&self, identity: &Pubkey, signature: &[u8; 64]) -> Result<()> {
        let key = VerifyingKey::from_bytes(&identity.to_bytes())
            .map_err(|_| error!(SurveyError::SignatureInvalid))?;
        key.verify_strict(&self.signing_bytes()?, &Signature::from_bytes(signature))
            .map_err(|_| error!(SurveyError::SignatureInvalid))
    }

    /// First second at which the statement is no longer valid.
    pub fn window_end(&self) -> Result<i64> {
        i64::from(self.duration_days)
            .checked_mul(SECONDS_PER_DAY)
            .and_then(|span| self.start_timestamp.checked_add(span))
            .ok_or_else(|| error!(SurveyError::InvalidDuration))
    }

    pub fn check_window(&self, now: i64) -> Result<()> {
        require!(
            self.duration_days >= 1 && self.duration_days <= MAX_DURATION_DAYS,
            SurveyError::InvalidDuration
        );
        require!(now >= self.start_timestamp, SurveyError::WindowNotStarted);
        require!(now < self.window_end()?, SurveyError::WindowExpired);
        Ok(())
    }
}
