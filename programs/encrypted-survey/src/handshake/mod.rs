//! Decryption authorization handshake.
//!
//! Client-side protocol that turns handles the caller may read into
//! plaintext:
//!
//! 1. generate a fresh x25519 keypair,
//! 2. bind its public key, the ledger scopes and a validity window into an
//!    [`AuthorizationStatement`],
//! 3. have the identity sign the statement,
//! 4. send the request to the decryption backend under a timeout,
//! 5. open the sealed plaintexts and drop the keypair.
//!
//! A handshake never reuses a keypair. On `BackendUnavailable` the caller
//! simply runs [`Handshake::decrypt`] again, which starts from step 1.

use std::collections::HashMap;

use anchor_lang::prelude::*;
use tracing::{debug, warn};

use crate::backend::{DecryptionBackend, TimeSource, UserDecryptRequest};
use crate::config::HandshakeConfig;
use crate::error::SurveyError;
use crate::handle::{HandleScope, OpaqueHandle};

pub mod keypair;
pub mod signer;
pub mod statement;

pub use keypair::*;
pub use signer::*;
pub use statement::*;

/// Plaintexts recovered by one handshake.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecryptedValues {
    values: HashMap<OpaqueHandle, u64>,
}

impl DecryptedValues {
    /// Zero-sentinel handles read as 0.
    pub fn get(&self, handle: &OpaqueHandle) -> Option<u64> {
        if handle.is_zero() {
            return Some(0);
        }
        self.values.get(handle).copied()
    }

    /// Plaintexts in batch order.
    pub fn in_order(&self, batch: &[HandleScope]) -> Result<Vec<u64>> {
        batch
            .iter()
            .map(|entry| {
                self.get(&entry.handle)
                    .ok_or_else(|| error!(SurveyError::MalformedResponse))
            })
            .collect()
    }

    /// Number of values that went through the backend.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub struct Handshake<'a, S, D, T> {
    signer: &'a S,
    backend: &'a D,
    clock: T,
    config: HandshakeConfig,
}

impl<'a, S, D, T> Handshake<'a, S, D, T>
where
    S: StatementSigner,
    D: DecryptionBackend,
    T: TimeSource,
{
    pub fn new(signer: &'a S, backend: &'a D, clock: T, config: HandshakeConfig) -> Self {
        Self {
            signer,
            backend,
            clock,
            config,
        }
    }

    pub fn identity(&self) -> Pubkey {
        self.signer.identity()
    }

    /// Decrypts `batch` all-or-nothing.
    ///
    /// Zero-sentinel handles resolve to 0 locally and are never sent; a batch
    /// made only of sentinels completes without contacting the backend.
    pub async fn decrypt(&self, batch: &[HandleScope]) -> Result<DecryptedValues> {
        require!(!batch.is_empty(), SurveyError::EmptyBatch);

        let mut pending: Vec<HandleScope> = Vec::with_capacity(batch.len());
        for entry in batch.iter().filter(|e| !e.handle.is_zero()) {
            if !pending.iter().any(|p| p.handle == entry.handle) {
                pending.push(*entry);
            }
        }
        if pending.is_empty() {
            return Ok(DecryptedValues::default());
        }

        let mut scopes: Vec<Pubkey> = pending.iter().map(|e| e.scope).collect();
        scopes.sort();
        scopes.dedup();

        let keypair = EphemeralKeypair::generate()?;
        let statement = AuthorizationStatement::new(
            keypair.public_key(),
            scopes,
            self.clock.now()?,
            self.config.duration_days,
        )?;
        let signature = self.signer.sign(&statement.signing_bytes()?).await?;

        let identity = self.signer.identity();
        debug!(
            %identity,
            handles = pending.len(),
            start = statement.start_timestamp,
            days = statement.duration_days,
            "requesting user decryption"
        );
        let request = UserDecryptRequest {
            handles: pending.clone(),
            public_key: statement.public_key,
            signature,
            scopes: statement.scopes,
            identity,
            start_timestamp: statement.start_timestamp,
            duration_days: statement.duration_days,
        };

        let sealed = match tokio::time::timeout(self.config.timeout, self.backend.user_decrypt(request)).await {
            Ok(response) => response?,
            Err(_) => {
                warn!(%identity, timeout = ?self.config.timeout, "decryption backend timed out");
                return err!(SurveyError::BackendUnavailable);
            }
        };

        require!(sealed.len() == pending.len(), SurveyError::MalformedResponse);
        let mut values = HashMap::with_capacity(sealed.len());
        for value in &sealed {
            require!(
                pending.iter().any(|e| e.handle == value.handle),
                SurveyError::MalformedResponse
            );
            values.insert(value.handle, keypair.open(value)?);
        }
        require!(values.len() == pending.len(), SurveyError::MalformedResponse);

        debug!(%identity, handles = values.len(), "user decryption complete");
        Ok(DecryptedValues { values })
    }
}
