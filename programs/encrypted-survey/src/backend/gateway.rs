//! In-process decryption gateway.
//!
//! Stands in for the threshold-decryption service: it authenticates a user
//! decrypt request, checks the validity window and the access registry, and
//! only then reveals and seals every requested plaintext.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anchor_lang::prelude::*;
use tracing::{debug, warn};

use super::{DecryptionBackend, SealedValue, SoftwareBackend, TimeSource, UserDecryptRequest};
use crate::acl::AccessRegistry;
use crate::error::SurveyError;
use crate::handshake::{seal, AuthorizationStatement};

pub struct DecryptionGateway<T> {
    backend: SoftwareBackend,
    registry: Arc<AccessRegistry>,
    clock: T,
    available: AtomicBool,
}

impl<T: TimeSource> DecryptionGateway<T> {
    pub fn new(backend: SoftwareBackend, registry: Arc<AccessRegistry>, clock: T) -> Self {
        Self {
            backend,
            registry,
            clock,
            available: AtomicBool::new(true),
        }
    }

    /// Simulates an outage; requests fail with `BackendUnavailable` while down.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Checks signature, window and every handle before anything is revealed.
    pub fn authorize(&self, request: &UserDecryptRequest) -> Result<()> {
        require!(!request.handles.is_empty(), SurveyError::EmptyBatch);

        let statement = AuthorizationStatement {
            public_key: request.public_key,
            scopes: request.scopes.clone(),
            start_timestamp: request.start_timestamp,
            duration_days: request.duration_days,
        };
        statement.verify(&request.identity, &request.signature)?;
        statement.check_window(self.clock.now()?)?;

        for entry in &request.handles {
            let bound = request.scopes.contains(&entry.scope);
            let owned = self.registry.is_allowed(&entry.scope, &entry.scope, &entry.handle);
            let granted = self.registry.is_allowed(&entry.scope, &request.identity, &entry.handle);
            if !(bound && owned && granted && self.backend.contains(&entry.handle)) {
                warn!(
                    identity = %request.identity,
                    handle = %entry.handle,
                    bound,
                    owned,
                    granted,
                    "rejecting user decrypt batch"
                );
                return err!(SurveyError::Unauthorized);
            }
        }
        Ok(())
    }
}

impl<T: TimeSource> DecryptionBackend for DecryptionGateway<T> {
    async fn user_decrypt(&self, request: UserDecryptRequest) -> Result<Vec<SealedValue>> {
        require!(
            self.available.load(Ordering::SeqCst),
            SurveyError::BackendUnavailable
        );
        self.authorize(&request)?;

        let sealed = request
            .handles
            .iter()
            .map(|entry| {
                let value = self.backend.reveal(&entry.handle)?;
                seal(&request.public_key, entry.handle, value)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(identity = %request.identity, handles = sealed.len(), "sealed user decrypt batch");
        Ok(sealed)
    }
}
