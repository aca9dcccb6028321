//! Access-control registry.
//!
//! Grants are append-only `(scope, viewer, handle)` triples. A ledger grants
//! itself every handle it stores (its own scope as viewer), grants each
//! submitter their normalized choices, and grants tally handles to viewers on
//! request. The decryption gateway reads the same registry.

use std::collections::HashSet;

use anchor_lang::prelude::*;
use parking_lot::RwLock;

use crate::error::SurveyError;
use crate::handle::OpaqueHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccessGrant {
    pub scope: Pubkey,
    pub viewer: Pubkey,
    pub handle: OpaqueHandle,
}

impl AccessGrant {
    /// Grants on the zero sentinel are meaningless and rejected.
    pub fn new(scope: Pubkey, viewer: Pubkey, handle: OpaqueHandle) -> Result<Self> {
        require!(!handle.is_zero(), SurveyError::UnknownHandle);
        Ok(Self {
            scope,
            viewer,
            handle,
        })
    }
}

#[derive(Debug, Default)]
pub struct AccessRegistry {
    grants: RwLock<HashSet<AccessGrant>>,
}

impl AccessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a grant. Returns `false` when it was already present.
    pub fn allow(&self, grant: AccessGrant) -> bool {
        self.grants.write().insert(grant)
    }

    /// Records a batch of grants under one write lock.
    pub fn allow_all(&self, grants: impl IntoIterator<Item = AccessGrant>) -> usize {
        let mut set = self.grants.write();
        grants.into_iter().filter(|g| set.insert(*g)).count()
    }

    pub fn is_allowed(&self, scope: &Pubkey, viewer: &Pubkey, handle: &OpaqueHandle) -> bool {
        if handle.is_zero() {
            return false;
        }
        self.grants.read().contains(&AccessGrant {
            scope: *scope,
            viewer: *viewer,
            handle: *handle,
        })
    }

    pub fn len(&self) -> usize {
        self.grants.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.read().is_empty()
    }
}
