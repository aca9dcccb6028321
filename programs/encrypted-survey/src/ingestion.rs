//! Ciphertext ingestion.
//!
//! Verifies externally supplied handles before the ledger touches them, so a
//! bad proof can never reach the irreversible submission path.

use anchor_lang::prelude::*;

use crate::backend::FheBackend;
use crate::constants::{QUESTION_COUNT, SUPPORTED_SCHEMES};
use crate::error::SurveyError;
use crate::handle::{ExternalHandle, OpaqueHandle};

/// Choice handles that passed ingestion, bound to the identity that proved
/// them. Only [`Ingestion::admit`] hands these out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdmittedChoices {
    identity: Pubkey,
    handles: [OpaqueHandle; QUESTION_COUNT],
}

impl AdmittedChoices {
    pub(crate) fn new(identity: Pubkey, handles: [OpaqueHandle; QUESTION_COUNT]) -> Self {
        Self { identity, handles }
    }

    pub fn identity(&self) -> Pubkey {
        self.identity
    }

    pub fn handles(&self) -> &[OpaqueHandle; QUESTION_COUNT] {
        &self.handles
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ingestion {
    scope: Pubkey,
    scheme_id: u64,
}

impl Ingestion {
    /// Binds ingestion to a ledger scope. The backend's scheme is checked
    /// here once rather than on every call.
    pub fn new<B: FheBackend>(backend: &B, scope: Pubkey) -> Result<Self> {
        let scheme_id = backend.scheme_id();
        if !SUPPORTED_SCHEMES.contains(&scheme_id) {
            msg!("Unsupported homomorphic scheme {:#x}", scheme_id);
            return err!(SurveyError::SchemeUnsupported);
        }
        Ok(Self { scope, scheme_id })
    }

    pub fn scope(&self) -> Pubkey {
        self.scope
    }

    pub fn scheme_id(&self) -> u64 {
        self.scheme_id
    }

    pub fn admit<B: FheBackend>(
        &self,
        backend: &B,
        identity: &Pubkey,
        raw: &[ExternalHandle],
        proof: &[u8],
    ) -> Result<AdmittedChoices> {
        require!(raw.len() == QUESTION_COUNT, SurveyError::WrongHandleCount);

        let admitted = backend.from_external(&self.scope, identity, raw, proof)?;
        let handles = admitted
            .try_into()
            .map_err(|_| error!(SurveyError::WrongHandleCount))?;
        Ok(AdmittedChoices::new(*identity, handles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SoftwareBackend;

    #[test]
    fn admits_a_full_batch() {
        let backend = SoftwareBackend::with_verifier_key([1u8; 32]);
        let scope = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let ingestion = Ingestion::new(&backend, scope).unwrap();

        let input = backend.encrypt_input(&scope, &alice, &[1, 2, 3, 0, 2]).unwrap();
        let admitted = ingestion
            .admit(&backend, &alice, &input.handles, &input.proof)
            .unwrap();
        assert_eq!(admitted.handles()[4].to_bytes(), input.handles[4].0);
        assert_eq!(admitted.identity(), alice);
    }

    #[test]
    fn proof_for_one_identity_does_not_admit_another() {
        let backend = SoftwareBackend::with_verifier_key([1u8; 32]);
        let scope = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let mallory = Pubkey::new_unique();
        let ingestion = Ingestion::new(&backend, scope).unwrap();

        let input = backend.encrypt_input(&scope, &alice, &[1, 2, 3, 0, 2]).unwrap();
        let expected: anchor_lang::error::Error = SurveyError::ProofInvalid.into();
        assert_eq!(
            ingestion
                .admit(&backend, &mallory, &input.handles, &input.proof)
                .unwrap_err(),
            expected
        );
    }

    #[test]
    fn rejects_wrong_batch_size_before_verifying() {
        let backend = SoftwareBackend::with_verifier_key([1u8; 32]);
        let scope = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let ingestion = Ingestion::new(&backend, scope).unwrap();

        let input = backend.encrypt_input(&scope, &alice, &[1, 2, 3, 0]).unwrap();
        let expected: anchor_lang::error::Error = SurveyError::WrongHandleCount.into();
        assert_eq!(
            ingestion
                .admit(&backend, &alice, &input.handles, &input.proof)
                .unwrap_err(),
            expected
        );
    }

    #[test]
    fn rejects_proof_for_another_ledger() {
        let backend = SoftwareBackend::with_verifier_key([1u8; 32]);
        let alice = Pubkey::new_unique();
        let ingestion = Ingestion::new(&backend, Pubkey::new_unique()).unwrap();

        let input = backend
            .encrypt_input(&Pubkey::new_unique(), &alice, &[0, 0, 0, 0, 0])
            .unwrap();
        let expected: anchor_lang::error::Error = SurveyError::ProofInvalid.into();
        assert_eq!(
            ingestion
                .admit(&backend, &alice, &input.handles, &input.proof)
                .unwrap_err(),
            expected
        );
    }

    #[test]
    fn unknown_scheme_is_refused_at_construction() {
        let backend = SoftwareBackend::with_verifier_key([1u8; 32]).with_scheme_id(0xdead);
        let expected: anchor_lang::error::Error = SurveyError::SchemeUnsupported.into();
        assert_eq!(
            Ingestion::new(&backend, Pubkey::new_unique()).unwrap_err(),
            expected
        );
    }
}
