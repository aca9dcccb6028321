//! Software-simulated homomorphic backend.
//!
//! Ciphertexts are plaintext values kept behind opaque handles in a shared
//! store. Only the crate's decryption gateway reads them back. Input proofs
//! are ed25519 attestations by the backend's input verifier key.

use std::collections::HashMap;
use std::sync::Arc;

use anchor_lang::prelude::*;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use parking_lot::Mutex;

use super::{random_bytes, FheBackend, FheType};
use crate::constants::{INPUT_ATTESTATION_DOMAIN, INPUT_PROOF_LEN, SOFTWARE_SCHEME_ID};
use crate::error::SurveyError;
use crate::handle::{ExternalHandle, OpaqueHandle};

#[derive(Clone, Copy, Debug)]
struct Ciphertext {
    ty: FheType,
    value: u64,
}

/// Client-side encryption output: handles plus the proof binding them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedInput {
    pub handles: Vec<ExternalHandle>,
    pub proof: Vec<u8>,
}

/// Statement attested by an input proof.
#[derive(AnchorSerialize)]
struct InputAttestation {
    scheme_id: u64,
    scope: Pubkey,
    identity: Pubkey,
    handles: Vec<[u8; 32]>,
}

impl InputAttestation {
    fn signing_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = INPUT_ATTESTATION_DOMAIN.to_vec();
        self.serialize(&mut bytes)
            .map_err(|_| error!(SurveyError::EncodingFailed))?;
        Ok(bytes)
    }
}

#[derive(Clone)]
pub struct SoftwareBackend {
    store: Arc<Mutex<HashMap<OpaqueHandle, Ciphertext>>>,
    input_verifier: Arc<SigningKey>,
    scheme_id: u64,
}

impl SoftwareBackend {
    pub fn new() -> Result<Self> {
        Ok(Self::with_verifier_key(random_bytes()?))
    }

    pub fn with_verifier_key(secret: [u8; 32]) -> Self {
        Self {
            store: Arc::new(Mutex::new(HashMap::new())),
            input_verifier: Arc::new(SigningKey::from_bytes(&secret)),
            scheme_id: SOFTWARE_SCHEME_ID,
        }
    }

    /// Reports a different scheme id; used to exercise scheme negotiation.
    pub fn with_scheme_id(mut self, scheme_id: u64) -> Self {
        self.scheme_id = scheme_id;
        self
    }

    pub fn input_verifier(&self) -> VerifyingKey {
        self.input_verifier.verifying_key()
    }

    /// Encrypts `values` as `U8` ciphertexts bound to `identity` and `scope`.
    pub fn encrypt_input(
        &self,
        scope: &Pubkey,
        identity: &Pubkey,
        values: &[u8],
    ) -> Result<EncryptedInput> {
        let mut handles = Vec::with_capacity(values.len());
        for &value in values {
            let handle = self.insert(FheType::U8, u64::from(value))?;
            handles.push(ExternalHandle::from(handle));
        }

        let attestation = InputAttestation {
            scheme_id: self.scheme_id,
            scope: *scope,
            identity: *identity,
            handles: handles.iter().map(|h| h.0).collect(),
        };
        let signature = self.input_verifier.sign(&attestation.signing_bytes()?);

        Ok(EncryptedInput {
            handles,
            proof: signature.to_bytes().to_vec(),
        })
    }

    /// Threshold decryption. Reachable only through the decryption gateway.
    pub(crate) fn reveal(&self, handle: &OpaqueHandle) -> Result<u64> {
        Ok(self.load(handle)?.value)
    }

    pub(crate) fn contains(&self, handle: &OpaqueHandle) -> bool {
        self.store.lock().contains_key(handle)
    }

    /// Number of live ciphertexts.
    pub fn ciphertext_count(&self) -> usize {
        self.store.lock().len()
    }

    fn insert(&self, ty: FheType, value: u64) -> Result<OpaqueHandle> {
        let mut bytes: [u8; 32] = random_bytes()?;
        // Last byte tags the type and keeps the handle clear of the zero sentinel.
        bytes[31] = 0x80
            | match ty {
                FheType::Bool => 0,
                FheType::U8 => 2,
                FheType::U32 => 4,
            };
        let handle = OpaqueHandle(bytes);
        self.store.lock().insert(
            handle,
            Ciphertext {
                ty,
                value: value & ty.mask(),
            },
        );
        Ok(handle)
    }

    fn load(&self, handle: &OpaqueHandle) -> Result<Ciphertext> {
        self.store
            .lock()
            .get(handle)
            .copied()
            .ok_or_else(|| error!(SurveyError::UnknownHandle))
    }
}

impl FheBackend for SoftwareBackend {
    fn scheme_id(&self) -> u64 {
        self.scheme_id
    }

    fn from_external(
        &self,
        scope: &Pubkey,
        identity: &Pubkey,
        handles: &[ExternalHandle],
        proof: &[u8],
    ) -> Result<Vec<OpaqueHandle>> {
        let proof: [u8; INPUT_PROOF_LEN] = proof
            .try_into()
            .map_err(|_| error!(SurveyError::ProofInvalid))?;
        let attestation = InputAttestation {
            scheme_id: self.scheme_id,
            scope: *scope,
            identity: *identity,
            handles: handles.iter().map(|h| h.0).collect(),
        };
        self.input_verifier
            .verifying_key()
            .verify(&attestation.signing_bytes()?, &Signature::from_bytes(&proof))
            .map_err(|_| error!(SurveyError::ProofInvalid))?;

        let mut admitted = Vec::with_capacity(handles.len());
        for external in handles {
            let handle = OpaqueHandle(external.0);
            let ciphertext = self
                .load(&handle)
                .map_err(|_| error!(SurveyError::ProofInvalid))?;
            require!(ciphertext.ty == FheType::U8, SurveyError::TypeMismatch);
            admitted.push(handle);
        }
        Ok(admitted)
    }

    fn trivial_encrypt(&self, ty: FheType, value: u64) -> Result<OpaqueHandle> {
        self.insert(ty, value)
    }

    fn add(&self, lhs: &OpaqueHandle, rhs: &OpaqueHandle) -> Result<OpaqueHandle> {
        let (lhs, rhs) = (self.load(lhs)?, self.load(rhs)?);
        require!(
            lhs.ty == rhs.ty && lhs.ty != FheType::Bool,
            SurveyError::TypeMismatch
        );
        self.insert(lhs.ty, lhs.value.wrapping_add(rhs.value) & lhs.ty.mask())
    }

    fn ge_scalar(&self, lhs: &OpaqueHandle, scalar: u64) -> Result<OpaqueHandle> {
        let lhs = self.load(lhs)?;
        require!(lhs.ty != FheType::Bool, SurveyError::TypeMismatch);
        self.insert(FheType::Bool, u64::from(lhs.value >= scalar))
    }

    fn eq_scalar(&self, lhs: &OpaqueHandle, scalar: u64) -> Result<OpaqueHandle> {
        let lhs = self.load(lhs)?;
        require!(lhs.ty != FheType::Bool, SurveyError::TypeMismatch);
        self.insert(FheType::Bool, u64::from(lhs.value == scalar))
    }

    fn select(
        &self,
        condition: &OpaqueHandle,
        if_true: &OpaqueHandle,
        if_false: &OpaqueHandle,
    ) -> Result<OpaqueHandle> {
        let condition = self.load(condition)?;
        let (if_true, if_false) = (self.load(if_true)?, self.load(if_false)?);
        require!(condition.ty == FheType::Bool, SurveyError::TypeMismatch);
        require!(if_true.ty == if_false.ty, SurveyError::TypeMismatch);

        // Blend both branches arithmetically; no branch on the condition.
        let c = condition.value & 1;
        let value = if_true
            .value
            .wrapping_mul(c)
            .wrapping_add(if_false.value.wrapping_mul(1 - c));
        self.insert(if_true.ty, value)
    }

    fn release(&self, handle: &OpaqueHandle) {
        self.store.lock().remove(handle);
    }
}
