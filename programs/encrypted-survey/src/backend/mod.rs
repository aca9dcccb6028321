//! Seams to the confidential-computation collaborators.
//!
//! The ledger is written purely against [`FheBackend`]; the handshake against
//! [`DecryptionBackend`]. [`SoftwareBackend`] and [`DecryptionGateway`] are
//! in-process stand-ins used by tests and local tooling.

use std::time::{SystemTime, UNIX_EPOCH};

use anchor_lang::prelude::*;

use crate::error::SurveyError;
use crate::handle::{ExternalHandle, HandleScope, OpaqueHandle};

pub mod gateway;
pub mod software;

pub use gateway::*;
pub use software::*;

/// Plaintext type carried by a ciphertext.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FheType {
    Bool,
    U8,
    U32,
}

impl FheType {
    /// Mask applied after arithmetic so values wrap at the type width.
    pub fn mask(self) -> u64 {
        match self {
            FheType::Bool => 0x1,
            FheType::U8 => 0xff,
            FheType::U32 => 0xffff_ffff,
        }
    }
}

/// Homomorphic capability the ledger computes with.
///
/// Every operation produces a fresh handle and never exposes plaintext.
/// Comparisons return encrypted booleans; `select` evaluates both branches.
pub trait FheBackend {
    /// Identifier of the underlying cryptographic scheme.
    fn scheme_id(&self) -> u64;

    /// Verifies an input proof binding `handles` to `identity` and `scope`,
    /// and returns the handles usable for computation.
    fn from_external(
        &self,
        scope: &Pubkey,
        identity: &Pubkey,
        handles: &[ExternalHandle],
        proof: &[u8],
    ) -> Result<Vec<OpaqueHandle>>;

    /// Encrypts a public constant.
    fn trivial_encrypt(&self, ty: FheType, value: u64) -> Result<OpaqueHandle>;

    fn add(&self, lhs: &OpaqueHandle, rhs: &OpaqueHandle) -> Result<OpaqueHandle>;

    /// Encrypted `lhs >= scalar`.
    fn ge_scalar(&self, lhs: &OpaqueHandle, scalar: u64) -> Result<OpaqueHandle>;

    /// Encrypted `lhs == scalar`.
    fn eq_scalar(&self, lhs: &OpaqueHandle, scalar: u64) -> Result<OpaqueHandle>;

    /// Oblivious `condition ? if_true : if_false`.
    fn select(
        &self,
        condition: &OpaqueHandle,
        if_true: &OpaqueHandle,
        if_false: &OpaqueHandle,
    ) -> Result<OpaqueHandle>;

    /// Frees a ciphertext nothing references any more. Unknown handles are
    /// ignored.
    fn release(&self, handle: &OpaqueHandle);
}

/// Request sent to the decryption backend in the last handshake step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserDecryptRequest {
    pub handles: Vec<HandleScope>,
    pub public_key: [u8; 32],
    pub signature: [u8; 64],
    pub scopes: Vec<Pubkey>,
    pub identity: Pubkey,
    pub start_timestamp: i64,
    pub duration_days: u32,
}

/// A plaintext re-encrypted to the requester's ephemeral key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedValue {
    pub handle: OpaqueHandle,
    /// Backend's one-off x25519 public key for this value.
    pub ephemeral_public_key: [u8; 32],
    pub ciphertext: [u8; 8],
}

/// Threshold-decryption service reached at the end of the handshake.
#[allow(async_fn_in_trait)]
pub trait DecryptionBackend {
    /// Returns one sealed value per requested handle, or fails the whole batch.
    async fn user_decrypt(&self, request: UserDecryptRequest) -> Result<Vec<SealedValue>>;
}

/// Source of the current unix time, in seconds.
pub trait TimeSource {
    fn now(&self) -> Result<i64>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Result<i64> {
        unix_seconds(SystemTime::now())
    }
}

/// Seconds since the unix epoch. Times before the epoch or past `i64::MAX`
/// seconds are refused rather than clamped.
pub fn unix_seconds(time: SystemTime) -> Result<i64> {
    let elapsed = time
        .duration_since(UNIX_EPOCH)
        .map_err(|_| error!(SurveyError::ClockUnavailable))?;
    i64::try_from(elapsed.as_secs()).map_err(|_| error!(SurveyError::ClockUnavailable))
}

/// Fixed clock, settable by tests and simulations.
#[derive(Clone, Copy, Debug)]
pub struct FixedTimeSource(pub i64);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Result<i64> {
        Ok(self.0)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn now(&self) -> Result<i64> {
        (**self).now()
    }
}

/// Fills a fresh array from the operating system's CSPRNG.
pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes).map_err(|_| error!(SurveyError::EntropyUnavailable))?;
    Ok(bytes)
}
