//! Encrypted Survey Ledger
//!
//! Participants answer a fixed five-question questionnaire with encrypted
//! choices. The ledger clamps and tallies them homomorphically, enforces one
//! submission per identity, and hands out plaintext only through a signed,
//! time-bounded decryption handshake.
//!
//! Location: programs/encrypted-survey/src/lib.rs

use anchor_lang::prelude::*;

declare_id!("7ixZrfAusDvEPjdszBMvmEF3zvUj1JX4HkM8rJHmj8dD");

pub mod acl;
pub mod backend;
pub mod catalog;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod handle;
pub mod handshake;
pub mod ingestion;
pub mod ledger;
pub mod report;
pub mod state;

pub use acl::{AccessGrant, AccessRegistry};
pub use backend::{
    DecryptionBackend, DecryptionGateway, EncryptedInput, FheBackend, FheType, FixedTimeSource,
    SealedValue, SoftwareBackend, SystemTimeSource, TimeSource, UserDecryptRequest,
};
pub use client::SurveyClient;
pub use config::{HandshakeConfig, QuestionSpec, SurveyConfig};
pub use constants::*;
pub use error::SurveyError;
pub use handle::{ExternalHandle, HandleScope, OpaqueHandle};
pub use handshake::{
    AuthorizationStatement, DecryptedValues, EphemeralKeypair, Handshake, LocalWallet,
    StatementSigner,
};
pub use ingestion::{AdmittedChoices, Ingestion};
pub use ledger::SurveyLedger;
pub use report::{build_report, tally_rows, Report, ReportTrait, TallyRow};
pub use state::{AnswersSubmitted, SubmissionRecord, SurveyCreated, TallyBoard};

#[cfg(test)]
mod tests;
