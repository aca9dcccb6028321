// ==================== SURVEY SHAPE ====================

/// Number of questions in the survey. Fixed at deployment.
pub const QUESTION_COUNT: usize = 5;

/// Upper bound on options per question.
pub const MAX_OPTIONS: usize = 4;

/// Option counts of the deployed questionnaire, in question order.
pub const DEFAULT_OPTION_COUNTS: [u8; QUESTION_COUNT] = [2, 3, 4, 2, 3];

// ==================== SEEDS & DOMAIN TAGS ====================

/// Seed for ledger scope PDA derivation
pub const SURVEY_SEED: &[u8] = b"survey";

/// Prefix of the canonical bytes signed by a user decrypt request
pub const USER_DECRYPT_DOMAIN: &[u8] = b"EncryptedSurvey/UserDecryptRequestVerification/v1";

/// Prefix of the canonical bytes attested by an input proof
pub const INPUT_ATTESTATION_DOMAIN: &[u8] = b"EncryptedSurvey/InputAttestation/v1";

/// Key derivation label for sealing decrypted values to a client key
pub const SEAL_DOMAIN: &[u8] = b"EncryptedSurvey/Seal/v1";

// ==================== BACKEND ====================

/// Scheme ids of homomorphic backends this ledger accepts
pub const SUPPORTED_SCHEMES: &[u64] = &[SOFTWARE_SCHEME_ID];

/// Scheme id reported by the software-simulated backend
pub const SOFTWARE_SCHEME_ID: u64 = 0x5357_4650_4845_0001;

/// Size of an ed25519 input proof
pub const INPUT_PROOF_LEN: usize = 64;

// ==================== DECRYPTION WINDOW ====================

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Validity window used by the client when none is configured
pub const DEFAULT_DURATION_DAYS: u32 = 10;

/// Longest validity window a decrypt request may claim
pub const MAX_DURATION_DAYS: u32 = 365;

/// Round-trip timeout used by the client when none is configured
pub const DEFAULT_DECRYPT_TIMEOUT_SECS: u64 = 30;
