use anchor_lang::prelude::*;

#[error_code]
pub enum SurveyError {
    // validation
    #[msg("Invalid question")]
    InvalidQuestion,
    #[msg("Invalid option")]
    InvalidOption,
    #[msg("Option count must be between 1 and MAX_OPTIONS")]
    InvalidOptionCount,
    #[msg("Handle batch does not match the question count")]
    WrongHandleCount,
    #[msg("Decryption window duration is out of range")]
    InvalidDuration,
    #[msg("Decryption batch is empty")]
    EmptyBatch,

    // protocol
    #[msg("Input proof does not verify")]
    ProofInvalid,
    #[msg("Signature does not match the identity")]
    SignatureInvalid,
    #[msg("Decryption window has expired")]
    WindowExpired,
    #[msg("Decryption window has not started")]
    WindowNotStarted,
    #[msg("Unauthorized")]
    Unauthorized,

    // state
    #[msg("Already submitted")]
    AlreadySubmitted,
    #[msg("You have not submitted the survey yet")]
    NotSubmitted,

    // backend
    #[msg("Homomorphic scheme is not supported")]
    SchemeUnsupported,
    #[msg("Unknown ciphertext handle")]
    UnknownHandle,
    #[msg("Ciphertext type mismatch")]
    TypeMismatch,
    #[msg("Decryption backend returned a malformed response")]
    MalformedResponse,
    #[msg("Failed to encode message")]
    EncodingFailed,
    #[msg("System randomness unavailable")]
    EntropyUnavailable,
    #[msg("System clock is before the unix epoch or out of range")]
    ClockUnavailable,

    // transient
    #[msg("Decryption backend unavailable")]
    BackendUnavailable,
}
