use anchor_lang::prelude::*;

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyCreated {
    pub scope: Pubkey,
    pub authority: Pubkey,
    pub survey_id: u64,
}

/// Emitted on every accepted submission. Carries the identity only.
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswersSubmitted {
    pub user: Pubkey,
}
