use anchor_lang::prelude::*;

use crate::constants::QUESTION_COUNT;
use crate::handle::OpaqueHandle;

/// Per-identity answers, written once and never modified.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub user: Pubkey,
    pub submitted: bool,
    /// Normalized choice handles, one per question
    pub choices: [[u8; 32]; QUESTION_COUNT],
}

impl SubmissionRecord {
    pub fn new(user: Pubkey, choices: [OpaqueHandle; QUESTION_COUNT]) -> Self {
        Self {
            user,
            submitted: true,
            choices: choices.map(OpaqueHandle::to_bytes),
        }
    }

    pub fn choice(&self, question: usize) -> OpaqueHandle {
        self.choices
            .get(question)
            .copied()
            .map(OpaqueHandle::from)
            .unwrap_or(OpaqueHandle::ZERO)
    }
}
