use anchor_lang::prelude::*;

use crate::constants::{MAX_OPTIONS, QUESTION_COUNT};
use crate::error::SurveyError;
use crate::handle::OpaqueHandle;

/// Encrypted per-(question, option) counters of a ledger.
///
/// Counters hold the zero sentinel until their first write.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct TallyBoard {
    pub counts: [[[u8; 32]; MAX_OPTIONS]; QUESTION_COUNT],
    /// Number of accepted submissions
    pub submissions: u64,
}

impl TallyBoard {
    pub fn new() -> Self {
        Self {
            counts: [[[0u8; 32]; MAX_OPTIONS]; QUESTION_COUNT],
            submissions: 0,
        }
    }

    pub fn get(&self, question: usize, option: usize) -> OpaqueHandle {
        self.counts
            .get(question)
            .and_then(|row| row.get(option))
            .copied()
            .map(OpaqueHandle::from)
            .unwrap_or(OpaqueHandle::ZERO)
    }

    pub fn set(&mut self, question: usize, option: usize, handle: OpaqueHandle) -> Result<()> {
        let slot = self
            .counts
            .get_mut(question)
            .ok_or_else(|| error!(SurveyError::InvalidQuestion))?
            .get_mut(option)
            .ok_or_else(|| error!(SurveyError::InvalidOption))?;
        *slot = handle.to_bytes();
        Ok(())
    }
}

impl Default for TallyBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_counters_read_as_zero_sentinel() {
        let board = TallyBoard::new();
        for q in 0..QUESTION_COUNT {
            for o in 0..MAX_OPTIONS {
                assert!(board.get(q, o).is_zero());
            }
        }
        assert!(board.get(QUESTION_COUNT, 0).is_zero());
    }

    #[test]
    fn set_rejects_out_of_range_slots() {
        let mut board = TallyBoard::new();
        board.set(1, 2, OpaqueHandle([4u8; 32])).unwrap();
        assert_eq!(board.get(1, 2), OpaqueHandle([4u8; 32]));
        let written = board.clone();

        let invalid_question: anchor_lang::error::Error = SurveyError::InvalidQuestion.into();
        let invalid_option: anchor_lang::error::Error = SurveyError::InvalidOption.into();
        assert_eq!(
            board.set(QUESTION_COUNT, 0, OpaqueHandle([5u8; 32])).unwrap_err(),
            invalid_question
        );
        assert_eq!(
            board.set(0, MAX_OPTIONS, OpaqueHandle([5u8; 32])).unwrap_err(),
            invalid_option
        );
        assert_eq!(board, written);
    }

    #[test]
    fn account_space_covers_every_counter() {
        assert_eq!(TallyBoard::INIT_SPACE, QUESTION_COUNT * MAX_OPTIONS * 32 + 8);
    }
}
