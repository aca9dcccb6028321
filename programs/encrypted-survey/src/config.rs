use std::time::Duration;

use anchor_lang::prelude::*;

use crate::catalog::QUESTIONS;
use crate::constants::*;
use crate::error::SurveyError;

/// One question of the fixed questionnaire.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuestionSpec {
    pub index: u8,
    pub option_count: u8,
}

/// Question table of a ledger, validated once at construction.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct SurveyConfig {
    questions: [QuestionSpec; QUESTION_COUNT],
}

impl SurveyConfig {
    pub fn new(option_counts: [u8; QUESTION_COUNT]) -> Result<Self> {
        let mut questions = [QuestionSpec { index: 0, option_count: 0 }; QUESTION_COUNT];
        for (i, &option_count) in option_counts.iter().enumerate() {
            require!(
                option_count >= 1 && usize::from(option_count) <= MAX_OPTIONS,
                SurveyError::InvalidOptionCount
            );
            questions[i] = QuestionSpec {
                index: i as u8,
                option_count,
            };
        }
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[QuestionSpec; QUESTION_COUNT] {
        &self.questions
    }

    pub fn question(&self, index: u8) -> Result<&QuestionSpec> {
        self.questions
            .get(usize::from(index))
            .ok_or_else(|| error!(SurveyError::InvalidQuestion))
    }
}

impl Default for SurveyConfig {
    /// The deployed questionnaire, as described by the catalog.
    fn default() -> Self {
        let mut questions = [QuestionSpec { index: 0, option_count: 0 }; QUESTION_COUNT];
        for (i, question) in QUESTIONS.iter().enumerate() {
            questions[i] = QuestionSpec {
                index: i as u8,
                option_count: question.options.len() as u8,
            };
        }
        Self { questions }
    }
}

/// Client-side settings for the decryption handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandshakeConfig {
    /// Validity window claimed by each authorization statement.
    pub duration_days: u32,
    /// Bound on the decryption backend round-trip.
    pub timeout: Duration,
}

impl HandshakeConfig {
    pub fn new(duration_days: u32, timeout: Duration) -> Result<Self> {
        require!(
            duration_days >= 1 && duration_days <= MAX_DURATION_DAYS,
            SurveyError::InvalidDuration
        );
        Ok(Self {
            duration_days,
            timeout,
        })
    }
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            duration_days: DEFAULT_DURATION_DAYS,
            timeout: Duration::from_secs(DEFAULT_DECRYPT_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_deployed_option_counts() {
        let config = SurveyConfig::default();
        let counts: Vec<u8> = config.questions().iter().map(|q| q.option_count).collect();
        assert_eq!(counts, DEFAULT_OPTION_COUNTS.to_vec());
        assert_eq!(config, SurveyConfig::new(DEFAULT_OPTION_COUNTS).unwrap());
    }

    #[test]
    fn rejects_out_of_range_option_counts() {
        assert!(SurveyConfig::new([0, 2, 2, 2, 2]).is_err());
        assert!(SurveyConfig::new([2, 2, 5, 2, 2]).is_err());
        assert!(SurveyConfig::new([1, 4, 4, 1, 4]).is_ok());
    }

    #[test]
    fn question_lookup_is_bounded() {
        let config = SurveyConfig::default();
        assert_eq!(config.question(2).unwrap().option_count, 4);
        assert!(config.question(QUESTION_COUNT as u8).is_err());
    }

    #[test]
    fn handshake_duration_is_bounded() {
        assert!(HandshakeConfig::new(0, Duration::from_secs(1)).is_err());
        assert!(HandshakeConfig::new(MAX_DURATION_DAYS + 1, Duration::from_secs(1)).is_err());
        assert_eq!(HandshakeConfig::default().duration_days, DEFAULT_DURATION_DAYS);
    }
}
