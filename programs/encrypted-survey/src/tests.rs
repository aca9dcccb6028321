//! Unit Tests for the Survey Ledger
//!
//! These tests drive the ledger against the software backend and read
//! ciphertexts back through the backend directly, bypassing the handshake.

use std::sync::Arc;

use anchor_lang::prelude::*;

use crate::acl::AccessRegistry;
use crate::backend::SoftwareBackend;
use crate::config::SurveyConfig;
use crate::constants::*;
use crate::error::SurveyError;
use crate::handle::OpaqueHandle;
use crate::ledger::SurveyLedger;

/// Test module for ledger accounting
#[cfg(test)]
mod ledger_tests {
    use super::*;

    fn new_ledger(config: SurveyConfig) -> SurveyLedger<SoftwareBackend> {
        SurveyLedger::new(
            Pubkey::new_unique(),
            7,
            config,
            SoftwareBackend::with_verifier_key([42u8; 32]),
            Arc::new(AccessRegistry::new()),
        )
        .unwrap()
    }

    fn submit(
        ledger: &mut SurveyLedger<SoftwareBackend>,
        identity: Pubkey,
        answers: [u8; QUESTION_COUNT],
    ) -> Result<()> {
        let input = ledger
            .backend()
            .encrypt_input(&ledger.scope(), &identity, &answers)?;
        ledger.submit_answers(identity, &input.handles, &input.proof)
    }

    fn plain(ledger: &SurveyLedger<SoftwareBackend>, handle: OpaqueHandle) -> u64 {
        if handle.is_zero() {
            return 0;
        }
        ledger.backend().reveal(&handle).unwrap()
    }

    fn counts(ledger: &SurveyLedger<SoftwareBackend>, question: u8) -> Vec<u64> {
        (0..MAX_OPTIONS as u8)
            .map(|o| plain(ledger, ledger.encrypted_count(question, o).unwrap()))
            .collect()
    }

    fn choices(ledger: &SurveyLedger<SoftwareBackend>, identity: &Pubkey) -> Vec<u64> {
        (0..QUESTION_COUNT as u8)
            .map(|q| plain(ledger, ledger.encrypted_choice(identity, q).unwrap()))
            .collect()
    }

    // =========================================================================
    // SUM INVARIANT TESTS
    // =========================================================================

    #[test]
    fn test_counts_sum_to_submissions_for_every_question() {
        let mut ledger = new_ledger(SurveyConfig::default());
        let answers = [
            [0, 0, 0, 0, 0],
            [1, 2, 3, 1, 2],
            [0, 1, 2, 1, 1],
            [1, 1, 1, 0, 0],
            [0, 2, 3, 0, 2],
        ];
        for a in answers {
            submit(&mut ledger, Pubkey::new_unique(), a).unwrap();
        }

        assert_eq!(ledger.submission_count(), 5);
        for q in 0..QUESTION_COUNT as u8 {
            let total: u64 = counts(&ledger, q).iter().sum();
            assert_eq!(total, 5, "question {q}");
        }
    }

    #[test]
    fn test_counts_past_option_count_stay_zero() {
        let mut ledger = new_ledger(SurveyConfig::default());
        submit(&mut ledger, Pubkey::new_unique(), [1, 2, 3, 1, 2]).unwrap();

        // Q0 has two options; options 2 and 3 are never written.
        assert!(ledger.encrypted_count(0, 2).unwrap().is_zero());
        assert!(ledger.encrypted_count(0, 3).unwrap().is_zero());
        assert!(!ledger.encrypted_count(2, 3).unwrap().is_zero());
    }

    #[test]
    fn test_every_written_counter_is_replaced_on_submission() {
        let mut ledger = new_ledger(SurveyConfig::default());
        submit(&mut ledger, Pubkey::new_unique(), [0, 0, 0, 0, 0]).unwrap();
        let before = ledger.encrypted_count(2, 3).unwrap();

        submit(&mut ledger, Pubkey::new_unique(), [0, 0, 0, 0, 0]).unwrap();
        let after = ledger.encrypted_count(2, 3).unwrap();

        // Same plaintext, fresh ciphertext.
        assert_ne!(before, after);
        assert_eq!(plain(&ledger, after), 0);
    }

    // =========================================================================
    // SINGLE SUBMISSION TESTS
    // =========================================================================

    #[test]
    fn test_second_submission_is_rejected() {
        let mut ledger = new_ledger(SurveyConfig::default());
        let alice = Pubkey::new_unique();
        submit(&mut ledger, alice, [0, 1, 2, 1, 0]).unwrap();
        let first = choices(&ledger, &alice);
        let grants = ledger.registry().len();

        let expected: anchor_lang::error::Error = SurveyError::AlreadySubmitted.into();
        assert_eq!(
            submit(&mut ledger, alice, [1, 0, 0, 0, 1]).unwrap_err(),
            expected
        );

        assert_eq!(choices(&ledger, &alice), first);
        assert_eq!(ledger.submission_count(), 1);
        assert_eq!(ledger.registry().len(), grants);
        assert_eq!(ledger.events().len(), 1);
    }

    #[test]
    fn test_rejected_proof_leaves_identity_free_to_submit() {
        let mut ledger = new_ledger(SurveyConfig::default());
        let alice = Pubkey::new_unique();
        let forged = ledger
            .backend()
            .encrypt_input(&ledger.scope(), &Pubkey::new_unique(), &[0, 0, 0, 0, 0])
            .unwrap();

        let expected: anchor_lang::error::Error = SurveyError::ProofInvalid.into();
        assert_eq!(
            ledger
                .submit_answers(alice, &forged.handles, &forged.proof)
                .unwrap_err(),
            expected
        );
        assert!(!ledger.has_submitted(&alice));

        submit(&mut ledger, alice, [0, 0, 0, 0, 0]).unwrap();
        assert!(ledger.has_submitted(&alice));
    }

    // =========================================================================
    // NORMALIZATION TESTS
    // =========================================================================

    #[test]
    fn test_out_of_range_answers_are_recorded_as_option_zero() {
        let mut ledger = new_ledger(SurveyConfig::default());
        let bob = Pubkey::new_unique();
        submit(&mut ledger, bob, [2, 3, 4, 255, 3]).unwrap();

        assert_eq!(choices(&ledger, &bob), vec![0, 0, 0, 0, 0]);
        for q in 0..QUESTION_COUNT as u8 {
            assert_eq!(counts(&ledger, q)[0], 1, "question {q}");
        }
    }

    #[test]
    fn test_in_range_answers_are_kept() {
        let mut ledger = new_ledger(SurveyConfig::default());
        let carol = Pubkey::new_unique();
        submit(&mut ledger, carol, [1, 2, 3, 1, 2]).unwrap();

        assert_eq!(choices(&ledger, &carol), vec![1, 2, 3, 1, 2]);
        assert_eq!(counts(&ledger, 2), vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_normalization_uses_configured_option_counts() {
        let mut ledger = new_ledger(SurveyConfig::new([1, 1, 1, 1, 4]).unwrap());
        let dave = Pubkey::new_unique();
        submit(&mut ledger, dave, [1, 0, 1, 0, 3]).unwrap();

        assert_eq!(choices(&ledger, &dave), vec![0, 0, 0, 0, 3]);
        assert_eq!(ledger.option_count_for_question(4).unwrap(), 4);
    }

    // =========================================================================
    // ZERO SENTINEL TESTS
    // =========================================================================

    #[test]
    fn test_unknown_identity_reads_zero_sentinel() {
        let mut ledger = new_ledger(SurveyConfig::default());
        submit(&mut ledger, Pubkey::new_unique(), [1, 1, 1, 1, 1]).unwrap();

        let stranger = Pubkey::new_unique();
        for q in 0..QUESTION_COUNT as u8 {
            assert_eq!(ledger.encrypted_choice(&stranger, q).unwrap(), OpaqueHandle::ZERO);
        }
    }

    #[test]
    fn test_zero_sentinel_is_never_granted() {
        let mut ledger = new_ledger(SurveyConfig::default());
        let viewer = Pubkey::new_unique();
        ledger.allow_counts(viewer, viewer).unwrap();

        let scope = ledger.scope();
        assert!(ledger.registry().is_empty());
        assert!(!ledger
            .registry()
            .is_allowed(&scope, &viewer, &OpaqueHandle::ZERO));
    }
}
