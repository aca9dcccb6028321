//! Confidential survey ledger.
//!
//! Owns the submission records and the encrypted tally board of one survey.
//! Answers arrive as opaque handles, are clamped into range and counted
//! without the ledger ever seeing a plaintext.

use std::collections::HashMap;
use std::sync::Arc;

use anchor_lang::prelude::*;

use crate::acl::{AccessGrant, AccessRegistry};
use crate::backend::{FheBackend, FheType};
use crate::config::SurveyConfig;
use crate::constants::*;
use crate::error::SurveyError;
use crate::handle::{ExternalHandle, OpaqueHandle};
use crate::ingestion::{AdmittedChoices, Ingestion};
use crate::state::*;

pub struct SurveyLedger<B> {
    scope: Pubkey,
    authority: Pubkey,
    survey_id: u64,
    bump: u8,
    config: SurveyConfig,
    ingestion: Ingestion,
    backend: B,
    registry: Arc<AccessRegistry>,
    records: HashMap<Pubkey, SubmissionRecord>,
    tally: TallyBoard,
    events: Vec<AnswersSubmitted>,
}

/// Updates computed by a submission before anything is committed.
struct StagedSubmission {
    record: SubmissionRecord,
    tally: TallyBoard,
    grants: Vec<AccessGrant>,
    /// Ciphertexts nothing references once the submission commits
    released: Vec<OpaqueHandle>,
}

fn track(created: &mut Vec<OpaqueHandle>, handle: OpaqueHandle) -> OpaqueHandle {
    created.push(handle);
    handle
}

impl<B: FheBackend> SurveyLedger<B> {
    /// Derives the scope address of survey `survey_id` created by `authority`.
    pub fn derive_scope(authority: &Pubkey, survey_id: u64) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[SURVEY_SEED, authority.as_ref(), &survey_id.to_le_bytes()],
            &crate::ID,
        )
    }

    pub fn new(
        authority: Pubkey,
        survey_id: u64,
        config: SurveyConfig,
        backend: B,
        registry: Arc<AccessRegistry>,
    ) -> Result<Self> {
        let (scope, bump) = Self::derive_scope(&authority, survey_id);
        let ingestion = Ingestion::new(&backend, scope)?;

        msg!("Survey {} created under scope {}", survey_id, scope);
        emit!(SurveyCreated {
            scope,
            authority,
            survey_id,
        });

        Ok(Self {
            scope,
            authority,
            survey_id,
            bump,
            config,
            ingestion,
            backend,
            registry,
            records: HashMap::new(),
            tally: TallyBoard::new(),
            events: Vec::new(),
        })
    }

    pub fn scope(&self) -> Pubkey {
        self.scope
    }

    pub fn authority(&self) -> Pubkey {
        self.authority
    }

    pub fn survey_id(&self) -> u64 {
        self.survey_id
    }

    pub fn bump(&self) -> u8 {
        self.bump
    }

    pub fn config(&self) -> &SurveyConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn registry(&self) -> &Arc<AccessRegistry> {
        &self.registry
    }

    /// Verifies `raw` against `proof` and records it as `identity`'s answers.
    pub fn submit_answers(
        &mut self,
        identity: Pubkey,
        raw: &[ExternalHandle],
        proof: &[u8],
    ) -> Result<()> {
        require!(!self.has_submitted(&identity), SurveyError::AlreadySubmitted);
        let choices = self.ingestion.admit(&self.backend, &identity, raw, proof)?;
        self.submit(choices)
    }

    /// Records admitted choices as their identity's answers.
    ///
    /// All backend work happens before the first write, so a failure leaves
    /// the records, the tally board and the registry untouched.
    pub(crate) fn submit(&mut self, choices: AdmittedChoices) -> Result<()> {
        let identity = choices.identity();
        require!(!self.has_submitted(&identity), SurveyError::AlreadySubmitted);
        require!(
            choices.handles().iter().all(|c| !c.is_zero()),
            SurveyError::UnknownHandle
        );

        let mut created = Vec::new();
        let staged = match self.stage(identity, choices.handles(), &mut created) {
            Ok(staged) => staged,
            Err(e) => {
                for handle in &created {
                    self.backend.release(handle);
                }
                return Err(e);
            }
        };

        let submissions = staged.tally.submissions;
        self.tally = staged.tally;
        self.records.insert(identity, staged.record);
        self.registry.allow_all(staged.grants);
        for handle in &staged.released {
            self.backend.release(handle);
        }

        msg!("Answers submitted by {} ({} total)", identity, submissions);
        let event = AnswersSubmitted { user: identity };
        emit!(event.clone());
        self.events.push(event);

        Ok(())
    }

    fn stage(
        &self,
        identity: Pubkey,
        choices: &[OpaqueHandle; QUESTION_COUNT],
        created: &mut Vec<OpaqueHandle>,
    ) -> Result<StagedSubmission> {
        let backend = &self.backend;
        let zero_choice = track(created, backend.trivial_encrypt(FheType::U8, 0)?);
        let zero = track(created, backend.trivial_encrypt(FheType::U32, 0)?);
        let one = track(created, backend.trivial_encrypt(FheType::U32, 1)?);

        let mut tally = self.tally.clone();
        let mut normalized = [OpaqueHandle::ZERO; QUESTION_COUNT];
        let mut counts = Vec::with_capacity(QUESTION_COUNT * MAX_OPTIONS);
        // Admitted inputs are consumed by normalization.
        let mut released = choices.to_vec();

        for (q, spec) in self.config.questions().iter().enumerate() {
            // Out-of-range answers count as option 0.
            let out_of_range = track(
                created,
                backend.ge_scalar(&choices[q], u64::from(spec.option_count))?,
            );
            let choice = track(
                created,
                backend.select(&out_of_range, &zero_choice, &choices[q])?,
            );
            normalized[q] = choice;

            for o in 0..usize::from(spec.option_count) {
                let hit = track(created, backend.eq_scalar(&choice, o as u64)?);
                let increment = track(created, backend.select(&hit, &one, &zero)?);
                let previous = self.tally.get(q, o);
                let current = if previous.is_zero() {
                    zero
                } else {
                    released.push(previous);
                    previous
                };
                let count = track(created, backend.add(&current, &increment)?);
                tally.set(q, o, count)?;
                counts.push(count);
            }
        }
        tally.submissions = self.tally.submissions + 1;

        let mut grants = Vec::with_capacity(2 * QUESTION_COUNT + counts.len());
        for handle in &normalized {
            grants.push(AccessGrant::new(self.scope, self.scope, *handle)?);
            grants.push(AccessGrant::new(self.scope, identity, *handle)?);
        }
        for handle in &counts {
            grants.push(AccessGrant::new(self.scope, self.scope, *handle)?);
        }

        released.extend(
            created
                .iter()
                .filter(|h| !normalized.contains(*h) && !counts.contains(*h))
                .copied(),
        );

        Ok(StagedSubmission {
            record: SubmissionRecord::new(identity, normalized),
            tally,
            grants,
            released,
        })
    }

    /// Grants `viewer` every tally counter written so far.
    ///
    /// Idempotent. Counters still at the zero sentinel need no grant.
    pub fn allow_counts(&mut self, caller: Pubkey, viewer: Pubkey) -> Result<usize> {
        let mut grants = Vec::new();
        for q in 0..QUESTION_COUNT {
            for o in 0..MAX_OPTIONS {
                let handle = self.tally.get(q, o);
                if !handle.is_zero() {
                    grants.push(AccessGrant::new(self.scope, viewer, handle)?);
                }
            }
        }
        let granted = grants.len();
        let added = self.registry.allow_all(grants);
        msg!(
            "{} allowed counts for {} ({} handles, {} new)",
            caller,
            viewer,
            granted,
            added
        );
        Ok(granted)
    }

    pub fn option_count_for_question(&self, question: u8) -> Result<u8> {
        Ok(self.config.question(question)?.option_count)
    }

    pub fn has_submitted(&self, identity: &Pubkey) -> bool {
        self.records
            .get(identity)
            .map(|record| record.submitted)
            .unwrap_or(false)
    }

    /// Normalized choice of `identity`, or the zero sentinel if none.
    pub fn encrypted_choice(&self, identity: &Pubkey, question: u8) -> Result<OpaqueHandle> {
        self.config.question(question)?;
        Ok(self
            .records
            .get(identity)
            .map(|record| record.choice(usize::from(question)))
            .unwrap_or(OpaqueHandle::ZERO))
    }

    /// Tally counter of `option`, or the zero sentinel if never written.
    pub fn encrypted_count(&self, question: u8, option: u8) -> Result<OpaqueHandle> {
        self.config.question(question)?;
        require!(usize::from(option) < MAX_OPTIONS, SurveyError::InvalidOption);
        Ok(self.tally.get(usize::from(question), usize::from(option)))
    }

    pub fn submission_count(&self) -> u64 {
        self.tally.submissions
    }

    pub fn record(&self, identity: &Pubkey) -> Option<&SubmissionRecord> {
        self.records.get(identity)
    }

    pub fn tally(&self) -> &TallyBoard {
        &self.tally
    }

    /// Submission events in commit order.
    pub fn events(&self) -> &[AnswersSubmitted] {
        &self.events
    }
}
