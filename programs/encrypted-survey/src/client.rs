//! Participant-side flows over a ledger.
//!
//! Each flow reads handles from the ledger and runs one fresh handshake to
//! turn them into plaintext.

use anchor_lang::prelude::*;
use tracing::info;

use crate::backend::{DecryptionBackend, FheBackend, TimeSource};
use crate::config::HandshakeConfig;
use crate::constants::{MAX_OPTIONS, QUESTION_COUNT};
use crate::error::SurveyError;
use crate::handle::HandleScope;
use crate::handshake::{Handshake, StatementSigner};
use crate::ledger::SurveyLedger;
use crate::report::{build_report, tally_rows, Report, TallyRow};

pub struct SurveyClient<'a, S, D, T> {
    handshake: Handshake<'a, S, D, T>,
}

impl<'a, S, D, T> SurveyClient<'a, S, D, T>
where
    S: StatementSigner,
    D: DecryptionBackend,
    T: TimeSource,
{
    pub fn new(signer: &'a S, backend: &'a D, clock: T, config: HandshakeConfig) -> Self {
        Self {
            handshake: Handshake::new(signer, backend, clock, config),
        }
    }

    pub fn identity(&self) -> Pubkey {
        self.handshake.identity()
    }

    /// Decrypts the caller's own normalized answers.
    pub async fn decrypt_my_answers<B: FheBackend>(
        &self,
        ledger: &SurveyLedger<B>,
    ) -> Result<[u8; QUESTION_COUNT]> {
        let identity = self.identity();
        require!(ledger.has_submitted(&identity), SurveyError::NotSubmitted);

        let mut batch = Vec::with_capacity(QUESTION_COUNT);
        for q in 0..QUESTION_COUNT as u8 {
            batch.push(HandleScope::new(
                ledger.encrypted_choice(&identity, q)?,
                ledger.scope(),
            ));
        }

        let values = self.handshake.decrypt(&batch).await?;
        let mut answers = [0u8; QUESTION_COUNT];
        for (answer, value) in answers.iter_mut().zip(values.in_order(&batch)?) {
            *answer = u8::try_from(value).map_err(|_| error!(SurveyError::MalformedResponse))?;
        }

        info!(%identity, scope = %ledger.scope(), "decrypted own answers");
        Ok(answers)
    }

    /// Grants the caller the current tallies and decrypts those of `question`.
    ///
    /// Options past the question's own count come back as 0.
    pub async fn decrypt_question_counts<B: FheBackend>(
        &self,
        ledger: &mut SurveyLedger<B>,
        question: u8,
    ) -> Result<[u64; MAX_OPTIONS]> {
        let identity = self.identity();
        ledger.option_count_for_question(question)?;
        ledger.allow_counts(identity, identity)?;

        let mut batch = Vec::with_capacity(MAX_OPTIONS);
        for o in 0..MAX_OPTIONS as u8 {
            batch.push(HandleScope::new(
                ledger.encrypted_count(question, o)?,
                ledger.scope(),
            ));
        }

        let values = self.handshake.decrypt(&batch).await?;
        let mut counts = [0u64; MAX_OPTIONS];
        for (count, value) in counts.iter_mut().zip(values.in_order(&batch)?) {
            *count = value;
        }

        info!(%identity, question, "decrypted question counts");
        Ok(counts)
    }

    /// Decrypted counts of `question` laid out as labelled bars.
    pub async fn question_rows<B: FheBackend>(
        &self,
        ledger: &mut SurveyLedger<B>,
        question: u8,
    ) -> Result<Vec<TallyRow>> {
        let counts = self.decrypt_question_counts(ledger, question).await?;
        tally_rows(question, &counts)
    }

    pub async fn my_report<B: FheBackend>(&self, ledger: &SurveyLedger<B>) -> Result<Report> {
        let answers = self.decrypt_my_answers(ledger).await?;
        Ok(build_report(&answers))
    }
}
