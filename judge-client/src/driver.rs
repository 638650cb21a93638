//! Study loop
//!
//! init, then per scenario: fetch, collect one vote per criterion, submit
//! the full batch. Skips advance without asking for votes. A failed
//! submission is resent from the session buffer when the rater asks for it.

use async_trait::async_trait;
use judge_common::api::{InitResponse, NextScenarioResponse, ScenarioPayload, VoteRequest, VoteResponse};
use judge_common::VoteSymbol;
use tracing::{debug, info, warn};

use crate::http::{ClientError, StudyClient};
use crate::session::{SessionStep, StudySession, VoteOutcome};

/// The study endpoints the loop drives
#[async_trait]
pub trait StudyApi: Send + Sync {
    async fn init(&self) -> Result<InitResponse, ClientError>;
    async fn next_scenario(&self, position: usize) -> Result<NextScenarioResponse, ClientError>;
    async fn submit_votes(&self, batch: &VoteRequest) -> Result<VoteResponse, ClientError>;
}

#[async_trait]
impl StudyApi for StudyClient {
    async fn init(&self) -> Result<InitResponse, ClientError> {
        StudyClient::init(self).await
    }

    async fn next_scenario(&self, position: usize) -> Result<NextScenarioResponse, ClientError> {
        StudyClient::next_scenario(self, position).await
    }

    async fn submit_votes(&self, batch: &VoteRequest) -> Result<VoteResponse, ClientError> {
        StudyClient::submit_votes(self, batch).await
    }
}

/// One rater input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaterInput {
    Vote(VoteSymbol),
    Quit,
}

/// Where votes come from
#[async_trait]
pub trait VoteSource: Send {
    /// A scenario is about to be judged
    fn present(&mut self, _scenario: &ScenarioPayload, _progress_percent: u32) {}

    async fn next_vote(&mut self, criterion_index: usize, criterion: &str) -> RaterInput;

    /// Resend the buffered batch after `error`?
    async fn retry_submission(&mut self, error: &ClientError) -> bool;
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Batches accepted during this session
    pub submitted: usize,
    /// Nothing remains to judge
    pub complete: bool,
}

pub async fn run_session<A, S>(api: &A, source: &mut S) -> Result<SessionSummary, ClientError>
where
    A: StudyApi + ?Sized,
    S: VoteSource + ?Sized,
{
    let init = api.init().await?;
    info!(
        "Study: {} scenarios remaining, {} already judged, {} criteria",
        init.total_scenarios, init.completed_scenarios, init.criteria_count
    );

    let mut session = StudySession::begin(&init);

    while !session.is_complete() {
        let response = api.next_scenario(session.position()).await?;
        match session.apply_next(response) {
            SessionStep::Complete => break,
            SessionStep::NeedsScenario { position } => {
                debug!("Skipped to position {}", position);
                continue;
            }
            SessionStep::Judging => {}
        }

        if let Some(scenario) = session.current() {
            source.present(scenario, session.progress_percent());
        }

        // Collect one vote per criterion
        loop {
            let Some((index, criterion)) = session.current_criterion() else {
                return Err(ClientError::Protocol(
                    "scenario carries no criteria".to_string(),
                ));
            };
            let input = source.next_vote(index, criterion).await;

            let symbol = match input {
                RaterInput::Vote(symbol) => symbol,
                RaterInput::Quit => {
                    info!("Session ended by rater");
                    return Ok(summary(&session, false));
                }
            };
            match session.record_vote(symbol) {
                Ok(VoteOutcome::NextCriterion(_)) => {}
                Ok(VoteOutcome::ReadyToSubmit(_)) => break,
                Err(e) => return Err(ClientError::Protocol(e.to_string())),
            }
        }

        submit_pending(api, source, &mut session).await?;
    }

    info!("Study complete: {} scenarios submitted", session.submitted());
    Ok(summary(&session, true))
}

async fn submit_pending<A, S>(
    api: &A,
    source: &mut S,
    session: &mut StudySession,
) -> Result<(), ClientError>
where
    A: StudyApi + ?Sized,
    S: VoteSource + ?Sized,
{
    loop {
        let Some(batch) = session.pending_batch() else {
            return Ok(());
        };

        match api.submit_votes(&batch).await {
            Ok(_) => {
                debug!("Stored votes for scenario {}", batch.scenario_index);
                session
                    .submission_succeeded()
                    .map_err(|e| ClientError::Protocol(e.to_string()))?;
                return Ok(());
            }
            Err(e) => {
                warn!("Vote submission failed: {}", e);
                session
                    .submission_failed()
                    .map_err(|e| ClientError::Protocol(e.to_string()))?;
                if !source.retry_submission(&e).await {
                    return Err(e);
                }
            }
        }
    }
}

fn summary(session: &StudySession, complete: bool) -> SessionSummary {
    SessionSummary {
        submitted: session.submitted(),
        complete,
    }
}
