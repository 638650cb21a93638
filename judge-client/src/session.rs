//! Rater session state
//!
//! One scenario is judged at a time, one criterion at a time. Votes are
//! buffered locally until every criterion has one, then the whole batch is
//! handed out for submission. The buffer survives a failed submission so it
//! can be resent without asking again.
//!
//! A successful submission does not move the position: the judged scenario
//! drops out of the server's remaining sequence, so the same position now
//! names the next unjudged scenario. Only skips advance the position.

use judge_common::api::{InitResponse, NextScenarioResponse, ScenarioPayload, VoteRequest};
use judge_common::VoteSymbol;
use thiserror::Error;

/// Votes that cannot be recorded in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No scenario is loaded")]
    NoScenario,

    #[error("A submission is pending")]
    SubmissionPending,

    #[error("No submission is pending")]
    NothingPending,
}

/// What the session needs after applying a `/next-scenario` response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    /// Fetch the scenario at `position`
    NeedsScenario { position: usize },
    /// A scenario is loaded and awaits votes
    Judging,
    /// Nothing remains
    Complete,
}

/// Result of recording one vote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// More criteria remain; holds the index of the next one
    NextCriterion(usize),
    /// Every criterion has a vote
    ReadyToSubmit(VoteRequest),
}

#[derive(Debug, Clone)]
pub struct StudySession {
    position: usize,
    /// Remaining scenarios reported at start
    total_scenarios: usize,
    /// Scenarios judged before this session
    completed_before: usize,
    /// Batches accepted during this session
    submitted: usize,
    criteria: Vec<String>,
    current: Option<ScenarioPayload>,
    votes: Vec<VoteSymbol>,
    submitting: bool,
    complete: bool,
}

impl StudySession {
    pub fn begin(init: &InitResponse) -> Self {
        Self {
            position: 0,
            total_scenarios: init.total_scenarios,
            completed_before: init.completed_scenarios,
            submitted: 0,
            criteria: init.criteria.clone(),
            current: None,
            votes: Vec::with_capacity(init.criteria_count),
            submitting: false,
            complete: init.total_scenarios == 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn completed_before(&self) -> usize {
        self.completed_before
    }

    pub fn current(&self) -> Option<&ScenarioPayload> {
        self.current.as_ref()
    }

    pub fn votes(&self) -> &[VoteSymbol] {
        &self.votes
    }

    /// Index and text of the criterion awaiting a vote
    pub fn current_criterion(&self) -> Option<(usize, &str)> {
        if self.current.is_none() || self.submitting {
            return None;
        }
        let index = self.votes.len();
        self.criteria.get(index).map(|c| (index, c.as_str()))
    }

    pub fn apply_next(&mut self, response: NextScenarioResponse) -> SessionStep {
        match response {
            NextScenarioResponse::Complete { .. } => {
                self.current = None;
                self.votes.clear();
                self.complete = true;
                SessionStep::Complete
            }
            NextScenarioResponse::Skip { next_position, .. } => {
                self.position = next_position;
                SessionStep::NeedsScenario {
                    position: next_position,
                }
            }
            NextScenarioResponse::Scenario(payload) => {
                self.criteria = payload.criteria.clone();
                self.votes.clear();
                self.current = Some(payload);
                SessionStep::Judging
            }
        }
    }

    /// Buffer one vote for the current criterion
    pub fn record_vote(&mut self, symbol: VoteSymbol) -> Result<VoteOutcome, SessionError> {
        if self.submitting {
            return Err(SessionError::SubmissionPending);
        }
        if self.current.is_none() {
            return Err(SessionError::NoScenario);
        }

        self.votes.push(symbol);
        if self.votes.len() < self.criteria.len() {
            return Ok(VoteOutcome::NextCriterion(self.votes.len()));
        }

        self.submitting = true;
        self.pending_batch()
            .map(VoteOutcome::ReadyToSubmit)
            .ok_or(SessionError::NoScenario)
    }

    /// The full batch awaiting submission
    pub fn pending_batch(&self) -> Option<VoteRequest> {
        if !self.submitting {
            return None;
        }
        let scenario = self.current.as_ref()?;
        Some(VoteRequest::new(
            &self.votes,
            scenario.scenario_index,
            scenario.model1.clone(),
            scenario.model2.clone(),
        ))
    }

    /// The server accepted the pending batch
    pub fn submission_succeeded(&mut self) -> Result<SessionStep, SessionError> {
        if !self.submitting {
            return Err(SessionError::NothingPending);
        }
        self.submitting = false;
        self.votes.clear();
        self.current = None;
        self.submitted += 1;
        Ok(SessionStep::NeedsScenario {
            position: self.position,
        })
    }

    /// The pending batch was not stored; it stays buffered for a retry
    pub fn submission_failed(&self) -> Result<(), SessionError> {
        if self.submitting {
            Ok(())
        } else {
            Err(SessionError::NothingPending)
        }
    }

    /// Share of this session's criterion votes already cast, 0 to 100
    pub fn progress_percent(&self) -> u32 {
        let per_scenario = self.criteria.len().max(1);
        let total = self.total_scenarios * per_scenario;
        if total == 0 {
            return 100;
        }
        let done = self.submitted * per_scenario + self.votes.len();
        (((done * 100) as f64 / total as f64).round() as u32).min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init(total: usize) -> InitResponse {
        InitResponse {
            success: true,
            total_scenarios: total,
            criteria_count: 2,
            completed_scenarios: 1,
            criteria: vec!["helpful".to_string(), "kind".to_string()],
        }
    }

    fn payload(index: i64) -> NextScenarioResponse {
        NextScenarioResponse::Scenario(ScenarioPayload {
            success: true,
            complete: false,
            scenario: format!("prompt {}", index),
            scenario_index: index,
            response1: "left".to_string(),
            response2: "right".to_string(),
            model1: "gpt-4".to_string(),
            model2: "Claude".to_string(),
            criteria: vec!["helpful".to_string(), "kind".to_string()],
            criterion_total: 2,
            scenario_number: 1,
            scenario_total: 2,
        })
    }

    #[test]
    fn test_begin_with_nothing_remaining_is_complete() {
        let session = StudySession::begin(&init(0));
        assert!(session.is_complete());
        assert_eq!(session.progress_percent(), 100);
    }

    #[test]
    fn test_full_batch_is_released_once() {
        let mut session = StudySession::begin(&init(2));
        assert_eq!(session.apply_next(payload(4)), SessionStep::Judging);
        assert_eq!(session.current_criterion(), Some((0, "helpful")));

        assert_eq!(
            session.record_vote(VoteSymbol::LeftWins),
            Ok(VoteOutcome::NextCriterion(1))
        );
        assert_eq!(session.current_criterion(), Some((1, "kind")));

        let expected = VoteRequest {
            votes: vec!["1".to_string(), "b".to_string()],
            scenario_index: 4,
            model1: "gpt-4".to_string(),
            model2: "Claude".to_string(),
        };
        assert_eq!(
            session.record_vote(VoteSymbol::BothMissed),
            Ok(VoteOutcome::ReadyToSubmit(expected.clone()))
        );
        assert!(session.is_submitting());
        assert_eq!(session.pending_batch(), Some(expected));
        assert_eq!(session.current_criterion(), None);
    }

    #[test]
    fn test_votes_rejected_while_submitting() {
        let mut session = StudySession::begin(&init(2));
        session.apply_next(payload(0));
        session.record_vote(VoteSymbol::Tie).unwrap();
        session.record_vote(VoteSymbol::Tie).unwrap();

        assert_eq!(
            session.record_vote(VoteSymbol::RightWins),
            Err(SessionError::SubmissionPending)
        );
        assert_eq!(session.votes().len(), 2);
    }

    #[test]
    fn test_votes_rejected_without_scenario() {
        let mut session = StudySession::begin(&init(2));
        assert_eq!(
            session.record_vote(VoteSymbol::LeftWins),
            Err(SessionError::NoScenario)
        );
        assert!(session.pending_batch().is_none());
    }

    #[test]
    fn test_failed_submission_keeps_buffer() {
        let mut session = StudySession::begin(&init(2));
        session.apply_next(payload(3));
        session.record_vote(VoteSymbol::LeftWins).unwrap();
        session.record_vote(VoteSymbol::RightWins).unwrap();
        let first = session.pending_batch();

        session.submission_failed().unwrap();
        assert!(session.is_submitting());
        assert_eq!(session.pending_batch(), first);
    }

    #[test]
    fn test_success_keeps_position_and_clears_buffer() {
        let mut session = StudySession::begin(&init(2));
        session.apply_next(payload(0));
        session.record_vote(VoteSymbol::LeftWins).unwrap();
        session.record_vote(VoteSymbol::Tie).unwrap();

        assert_eq!(
            session.submission_succeeded(),
            Ok(SessionStep::NeedsScenario { position: 0 })
        );
        assert_eq!(session.submitted(), 1);
        assert!(session.votes().is_empty());
        assert!(session.current().is_none());
        assert_eq!(session.submission_succeeded(), Err(SessionError::NothingPending));
    }

    #[test]
    fn test_skip_advances_position() {
        let mut session = StudySession::begin(&init(3));
        let step = session.apply_next(NextScenarioResponse::skip(2));
        assert_eq!(step, SessionStep::NeedsScenario { position: 2 });
        assert_eq!(session.position(), 2);
        assert!(session.current().is_none());
    }

    #[test]
    fn test_complete_response() {
        let mut session = StudySession::begin(&init(1));
        assert_eq!(
            session.apply_next(NextScenarioResponse::complete()),
            SessionStep::Complete
        );
        assert!(session.is_complete());
    }

    #[test]
    fn test_progress_counts_criteria() {
        let mut session = StudySession::begin(&init(2));
        assert_eq!(session.progress_percent(), 0);

        session.apply_next(payload(0));
        session.record_vote(VoteSymbol::LeftWins).unwrap();
        assert_eq!(session.progress_percent(), 25);

        session.record_vote(VoteSymbol::LeftWins).unwrap();
        session.submission_succeeded().unwrap();
        assert_eq!(session.progress_percent(), 50);
    }
}
