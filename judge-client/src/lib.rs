//! judge-client library - rater session for the human-judgement study
//!
//! Drives the study endpoints one scenario at a time and one criterion at a
//! time, submitting only complete vote batches.

pub mod driver;
pub mod http;
pub mod session;

pub use driver::{run_session, RaterInput, SessionSummary, StudyApi, VoteSource};
pub use http::{ClientError, StudyClient};
pub use session::{SessionError, SessionStep, StudySession, VoteOutcome};
