//! # Judge Common Library
//!
//! Shared code for the human-judgement study service and its clients:
//! - Error type and configuration loading
//! - Criteria and scenario catalog loading
//! - Vote symbols and canonical model pairs
//! - HTTP API request/response types and credential helpers
//! - SQLite schema and judgement record queries

pub mod api;
pub mod catalog;
pub mod config;
pub mod criteria;
pub mod db;
pub mod error;
pub mod vote;

pub use catalog::{Scenario, ScenarioCatalog};
pub use config::StudyConfig;
pub use criteria::CriteriaSet;
pub use error::{Error, Result};
pub use vote::{normalize_pair, CanonicalPair, Tally, VoteSymbol};
