//! Database schema and queries

pub mod init;
pub mod judgements;
pub mod users;

pub use init::*;
pub use judgements::*;
pub use users::*;
