//! Data models for the oracle server

pub mod oracle;

use serde::Serialize;

pub use oracle::{Address, LogMeta, OracleRequest, OracleSubmission, StatusCode, U256};

/// Body returned by the status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiMessage {
    pub message: String,
}
