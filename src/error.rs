//! Error types for the oracle server

use thiserror::Error;

/// Errors raised while talking to the ledger node or the FlightSuretyApp contract
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    #[error("ledger node reported no accounts")]
    NoAccounts,

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("no receipt for transaction {tx_hash} after {attempts} attempts")]
    ReceiptTimeout { tx_hash: String, attempts: u32 },
}

/// Errors raised while encoding or decoding contract ABI data
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("invalid hex data: {0}")]
    InvalidHex(String),

    #[error("data too short: need {needed} bytes, have {actual}")]
    ShortData { needed: usize, actual: usize },

    #[error("value does not fit in {0}")]
    Overflow(&'static str),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unexpected event topic {0}")]
    UnexpectedTopic(String),
}

/// Errors raised while loading process configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("network profile '{0}' not found")]
    UnknownNetwork(String),

    #[error("no FlightSuretyApp address configured for network '{0}'")]
    MissingAppAddress(String),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
