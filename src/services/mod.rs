//! Business logic services for the oracle server

pub mod oracle_service;

pub use oracle_service::{
    FailureAction, FailureHandler, FailurePolicy, FailureStage, OracleService,
    RegistrationSummary, RequestReport, RunStats, SlotFailure,
};
