//! FlightSurety Oracle Server Library
//!
//! Simulated flight-status oracles for the FlightSuretyApp contract, plus
//! the small HTTP API served next to them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod routes;
pub mod services;
