//! Oracle registration and request responder

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::LedgerError;
use crate::ledger::{FlightSuretyApp, OracleRequestDelivery};
use crate::models::{Address, OracleRequest, OracleSubmission, StatusCode, U256};

/// Outcome of the startup registration phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSummary {
    pub account: Address,
    pub fee: U256,
    pub registered: u8,
}

/// The remote call that failed for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    IndexQuery,
    Submission,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::IndexQuery => f.write_str("getMyIndexes"),
            FailureStage::Submission => f.write_str("submitOracleResponse"),
        }
    }
}

#[derive(Debug)]
pub struct SlotFailure {
    pub slot: u8,
    pub stage: FailureStage,
    pub error: LedgerError,
}

/// What to do with the remaining slots of a request after a slot fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    Continue,
    Abort,
}

/// Decides how the responder reacts to a failed slot.
pub trait FailureHandler: Send + Sync {
    fn on_failure(&self, request: &OracleRequest, failure: &SlotFailure) -> FailureAction;
}

/// Stock [`FailureHandler`]: logs the failure and applies a fixed action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    #[default]
    Continue,
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(FailurePolicy::Continue),
            "abort" => Ok(FailurePolicy::Abort),
            other => Err(format!("unknown failure policy '{other}'")),
        }
    }
}

impl FailureHandler for FailurePolicy {
    fn on_failure(&self, request: &OracleRequest, failure: &SlotFailure) -> FailureAction {
        warn!(
            slot = failure.slot,
            stage = %failure.stage,
            index = request.index,
            flight = %request.flight,
            error = %failure.error,
            policy = ?self,
            "oracle slot failed"
        );

        match self {
            FailurePolicy::Continue => FailureAction::Continue,
            FailurePolicy::Abort => FailureAction::Abort,
        }
    }
}

/// What happened while answering one request.
#[derive(Debug, Default)]
pub struct RequestReport {
    pub submissions: Vec<OracleSubmission>,
    pub failures: Vec<SlotFailure>,
    pub aborted: bool,
}

/// Totals for a responder run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub requests: u64,
    pub delivery_errors: u64,
    pub submissions: u64,
    pub slot_failures: u64,
}

pub struct OracleService<H = FailurePolicy> {
    app: Arc<dyn FlightSuretyApp>,
    account: Address,
    oracle_count: u8,
    failure_handler: H,
}

impl<H: FailureHandler> OracleService<H> {
    pub fn new(
        app: Arc<dyn FlightSuretyApp>,
        account: Address,
        oracle_count: u8,
        failure_handler: H,
    ) -> Self {
        Self {
            app,
            account,
            oracle_count,
            failure_handler,
        }
    }

    /// Builds a service acting as the ledger node's default account.
    pub async fn connect(
        app: Arc<dyn FlightSuretyApp>,
        oracle_count: u8,
        failure_handler: H,
    ) -> Result<Self, LedgerError> {
        let account = app.default_account().await?;
        info!(account = %account, "using default account");
        Ok(Self::new(app, account, oracle_count, failure_handler))
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn oracle_count(&self) -> u8 {
        self.oracle_count
    }

    /// Reads the registration fee once and registers every oracle slot
    /// with it, one transaction at a time. The first failure is returned.
    pub async fn register_oracles(&self) -> Result<RegistrationSummary, LedgerError> {
        let fee = self.app.registration_fee().await?;
        info!(fee = %fee, oracles = self.oracle_count, "registering oracles");

        for slot in 0..self.oracle_count {
            let tx_hash = self.app.register_oracle(self.account, fee).await?;
            debug!(slot, tx_hash = %tx_hash, "oracle registered");
        }

        info!(
            account = %self.account,
            registered = self.oracle_count,
            "oracle registration complete"
        );

        Ok(RegistrationSummary {
            account: self.account,
            fee,
            registered: self.oracle_count,
        })
    }

    /// Answers a request from every slot whose index set contains the
    /// request index. Slots are processed sequentially.
    pub async fn handle_request(&self, request: &OracleRequest) -> RequestReport {
        let mut report = RequestReport::default();

        for slot in 0..self.oracle_count {
            match self.respond_from_slot(slot, request).await {
                Ok(Some(submission)) => report.submissions.push(submission),
                Ok(None) => {}
                Err(failure) => {
                    let action = self.failure_handler.on_failure(request, &failure);
                    report.failures.push(failure);
                    if action == FailureAction::Abort {
                        report.aborted = true;
                        break;
                    }
                }
            }
        }

        report
    }

    async fn respond_from_slot(
        &self,
        slot: u8,
        request: &OracleRequest,
    ) -> Result<Option<OracleSubmission>, SlotFailure> {
        let indexes = self
            .app
            .get_my_indexes(self.account, slot)
            .await
            .map_err(|error| SlotFailure {
                slot,
                stage: FailureStage::IndexQuery,
                error,
            })?;

        if !indexes.contains(&request.index) {
            return Ok(None);
        }

        let status = StatusCode::random(&mut rand::thread_rng());
        let tx_hash = self
            .app
            .submit_oracle_response(self.account, request, status)
            .await
            .map_err(|error| SlotFailure {
                slot,
                stage: FailureStage::Submission,
                error,
            })?;

        info!(
            slot,
            index = request.index,
            airline = %request.airline,
            flight = %request.flight,
            timestamp = request.timestamp,
            status = status.code(),
            tx_hash = %tx_hash,
            "oracle response submitted"
        );

        Ok(Some(OracleSubmission {
            slot,
            status,
            tx_hash,
        }))
    }

    /// Consumes deliveries until the channel closes.
    pub async fn run(&self, mut deliveries: mpsc::Receiver<OracleRequestDelivery>) -> RunStats {
        let mut stats = RunStats::default();
        info!(oracles = self.oracle_count, "oracle responder started");

        while let Some(delivery) = deliveries.recv().await {
            let request = match delivery {
                Ok(request) => request,
                Err(err) => {
                    error!(error = %err, "OracleRequest delivery failed");
                    stats.delivery_errors += 1;
                    continue;
                }
            };

            let report = self.handle_request(&request).await;
            stats.requests += 1;
            stats.submissions += report.submissions.len() as u64;
            stats.slot_failures += report.failures.len() as u64;
        }

        info!(?stats, "oracle responder stopped");
        stats
    }
}
