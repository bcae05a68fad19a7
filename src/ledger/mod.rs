//! Access to the FlightSuretyApp contract on the ledger node

pub mod abi;
pub mod events;
pub mod rpc;

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::models::{Address, OracleRequest, StatusCode, U256};

pub use events::{OracleRequestDelivery, OracleRequestPoller};
pub use rpc::{GasLimits, RpcClient, RpcFlightSuretyApp};

/// The contract methods the oracle server relies on.
///
/// Transaction methods resolve to the transaction hash once the ledger has
/// accepted and mined the call.
#[async_trait]
pub trait FlightSuretyApp: Send + Sync {
    /// First account managed by the connected node.
    async fn default_account(&self) -> Result<Address, LedgerError>;

    /// `REGISTRATION_FEE()`, in wei.
    async fn registration_fee(&self) -> Result<U256, LedgerError>;

    async fn register_oracle(&self, from: Address, fee: U256) -> Result<String, LedgerError>;

    async fn get_my_indexes(&self, from: Address, slot: u8) -> Result<Vec<u8>, LedgerError>;

    async fn submit_oracle_response(
        &self,
        from: Address,
        request: &OracleRequest,
        status: StatusCode,
    ) -> Result<String, LedgerError>;
}
