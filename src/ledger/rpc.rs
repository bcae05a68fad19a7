//! JSON-RPC client for an Ethereum-compatible ledger node

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::{sleep, Duration};
use tracing::debug;

use super::abi;
use super::FlightSuretyApp;
use crate::error::LedgerError;
use crate::models::{Address, OracleRequest, StatusCode, U256};

/// Thin JSON-RPC 2.0 client over HTTP.
#[derive(Clone)]
pub struct RpcClient {
    url: String,
    http: Client,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let response = self
            .http
            .post(&self.url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        parse_response(method, response)
    }
}

fn parse_response<T: DeserializeOwned>(method: &str, response: Value) -> Result<T, LedgerError> {
    if let Some(err) = response.get("error") {
        return Err(LedgerError::Rpc {
            code: err.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    let result = response
        .get("result")
        .cloned()
        .ok_or_else(|| LedgerError::InvalidResponse(format!("{method}: missing result")))?;

    serde_json::from_value(result)
        .map_err(|err| LedgerError::InvalidResponse(format!("{method}: {err}")))
}

/// Parses a hex-encoded JSON-RPC quantity such as `"0x1b4"`.
pub fn parse_quantity(value: &str) -> Result<u64, LedgerError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(digits, 16)
        .map_err(|_| LedgerError::InvalidResponse(format!("invalid quantity {value}")))
}

pub fn quantity(value: U256) -> String {
    format!("{value:#x}")
}

/// Gas ceilings for the two transactions the oracle sends.
#[derive(Debug, Clone, Copy)]
pub struct GasLimits {
    pub register: u64,
    pub response: u64,
}

#[derive(Debug, Deserialize)]
struct TransactionReceipt {
    status: Option<String>,
}

const RECEIPT_POLL_INTERVAL_MS: u64 = 250;
const RECEIPT_MAX_ATTEMPTS: u32 = 240;

/// [`FlightSuretyApp`] backed by a node that signs for its own accounts
/// (`eth_sendTransaction`), such as a local development chain.
pub struct RpcFlightSuretyApp {
    rpc: RpcClient,
    contract: Address,
    gas: GasLimits,
    receipt_poll_interval: Duration,
    receipt_max_attempts: u32,
}

impl RpcFlightSuretyApp {
    pub fn new(rpc: RpcClient, contract: Address, gas: GasLimits) -> Self {
        Self {
            rpc,
            contract,
            gas,
            receipt_poll_interval: Duration::from_millis(RECEIPT_POLL_INTERVAL_MS),
            receipt_max_attempts: RECEIPT_MAX_ATTEMPTS,
        }
    }

    /// Overrides how often, and how many times, a transaction receipt is
    /// polled before giving up with [`LedgerError::ReceiptTimeout`].
    pub fn with_receipt_polling(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.receipt_poll_interval = interval;
        self.receipt_max_attempts = max_attempts;
        self
    }

    async fn eth_call(&self, from: Option<Address>, data: Vec<u8>) -> Result<Vec<u8>, LedgerError> {
        let mut tx = json!({
            "to": self.contract.to_string(),
            "data": abi::encode_hex(&data),
        });
        if let Some(from) = from {
            tx["from"] = json!(from.to_string());
        }

        let raw: String = self.rpc.call("eth_call", json!([tx, "latest"])).await?;
        Ok(abi::decode_hex(&raw)?)
    }

    async fn send_transaction(
        &self,
        from: Address,
        data: Vec<u8>,
        value: U256,
        gas: u64,
    ) -> Result<String, LedgerError> {
        let tx = json!({
            "from": from.to_string(),
            "to": self.contract.to_string(),
            "data": abi::encode_hex(&data),
            "value": quantity(value),
            "gas": quantity(U256::from(gas)),
        });

        let tx_hash: String = self.rpc.call("eth_sendTransaction", json!([tx])).await?;
        debug!(tx_hash = %tx_hash, "transaction sent, awaiting receipt");
        self.wait_for_receipt(tx_hash).await
    }

    async fn wait_for_receipt(&self, tx_hash: String) -> Result<String, LedgerError> {
        for _ in 0..self.receipt_max_attempts {
            let receipt: Option<TransactionReceipt> = self
                .rpc
                .call("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;

            if let Some(receipt) = receipt {
                // pre-Byzantium receipts carry no status
                let reverted = match receipt.status.as_deref() {
                    Some(status) => parse_quantity(status)? == 0,
                    None => false,
                };
                if reverted {
                    return Err(LedgerError::Reverted { tx_hash });
                }
                return Ok(tx_hash);
            }

            sleep(self.receipt_poll_interval).await;
        }

        Err(LedgerError::ReceiptTimeout {
            tx_hash,
            attempts: self.receipt_max_attempts,
        })
    }
}

#[async_trait]
impl FlightSuretyApp for RpcFlightSuretyApp {
    async fn default_account(&self) -> Result<Address, LedgerError> {
        let accounts: Vec<Address> = self.rpc.call("eth_accounts", json!([])).await?;
        accounts.into_iter().next().ok_or(LedgerError::NoAccounts)
    }

    async fn registration_fee(&self) -> Result<U256, LedgerError> {
        let data = self.eth_call(None, abi::registration_fee_call()).await?;
        Ok(abi::decode_u256(&data)?)
    }

    async fn register_oracle(&self, from: Address, fee: U256) -> Result<String, LedgerError> {
        self.send_transaction(from, abi::register_oracle_call(), fee, self.gas.register)
            .await
    }

    async fn get_my_indexes(&self, from: Address, slot: u8) -> Result<Vec<u8>, LedgerError> {
        let data = self
            .eth_call(Some(from), abi::get_my_indexes_call(slot))
            .await?;
        Ok(abi::decode_index_set(&data)?)
    }

    async fn submit_oracle_response(
        &self,
        from: Address,
        request: &OracleRequest,
        status: StatusCode,
    ) -> Result<String, LedgerError> {
        self.send_transaction(
            from,
            abi::submit_oracle_response_call(request, status),
            U256::ZERO,
            self.gas.response,
        )
        .await
    }
}
