//! `OracleRequest` event feed.
//!
//! Polls `eth_getLogs` behind a block cursor and forwards every decoded
//! request, in log order, into a channel consumed by the responder.

use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use super::abi;
use super::rpc::{parse_quantity, quantity, RpcClient};
use crate::error::{AbiError, LedgerError};
use crate::models::{Address, LogMeta, OracleRequest, U256};

/// One delivery from the event feed.
pub type OracleRequestDelivery = Result<OracleRequest, LedgerError>;

/// Largest block range requested in one `eth_getLogs` call.
const MAX_BLOCK_RANGE: u64 = 200;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    #[serde(default)]
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: Option<String>,
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub removed: bool,
}

pub struct OracleRequestPoller {
    rpc: RpcClient,
    contract: Address,
    next_block: u64,
    interval: Duration,
    topic: String,
}

impl OracleRequestPoller {
    pub fn new(rpc: RpcClient, contract: Address, from_block: u64, interval: Duration) -> Self {
        Self {
            rpc,
            contract,
            next_block: from_block,
            interval,
            topic: abi::encode_hex(abi::event_topic(abi::ORACLE_REQUEST_EVENT_SIG).as_slice()),
        }
    }

    /// Runs until the receiving side of `tx` is dropped.
    ///
    /// While behind the chain head, ranges are fetched back to back. The
    /// poller waits one interval once it has caught up, and after an RPC
    /// failure, which is delivered as an error before the same block range
    /// is retried.
    pub async fn run(mut self, tx: mpsc::Sender<OracleRequestDelivery>) {
        info!(
            contract = %self.contract,
            from_block = self.next_block,
            "OracleRequest poller started"
        );

        while !tx.is_closed() {
            match self.poll_once(&tx).await {
                Ok(false) => continue,
                Ok(true) => {}
                Err(err) => {
                    if tx.send(Err(err)).await.is_err() {
                        break;
                    }
                }
            }

            sleep(self.interval).await;
        }

        info!("OracleRequest poller stopped");
    }

    /// Fetches and delivers one block range. Returns `true` once the cursor
    /// has reached the chain head.
    async fn poll_once(
        &mut self,
        tx: &mpsc::Sender<OracleRequestDelivery>,
    ) -> Result<bool, LedgerError> {
        let latest: String = self.rpc.call("eth_blockNumber", json!([])).await?;
        let latest = parse_quantity(&latest)?;
        if self.next_block > latest {
            return Ok(true);
        }

        let to_block = latest.min(self.next_block + MAX_BLOCK_RANGE - 1);
        let logs: Vec<RawLog> = self
            .rpc
            .call(
                "eth_getLogs",
                json!([{
                    "address": self.contract.to_string(),
                    "topics": [self.topic],
                    "fromBlock": quantity(U256::from(self.next_block)),
                    "toBlock": quantity(U256::from(to_block)),
                }]),
            )
            .await?;

        let mut delivered = 0usize;
        for log in logs.iter().filter(|log| !log.removed) {
            let delivery = decode_log(log, &self.topic)
                .map(|(request, meta)| {
                    debug!(
                        block = meta.block_number,
                        tx_hash = meta.tx_hash.as_deref().unwrap_or("unknown"),
                        index = request.index,
                        flight = %request.flight,
                        "OracleRequest received"
                    );
                    request
                })
                .map_err(LedgerError::from);

            if tx.send(delivery).await.is_err() {
                return Ok(true);
            }
            delivered += 1;
        }

        debug!(
            from_block = self.next_block,
            to_block,
            delivered,
            "OracleRequest poll cycle complete"
        );
        self.next_block = to_block + 1;
        Ok(to_block == latest)
    }
}

/// Decodes a raw log into the request it carries.
pub fn decode_log(log: &RawLog, expected_topic: &str) -> Result<(OracleRequest, LogMeta), AbiError> {
    let topic = log.topics.first().map(String::as_str).unwrap_or_default();
    if !topic.eq_ignore_ascii_case(expected_topic) {
        return Err(AbiError::UnexpectedTopic(topic.to_string()));
    }

    let data = abi::decode_hex(&log.data)?;
    let request = abi::decode_oracle_request(&data)?;
    let meta = LogMeta {
        block_number: log
            .block_number
            .as_deref()
            .and_then(|n| parse_quantity(n).ok())
            .unwrap_or(0),
        tx_hash: log.transaction_hash.clone(),
    };

    Ok((request, meta))
}
