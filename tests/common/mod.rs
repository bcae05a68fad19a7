#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use flightsurety_oracle::error::LedgerError;
use flightsurety_oracle::ledger::FlightSuretyApp;
use flightsurety_oracle::models::{Address, OracleRequest, StatusCode, U256};

pub const ONE_ETHER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RegistrationFee,
    Register { from: Address, value: U256 },
    GetMyIndexes { from: Address, slot: u8 },
    Submit {
        from: Address,
        request: OracleRequest,
        status: StatusCode,
    },
}

/// In-memory FlightSuretyApp that records every call.
#[derive(Default)]
pub struct MockApp {
    pub accounts: Vec<Address>,
    pub fee: U256,
    pub fail_fee: bool,
    /// Zero-based registration attempt that is rejected.
    pub fail_registration_at: Option<usize>,
    pub indexes: HashMap<u8, Vec<u8>>,
    pub failing_index_slots: HashSet<u8>,
    pub reject_submissions: bool,
    calls: Mutex<Vec<Call>>,
}

impl MockApp {
    pub fn new(fee: U256) -> Self {
        Self {
            accounts: vec![account()],
            fee,
            ..Default::default()
        }
    }

    pub fn with_indexes(mut self, slot: u8, indexes: &[u8]) -> Self {
        self.indexes.insert(slot, indexes.to_vec());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn registrations(&self) -> Vec<(Address, U256)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Register { from, value } => Some((from, value)),
                _ => None,
            })
            .collect()
    }

    pub fn queried_slots(&self) -> Vec<u8> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::GetMyIndexes { slot, .. } => Some(slot),
                _ => None,
            })
            .collect()
    }

    pub fn submissions(&self) -> Vec<(Address, OracleRequest, StatusCode)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Submit {
                    from,
                    request,
                    status,
                } => Some((from, request, status)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl FlightSuretyApp for MockApp {
    async fn default_account(&self) -> Result<Address, LedgerError> {
        self.accounts.first().copied().ok_or(LedgerError::NoAccounts)
    }

    async fn registration_fee(&self) -> Result<U256, LedgerError> {
        self.record(Call::RegistrationFee);
        if self.fail_fee {
            return Err(LedgerError::InvalidResponse("eth_call: timeout".to_string()));
        }
        Ok(self.fee)
    }

    async fn register_oracle(&self, from: Address, fee: U256) -> Result<String, LedgerError> {
        let attempt = self.registrations().len();
        self.record(Call::Register { from, value: fee });
        if self.fail_registration_at == Some(attempt) {
            return Err(LedgerError::Rpc {
                code: -32000,
                message: "revert Registration fee is required".to_string(),
            });
        }
        Ok(format!("0xregister{attempt}"))
    }

    async fn get_my_indexes(&self, from: Address, slot: u8) -> Result<Vec<u8>, LedgerError> {
        self.record(Call::GetMyIndexes { from, slot });
        if self.failing_index_slots.contains(&slot) {
            return Err(LedgerError::Rpc {
                code: -32000,
                message: "revert Not registered as an oracle".to_string(),
            });
        }
        Ok(self.indexes.get(&slot).cloned().unwrap_or_default())
    }

    async fn submit_oracle_response(
        &self,
        from: Address,
        request: &OracleRequest,
        status: StatusCode,
    ) -> Result<String, LedgerError> {
        self.record(Call::Submit {
            from,
            request: request.clone(),
            status,
        });
        if self.reject_submissions {
            return Err(LedgerError::Reverted {
                tx_hash: "0xrejected".to_string(),
            });
        }
        Ok(format!("0xresponse{}", self.submissions().len()))
    }
}

pub fn account() -> Address {
    "0x627306090abab3a6e1400e9345bc60c78a8bef57".parse().unwrap()
}

pub fn request(index: u8) -> OracleRequest {
    OracleRequest {
        index,
        airline: "0xf17f52151ebef6c7334fad080c5704d77216b732".parse().unwrap(),
        flight: "ND1309".to_string(),
        timestamp: 1_700_000_000,
    }
}
