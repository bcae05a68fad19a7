use std::fmt;

pub use alloy_primitives::{Address, U256};
use rand::Rng;

/// Flight status reported by an oracle.
///
/// The numeric values are fixed by the FlightSuretyApp contract; nothing
/// here interprets them beyond picking one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl StatusCode {
    pub const ALL: [StatusCode; 6] = [
        StatusCode::Unknown,
        StatusCode::OnTime,
        StatusCode::LateAirline,
        StatusCode::LateWeather,
        StatusCode::LateTechnical,
        StatusCode::LateOther,
    ];

    pub fn code(self) -> u8 {
        match self {
            StatusCode::Unknown => 0,
            StatusCode::OnTime => 10,
            StatusCode::LateAirline => 20,
            StatusCode::LateWeather => 30,
            StatusCode::LateTechnical => 40,
            StatusCode::LateOther => 50,
        }
    }

    /// Picks a status uniformly from [`StatusCode::ALL`].
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let pos = rng.gen_range(0..=Self::ALL.len() - 1);
        Self::ALL[pos]
    }
}

impl From<StatusCode> for u8 {
    fn from(status: StatusCode) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == value)
            .ok_or_else(|| format!("unknown flight status code {value}"))
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An `OracleRequest` emitted by the FlightSuretyApp contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub index: u8,
    pub airline: Address,
    pub flight: String,
    pub timestamp: u64,
}

/// Where an [`OracleRequest`] was found on chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogMeta {
    pub block_number: u64,
    pub tx_hash: Option<String>,
}

/// A response the oracle sent back for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleSubmission {
    pub slot: u8,
    pub status: StatusCode,
    pub tx_hash: String,
}
