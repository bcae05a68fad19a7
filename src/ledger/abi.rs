//! Ethereum ABI encoding for the FlightSuretyApp calls the oracle makes.
//!
//! Only the handful of shapes the oracle needs are supported: static
//! unsigned integers, addresses, a single trailing `string`, and index
//! arrays of `uint8`.

use alloy_primitives::{hex, keccak256, B256};

use crate::error::AbiError;
use crate::models::{Address, OracleRequest, StatusCode, U256};

const WORD: usize = 32;

pub const REGISTRATION_FEE_SIG: &str = "REGISTRATION_FEE()";
pub const REGISTER_ORACLE_SIG: &str = "registerOracle()";
pub const GET_MY_INDEXES_SIG: &str = "getMyIndexes(uint256)";
pub const SUBMIT_ORACLE_RESPONSE_SIG: &str =
    "submitOracleResponse(uint8,address,string,uint256,uint8)";
pub const ORACLE_REQUEST_EVENT_SIG: &str = "OracleRequest(uint8,address,string,uint256)";

/// First four bytes of the keccak hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn event_topic(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

pub fn registration_fee_call() -> Vec<u8> {
    selector(REGISTRATION_FEE_SIG).to_vec()
}

pub fn register_oracle_call() -> Vec<u8> {
    selector(REGISTER_ORACLE_SIG).to_vec()
}

pub fn get_my_indexes_call(slot: u8) -> Vec<u8> {
    let mut out = selector(GET_MY_INDEXES_SIG).to_vec();
    out.extend_from_slice(&uint_word(slot as u128));
    out
}

pub fn submit_oracle_response_call(request: &OracleRequest, status: StatusCode) -> Vec<u8> {
    let flight = request.flight.as_bytes();
    let mut out = selector(SUBMIT_ORACLE_RESPONSE_SIG).to_vec();

    // head: five words, the string is referenced by offset
    out.extend_from_slice(&uint_word(request.index as u128));
    out.extend_from_slice(&address_word(&request.airline));
    out.extend_from_slice(&uint_word((5 * WORD) as u128));
    out.extend_from_slice(&uint_word(request.timestamp as u128));
    out.extend_from_slice(&uint_word(status.code() as u128));

    // tail
    out.extend_from_slice(&uint_word(flight.len() as u128));
    out.extend_from_slice(flight);
    out.resize(out.len() + padding(flight.len()), 0);
    out
}

/// Decodes a single `uint256` return value.
pub fn decode_u256(data: &[u8]) -> Result<U256, AbiError> {
    let word = word_at(data, 0)?;
    U256::try_from_be_slice(word).ok_or(AbiError::Overflow("uint256"))
}

/// Decodes the index set returned by `getMyIndexes`.
///
/// Accepts both a static `uint8[N]` (N consecutive words) and a dynamic
/// `uint8[]` (offset, length, items). A static array can never start with
/// the value 32 because oracle indexes are single digits, so a leading 32
/// always means the dynamic form and its items must all be present.
pub fn decode_index_set(data: &[u8]) -> Result<Vec<u8>, AbiError> {
    if data.len() >= 2 * WORD && word_to_u128(word_at(data, 0)?)? == WORD as u128 {
        let len = word_to_usize(word_at(data, WORD)?)?;
        let needed = len
            .checked_mul(WORD)
            .and_then(|items| items.checked_add(2 * WORD))
            .ok_or(AbiError::Overflow("usize"))?;
        if data.len() < needed {
            return Err(AbiError::ShortData {
                needed,
                actual: data.len(),
            });
        }
        return (0..len)
            .map(|i| word_to_u8(word_at(data, 2 * WORD + i * WORD)?))
            .collect();
    }

    (0..data.len() / WORD)
        .map(|i| word_to_u8(word_at(data, i * WORD)?))
        .collect()
}

/// Decodes the non-indexed data of an `OracleRequest` log.
pub fn decode_oracle_request(data: &[u8]) -> Result<OracleRequest, AbiError> {
    let index = word_to_u8(word_at(data, 0)?)?;
    let airline = word_to_address(word_at(data, WORD)?)?;
    let offset = word_to_usize(word_at(data, 2 * WORD)?)?;
    let timestamp = word_to_u64(word_at(data, 3 * WORD)?)?;

    let len = word_to_usize(word_at(data, offset)?)?;
    let start = offset + WORD;
    let end = start
        .checked_add(len)
        .ok_or(AbiError::Overflow("usize"))?;
    if data.len() < end {
        return Err(AbiError::ShortData {
            needed: end,
            actual: data.len(),
        });
    }
    let flight = String::from_utf8(data[start..end].to_vec()).map_err(|_| AbiError::InvalidUtf8)?;

    Ok(OracleRequest {
        index,
        airline,
        flight,
        timestamp,
    })
}

pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn decode_hex(value: &str) -> Result<Vec<u8>, AbiError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(digits).map_err(|_| AbiError::InvalidHex(value.to_string()))
}

fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_slice());
    word
}

fn padding(len: usize) -> usize {
    (WORD - len % WORD) % WORD
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    let end = offset.checked_add(WORD).ok_or(AbiError::Overflow("usize"))?;
    data.get(offset..end).ok_or(AbiError::ShortData {
        needed: end,
        actual: data.len(),
    })
}

fn word_to_u128(word: &[u8]) -> Result<u128, AbiError> {
    if word[..16].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow("u128"));
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(buf))
}

fn word_to_u64(word: &[u8]) -> Result<u64, AbiError> {
    u64::try_from(word_to_u128(word)?).map_err(|_| AbiError::Overflow("u64"))
}

fn word_to_usize(word: &[u8]) -> Result<usize, AbiError> {
    usize::try_from(word_to_u128(word)?).map_err(|_| AbiError::Overflow("usize"))
}

fn word_to_u8(word: &[u8]) -> Result<u8, AbiError> {
    u8::try_from(word_to_u128(word)?).map_err(|_| AbiError::Overflow("u8"))
}

fn word_to_address(word: &[u8]) -> Result<Address, AbiError> {
    if word[..12].iter().any(|b| *b != 0) {
        return Err(AbiError::InvalidAddress(encode_hex(word)));
    }
    Ok(Address::from_slice(&word[12..]))
}
