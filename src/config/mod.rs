//! Process configuration

pub mod network;

use std::str::FromStr;

use validator::Validate;

use crate::error::ConfigError;
use crate::models::Address;
use crate::services::FailurePolicy;

pub use network::{NetworkProfile, NetworkProfiles};

const DEFAULT_CONFIG_FILE: &str = "config.json";
const DEFAULT_ORACLE_COUNT: u8 = 25;
const DEFAULT_REGISTER_GAS: u64 = 3_000_000;
const DEFAULT_RESPONSE_GAS: u64 = 5_000_000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug, Validate)]
pub struct OracleConfig {
    pub network: String,
    #[validate(url)]
    pub rpc_url: String,
    pub app_address: Address,
    #[validate(range(min = 1))]
    pub oracle_count: u8,
    #[validate(range(min = 21000))]
    pub register_gas: u64,
    #[validate(range(min = 21000))]
    pub response_gas: u64,
    pub from_block: u64,
    #[validate(range(min = 1))]
    pub poll_interval_ms: u64,
    pub failure_policy: FailurePolicy,
    pub port: u16,
}

impl OracleConfig {
    /// Loads the network profile file and applies the `ORACLE_*` overrides
    /// from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("ORACLE_CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let profiles = network::read_profiles(&path)?;
        Self::resolve(&profiles, |key| std::env::var(key).ok())
    }

    /// Selects a profile and applies overrides read through `env`.
    pub fn resolve<F>(profiles: &NetworkProfiles, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network = env("ORACLE_NETWORK").unwrap_or_else(|| network::DEFAULT_NETWORK.to_string());
        let profile = profiles
            .get(&network)
            .ok_or_else(|| ConfigError::UnknownNetwork(network.clone()))?;

        let rpc_url = env("ORACLE_RPC_URL").unwrap_or_else(|| profile.url.clone());
        let app_address = env("ORACLE_APP_ADDRESS")
            .or_else(|| profile.app_address.clone())
            .filter(|address| !address.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingAppAddress(network.clone()))?;
        let app_address = app_address
            .trim()
            .parse::<Address>()
            .map_err(|_| ConfigError::InvalidAddress(app_address.clone()))?;

        let config = Self {
            rpc_url,
            app_address,
            oracle_count: parse_var(&env, "ORACLE_COUNT", DEFAULT_ORACLE_COUNT)?,
            register_gas: parse_var(&env, "ORACLE_REGISTER_GAS", DEFAULT_REGISTER_GAS)?,
            response_gas: parse_var(&env, "ORACLE_RESPONSE_GAS", DEFAULT_RESPONSE_GAS)?,
            from_block: parse_var(&env, "ORACLE_FROM_BLOCK", 0)?,
            poll_interval_ms: parse_var(&env, "ORACLE_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?,
            failure_policy: parse_var(&env, "ORACLE_FAILURE_POLICY", FailurePolicy::Continue)?,
            port: parse_var(&env, "PORT", DEFAULT_PORT)?,
            network,
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<F, T>(env: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match env(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
