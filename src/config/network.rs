use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_NETWORK: &str = "localhost";
pub const DEFAULT_LOCAL_URL: &str = "http://127.0.0.1:9545";

/// One entry of the network profile file.
///
/// The file is keyed by network name, e.g.
/// `{ "localhost": { "url": "...", "appAddress": "0x...", "dataAddress": "0x..." } }`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    pub url: String,
    #[serde(default)]
    pub app_address: Option<String>,
    #[serde(default)]
    pub data_address: Option<String>,
}

pub type NetworkProfiles = HashMap<String, NetworkProfile>;

/// Profiles used when no profile file exists.
pub fn builtin_profiles() -> NetworkProfiles {
    let mut profiles = HashMap::new();
    profiles.insert(
        DEFAULT_NETWORK.to_string(),
        NetworkProfile {
            url: DEFAULT_LOCAL_URL.to_string(),
            app_address: None,
            data_address: None,
        },
    );
    profiles
}

pub fn parse_profiles(path: &str, content: &str) -> Result<NetworkProfiles, ConfigError> {
    serde_json::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

/// Reads the profile file, falling back to [`builtin_profiles`] when it
/// does not exist.
pub fn read_profiles(path: &str) -> Result<NetworkProfiles, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(builtin_profiles());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_profiles(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_truffle_style_profile_file() {
        let content = r#"{
            "localhost": {
                "url": "http://localhost:8545",
                "dataAddress": "0x345cA3e014Aaf5dcA488057592ee47305D9B3e10",
                "appAddress": "0xf25186B5081Ff5cE73482AD761DB0eB0d25abfBF"
            }
        }"#;

        let profiles = parse_profiles("config.json", content).unwrap();
        let localhost = &profiles["localhost"];
        assert_eq!(localhost.url, "http://localhost:8545");
        assert_eq!(
            localhost.app_address.as_deref(),
            Some("0xf25186B5081Ff5cE73482AD761DB0eB0d25abfBF")
        );
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        assert!(matches!(
            parse_profiles("config.json", "{ not json"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_uses_builtin_localhost() {
        let profiles = read_profiles("/nonexistent/flightsurety/config.json").unwrap();
        assert_eq!(profiles[DEFAULT_NETWORK].url, DEFAULT_LOCAL_URL);
    }
}
