//! # Node Configuration
//!
//! Unified configuration for all subsystems, loaded from a TOML file.
//!
//! ## Layout
//!
//! ```toml
//! payout_address = "0x…"
//!
//! [destination]
//! lotus_api = "https://api.calibration.node.glif.io/rpc/v1"
//! prover_address = "0x…"
//! provider_address = "t01000"
//!
//! [sources.calibration]
//! api = "https://…"
//! on_ramp_address = "0x…"
//! chain_id = 314159
//! ```
//!
//! `[aggregation]`, `[deal]`, `[transfer]`, `[upload]` and `[watcher]` take
//! the subsystem configs directly and may be omitted.
//!
//! ## Secrets
//!
//! Never read from the file. `XC_SIGNER_KEY` is required, `XC_LIGHTHOUSE_API_KEY`
//! is required while uploads are enabled, `XC_LOTUS_TOKEN` is optional.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shared_types::{EthAddress, H160};
use thiserror::Error;
use xc_02_event_watcher::WatcherConfig;
use xc_03_aggregation::{AggregationConfig, UploadConfig};
use xc_04_deal_negotiation::DealConfig;
use xc_05_transfer_server::TransferConfig;

/// Environment variable holding the hex commit-signing key.
pub const SIGNER_KEY_ENV: &str = "XC_SIGNER_KEY";
/// Environment variable holding the Lighthouse API key.
pub const LIGHTHOUSE_KEY_ENV: &str = "XC_LIGHTHOUSE_API_KEY";
/// Environment variable holding an optional Lotus bearer token.
pub const LOTUS_TOKEN_ENV: &str = "XC_LOTUS_TOKEN";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config {path}: {error}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying error
        error: std::io::Error,
    },

    /// File is not valid TOML for [`NodeConfig`].
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A value is out of range or malformed.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// Address field does not hold a 20-byte hex address.
    #[error("{field}: invalid address {value:?}")]
    InvalidAddress {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// `--chain` names no `[sources.<name>]` section.
    #[error("unknown source chain {0:?}")]
    UnknownChain(String),

    /// Required secret missing from the environment.
    #[error("environment variable {0} is not set")]
    MissingSecret(&'static str),
}

/// Destination (storage) chain settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    /// Lotus JSON-RPC endpoint
    pub lotus_api: String,
    /// EVM address deals are made on behalf of
    pub prover_address: String,
    /// Storage provider actor, `f0…`
    pub provider_address: String,
}

/// One source chain the bridge can watch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// EVM JSON-RPC endpoint
    pub api: String,
    /// On-ramp contract address
    pub on_ramp_address: String,
    /// EIP-155 chain id, also used as the deal label
    pub chain_id: u64,
}

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Address paid out by `commitAggregate`
    pub payout_address: String,
    /// Destination chain
    pub destination: DestinationConfig,
    /// Source chains by name
    pub sources: BTreeMap<String, SourceConfig>,
    /// Aggregation thresholds
    pub aggregation: AggregationConfig,
    /// Deal terms; the provider comes from `[destination]`
    pub deal: DealConfig,
    /// Transfer server
    pub transfer: TransferConfig,
    /// Remote upload
    pub upload: UploadConfig,
    /// Event watcher
    pub watcher: WatcherConfig,
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.display().to_string(),
            error,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Source chain named `chain`.
    pub fn source(&self, chain: &str) -> Result<&SourceConfig, ConfigError> {
        self.sources
            .get(chain)
            .ok_or_else(|| ConfigError::UnknownChain(chain.to_string()))
    }

    /// Payout address.
    pub fn payout(&self) -> Result<EthAddress, ConfigError> {
        parse_address("payout_address", &self.payout_address)
    }

    /// Prover address, the deal client.
    pub fn prover(&self) -> Result<EthAddress, ConfigError> {
        parse_address("destination.prover_address", &self.destination.prover_address)
    }

    /// Deal configuration with the provider taken from `[destination]`.
    pub fn deal_config(&self) -> DealConfig {
        DealConfig {
            provider_address: self.destination.provider_address.clone(),
            ..self.deal.clone()
        }
    }

    /// Validate everything needed to run against `chain`.
    pub fn validate(&self, chain: &str) -> Result<(), ConfigError> {
        let invalid = |e: &dyn std::fmt::Display| ConfigError::Invalid(e.to_string());

        self.aggregation.validate().map_err(|e| invalid(&e))?;
        self.upload.validate().map_err(|e| invalid(&e))?;
        self.transfer.validate().map_err(|e| invalid(&e))?;
        self.watcher.validate().map_err(|e| invalid(&e))?;
        self.deal_config().validate().map_err(|e| invalid(&e))?;

        self.payout()?;
        self.prover()?;
        if self.destination.lotus_api.is_empty() {
            return Err(ConfigError::Invalid("destination.lotus_api must be set".into()));
        }

        let source = self.source(chain)?;
        if source.api.is_empty() {
            return Err(ConfigError::Invalid(format!("sources.{}.api must be set", chain)));
        }
        parse_address("on_ramp_address", &source.on_ramp_address)?;
        Ok(())
    }
}

/// Parse a `0x`-prefixed (or bare) 20-byte hex address.
pub fn parse_address(field: &'static str, value: &str) -> Result<EthAddress, ConfigError> {
    let invalid = || ConfigError::InvalidAddress {
        field,
        value: value.to_string(),
    };
    let bytes = hex::decode(value.trim_start_matches("0x")).map_err(|_| invalid())?;
    if bytes.len() != 20 {
        return Err(invalid());
    }
    Ok(H160::from_slice(&bytes))
}

/// Secrets read from the environment.
#[derive(Clone, Default)]
pub struct Secrets {
    /// Hex secp256k1 key signing commit transactions
    pub signer_key: String,
    /// Lighthouse API key
    pub lighthouse_api_key: Option<String>,
    /// Lotus bearer token
    pub lotus_token: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("signer_key", &"<redacted>")
            .field("lighthouse_api_key", &self.lighthouse_api_key.as_ref().map(|_| "<redacted>"))
            .field("lotus_token", &self.lotus_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Secrets {
    /// Read secrets from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read secrets through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Ok(Self {
            signer_key: get(SIGNER_KEY_ENV).ok_or(ConfigError::MissingSecret(SIGNER_KEY_ENV))?,
            lighthouse_api_key: get(LIGHTHOUSE_KEY_ENV),
            lotus_token: get(LOTUS_TOKEN_ENV),
        })
    }

    /// Lighthouse key, required once uploads are enabled.
    pub fn lighthouse_key(&self) -> Result<&str, ConfigError> {
        self.lighthouse_api_key
            .as_deref()
            .ok_or(ConfigError::MissingSecret(LIGHTHOUSE_KEY_ENV))
    }
}
