//! Provider configuration read from the ambient environment

use crate::error::{Result, SmokeError};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::{path::PathBuf, str::FromStr, time::Duration};
use url::Url;

/// RPC endpoint of the target cluster
pub const PROVIDER_URL_ENV: &str = "ANCHOR_PROVIDER_URL";
/// Path to the payer keypair file
pub const WALLET_ENV: &str = "ANCHOR_WALLET";
pub const COMMITMENT_ENV: &str = "LITESVM_EXP_COMMITMENT";
pub const CONFIRM_TIMEOUT_ENV: &str = "LITESVM_EXP_CONFIRM_TIMEOUT_SECS";
/// Anchor IDL describing the deployed program
pub const IDL_ENV: &str = "LITESVM_EXP_IDL";

pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderConfig {
    /// RPC endpoint to connect to
    pub rpc_url: String,

    /// Keypair paying for and signing every call
    pub wallet_path: PathBuf,

    pub commitment: CommitmentConfig,

    /// How long to wait for a submitted call to be confirmed
    pub confirm_timeout: Duration,

    /// IDL file; the compiled-in descriptor is used when absent
    pub idl_path: Option<PathBuf>,
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let rpc_url = get(PROVIDER_URL_ENV)
            .ok_or_else(|| SmokeError::Configuration(format!("{PROVIDER_URL_ENV} is not set")))?;
        validate_rpc_url(&rpc_url)?;

        let wallet = get(WALLET_ENV)
            .ok_or_else(|| SmokeError::Configuration(format!("{WALLET_ENV} is not set")))?;
        let wallet_path = expand_path(&wallet);

        let commitment = match get(COMMITMENT_ENV) {
            Some(value) => parse_commitment(&value)?,
            None => CommitmentConfig::confirmed(),
        };

        let confirm_timeout = match get(CONFIRM_TIMEOUT_ENV) {
            Some(value) => parse_timeout(&value)?,
            None => DEFAULT_CONFIRM_TIMEOUT,
        };

        let idl_path = get(IDL_ENV).map(|path| expand_path(&path));

        Ok(Self {
            rpc_url: rpc_url.trim().to_string(),
            wallet_path,
            commitment,
            confirm_timeout,
            idl_path,
        })
    }
}

fn validate_rpc_url(url: &str) -> Result<()> {
    let url = url.trim();
    let parsed = Url::parse(url).map_err(|err| {
        SmokeError::Configuration(format!(
            "{PROVIDER_URL_ENV} is not a valid URL ({err}): {url:?}"
        ))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SmokeError::Configuration(format!(
            "{PROVIDER_URL_ENV} must be an http(s) URL, got {url:?}"
        )));
    }

    match parsed.host_str() {
        None | Some("") => Err(SmokeError::Configuration(format!(
            "{PROVIDER_URL_ENV} has no host: {url:?}"
        ))),
        Some(_) => Ok(()),
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).into_owned())
}

pub fn parse_commitment(value: &str) -> Result<CommitmentConfig> {
    let commitment = CommitmentLevel::from_str(value.trim()).map_err(|_| {
        SmokeError::Configuration(format!(
            "{COMMITMENT_ENV} must be processed, confirmed or finalized, got {value:?}"
        ))
    })?;
    Ok(CommitmentConfig { commitment })
}

fn parse_timeout(value: &str) -> Result<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(SmokeError::Configuration(format!(
            "{CONFIRM_TIMEOUT_ENV} must be a positive number of seconds, got {value:?}"
        ))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
    }
}
