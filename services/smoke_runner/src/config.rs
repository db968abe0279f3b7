//! Runner configuration

use crate::suite::{select_cases, Case};
use clap::Parser;
use litesvm_exp_sdk::{
    config::{COMMITMENT_ENV, CONFIRM_TIMEOUT_ENV, IDL_ENV, PROVIDER_URL_ENV, WALLET_ENV},
    ProviderConfig, SmokeError,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "smoke_runner", about = "Run the litesvm_exp smoke suite")]
pub struct Cli {
    /// RPC endpoint of the validator
    #[arg(long, env = PROVIDER_URL_ENV)]
    pub url: Option<String>,

    /// Payer keypair file
    #[arg(long, env = WALLET_ENV)]
    pub wallet: Option<String>,

    /// processed, confirmed or finalized
    #[arg(long, env = COMMITMENT_ENV)]
    pub commitment: Option<String>,

    /// Seconds to wait for each confirmation
    #[arg(long, env = CONFIRM_TIMEOUT_ENV)]
    pub timeout_secs: Option<u64>,

    /// Anchor IDL of the deployed program
    #[arg(long, env = IDL_ENV)]
    pub idl: Option<String>,

    /// Run only this case (repeatable)
    #[arg(long = "case", value_name = "NAME")]
    pub cases: Vec<String>,

    /// Print the case names and exit
    #[arg(long)]
    pub list: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub provider: ProviderConfig,
    pub cases: Vec<Case>,
}

impl Cli {
    pub fn into_config(self) -> Result<Config, SmokeError> {
        let provider = ProviderConfig::from_lookup(|key| match key {
            PROVIDER_URL_ENV => self.url.clone(),
            WALLET_ENV => self.wallet.clone(),
            COMMITMENT_ENV => self.commitment.clone(),
            CONFIRM_TIMEOUT_ENV => self.timeout_secs.map(|secs| secs.to_string()),
            IDL_ENV => self.idl.clone(),
            _ => None,
        })?;

        Ok(Config {
            provider,
            cases: select_cases(&self.cases)?,
        })
    }
}
