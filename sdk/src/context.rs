//! Execution context: the cluster, the payer and the confirmation policy for one run

use crate::{
    cluster::{Cluster, RpcCluster},
    config::{ProviderConfig, DEFAULT_CONFIRM_TIMEOUT},
    error::{Result, SmokeError},
    types::TransactionReceipt,
};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
    signer::Signer,
    transaction::Transaction,
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

/// Connection parameters shared by every handle resolved from it.
///
/// Built once per run and passed down explicitly; there is no process-wide provider.
pub struct ExecutionContext {
    cluster: Arc<dyn Cluster>,
    payer: Keypair,
    confirm_timeout: Duration,
}

impl ExecutionContext {
    pub fn new(cluster: Arc<dyn Cluster>, payer: Keypair) -> Self {
        Self {
            cluster,
            payer,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }

    pub fn with_confirm_timeout(mut self, confirm_timeout: Duration) -> Self {
        self.confirm_timeout = confirm_timeout;
        self
    }

    /// Load the payer keypair and connect to the configured RPC endpoint
    pub fn connect(config: &ProviderConfig) -> Result<Self> {
        let payer = read_keypair_file(&config.wallet_path).map_err(|e| {
            SmokeError::Configuration(format!(
                "cannot load wallet {}: {e}",
                config.wallet_path.display()
            ))
        })?;

        let cluster = RpcCluster::new(config.rpc_url.clone(), config.commitment);
        info!(
            endpoint = %config.rpc_url,
            payer = %payer.pubkey(),
            commitment = ?config.commitment.commitment,
            "execution context configured"
        );

        Ok(Self::new(Arc::new(cluster), payer).with_confirm_timeout(config.confirm_timeout))
    }

    pub fn from_env() -> Result<Self> {
        Self::connect(&ProviderConfig::from_env()?)
    }

    pub fn cluster(&self) -> &dyn Cluster {
        self.cluster.as_ref()
    }

    pub fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }

    pub fn confirm_timeout(&self) -> Duration {
        self.confirm_timeout
    }

    /// Sign `instruction` with the payer, submit it and wait for confirmation.
    ///
    /// Gives up with [`SmokeError::Timeout`] once the confirmation timeout elapses.
    pub async fn send(&self, instruction: Instruction) -> Result<TransactionReceipt> {
        let submit = async {
            let blockhash = self.cluster.latest_blockhash().await?;
            let transaction = Transaction::new_signed_with_payer(
                &[instruction],
                Some(&self.payer.pubkey()),
                &[&self.payer],
                blockhash,
            );
            debug!(signature = %transaction.signatures[0], "submitting");
            self.cluster.send_and_confirm(transaction).await
        };

        tokio::time::timeout(self.confirm_timeout, submit)
            .await
            .map_err(|_| SmokeError::Timeout(self.confirm_timeout))?
    }
}
