//! JSON-RPC validator backend

use super::Cluster;
use crate::{
    error::{Result, SmokeError},
    types::TransactionReceipt,
};
use async_trait::async_trait;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_request::{RpcError, RpcResponseErrorData},
};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    transaction::Transaction,
};
use tracing::debug;

pub struct RpcCluster {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcCluster {
    pub fn new(rpc_url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url.into(), commitment),
            commitment,
        }
    }

    fn classify(&self, err: ClientError) -> SmokeError {
        classify_client_error(&self.client.url(), err)
    }
}

#[async_trait]
impl Cluster for RpcCluster {
    fn endpoint(&self) -> String {
        self.client.url()
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        self.client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map(|response| response.value)
            .map_err(|e| self.classify(e))
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| self.classify(e))
    }

    async fn send_and_confirm(&self, transaction: Transaction) -> Result<TransactionReceipt> {
        let signature = self
            .client
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(|e| self.classify(e))?;
        debug!(%signature, "confirmed by {}", self.client.url());
        Ok(TransactionReceipt::new(signature))
    }
}

/// Split RPC client failures into transport problems and rejected transactions
pub(crate) fn classify_client_error(endpoint: &str, err: ClientError) -> SmokeError {
    if let Some(tx_error) = err.get_transaction_error() {
        return SmokeError::Execution {
            reason: err.to_string(),
            tx_error: Some(tx_error),
            logs: preflight_logs(&err),
        };
    }

    match err.kind() {
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => SmokeError::Connection {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        },
        _ => SmokeError::Execution {
            reason: err.to_string(),
            tx_error: None,
            logs: Vec::new(),
        },
    }
}

fn preflight_logs(err: &ClientError) -> Vec<String> {
    match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            data: RpcResponseErrorData::SendTransactionPreflightFailure(result),
            ..
        }) => result.logs.clone().unwrap_or_default(),
        _ => Vec::new(),
    }
}
