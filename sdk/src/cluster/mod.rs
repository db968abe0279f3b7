//! Target environments a program handle can submit calls to

use crate::{error::Result, types::TransactionReceipt};
use async_trait::async_trait;
use solana_sdk::{account::Account, hash::Hash, pubkey::Pubkey, transaction::Transaction};

pub mod rpc;
#[cfg(feature = "litesvm")]
pub mod svm;

pub use rpc::RpcCluster;
#[cfg(feature = "litesvm")]
pub use svm::LiteSvmCluster;

/// A validator or simulator that accepts signed transactions
#[async_trait]
pub trait Cluster: Send + Sync {
    /// Human readable location, used in logs and errors
    fn endpoint(&self) -> String;

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>>;

    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Submit `transaction` and wait until the cluster confirms or rejects it
    async fn send_and_confirm(&self, transaction: Transaction) -> Result<TransactionReceipt>;
}
