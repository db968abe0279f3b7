//! In-process LiteSVM backend

use super::Cluster;
use crate::{
    error::{Result, SmokeError},
    types::TransactionReceipt,
};
use async_trait::async_trait;
use litesvm::LiteSVM;
use solana_sdk::{account::Account, hash::Hash, pubkey::Pubkey, transaction::Transaction};
use std::{
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, info};

pub struct LiteSvmCluster {
    svm: Mutex<LiteSVM>,
}

impl Default for LiteSvmCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl LiteSvmCluster {
    pub fn new() -> Self {
        Self {
            svm: Mutex::new(LiteSVM::new()),
        }
    }

    /// Simulator with the compiled program at `path` loaded under `program_id`
    pub fn with_program(program_id: Pubkey, path: impl AsRef<Path>) -> Result<Self> {
        let cluster = Self::new();
        cluster.add_program(program_id, path)?;
        Ok(cluster)
    }

    pub fn add_program(&self, program_id: Pubkey, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.lock()
            .add_program_from_file(program_id, path)
            .map_err(|e| {
                SmokeError::Resolution(format!("cannot load program {}: {e}", path.display()))
            })?;
        info!(%program_id, "loaded {}", path.display());
        Ok(())
    }

    pub fn airdrop(&self, to: &Pubkey, lamports: u64) -> Result<()> {
        self.lock()
            .airdrop(to, lamports)
            .map(|_| ())
            .map_err(|failed| SmokeError::execution(failed.err, failed.meta.logs))
    }

    fn lock(&self) -> MutexGuard<'_, LiteSVM> {
        self.svm.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Cluster for LiteSvmCluster {
    fn endpoint(&self) -> String {
        "litesvm".to_string()
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        Ok(self.lock().get_account(address))
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(self.lock().latest_blockhash())
    }

    async fn send_and_confirm(&self, transaction: Transaction) -> Result<TransactionReceipt> {
        let mut svm = self.lock();
        let result = svm.send_transaction(transaction);
        // Advance like a validator would, so identical follow-up calls are not deduplicated
        svm.expire_blockhash();

        match result {
            Ok(meta) => {
                debug!(
                    signature = %meta.signature,
                    units = meta.compute_units_consumed,
                    "executed"
                );
                Ok(TransactionReceipt::new(meta.signature).with_logs(meta.logs))
            }
            Err(failed) => Err(SmokeError::execution(failed.err, failed.meta.logs)),
        }
    }
}
