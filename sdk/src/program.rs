//! Typed handle to the deployed litesvm_exp program

use crate::{
    context::ExecutionContext,
    descriptor::ProgramDescriptor,
    error::{Result, SmokeError},
    types::{Method, TransactionReceipt},
};
use anchor_lang::{system_program, AccountDeserialize, InstructionData, ToAccountMetas};
use litesvm_exp::{accounts, instruction, CounterAccount};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use tracing::{info, warn};

/// Program address bound to its interface descriptor.
///
/// Borrows the [`ExecutionContext`] it was resolved under, so a handle can never be used
/// with another context.
pub struct ProgramHandle<'ctx> {
    ctx: &'ctx ExecutionContext,
    descriptor: ProgramDescriptor,
    counter: Pubkey,
}

impl<'ctx> ProgramHandle<'ctx> {
    /// Bind `descriptor` to the program deployed on the context's cluster
    pub async fn resolve(
        ctx: &'ctx ExecutionContext,
        descriptor: ProgramDescriptor,
    ) -> Result<Self> {
        descriptor.check_compatible()?;

        let program_id = descriptor.address;
        match ctx.cluster().get_account(&program_id).await? {
            Some(account) if account.executable => {}
            Some(_) => {
                return Err(SmokeError::Resolution(format!(
                    "account {program_id} is not an executable program"
                )))
            }
            None => {
                return Err(SmokeError::Resolution(format!(
                    "program {program_id} is not deployed on {}",
                    ctx.cluster().endpoint()
                )))
            }
        }

        let (counter, _) = litesvm_exp::counter_address(&program_id);
        info!(program = %descriptor.name, %program_id, "resolved program handle");

        Ok(Self {
            ctx,
            descriptor,
            counter,
        })
    }

    pub fn program_id(&self) -> Pubkey {
        self.descriptor.address
    }

    pub fn descriptor(&self) -> &ProgramDescriptor {
        &self.descriptor
    }

    /// Address of the counter PDA
    pub fn counter_address(&self) -> Pubkey {
        self.counter
    }

    pub fn initialize_instruction(&self) -> Instruction {
        Instruction {
            program_id: self.program_id(),
            accounts: accounts::Initialize {}.to_account_metas(None),
            data: instruction::Initialize {}.data(),
        }
    }

    pub fn initialize_counter_instruction(&self) -> Instruction {
        Instruction {
            program_id: self.program_id(),
            accounts: accounts::Counter {
                signer: self.ctx.payer(),
                counter: self.counter,
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: instruction::InitializeCounter {}.data(),
        }
    }

    pub fn increment_counter_instruction(&self) -> Instruction {
        Instruction {
            program_id: self.program_id(),
            accounts: self.counter_operation_accounts(),
            data: instruction::IncrementCounter {}.data(),
        }
    }

    pub fn decrement_counter_instruction(&self) -> Instruction {
        Instruction {
            program_id: self.program_id(),
            accounts: self.counter_operation_accounts(),
            data: instruction::DecrementCounter {}.data(),
        }
    }

    fn counter_operation_accounts(&self) -> Vec<AccountMeta> {
        accounts::CounterOperation {
            signer: self.ctx.payer(),
            counter: self.counter,
        }
        .to_account_metas(None)
    }

    pub async fn initialize(&self) -> Result<TransactionReceipt> {
        self.invoke(Method::Initialize, self.initialize_instruction()).await
    }

    pub async fn initialize_counter(&self) -> Result<TransactionReceipt> {
        self.invoke(Method::InitializeCounter, self.initialize_counter_instruction()).await
    }

    pub async fn increment_counter(&self) -> Result<TransactionReceipt> {
        self.invoke(Method::IncrementCounter, self.increment_counter_instruction()).await
    }

    pub async fn decrement_counter(&self) -> Result<TransactionReceipt> {
        self.invoke(Method::DecrementCounter, self.decrement_counter_instruction()).await
    }

    /// Read back the counter account
    pub async fn fetch_counter(&self) -> Result<CounterAccount> {
        let account = self
            .ctx
            .cluster()
            .get_account(&self.counter)
            .await?
            .ok_or_else(|| SmokeError::Account {
                address: self.counter,
                reason: "not found".to_string(),
            })?;

        if account.owner != self.program_id() {
            return Err(SmokeError::Account {
                address: self.counter,
                reason: format!("owned by {}", account.owner),
            });
        }

        CounterAccount::try_deserialize(&mut account.data.as_slice()).map_err(|e| {
            SmokeError::Account {
                address: self.counter,
                reason: e.to_string(),
            }
        })
    }

    async fn invoke(&self, method: Method, instruction: Instruction) -> Result<TransactionReceipt> {
        match self.ctx.send(instruction).await {
            Ok(receipt) => {
                info!(%method, signature = %receipt.signature, "confirmed");
                Ok(receipt)
            }
            Err(err) => {
                match err.custom_code().and_then(|code| self.descriptor.error(code)) {
                    Some(described) => warn!(%method, error = %described.name, "rejected: {err}"),
                    None => warn!(%method, "rejected: {err}"),
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryCluster;
    use anchor_lang::{AccountSerialize, Discriminator};
    use litesvm_exp::CounterError;
    use solana_sdk::{account::Account, signature::Keypair};
    use std::{sync::Arc, time::Duration};

    fn context(cluster: InMemoryCluster) -> ExecutionContext {
        ExecutionContext::new(Arc::new(cluster), Keypair::new())
    }

    fn deployed() -> InMemoryCluster {
        let cluster = InMemoryCluster::new();
        cluster.deploy(litesvm_exp::ID);
        cluster
    }

    #[tokio::test]
    async fn test_initialize_returns_signature() {
        let ctx = context(deployed());
        let handle = ProgramHandle::resolve(&ctx, ProgramDescriptor::compiled())
            .await
            .unwrap();

        let receipt = handle.initialize().await.unwrap();
        assert!(!receipt.signature.to_string().is_empty());
        assert!(receipt
            .logs
            .iter()
            .any(|line| line.contains("Greetings from")));
    }

    #[tokio::test]
    async fn test_resolve_requires_deployed_program() {
        let ctx = context(InMemoryCluster::new());
        let err = ProgramHandle::resolve(&ctx, ProgramDescriptor::compiled())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SmokeError::Resolution(ref msg) if msg.contains("not deployed")));
    }

    #[tokio::test]
    async fn test_resolve_rejects_foreign_descriptor() {
        let ctx = context(deployed());
        let mut descriptor = ProgramDescriptor::compiled();
        descriptor.address = Pubkey::new_unique();
        let err = ProgramHandle::resolve(&ctx, descriptor).await.err().unwrap();
        assert!(matches!(err, SmokeError::Resolution(_)));
    }

    #[tokio::test]
    async fn test_resolve_rejects_non_executable_account() {
        let cluster = InMemoryCluster::new();
        cluster.set_account(
            litesvm_exp::ID,
            Account {
                lamports: 1,
                owner: system_program::ID,
                ..Account::default()
            },
        );
        let ctx = context(cluster);
        let err = ProgramHandle::resolve(&ctx, ProgramDescriptor::compiled())
            .await
            .err()
            .unwrap();
        assert!(
            matches!(err, SmokeError::Resolution(ref msg) if msg.contains("not an executable"))
        );
    }

    #[tokio::test]
    async fn test_fetch_rejects_foreign_owned_counter() {
        let cluster = deployed();
        let (counter, _) = litesvm_exp::counter_address(&litesvm_exp::ID);
        let mut data = Vec::new();
        CounterAccount { count: 3 }.try_serialize(&mut data).unwrap();
        cluster.set_account(
            counter,
            Account {
                lamports: 1,
                data,
                owner: Pubkey::new_unique(),
                ..Account::default()
            },
        );
        let ctx = context(cluster);
        let handle = ProgramHandle::resolve(&ctx, ProgramDescriptor::compiled())
            .await
            .unwrap();

        let err = handle.fetch_counter().await.unwrap_err();
        assert!(
            matches!(err, SmokeError::Account { ref reason, .. } if reason.contains("owned by"))
        );
    }

    #[tokio::test]
    async fn test_fetch_rejects_garbled_counter() {
        let cluster = deployed();
        let (counter, _) = litesvm_exp::counter_address(&litesvm_exp::ID);
        cluster.set_account(
            counter,
            Account {
                lamports: 1,
                data: vec![0; CounterAccount::SIZE],
                owner: litesvm_exp::ID,
                ..Account::default()
            },
        );
        let ctx = context(cluster);
        let handle = ProgramHandle::resolve(&ctx, ProgramDescriptor::compiled())
            .await
            .unwrap();

        let err = handle.fetch_counter().await.unwrap_err();
        assert!(matches!(err, SmokeError::Account { .. }));
    }

    #[tokio::test]
    async fn test_resolve_on_offline_cluster_is_connection_error() {
        let cluster = deployed();
        cluster.set_offline(true);
        let ctx = context(cluster);
        let err = ProgramHandle::resolve(&ctx, ProgramDescriptor::compiled())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SmokeError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_counter_lifecycle() {
        let ctx = context(deployed());
        let handle = ProgramHandle::resolve(&ctx, ProgramDescriptor::compiled())
            .await
            .unwrap();

        handle.initialize_counter().await.unwrap();
        assert_eq!(handle.fetch_counter().await.unwrap().count, 0);

        handle.increment_counter().await.unwrap();
        handle.increment_counter().await.unwrap();
        assert_eq!(handle.fetch_counter().await.unwrap().count, 2);

        handle.decrement_counter().await.unwrap();
        assert_eq!(handle.fetch_counter().await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_second_counter_initialization_is_rejected() {
        let ctx = context(deployed());
        let handle = ProgramHandle::resolve(&ctx, ProgramDescriptor::compiled())
            .await
            .unwrap();

        handle.initialize_counter().await.unwrap();
        let err = handle.initialize_counter().await.unwrap_err();
        assert!(err.is_already_initialized(), "got {err:?}");
    }

    #[tokio::test]
    async fn test_decrement_below_zero_is_rejected() {
        let ctx = context(deployed());
        let handle = ProgramHandle::resolve(&ctx, ProgramDescriptor::compiled())
            .await
            .unwrap();

        handle.initialize_counter().await.unwrap();
        let err = handle.decrement_counter().await.unwrap_err();
        assert_eq!(err.custom_code(), Some(u32::from(CounterError::Underflow)));
        assert_eq!(handle.fetch_counter().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_fetch_before_initialization() {
        let ctx = context(deployed());
        let handle = ProgramHandle::resolve(&ctx, ProgramDescriptor::compiled())
            .await
            .unwrap();
        let err = handle.fetch_counter().await.unwrap_err();
        assert!(matches!(err, SmokeError::Account { .. }));
    }

    #[tokio::test]
    async fn test_slow_confirmation_times_out() {
        let cluster = deployed();
        cluster.set_confirm_delay(Duration::from_millis(500));
        let ctx = context(cluster).with_confirm_timeout(Duration::from_millis(20));
        let handle = ProgramHandle::resolve(&ctx, ProgramDescriptor::compiled())
            .await
            .unwrap();

        let err = handle.initialize().await.unwrap_err();
        assert!(err.is_timeout(), "got {err:?}");
    }

    #[test]
    fn test_counter_instruction_layout() {
        let payer = Keypair::new();
        let ctx = ExecutionContext::new(Arc::new(deployed()), payer);
        let handle = ProgramHandle {
            ctx: &ctx,
            descriptor: ProgramDescriptor::compiled(),
            counter: litesvm_exp::counter_address(&litesvm_exp::ID).0,
        };

        let ix = handle.initialize_counter_instruction();
        assert_eq!(ix.accounts.len(), 3);
        assert_eq!(ix.accounts[0].pubkey, ctx.payer());
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[1].pubkey, handle.counter_address());
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
        assert_eq!(ix.accounts[2].pubkey, system_program::ID);
        assert_eq!(ix.data, instruction::InitializeCounter::DISCRIMINATOR);

        let ix = handle.decrement_counter_instruction();
        assert_eq!(ix.accounts.len(), 2);
        assert!(handle.initialize_instruction().accounts.is_empty());
    }
}
