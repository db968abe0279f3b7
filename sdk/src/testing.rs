//! In-memory cluster running a host-side model of the litesvm_exp program

use crate::{
    cluster::Cluster,
    error::{Result, SmokeError},
    types::{Method, TransactionReceipt},
};
use anchor_lang::{prelude::ProgramError, AccountDeserialize, AccountSerialize};
use async_trait::async_trait;
use litesvm_exp::CounterAccount;
use solana_sdk::{
    account::Account,
    bpf_loader_upgradeable,
    hash::Hash,
    instruction::InstructionError,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

/// Anchor `InstructionFallbackNotFound`
const UNKNOWN_INSTRUCTION: u32 = 101;
/// Anchor `AccountNotInitialized`
const ACCOUNT_NOT_INITIALIZED: u32 = 3012;

struct State {
    accounts: HashMap<Pubkey, Account>,
    processed: HashSet<Signature>,
    blockhash: Hash,
    offline: bool,
    confirm_delay: Option<Duration>,
}

/// Cluster stand-in for tests that need no compiled program or validator.
///
/// Advances its blockhash after every submitted transaction.
pub struct InMemoryCluster {
    state: Mutex<State>,
}

impl Default for InMemoryCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                accounts: HashMap::new(),
                processed: HashSet::new(),
                blockhash: Hash::new_unique(),
                offline: false,
                confirm_delay: None,
            }),
        }
    }

    /// Mark `program_id` as a deployed executable
    pub fn deploy(&self, program_id: Pubkey) {
        self.lock().accounts.insert(
            program_id,
            Account {
                lamports: 1,
                data: Vec::new(),
                owner: bpf_loader_upgradeable::id(),
                executable: true,
                rent_epoch: 0,
            },
        );
    }

    pub fn set_account(&self, address: Pubkey, account: Account) {
        self.lock().accounts.insert(address, account);
    }

    /// Fail every request as if the endpoint were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Delay confirmations, for exercising timeouts
    pub fn set_confirm_delay(&self, delay: Duration) {
        self.lock().confirm_delay = Some(delay);
    }

    pub fn processed_count(&self) -> usize {
        self.lock().processed.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_online(&self) -> Result<()> {
        if self.lock().offline {
            return Err(SmokeError::Connection {
                endpoint: self.endpoint(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Cluster for InMemoryCluster {
    fn endpoint(&self) -> String {
        "in-memory".to_string()
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        self.check_online()?;
        Ok(self.lock().accounts.get(address).cloned())
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.check_online()?;
        Ok(self.lock().blockhash)
    }

    async fn send_and_confirm(&self, transaction: Transaction) -> Result<TransactionReceipt> {
        self.check_online()?;

        let delay = self.lock().confirm_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        let outcome = process(&mut state, &transaction);
        state.blockhash = Hash::new_unique();

        match outcome {
            Ok(logs) => {
                let signature = transaction.signatures[0];
                state.processed.insert(signature);
                Ok(TransactionReceipt::new(signature).with_logs(logs))
            }
            Err((tx_error, logs)) => Err(SmokeError::execution(tx_error, logs)),
        }
    }
}

type Outcome = std::result::Result<Vec<String>, (TransactionError, Vec<String>)>;

fn process(state: &mut State, transaction: &Transaction) -> Outcome {
    let fail = |err: TransactionError| -> Outcome { Err((err, Vec::new())) };

    if transaction.verify().is_err() {
        return fail(TransactionError::SignatureFailure);
    }
    if transaction.message.recent_blockhash != state.blockhash {
        return fail(TransactionError::BlockhashNotFound);
    }
    if state.processed.contains(&transaction.signatures[0]) {
        return fail(TransactionError::AlreadyProcessed);
    }

    // Changes become visible only if every instruction succeeds
    let mut accounts = state.accounts.clone();
    let mut logs = Vec::new();
    let keys = &transaction.message.account_keys;

    for (index, ix) in transaction.message.instructions.iter().enumerate() {
        let index = index as u8;
        let program_id = keys[usize::from(ix.program_id_index)];
        let deployed = accounts.get(&program_id).is_some_and(|a| a.executable);
        if !deployed {
            return Err((TransactionError::ProgramAccountNotFound, logs));
        }

        logs.push(format!("Program {program_id} invoke [1]"));
        let ix_accounts: Vec<Pubkey> = ix
            .accounts
            .iter()
            .map(|i| keys[usize::from(*i)])
            .collect();
        match execute(&program_id, &mut accounts, &ix_accounts, &ix.data, &mut logs) {
            Ok(()) => logs.push(format!("Program {program_id} success")),
            Err(err) => {
                logs.push(format!("Program {program_id} failed: {err}"));
                return Err((TransactionError::InstructionError(index, err), logs));
            }
        }
    }

    state.accounts = accounts;
    Ok(logs)
}

fn execute(
    program_id: &Pubkey,
    accounts: &mut HashMap<Pubkey, Account>,
    keys: &[Pubkey],
    data: &[u8],
    logs: &mut Vec<String>,
) -> std::result::Result<(), InstructionError> {
    if *program_id != litesvm_exp::ID {
        return Err(InstructionError::IncorrectProgramId);
    }
    let method = Method::from_discriminator(data)
        .ok_or(InstructionError::Custom(UNKNOWN_INSTRUCTION))?;
    logs.push(format!("Program log: Instruction: {method}"));

    match method {
        Method::Initialize => {
            logs.push(format!("Program log: Greetings from: {program_id:?}"));
        }
        Method::InitializeCounter => {
            let address = *keys.get(1).ok_or(InstructionError::NotEnoughAccountKeys)?;
            if accounts.get(&address).is_some_and(|a| a.lamports > 0 || !a.data.is_empty()) {
                // SystemError::AccountAlreadyInUse
                return Err(InstructionError::Custom(0));
            }
            let counter = CounterAccount { count: 0 };
            let mut data = Vec::with_capacity(CounterAccount::SIZE);
            counter
                .try_serialize(&mut data)
                .map_err(|_| InstructionError::AccountDataTooSmall)?;
            accounts.insert(
                address,
                Account {
                    lamports: 1_002_240,
                    data,
                    owner: *program_id,
                    executable: false,
                    rent_epoch: 0,
                },
            );
            logs.push(format!(
                "Program log: Counter Account initialized with count: {}",
                counter.count
            ));
        }
        Method::IncrementCounter | Method::DecrementCounter => {
            let address = *keys.get(1).ok_or(InstructionError::NotEnoughAccountKeys)?;
            let account = accounts
                .get_mut(&address)
                .ok_or(InstructionError::Custom(ACCOUNT_NOT_INITIALIZED))?;
            let mut counter = CounterAccount::try_deserialize(&mut account.data.as_slice())
                .map_err(|_| InstructionError::InvalidAccountData)?;

            let (result, verb) = if method == Method::IncrementCounter {
                (counter.increment(), "incremented")
            } else {
                (counter.decrement(), "decremented")
            };
            result.map_err(|e| match ProgramError::from(e) {
                ProgramError::Custom(code) => InstructionError::Custom(code),
                _ => InstructionError::InvalidArgument,
            })?;

            account.data.clear();
            counter
                .try_serialize(&mut account.data)
                .map_err(|_| InstructionError::AccountDataTooSmall)?;
            logs.push(format!("Program log: Counter {verb} to: {}", counter.count));
        }
    }

    Ok(())
}
