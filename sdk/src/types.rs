//! Common types used across the SDK

use anchor_lang::Discriminator;
use litesvm_exp::instruction;
use solana_sdk::signature::Signature;
use std::fmt;

/// Outcome of a confirmed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub signature: Signature,
    /// Program logs, when the backend reports them
    pub logs: Vec<String>,
}

impl TransactionReceipt {
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            logs: Vec::new(),
        }
    }

    pub fn with_logs(mut self, logs: Vec<String>) -> Self {
        self.logs = logs;
        self
    }
}

impl fmt::Display for TransactionReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature)
    }
}

/// Methods exposed by the litesvm_exp program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Initialize,
    InitializeCounter,
    IncrementCounter,
    DecrementCounter,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::Initialize,
        Method::InitializeCounter,
        Method::IncrementCounter,
        Method::DecrementCounter,
    ];

    /// Name as it appears in the IDL
    pub fn name(self) -> &'static str {
        match self {
            Method::Initialize => "initialize",
            Method::InitializeCounter => "initialize_counter",
            Method::IncrementCounter => "increment_counter",
            Method::DecrementCounter => "decrement_counter",
        }
    }

    /// Discriminator compiled into the program crate
    pub fn discriminator(self) -> &'static [u8] {
        match self {
            Method::Initialize => instruction::Initialize::DISCRIMINATOR,
            Method::InitializeCounter => instruction::InitializeCounter::DISCRIMINATOR,
            Method::IncrementCounter => instruction::IncrementCounter::DISCRIMINATOR,
            Method::DecrementCounter => instruction::DecrementCounter::DISCRIMINATOR,
        }
    }

    pub fn from_discriminator(data: &[u8]) -> Option<Method> {
        Self::ALL
            .into_iter()
            .find(|method| data.starts_with(method.discriminator()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
