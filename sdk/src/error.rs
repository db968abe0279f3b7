use solana_sdk::{
    instruction::InstructionError,
    pubkey::Pubkey,
    transaction::TransactionError,
};
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SmokeError>;

/// System program error raised when `create_account`/`allocate` hits an
/// account that already holds data or lamports.
const ACCOUNT_ALREADY_IN_USE: u32 = 0;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Could not resolve program: {0}")]
    Resolution(String),

    #[error("Connection to {endpoint} failed: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("Transaction failed: {reason}")]
    Execution {
        reason: String,
        tx_error: Option<TransactionError>,
        logs: Vec<String>,
    },

    #[error("No confirmation within {0:?}")]
    Timeout(Duration),

    #[error("Account {address} unreadable: {reason}")]
    Account { address: Pubkey, reason: String },
}

impl SmokeError {
    pub fn execution(tx_error: TransactionError, logs: Vec<String>) -> Self {
        Self::Execution {
            reason: tx_error.to_string(),
            tx_error: Some(tx_error),
            logs,
        }
    }

    pub fn transaction_error(&self) -> Option<&TransactionError> {
        match self {
            Self::Execution { tx_error, .. } => tx_error.as_ref(),
            _ => None,
        }
    }

    /// Program logs captured for a rejected transaction, if the backend reported any
    pub fn logs(&self) -> &[String] {
        match self {
            Self::Execution { logs, .. } => logs,
            _ => &[],
        }
    }

    /// Custom error code returned by the failing instruction
    pub fn custom_code(&self) -> Option<u32> {
        match self.transaction_error()? {
            TransactionError::InstructionError(_, InstructionError::Custom(code)) => Some(*code),
            _ => None,
        }
    }

    /// True when the rejection means the target state already exists
    pub fn is_already_initialized(&self) -> bool {
        matches!(
            self.transaction_error(),
            Some(
                TransactionError::AlreadyProcessed
                    | TransactionError::InstructionError(
                        _,
                        InstructionError::AccountAlreadyInitialized
                            | InstructionError::Custom(ACCOUNT_ALREADY_IN_USE)
                    )
            )
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_in_use_is_already_initialized() {
        let err = SmokeError::execution(
            TransactionError::InstructionError(0, InstructionError::Custom(0)),
            vec![],
        );
        assert!(err.is_already_initialized());
        assert_eq!(err.custom_code(), Some(0));
    }

    #[test]
    fn test_duplicate_transaction_is_already_initialized() {
        let err = SmokeError::execution(TransactionError::AlreadyProcessed, vec![]);
        assert!(err.is_already_initialized());
        assert_eq!(err.custom_code(), None);
    }

    #[test]
    fn test_program_error_is_not_already_initialized() {
        let err = SmokeError::execution(
            TransactionError::InstructionError(0, InstructionError::Custom(6001)),
            vec!["Program log: underflow".to_string()],
        );
        assert!(!err.is_already_initialized());
        assert_eq!(err.custom_code(), Some(6001));
        assert_eq!(err.logs().len(), 1);
    }

    #[test]
    fn test_other_kinds_carry_no_transaction_error() {
        let err = SmokeError::Connection {
            endpoint: "http://127.0.0.1:8899".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.transaction_error().is_none());
        assert!(!err.is_already_initialized());
        assert!(err.to_string().contains("127.0.0.1:8899"));

        let err = SmokeError::Timeout(Duration::from_secs(3));
        assert!(err.is_timeout());
        assert!(err.logs().is_empty());
    }
}
