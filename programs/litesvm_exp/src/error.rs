//! Counter errors

use anchor_lang::prelude::*;

#[error_code]
pub enum CounterError {
    #[msg("Counter overflow")]
    Overflow,

    #[msg("Counter underflow")]
    Underflow,
}
