use anchor_lang::prelude::*;

pub mod error;
pub mod state;

pub use error::CounterError;
pub use state::CounterAccount;

declare_id!("4HADsmeSsErmhVZdvYbLTmF5iBuqo1fXXwSHL2apXn1x");

/// Seed of the single counter PDA owned by this program
pub const COUNTER_SEED: &[u8] = b"counter";

#[program]
pub mod litesvm_exp {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        msg!("Greetings from: {:?}", ctx.program_id);
        Ok(())
    }

    pub fn initialize_counter(ctx: Context<Counter>) -> Result<()> {
        let counter = &mut ctx.accounts.counter;
        counter.count = 0;
        msg!("Counter Account initialized with count: {}", counter.count);
        Ok(())
    }

    pub fn increment_counter(ctx: Context<CounterOperation>) -> Result<()> {
        let counter = &mut ctx.accounts.counter;
        counter.increment()?;
        msg!("Counter incremented to: {}", counter.count);
        Ok(())
    }

    pub fn decrement_counter(ctx: Context<CounterOperation>) -> Result<()> {
        let counter = &mut ctx.accounts.counter;
        counter.decrement()?;
        msg!("Counter decremented to: {}", counter.count);
        Ok(())
    }
}

#[derive(Accounts)]
pub struct Initialize {}

#[derive(Accounts)]
pub struct Counter<'info> {
    #[account(mut)]
    pub signer: Signer<'info>,

    #[account(
        init,
        payer = signer,
        space = CounterAccount::SIZE,
        seeds = [COUNTER_SEED],
        bump
    )]
    pub counter: Account<'info, CounterAccount>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct CounterOperation<'info> {
    #[account(mut)]
    pub signer: Signer<'info>,

    #[account(
        mut,
        seeds = [COUNTER_SEED],
        bump
    )]
    pub counter: Account<'info, CounterAccount>,
}

/// Address and bump of the counter PDA for `program_id`
pub fn counter_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[COUNTER_SEED], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::{Discriminator, InstructionData};

    #[test]
    fn test_counter_address_is_deterministic() {
        let (first, bump) = counter_address(&ID);
        let (second, bump2) = counter_address(&ID);
        assert_eq!(first, second);
        assert_eq!(bump, bump2);
        assert_ne!(first, ID);
    }

    #[test]
    fn test_counter_address_depends_on_program() {
        let (ours, _) = counter_address(&ID);
        let (theirs, _) = counter_address(&Pubkey::new_unique());
        assert_ne!(ours, theirs);
    }

    #[test]
    fn test_instruction_data_is_discriminator_only() {
        // Every method takes zero arguments
        assert_eq!(
            instruction::Initialize {}.data(),
            instruction::Initialize::DISCRIMINATOR.to_vec()
        );
        assert_eq!(
            instruction::InitializeCounter {}.data(),
            instruction::InitializeCounter::DISCRIMINATOR.to_vec()
        );
        assert_eq!(instruction::IncrementCounter {}.data().len(), 8);
        assert_eq!(instruction::DecrementCounter {}.data().len(), 8);
    }

    #[test]
    fn test_discriminators_are_distinct() {
        let all = [
            instruction::Initialize::DISCRIMINATOR,
            instruction::InitializeCounter::DISCRIMINATOR,
            instruction::IncrementCounter::DISCRIMINATOR,
            instruction::DecrementCounter::DISCRIMINATOR,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_initialize_discriminator_matches_sighash() {
        assert_eq!(
            instruction::Initialize::DISCRIMINATOR,
            &[175, 175, 109, 31, 13, 152, 155, 237]
        );
    }
}
