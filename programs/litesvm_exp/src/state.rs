use anchor_lang::prelude::*;
use crate::error::CounterError;

/// Counter state stored at the `counter` PDA
#[account]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CounterAccount {
    pub count: u64,
}

impl CounterAccount {
    pub const SIZE: usize = 8 + // discriminator
        8; // count

    pub fn increment(&mut self) -> Result<()> {
        self.count = self.count.checked_add(1).ok_or(CounterError::Overflow)?;
        Ok(())
    }

    pub fn decrement(&mut self) -> Result<()> {
        self.count = self.count.checked_sub(1).ok_or(CounterError::Underflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::Discriminator;

    #[test]
    fn test_size_matches_serialized_len() {
        let mut buf = Vec::new();
        CounterAccount { count: 7 }.try_serialize(&mut buf).unwrap();
        assert_eq!(buf.len(), CounterAccount::SIZE);
    }

    #[test]
    fn test_increment_then_decrement() {
        let mut counter = CounterAccount::default();
        counter.increment().unwrap();
        counter.increment().unwrap();
        assert_eq!(counter.count, 2);
        counter.decrement().unwrap();
        assert_eq!(counter.count, 1);
    }

    #[test]
    fn test_decrement_below_zero_fails() {
        let mut counter = CounterAccount::default();
        let err = counter.decrement().unwrap_err();
        assert_eq!(err, CounterError::Underflow.into());
        assert_eq!(counter.count, 0);
    }

    #[test]
    fn test_increment_past_max_fails() {
        let mut counter = CounterAccount { count: u64::MAX };
        let err = counter.increment().unwrap_err();
        assert_eq!(err, CounterError::Overflow.into());
        assert_eq!(counter.count, u64::MAX);
    }

    #[test]
    fn test_roundtrip_through_account_serialization() {
        let mut buf = Vec::new();
        CounterAccount { count: 42 }.try_serialize(&mut buf).unwrap();
        assert_eq!(&buf[..8], CounterAccount::DISCRIMINATOR);
        let decoded = CounterAccount::try_deserialize(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded.count, 42);
    }
}
