//! Execution guard
//!
//! Value-moving instructions take an operation lock on the account they
//! mutate before doing anything else and drop it right before returning.
//! A nested invocation that reaches the same entry point while the flag is
//! still set fails with [`GuardError::Reentrancy`]. Failed instructions
//! revert the whole transaction, the flag included, so only the success
//! path has to release it.
//!
//! Anchor only serializes `Account<T>` back to account data when the
//! handler returns, so a nested call would still read the old flag. The
//! lock is therefore written through to account data as soon as it is
//! taken ([`lock_account`]), and handlers call [`persist`] on the effects
//! they make before any CPI.

use anchor_lang::prelude::*;

#[error_code]
pub enum GuardError {
    #[msg("Re-entrant call blocked")]
    Reentrancy,
}

/// State that carries its own operation lock
pub trait OperationLock {
    fn lock_flag(&mut self) -> &mut bool;

    /// Acquire the lock, failing if it is already held
    fn lock(&mut self) -> Result<()> {
        let flag = self.lock_flag();
        require!(!*flag, GuardError::Reentrancy);
        *flag = true;
        Ok(())
    }

    fn unlock(&mut self) {
        *self.lock_flag() = false;
    }
}

/// Lock the state `select` picks out of `account` and write the account
/// back to its data
pub fn lock_account<'info, T, L, F>(account: &mut Account<'info, T>, select: F) -> Result<()>
where
    T: AccountSerialize + AccountDeserialize + Owner + Clone,
    L: OperationLock,
    F: FnOnce(&mut T) -> &mut L,
{
    select(&mut **account).lock()?;
    persist(account)
}

/// Write the in-memory account back to its data
pub fn persist<'info, T>(account: &Account<'info, T>) -> Result<()>
where
    T: AccountSerialize + AccountDeserialize + Owner + Clone,
{
    account.exit(&crate::ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{agent, config_with_keys};
    use crate::state::{Agent, Config};

    #[derive(Default)]
    struct Guarded {
        locked: bool,
    }

    impl OperationLock for Guarded {
        fn lock_flag(&mut self) -> &mut bool {
            &mut self.locked
        }
    }

    #[test]
    fn test_second_lock_is_rejected() {
        let mut state = Guarded::default();
        state.lock().unwrap();
        assert_eq!(state.lock().unwrap_err(), GuardError::Reentrancy.into());
    }

    #[test]
    fn test_unlock_allows_next_operation() {
        let mut state = Guarded::default();
        state.lock().unwrap();
        state.unlock();
        assert!(state.lock().is_ok());
    }

    fn serialized<T: AccountSerialize>(value: &T, space: usize) -> Vec<u8> {
        let mut data = vec![0u8; space];
        value.try_serialize(&mut &mut data[..]).unwrap();
        data
    }

    #[test]
    fn test_agent_lock_reaches_account_data() {
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 1_000_000_000u64;
        let mut data = serialized(&agent("alpha", 0, 7), 8 + Agent::INIT_SPACE);
        let info = AccountInfo::new(&key, false, true, &mut lamports, &mut data[..], &owner, false, 0);

        let mut outer = Account::<Agent>::try_from(&info).unwrap();
        lock_account(&mut outer, |agent| &mut agent.market).unwrap();

        // A nested call deserializes the account afresh
        let mut nested = Account::<Agent>::try_from(&info).unwrap();
        assert!(nested.market.locked);
        assert_eq!(
            lock_account(&mut nested, |agent| &mut agent.market).unwrap_err(),
            GuardError::Reentrancy.into()
        );
    }

    #[test]
    fn test_config_lock_reaches_account_data() {
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 1_000_000_000u64;
        let mut data = serialized(&config_with_keys(&[[1; 32]]), 8 + Config::INIT_SPACE);
        let info = AccountInfo::new(&key, false, true, &mut lamports, &mut data[..], &owner, false, 0);

        let mut outer = Account::<Config>::try_from(&info).unwrap();
        lock_account(&mut outer, |config| config).unwrap();
        outer.agent_count += 1;
        persist(&outer).unwrap();

        let nested = Account::<Config>::try_from(&info).unwrap();
        assert!(nested.locked);
        assert_eq!(nested.agent_count, 1);
    }
}
