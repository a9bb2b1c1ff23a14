//! Liquidity Pool State
//!
//! Every agent gets a pool account when its vaults are opened. The pool
//! stays closed until the agent's funding first reaches the goal; at that
//! point it is opened once and seeded with freshly minted agent tokens and
//! a share of the raised funding.

use anchor_lang::prelude::*;

/// Agent/payment token pairing
///
/// Seeds: ["pool", agent]
#[account]
#[derive(InitSpace)]
pub struct LiquidityPool {
    pub agent: Pubkey,

    pub token_mint: Pubkey,

    pub payment_mint: Pubkey,

    /// Set once, at bootstrap
    pub opened: bool,

    pub opened_at: i64,

    /// Agent tokens deposited
    pub token_reserve: u64,

    /// Payment tokens deposited
    pub payment_reserve: u64,

    /// PDA bump seed
    pub bump: u8,
}

impl LiquidityPool {
    pub const SEED: &'static [u8] = b"pool";

    /// Open the pairing and record the initial deposit
    ///
    /// Returns `false` (and changes nothing) if the pool was already open.
    pub fn open(&mut self, now: i64, token_amount: u64, payment_amount: u64) -> bool {
        if self.opened {
            return false;
        }
        self.opened = true;
        self.opened_at = now;
        self.token_reserve = token_amount;
        self.payment_reserve = payment_amount;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_opens_once() {
        let mut pool = LiquidityPool {
            agent: Pubkey::new_unique(),
            token_mint: Pubkey::new_unique(),
            payment_mint: Pubkey::new_unique(),
            opened: false,
            opened_at: 0,
            token_reserve: 0,
            payment_reserve: 0,
            bump: 255,
        };

        assert!(pool.open(100, 5_000, 600));
        assert!(!pool.open(200, 9_999, 999));
        assert_eq!(pool.opened_at, 100);
        assert_eq!(pool.token_reserve, 5_000);
        assert_eq!(pool.payment_reserve, 600);
    }
}
