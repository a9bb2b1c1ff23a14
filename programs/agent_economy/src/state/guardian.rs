//! Guardian Role
//!
//! A wallet holds the guardian role exactly while its guardian account
//! exists. Only guardians may vote on breeding proposals.

use anchor_lang::prelude::*;

/// Guardian role account
///
/// Seeds: ["guardian", wallet]
#[account]
#[derive(InitSpace)]
pub struct Guardian {
    /// Wallet holding the role
    pub wallet: Pubkey,

    /// Unix timestamp when the role was granted
    pub granted_at: i64,

    /// PDA bump seed
    pub bump: u8,
}

impl Guardian {
    pub const SEED: &'static [u8] = b"guardian";
}
