//! Global Protocol Configuration
//!
//! This account stores protocol-wide settings that apply to every agent:
//! curve constants, fees, breeding rules and the trait key universe.

use anchor_lang::prelude::*;

use crate::amm::{ExponentialCurve, TOKEN_UNIT, WAD};
use crate::guard::OperationLock;
use crate::state::Trait;

/// Maximum number of trait keys per agent
pub const MAX_TRAITS: usize = 16;

/// Maximum number of guardian votes a proposal can hold
pub const MAX_VOTERS: usize = 16;

/// Global configuration account (singleton PDA)
///
/// Seeds: ["config"]
#[account]
#[derive(InitSpace)]
pub struct Config {
    /// Protocol administrator, also the explicit trait-setting authority
    pub admin: Pubkey,

    /// Token used to pay for agents, proposals and curve trades
    pub payment_mint: Pubkey,

    /// Trading fee in basis points (500 = 5%)
    pub fee_bps: u64,

    /// Minimum payment attached to `create_agent`
    pub creation_cost: u64,

    /// Minimum payment attached to `submit_proposal`
    pub proposal_cost: u64,

    /// Curve P0, WAD-scaled payment base units per whole token
    pub initial_price: u128,

    /// Curve k, WAD-scaled growth per whole token
    pub growth_rate: u128,

    /// Funding that triggers liquidity bootstrapping
    pub funding_goal: u64,

    /// Agent tokens minted into the pool at bootstrap
    pub reserve_allocation: u64,

    /// Share of raised funding deposited into the pool (6000 = 60%)
    pub liquidity_share_bps: u64,

    /// Guardian votes needed to execute a breeding proposal
    pub required_approvals: u8,

    /// Seconds after proposal creation during which votes are accepted
    pub voting_window: i64,

    /// Seconds a parent stays in cooldown after breeding
    pub cooldown_period: i64,

    /// Minimum fitness of each breeding parent
    pub min_fitness: u64,

    /// Minimum market cap of each breeding parent
    pub min_market_cap: u64,

    /// Largest allowed generation difference between parents
    pub max_generation_gap: u32,

    /// Ordered trait key universe shared by every agent
    #[max_len(16)]
    pub trait_keys: Vec<[u8; 32]>,

    /// Agents registered so far (next serial number)
    pub agent_count: u64,

    /// Proposals submitted so far (next proposal id)
    pub proposal_count: u64,

    /// Operation lock for payable instructions
    pub locked: bool,

    /// PDA bump seed
    pub bump: u8,
}

impl Config {
    pub const SEED: &'static [u8] = b"config";

    pub fn curve(&self) -> Result<ExponentialCurve> {
        ExponentialCurve::new(self.initial_price, self.growth_rate)
    }

    /// Check that `traits` carries exactly the configured keys, in order
    pub fn matches_trait_universe(&self, traits: &[Trait]) -> bool {
        traits.len() == self.trait_keys.len()
            && traits
                .iter()
                .zip(self.trait_keys.iter())
                .all(|(t, key)| t.key == *key)
    }
}

impl OperationLock for Config {
    fn lock_flag(&mut self) -> &mut bool {
        &mut self.locked
    }
}

/// Parameters accepted by `initialize`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct ProtocolParams {
    pub fee_bps: u64,
    pub creation_cost: u64,
    pub proposal_cost: u64,
    pub initial_price: u128,
    pub growth_rate: u128,
    pub funding_goal: u64,
    pub reserve_allocation: u64,
    pub liquidity_share_bps: u64,
    pub required_approvals: u8,
    pub voting_window: i64,
    pub cooldown_period: i64,
    pub min_fitness: u64,
    pub min_market_cap: u64,
    pub max_generation_gap: u32,
    pub trait_keys: Vec<[u8; 32]>,
}

impl Default for ProtocolParams {
    /// Defaults assume a 6-decimal payment token (e.g. USDC)
    fn default() -> Self {
        Self {
            fee_bps: 500,
            creation_cost: 10_000_000,  // 10 tokens
            proposal_cost: 5_000_000,   // 5 tokens
            initial_price: 1_000 * WAD, // 0.001 per agent token
            growth_rate: WAD / 1_000_000,
            funding_goal: 50_000_000_000, // 50k tokens
            reserve_allocation: 200_000 * TOKEN_UNIT as u64,
            liquidity_share_bps: 6_000,
            required_approvals: 6,
            voting_window: 24 * 60 * 60,
            cooldown_period: 3 * 24 * 60 * 60,
            min_fitness: 1_000_000,
            min_market_cap: 0,
            max_generation_gap: 2,
            trait_keys: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::config_with_keys;

    #[test]
    fn test_trait_universe_requires_same_keys_in_order() {
        let config = config_with_keys(&[[1; 32], [2; 32]]);
        let trait_of = |key: [u8; 32]| Trait {
            key,
            value: 10,
            dominance: 1,
        };

        assert!(config.matches_trait_universe(&[trait_of([1; 32]), trait_of([2; 32])]));
        assert!(!config.matches_trait_universe(&[trait_of([2; 32]), trait_of([1; 32])]));
        assert!(!config.matches_trait_universe(&[trait_of([1; 32])]));
    }

    #[test]
    fn test_default_curve_is_valid() {
        let config = config_with_keys(&[]);
        assert!(config.curve().is_ok());
    }
}
