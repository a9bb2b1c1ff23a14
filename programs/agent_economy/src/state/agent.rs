//! Agent Registry State
//!
//! Each agent is one account holding its lineage, genome, curve market and
//! cooldown state. Every other component reads agents through the methods
//! defined here; nothing writes the fields directly outside this module and
//! the instruction that creates the account.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hashv;

use crate::amm::{fee_on, CurveError, ExponentialCurve};
use crate::guard::OperationLock;

/// Fitness weights, applied per term as `value · weight / 100`
pub const FITNESS_MCAP_WEIGHT: u64 = 40;
pub const FITNESS_FUNDING_WEIGHT: u64 = 30;
pub const FITNESS_AGE_WEIGHT: u64 = 30;

pub const MAX_ID_LEN: usize = 32;
pub const MAX_NAME_LEN: usize = 32;
pub const MAX_SYMBOL_LEN: usize = 10;
pub const MAX_DESCRIPTION_LEN: usize = 200;
pub const MAX_IMAGE_LEN: usize = 200;

#[error_code]
pub enum RegistryError {
    #[msg("Agent is already in cooldown")]
    AlreadyInCooldown,
    #[msg("Agent is not in cooldown")]
    NotInCooldown,
    #[msg("Cooldown period has not elapsed")]
    CooldownNotElapsed,
    #[msg("Trait key is not part of this agent's genome")]
    UnknownTrait,
    #[msg("Traits must match the configured trait keys")]
    TraitSetMismatch,
    #[msg("Metadata field exceeds maximum length")]
    FieldTooLong,
    #[msg("Agent token is in cooldown")]
    CooldownActive,
}

/// A single gene
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug)]
pub struct Trait {
    /// Opaque trait identifier
    pub key: [u8; 32],
    pub value: u64,
    /// Tie-break weight during inheritance
    pub dominance: u64,
}

/// Display metadata of an agent token
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct AgentProfile {
    #[max_len(32)]
    pub name: String,
    #[max_len(10)]
    pub symbol: String,
    #[max_len(200)]
    pub description: String,
    #[max_len(200)]
    pub image: String,
}

impl AgentProfile {
    pub fn validate(&self) -> Result<()> {
        require!(
            !self.name.is_empty() && self.name.len() <= MAX_NAME_LEN,
            RegistryError::FieldTooLong
        );
        require!(
            !self.symbol.is_empty() && self.symbol.len() <= MAX_SYMBOL_LEN,
            RegistryError::FieldTooLong
        );
        require!(
            self.description.len() <= MAX_DESCRIPTION_LEN,
            RegistryError::FieldTooLong
        );
        require!(self.image.len() <= MAX_IMAGE_LEN, RegistryError::FieldTooLong);
        Ok(())
    }
}

/// Agent ids double as PDA seeds, so they are capped at 32 bytes
pub fn validate_agent_id(id: &str) -> Result<()> {
    require!(
        !id.is_empty() && id.len() <= MAX_ID_LEN,
        RegistryError::FieldTooLong
    );
    Ok(())
}

/// Bonding-curve state of one agent token
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct MarketState {
    /// Tokens sold through the curve (base units)
    pub supply: u64,
    /// Net curve cost received, floored at zero
    pub funding_raised: u64,
    /// Spot price times supply after the last trade
    pub market_cap: u64,
    /// One-shot liquidity bootstrap flag
    pub liquidity_bootstrapped: bool,
    /// Operation lock for buy/sell
    pub locked: bool,
}

impl MarketState {
    /// Apply a buy of `amount` tokens that cost `cost`
    ///
    /// Returns `true` exactly once: on the buy that first lifts funding to
    /// `funding_goal`.
    pub fn record_buy(
        &mut self,
        curve: &ExponentialCurve,
        amount: u64,
        cost: u64,
        funding_goal: u64,
    ) -> Result<bool> {
        self.supply = self
            .supply
            .checked_add(amount)
            .ok_or(CurveError::Overflow)?;
        self.funding_raised = self
            .funding_raised
            .checked_add(cost)
            .ok_or(CurveError::Overflow)?;
        self.market_cap = curve.market_cap(self.supply)?;

        let crossed = !self.liquidity_bootstrapped && self.funding_raised >= funding_goal;
        if crossed {
            self.liquidity_bootstrapped = true;
        }

        Ok(crossed)
    }

    /// Apply a sell of `amount` tokens whose gross curve value was `gross`
    ///
    /// Funding is clamped at zero rather than failing.
    pub fn record_sell(&mut self, curve: &ExponentialCurve, amount: u64, gross: u64) -> Result<()> {
        self.supply = self
            .supply
            .checked_sub(amount)
            .ok_or(CurveError::InsufficientSupply)?;
        self.funding_raised = self.funding_raised.saturating_sub(gross);
        self.market_cap = curve.market_cap(self.supply)?;
        Ok(())
    }

    /// Payment tokens deposited into the pool at bootstrap
    pub fn liquidity_contribution(&self, share_bps: u64) -> Result<u64> {
        fee_on(self.funding_raised, share_bps)
    }
}

impl OperationLock for MarketState {
    fn lock_flag(&mut self) -> &mut bool {
        &mut self.locked
    }
}

/// Agent account
///
/// Seeds: ["agent", id]
#[account]
#[derive(InitSpace)]
pub struct Agent {
    /// Globally unique external id
    #[max_len(32)]
    pub id: String,

    /// Agent token mint, fixed at creation
    pub mint: Pubkey,

    /// Account that created (or bred) this agent
    pub creator: Pubkey,

    /// Registration order
    pub serial_number: u64,

    /// 0 for genesis agents, max(parents) + 1 for children
    pub generation: u32,

    /// Lineage tag; equal codes cannot breed
    pub family_code: u64,

    /// Parent agent accounts (default key for genesis agents)
    pub parent_a: Pubkey,
    pub parent_b: Pubkey,

    pub profile: AgentProfile,

    pub market: MarketState,

    /// Snapshot written by `refresh_fitness` for off-chain readers.
    /// Breeding checks always recompute fitness at the current clock.
    pub fitness: u64,

    pub created_at: i64,

    pub last_activity_time: i64,

    pub in_cooldown: bool,

    pub cooldown_started_at: i64,

    #[max_len(16)]
    pub traits: Vec<Trait>,

    /// PDA bump seed
    pub bump: u8,
}

/// Registry view of an agent used by breeding validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentDetails {
    pub generation: u32,
    pub family_code: u64,
    pub fitness: u64,
}

impl Agent {
    pub const SEED: &'static [u8] = b"agent";
    pub const MINT_SEED: &'static [u8] = b"agent_mint";

    /// Family code of a genesis agent
    pub fn genesis_family_code(id: &str) -> u64 {
        first_u64(&hashv(&[b"family", id.as_bytes()]).to_bytes())
    }

    /// Family code of a child
    ///
    /// Symmetric in the two parents and never equal to either of them.
    pub fn child_family_code(code_a: u64, code_b: u64) -> u64 {
        let (low, high) = if code_a <= code_b {
            (code_a, code_b)
        } else {
            (code_b, code_a)
        };
        let mut code = first_u64(
            &hashv(&[b"family", &low.to_le_bytes(), &high.to_le_bytes()]).to_bytes(),
        );
        while code == code_a || code == code_b {
            code = code.wrapping_add(1);
        }
        code
    }

    /// Composite fitness at `now`
    ///
    /// `mcap·40/100 + funding·30/100 + age·30/100`, each term floored on
    /// its own. The sum can differ by a unit or two from flooring the
    /// weighted total once; that truncation is kept as is.
    pub fn calculate_fitness(&self, now: i64) -> u64 {
        let age = now.saturating_sub(self.last_activity_time).max(0) as u64;

        weighted(self.market.market_cap, FITNESS_MCAP_WEIGHT)
            .saturating_add(weighted(self.market.funding_raised, FITNESS_FUNDING_WEIGHT))
            .saturating_add(weighted(age, FITNESS_AGE_WEIGHT))
    }

    /// Store the fitness at `now` as the agent's snapshot
    pub fn refresh_fitness(&mut self, now: i64) -> u64 {
        self.fitness = self.calculate_fitness(now);
        self.fitness
    }

    pub fn details(&self, now: i64) -> AgentDetails {
        AgentDetails {
            generation: self.generation,
            family_code: self.family_code,
            fitness: self.calculate_fitness(now),
        }
    }

    pub fn trait_keys(&self) -> Vec<[u8; 32]> {
        self.traits.iter().map(|t| t.key).collect()
    }

    /// `(value, dominance)` of a trait, if the agent carries it
    pub fn trait_details(&self, key: &[u8; 32]) -> Option<(u64, u64)> {
        self.traits
            .iter()
            .find(|t| t.key == *key)
            .map(|t| (t.value, t.dominance))
    }

    pub fn set_trait(&mut self, key: &[u8; 32], value: u64) -> Result<()> {
        let entry = self
            .traits
            .iter_mut()
            .find(|t| t.key == *key)
            .ok_or(RegistryError::UnknownTrait)?;
        entry.value = value;
        Ok(())
    }

    pub fn start_cooldown(&mut self, now: i64) -> Result<()> {
        require!(!self.in_cooldown, RegistryError::AlreadyInCooldown);
        self.in_cooldown = true;
        self.cooldown_started_at = now;
        Ok(())
    }

    /// Leave cooldown once `period` seconds have passed since it started
    pub fn end_cooldown(&mut self, now: i64, period: i64) -> Result<()> {
        require!(self.in_cooldown, RegistryError::NotInCooldown);
        let ready_at = self.cooldown_started_at.saturating_add(period);
        require!(now >= ready_at, RegistryError::CooldownNotElapsed);
        self.in_cooldown = false;
        Ok(())
    }

    /// Gate applied by the transfer hook to every token transfer
    pub fn ensure_transferable(&self) -> Result<()> {
        require!(!self.in_cooldown, RegistryError::CooldownActive);
        Ok(())
    }

    /// Record a trade on this agent's curve
    pub fn touch(&mut self, now: i64) {
        self.last_activity_time = now;
    }
}

fn weighted(value: u64, weight: u64) -> u64 {
    ((value as u128 * weight as u128) / 100) as u64
}

fn first_u64(bytes: &[u8; 32]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::{TOKEN_UNIT, WAD};
    use crate::state::test_support::agent;

    fn curve() -> ExponentialCurve {
        ExponentialCurve::new(1_000 * WAD, WAD / 1_000_000).unwrap()
    }

    #[test]
    fn test_fitness_floors_each_term() {
        let mut agent = agent("alpha", 0, 7);
        agent.market.market_cap = 3;
        agent.market.funding_raised = 3;
        agent.last_activity_time = 100;

        // 3·40/100 = 1, 3·30/100 = 0, 3·30/100 = 0 → 1
        // (a single floor of 0.4·3 + 0.3·3 + 0.3·3 = 3 would give 3)
        assert_eq!(agent.calculate_fitness(103), 1);
    }

    #[test]
    fn test_fitness_weights() {
        let mut agent = agent("alpha", 0, 7);
        agent.market.market_cap = 1_000;
        agent.market.funding_raised = 2_000;
        agent.last_activity_time = 0;
        assert_eq!(agent.calculate_fitness(500), 400 + 600 + 150);
    }

    #[test]
    fn test_fitness_monotonic_in_value_measures() {
        let mut agent = agent("alpha", 0, 7);
        agent.last_activity_time = 1_000;
        let now = 2_000;

        let mut previous = agent.calculate_fitness(now);
        for step in 1..20u64 {
            agent.market.market_cap = step * 37;
            agent.market.funding_raised = step * 11;
            let current = agent.calculate_fitness(now);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_fitness_monotonic_in_time() {
        let mut agent = agent("alpha", 0, 7);
        agent.market.market_cap = 500;
        agent.last_activity_time = 1_000;

        let mut previous = agent.calculate_fitness(1_000);
        for now in (1_001..1_200).step_by(7) {
            let current = agent.calculate_fitness(now);
            assert!(current >= previous);
            previous = current;
        }
        // A clock reading before the last activity counts as zero age
        assert_eq!(agent.calculate_fitness(0), 200);
    }

    #[test]
    fn test_cooldown_transitions() {
        let mut agent = agent("alpha", 0, 7);
        let period = 3_600;

        assert_eq!(
            agent.end_cooldown(0, period).unwrap_err(),
            RegistryError::NotInCooldown.into()
        );

        agent.start_cooldown(1_000).unwrap();
        assert_eq!(
            agent.start_cooldown(1_001).unwrap_err(),
            RegistryError::AlreadyInCooldown.into()
        );

        assert_eq!(
            agent.end_cooldown(1_000 + period - 1, period).unwrap_err(),
            RegistryError::CooldownNotElapsed.into()
        );
        assert!(agent.in_cooldown);

        agent.end_cooldown(1_000 + period, period).unwrap();
        assert!(!agent.in_cooldown);
    }

    #[test]
    fn test_transfers_blocked_only_during_cooldown() {
        let mut agent = agent("alpha", 0, 7);
        assert!(agent.ensure_transferable().is_ok());

        agent.start_cooldown(1_000).unwrap();
        assert_eq!(
            agent.ensure_transferable().unwrap_err(),
            RegistryError::CooldownActive.into()
        );

        // Still blocked after the period until someone ends the cooldown
        assert_eq!(
            agent.ensure_transferable().unwrap_err(),
            RegistryError::CooldownActive.into()
        );
        agent.end_cooldown(1_000 + 3_600, 3_600).unwrap();
        assert!(agent.ensure_transferable().is_ok());
    }

    #[test]
    fn test_refresh_fitness_stores_snapshot() {
        let mut agent = agent("alpha", 0, 7);
        agent.market.market_cap = 1_000;
        agent.market.funding_raised = 2_000;

        assert_eq!(agent.refresh_fitness(500), 1_150);
        assert_eq!(agent.fitness, 1_150);

        // The snapshot goes stale; live fitness keeps moving
        assert_eq!(agent.calculate_fitness(1_500), 1_450);
        assert_eq!(agent.fitness, 1_150);
        assert_eq!(agent.details(1_500).fitness, 1_450);
    }

    #[test]
    fn test_cooldown_can_end_long_after_period() {
        let mut agent = agent("alpha", 0, 7);
        agent.start_cooldown(50).unwrap();
        agent.end_cooldown(50 + 10_000, 3_600).unwrap();
        agent.start_cooldown(20_000).unwrap();
        assert!(agent.in_cooldown);
    }

    #[test]
    fn test_child_family_code_differs_from_parents() {
        for (a, b) in [(5u64, 9u64), (0, u64::MAX), (12_345, 678), (1, 2)] {
            let code = Agent::child_family_code(a, b);
            assert_ne!(code, a);
            assert_ne!(code, b);
            assert_eq!(code, Agent::child_family_code(b, a));
        }
    }

    #[test]
    fn test_genesis_family_code_is_deterministic() {
        assert_eq!(
            Agent::genesis_family_code("alpha"),
            Agent::genesis_family_code("alpha")
        );
        assert_ne!(
            Agent::genesis_family_code("alpha"),
            Agent::genesis_family_code("beta")
        );
    }

    #[test]
    fn test_trait_access() {
        let mut agent = agent("alpha", 0, 7);
        assert_eq!(agent.trait_keys(), vec![[1; 32], [2; 32]]);
        assert_eq!(agent.trait_details(&[1; 32]), Some((100, 5)));
        assert_eq!(agent.trait_details(&[9; 32]), None);

        agent.set_trait(&[2; 32], 77).unwrap();
        assert_eq!(agent.trait_details(&[2; 32]), Some((77, 3)));
        assert_eq!(
            agent.set_trait(&[9; 32], 1).unwrap_err(),
            RegistryError::UnknownTrait.into()
        );
    }

    #[test]
    fn test_bootstrap_fires_once() {
        let curve = curve();
        let mut market = MarketState::default();
        let goal = 5_000_000;
        let lot = 2_000 * TOKEN_UNIT as u64;

        // Two buys reach the goal for the first time
        let cost = curve.cost(market.supply, lot).unwrap();
        assert!(!market.record_buy(&curve, lot, cost, goal).unwrap());
        let cost = curve.cost(market.supply, lot).unwrap();
        assert!(!market.record_buy(&curve, lot, cost, goal).unwrap());
        let cost = curve.cost(market.supply, lot).unwrap();
        assert!(market.record_buy(&curve, lot, cost, goal).unwrap());
        assert!(market.liquidity_bootstrapped);

        // Partial sell drops funding back under the goal
        let gross = curve.cost(market.supply - lot, lot).unwrap();
        market.record_sell(&curve, lot, gross).unwrap();
        assert!(market.funding_raised < goal);

        // Crossing again does not bootstrap a second time
        let cost = curve.cost(market.supply, lot).unwrap();
        assert!(!market.record_buy(&curve, lot, cost, goal).unwrap());
        assert!(market.funding_raised >= goal);
    }

    #[test]
    fn test_funding_floors_at_zero() {
        let curve = curve();
        let mut market = MarketState {
            supply: 10 * TOKEN_UNIT as u64,
            funding_raised: 100,
            ..Default::default()
        };
        market
            .record_sell(&curve, 10 * TOKEN_UNIT as u64, 10_000)
            .unwrap();
        assert_eq!(market.funding_raised, 0);
        assert_eq!(market.supply, 0);
        assert_eq!(market.market_cap, 0);
    }

    #[test]
    fn test_liquidity_contribution_is_sixty_percent() {
        let market = MarketState {
            funding_raised: 1_000_001,
            ..Default::default()
        };
        assert_eq!(market.liquidity_contribution(6_000).unwrap(), 600_000);
    }

    #[test]
    fn test_profile_limits() {
        let mut profile = AgentProfile {
            name: "Alpha".to_string(),
            symbol: "ALPH".to_string(),
            description: String::new(),
            image: "https://example.com/a.png".to_string(),
        };
        assert!(profile.validate().is_ok());

        profile.symbol = "X".repeat(MAX_SYMBOL_LEN + 1);
        assert_eq!(
            profile.validate().unwrap_err(),
            RegistryError::FieldTooLong.into()
        );

        assert!(validate_agent_id(&"a".repeat(MAX_ID_LEN)).is_ok());
        assert!(validate_agent_id(&"a".repeat(MAX_ID_LEN + 1)).is_err());
        assert!(validate_agent_id("").is_err());
    }
}
