//! Breeding Proposal State
//!
//! A proposal pairs two agents and carries the child's metadata. Guardians
//! vote on it inside a fixed window; the vote that reaches quorum executes
//! the breeding in the same instruction.
//!
//! ```text
//!   submit_proposal          vote (approvals < quorum)
//!  ───────────────▶ Proposed ─────────────▶ Voting ──┐
//!                      │                      ▲      │ vote
//!                      │                      └──────┘
//!                      │ vote reaching quorum        │ vote reaching quorum
//!                      └──────────────▶ Executed ◀───┘
//! ```
//!
//! There is no rejected state. Once the window closes further votes fail,
//! so a proposal that missed quorum simply stays in `Voting` forever.

use anchor_lang::prelude::*;

use crate::state::{Agent, AgentProfile, Config, MAX_VOTERS};

#[error_code]
pub enum BreedingError {
    #[msg("Parents belong to the same family")]
    SameFamily,
    #[msg("Generation gap between parents is too large")]
    GenerationGapTooLarge,
    #[msg("Parent fitness below breeding threshold")]
    FitnessBelowThreshold,
    #[msg("Parent market cap below breeding threshold")]
    MarketCapBelowThreshold,
    #[msg("Parent is in cooldown")]
    ParentInCooldown,
    #[msg("Payment below proposal cost")]
    PaymentBelowCost,
    #[msg("Child agent id is already registered")]
    ChildAlreadyExists,
    #[msg("Proposal already executed")]
    AlreadyExecuted,
    #[msg("Guardian already voted on this proposal")]
    AlreadyVoted,
    #[msg("Voting window has closed")]
    VotingClosed,
    #[msg("Proposal cannot hold more votes")]
    VoterCapacityReached,
}

/// Breeding proposal account
///
/// Seeds: ["proposal", config, id.to_le_bytes()]
#[account]
#[derive(InitSpace)]
pub struct BreedingProposal {
    /// Sequential proposal id
    pub id: u64,

    pub proposer: Pubkey,

    /// Reference parent: the child inherits its trait keys
    pub parent_a: Pubkey,

    pub parent_b: Pubkey,

    /// Unix timestamp of submission; the voting window starts here
    pub created_at: i64,

    pub approvals: u8,

    pub executed: bool,

    /// Guardians that already voted
    #[max_len(16)]
    pub voters: Vec<Pubkey>,

    /// Id the child agent will be registered under
    #[max_len(32)]
    pub child_id: String,

    pub child_profile: AgentProfile,

    /// PDA bump seed
    pub bump: u8,
}

/// Proposal lifecycle status
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProposalStatus {
    /// Submitted, no votes yet
    Proposed,
    /// At least one vote, quorum not reached
    Voting,
    /// Child created
    Executed,
}

impl BreedingProposal {
    pub const SEED: &'static [u8] = b"proposal";

    pub fn status(&self) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else if self.approvals == 0 {
            ProposalStatus::Proposed
        } else {
            ProposalStatus::Voting
        }
    }

    /// Votes are accepted up to and including `created_at + window`
    pub fn voting_open(&self, now: i64, window: i64) -> bool {
        now <= self.created_at.saturating_add(window)
    }

    pub fn has_voted(&self, voter: &Pubkey) -> bool {
        self.voters.contains(voter)
    }

    /// Record one guardian vote
    ///
    /// Returns `true` when this vote brings approvals to `required`.
    pub fn record_vote(
        &mut self,
        voter: Pubkey,
        now: i64,
        window: i64,
        required: u8,
    ) -> Result<bool> {
        require!(!self.executed, BreedingError::AlreadyExecuted);
        require!(self.voting_open(now, window), BreedingError::VotingClosed);
        require!(!self.has_voted(&voter), BreedingError::AlreadyVoted);
        require!(
            self.voters.len() < MAX_VOTERS,
            BreedingError::VoterCapacityReached
        );

        self.voters.push(voter);
        self.approvals = self.approvals.saturating_add(1);

        Ok(self.approvals >= required)
    }

    /// Flip `executed`, refusing a second execution
    pub fn mark_executed(&mut self) -> Result<()> {
        require!(!self.executed, BreedingError::AlreadyExecuted);
        self.executed = true;
        Ok(())
    }
}

/// Eligibility rules for a breeding pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreedingRules {
    pub min_fitness: u64,
    pub min_market_cap: u64,
    pub max_generation_gap: u32,
}

impl BreedingRules {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_fitness: config.min_fitness,
            min_market_cap: config.min_market_cap,
            max_generation_gap: config.max_generation_gap,
        }
    }

    /// Check both parents against the registry at `now`
    ///
    /// Family codes are compared first: equal codes are rejected whatever
    /// the other fields hold.
    pub fn validate_pair(&self, parent_a: &Agent, parent_b: &Agent, now: i64) -> Result<()> {
        let a = parent_a.details(now);
        let b = parent_b.details(now);

        require!(a.family_code != b.family_code, BreedingError::SameFamily);
        require!(
            a.generation.abs_diff(b.generation) <= self.max_generation_gap,
            BreedingError::GenerationGapTooLarge
        );
        require!(
            !parent_a.in_cooldown && !parent_b.in_cooldown,
            BreedingError::ParentInCooldown
        );
        require!(
            a.fitness >= self.min_fitness && b.fitness >= self.min_fitness,
            BreedingError::FitnessBelowThreshold
        );
        require!(
            parent_a.market.market_cap >= self.min_market_cap
                && parent_b.market.market_cap >= self.min_market_cap,
            BreedingError::MarketCapBelowThreshold
        );

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{agent, proposal};

    const WINDOW: i64 = 24 * 60 * 60;
    const QUORUM: u8 = 6;

    fn rules() -> BreedingRules {
        BreedingRules {
            min_fitness: 1_000,
            min_market_cap: 0,
            max_generation_gap: 2,
        }
    }

    fn fit_agent(id: &str, generation: u32, family_code: u64) -> Agent {
        let mut agent = agent(id, generation, family_code);
        agent.market.market_cap = 10_000;
        agent
    }

    #[test]
    fn test_valid_pair_accepted() {
        let a = fit_agent("alpha", 0, 1);
        let b = fit_agent("beta", 2, 2);
        assert!(rules().validate_pair(&a, &b, 0).is_ok());
    }

    #[test]
    fn test_same_family_rejected_regardless_of_other_fields() {
        let a = fit_agent("alpha", 0, 5);
        let mut b = fit_agent("beta", 9, 5);
        b.in_cooldown = true;
        b.market.market_cap = 0;
        assert_eq!(
            rules().validate_pair(&a, &b, 0).unwrap_err(),
            BreedingError::SameFamily.into()
        );
    }

    #[test]
    fn test_generation_gap_rejected() {
        let a = fit_agent("alpha", 1, 1);
        let b = fit_agent("beta", 4, 2);
        assert_eq!(
            rules().validate_pair(&a, &b, 0).unwrap_err(),
            BreedingError::GenerationGapTooLarge.into()
        );
        assert_eq!(
            rules().validate_pair(&b, &a, 0).unwrap_err(),
            BreedingError::GenerationGapTooLarge.into()
        );
    }

    #[test]
    fn test_low_fitness_rejected() {
        let a = fit_agent("alpha", 0, 1);
        let mut b = fit_agent("beta", 0, 2);
        // 2_000 · 40 / 100 = 800 < 1_000
        b.market.market_cap = 2_000;
        assert_eq!(
            rules().validate_pair(&a, &b, 0).unwrap_err(),
            BreedingError::FitnessBelowThreshold.into()
        );
    }

    #[test]
    fn test_market_cap_threshold_rejected() {
        let a = fit_agent("alpha", 0, 1);
        let b = fit_agent("beta", 0, 2);
        let strict = BreedingRules {
            min_market_cap: 20_000,
            ..rules()
        };
        assert_eq!(
            strict.validate_pair(&a, &b, 0).unwrap_err(),
            BreedingError::MarketCapBelowThreshold.into()
        );
    }

    #[test]
    fn test_parent_in_cooldown_rejected() {
        let mut a = fit_agent("alpha", 0, 1);
        let b = fit_agent("beta", 0, 2);
        a.start_cooldown(0).unwrap();
        assert_eq!(
            rules().validate_pair(&a, &b, 0).unwrap_err(),
            BreedingError::ParentInCooldown.into()
        );
    }

    /// Votes from `count` distinct guardians at `now`; returns how many
    /// times quorum triggered an execution
    fn cast_votes(proposal: &mut BreedingProposal, count: usize, now: i64) -> usize {
        let mut executions = 0;
        for _ in 0..count {
            if proposal
                .record_vote(Pubkey::new_unique(), now, WINDOW, QUORUM)
                .unwrap()
            {
                proposal.mark_executed().unwrap();
                executions += 1;
            }
        }
        executions
    }

    #[test]
    fn test_sixth_vote_executes_once() {
        let mut proposal = proposal(1_000);
        assert_eq!(proposal.status(), ProposalStatus::Proposed);

        assert_eq!(cast_votes(&mut proposal, 5, 1_000), 0);
        assert_eq!(proposal.status(), ProposalStatus::Voting);

        assert_eq!(cast_votes(&mut proposal, 1, 2_000), 1);
        assert_eq!(proposal.status(), ProposalStatus::Executed);
        assert_eq!(proposal.approvals, 6);

        // A seventh vote after execution
        assert_eq!(
            proposal
                .record_vote(Pubkey::new_unique(), 2_001, WINDOW, QUORUM)
                .unwrap_err(),
            BreedingError::AlreadyExecuted.into()
        );
        assert_eq!(
            proposal.mark_executed().unwrap_err(),
            BreedingError::AlreadyExecuted.into()
        );
    }

    #[test]
    fn test_sixth_vote_after_window_rejected() {
        let mut proposal = proposal(1_000);
        assert_eq!(cast_votes(&mut proposal, 5, 1_000 + WINDOW), 0);

        assert_eq!(
            proposal
                .record_vote(Pubkey::new_unique(), 1_000 + WINDOW + 1, WINDOW, QUORUM)
                .unwrap_err(),
            BreedingError::VotingClosed.into()
        );
        assert!(!proposal.executed);
        assert_eq!(proposal.approvals, 5);
        assert_eq!(proposal.status(), ProposalStatus::Voting);
    }

    #[test]
    fn test_double_vote_rejected() {
        let mut proposal = proposal(0);
        let guardian = Pubkey::new_unique();
        proposal.record_vote(guardian, 10, WINDOW, QUORUM).unwrap();
        assert_eq!(
            proposal
                .record_vote(guardian, 11, WINDOW, QUORUM)
                .unwrap_err(),
            BreedingError::AlreadyVoted.into()
        );
        assert_eq!(proposal.approvals, 1);
    }

    #[test]
    fn test_voter_capacity() {
        let mut proposal = proposal(0);
        // Quorum above capacity never triggers
        assert_eq!(cast_votes_with_quorum(&mut proposal, MAX_VOTERS, u8::MAX), 0);
        assert_eq!(
            proposal
                .record_vote(Pubkey::new_unique(), 0, WINDOW, u8::MAX)
                .unwrap_err(),
            BreedingError::VoterCapacityReached.into()
        );
    }

    fn cast_votes_with_quorum(proposal: &mut BreedingProposal, count: usize, quorum: u8) -> usize {
        (0..count)
            .filter(|_| {
                proposal
                    .record_vote(Pubkey::new_unique(), 0, WINDOW, quorum)
                    .unwrap()
            })
            .count()
    }
}
