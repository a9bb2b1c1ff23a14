//! State structures for the agent economy

pub mod agent;
pub mod config;
pub mod guardian;
pub mod pool;
pub mod proposal;

pub use agent::*;
pub use config::*;
pub use guardian::*;
pub use pool::*;
pub use proposal::*;

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use anchor_lang::prelude::*;

    pub fn config_with_keys(keys: &[[u8; 32]]) -> Config {
        let params = ProtocolParams::default();
        Config {
            admin: Pubkey::new_unique(),
            payment_mint: Pubkey::new_unique(),
            fee_bps: params.fee_bps,
            creation_cost: params.creation_cost,
            proposal_cost: params.proposal_cost,
            initial_price: params.initial_price,
            growth_rate: params.growth_rate,
            funding_goal: params.funding_goal,
            reserve_allocation: params.reserve_allocation,
            liquidity_share_bps: params.liquidity_share_bps,
            required_approvals: params.required_approvals,
            voting_window: params.voting_window,
            cooldown_period: params.cooldown_period,
            min_fitness: params.min_fitness,
            min_market_cap: params.min_market_cap,
            max_generation_gap: params.max_generation_gap,
            trait_keys: keys.to_vec(),
            agent_count: 0,
            proposal_count: 0,
            locked: false,
            bump: 255,
        }
    }

    /// Genesis-style agent with traits [1;32] = (100, 5) and [2;32] = (200, 3)
    pub fn agent(id: &str, generation: u32, family_code: u64) -> Agent {
        Agent {
            id: id.to_string(),
            mint: Pubkey::new_unique(),
            creator: Pubkey::new_unique(),
            serial_number: 0,
            generation,
            family_code,
            parent_a: Pubkey::default(),
            parent_b: Pubkey::default(),
            profile: AgentProfile {
                name: id.to_string(),
                symbol: "AGT".to_string(),
                ..Default::default()
            },
            market: MarketState::default(),
            fitness: 0,
            created_at: 0,
            last_activity_time: 0,
            in_cooldown: false,
            cooldown_started_at: 0,
            traits: vec![
                Trait {
                    key: [1; 32],
                    value: 100,
                    dominance: 5,
                },
                Trait {
                    key: [2; 32],
                    value: 200,
                    dominance: 3,
                },
            ],
            bump: 255,
        }
    }

    pub fn proposal(created_at: i64) -> BreedingProposal {
        BreedingProposal {
            id: 0,
            proposer: Pubkey::new_unique(),
            parent_a: Pubkey::new_unique(),
            parent_b: Pubkey::new_unique(),
            created_at,
            approvals: 0,
            executed: false,
            voters: Vec::new(),
            child_id: "child".to_string(),
            child_profile: AgentProfile::default(),
            bump: 255,
        }
    }
}
