//! # Agent Economy: Evolving Agent Tokens
//!
//! Every agent is an on-chain account with a genome and its own token.
//!
//! ## Overview
//!
//! Agents are registered for a fee and their tokens trade against an
//! exponential bonding curve. Once an agent's curve raises enough funding,
//! part of it seeds a liquidity pool. Sufficiently fit agents from
//! different families can be bred: guardians vote on the pairing, and the
//! vote that reaches quorum creates a child agent whose traits are crossed
//! over from its parents.
//!
//! ## How it works
//! - `amm` prices trades with WAD fixed-point math.
//! - `genetics` crosses traits, with injectable mutation entropy.
//! - `guard` blocks re-entrant calls on value-moving instructions.
//! - Agent mints are Token-2022 mints whose transfer hook is this program.
//!

use anchor_lang::prelude::*;

pub mod amm;
pub mod genetics;
pub mod guard;
pub mod instructions;
pub mod state;

pub use amm::*;
pub use instructions::*;
pub use state::{AgentProfile, ProtocolParams, Trait};

// Replace with your deployed program ID
declare_id!("8NeEkxgPMV5AnZ8o5ksjPhqsHwkWXdvGCGyHmEt6tJTn");

/// Main Agent Economy program
#[program]
pub mod agent_economy {
    use super::*;

    /// Initialize the protocol with global configuration
    pub fn initialize(ctx: Context<Initialize>, params: ProtocolParams) -> Result<()> {
        ctx.accounts.initialize(params, &ctx.bumps)
    }

    /// Give a wallet the right to vote on breeding proposals
    pub fn grant_guardian(ctx: Context<GrantGuardian>, wallet: Pubkey) -> Result<()> {
        ctx.accounts.grant_guardian(wallet, &ctx.bumps)
    }

    /// Remove a guardian
    pub fn revoke_guardian(ctx: Context<RevokeGuardian>) -> Result<()> {
        ctx.accounts.revoke_guardian()
    }

    /// Register a genesis agent and its mint (Step 1)
    pub fn create_agent(
        ctx: Context<CreateAgent>,
        agent_id: String,
        profile: AgentProfile,
        traits: Vec<Trait>,
        payment: u64,
    ) -> Result<()> {
        ctx.accounts
            .create_agent(agent_id, profile, traits, payment, &ctx.bumps)
    }

    /// Create the reserve vault and liquidity pool accounts (Step 2)
    pub fn open_agent_vaults(ctx: Context<OpenAgentVaults>) -> Result<()> {
        ctx.accounts.open_agent_vaults(&ctx.bumps)
    }

    /// Buy agent tokens from the curve
    pub fn buy_tokens(ctx: Context<Trade>, amount: u64, max_payment: u64) -> Result<u64> {
        ctx.accounts.buy_tokens(amount, max_payment)
    }

    /// Sell agent tokens back to the curve
    pub fn sell_tokens(ctx: Context<Trade>, amount: u64, min_proceeds: u64) -> Result<u64> {
        ctx.accounts.sell_tokens(amount, min_proceeds)
    }

    /// Transfer hook for agent mints: rejects transfers during cooldown
    #[interface(spl_transfer_hook_interface::execute)]
    pub fn transfer_agent_tokens(ctx: Context<TransferAgentTokens>, amount: u64) -> Result<()> {
        ctx.accounts.transfer_agent_tokens(amount)
    }

    /// Propose breeding two agents
    pub fn submit_proposal(
        ctx: Context<SubmitProposal>,
        child_id: String,
        child_profile: AgentProfile,
        payment: u64,
    ) -> Result<()> {
        ctx.accounts
            .submit_proposal(child_id, child_profile, payment, &ctx.bumps)
    }

    /// Guardian vote; executes the breeding on quorum
    pub fn vote(ctx: Context<Vote>) -> Result<()> {
        ctx.accounts.vote(&ctx.bumps)
    }

    /// Release an agent whose cooldown has elapsed (permissionless)
    pub fn end_cooldown(ctx: Context<TouchAgent>) -> Result<()> {
        ctx.accounts.end_cooldown()
    }

    /// Store an agent's current fitness (permissionless)
    pub fn refresh_fitness(ctx: Context<TouchAgent>) -> Result<u64> {
        ctx.accounts.refresh_fitness()
    }

    /// Overwrite a trait value (admin only)
    pub fn set_trait(ctx: Context<SetTrait>, key: [u8; 32], value: u64) -> Result<()> {
        ctx.accounts.set_trait(key, value)
    }
}
