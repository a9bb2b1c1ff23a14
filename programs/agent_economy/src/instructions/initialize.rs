//! Protocol Initialization
//!
//! Sets up the global configuration for the agent economy and the fee
//! treasury. This is typically called once during deployment.

use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

use crate::amm::{ExponentialCurve, BPS_DENOMINATOR};
use crate::state::{Config, ProtocolParams, MAX_TRAITS, MAX_VOTERS};

/// Event emitted once the protocol is configured
#[event]
pub struct ProtocolInitialized {
    pub admin: Pubkey,
    pub payment_mint: Pubkey,
    pub fee_bps: u64,
    pub required_approvals: u8,
    pub trait_count: u8,
}

/// Accounts required for protocol initialization
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Protocol administrator (becomes the admin)
    #[account(mut)]
    pub admin: Signer<'info>,

    /// Global configuration account (created)
    #[account(
        init,
        payer = admin,
        space = 8 + Config::INIT_SPACE,
        seeds = [Config::SEED],
        bump,
    )]
    pub config: Account<'info, Config>,

    /// Payment token mint (e.g., USDC)
    pub payment_mint: InterfaceAccount<'info, Mint>,

    /// Fee treasury, owned by the config PDA
    #[account(
        init,
        payer = admin,
        associated_token::mint = payment_mint,
        associated_token::authority = config,
        associated_token::token_program = token_program,
    )]
    pub treasury: InterfaceAccount<'info, TokenAccount>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,
    /// Associated token program
    pub associated_token_program: Program<'info, AssociatedToken>,
    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> Initialize<'info> {
    /// Initialize the protocol configuration
    pub fn initialize(&mut self, params: ProtocolParams, bumps: &InitializeBumps) -> Result<()> {
        validate_params(&params)?;

        self.config.set_inner(Config {
            admin: self.admin.key(),
            payment_mint: self.payment_mint.key(),
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
            trait_keys: params.trait_keys.clone(),
            agent_count: 0,
            proposal_count: 0,
            locked: false,
            bump: bumps.config,
        });

        msg!("Protocol initialized!");
        msg!("Admin: {}", self.admin.key());
        msg!("Fee: {} bps", params.fee_bps);
        msg!("Quorum: {} guardians", params.required_approvals);

        emit!(ProtocolInitialized {
            admin: self.admin.key(),
            payment_mint: self.payment_mint.key(),
            fee_bps: params.fee_bps,
            required_approvals: params.required_approvals,
            trait_count: params.trait_keys.len() as u8,
        });

        Ok(())
    }
}

/// Reject configurations the program cannot run with
pub fn validate_params(params: &ProtocolParams) -> Result<()> {
    // Validate fee is reasonable (max 30%)
    require!(params.fee_bps <= 3000, InitializeError::FeeTooHigh);
    require!(
        params.required_approvals > 0 && params.required_approvals as usize <= MAX_VOTERS,
        InitializeError::InvalidQuorum
    );
    require!(
        params.liquidity_share_bps <= BPS_DENOMINATOR,
        InitializeError::InvalidLiquidityShare
    );
    require!(
        params.voting_window > 0 && params.cooldown_period >= 0,
        InitializeError::InvalidPeriod
    );
    require!(
        params.trait_keys.len() <= MAX_TRAITS,
        InitializeError::TooManyTraits
    );

    let mut keys = params.trait_keys.clone();
    keys.sort_unstable();
    keys.dedup();
    require!(
        keys.len() == params.trait_keys.len(),
        InitializeError::DuplicateTraitKey
    );

    ExponentialCurve::new(params.initial_price, params.growth_rate)?;

    Ok(())
}

#[error_code]
pub enum InitializeError {
    #[msg("Protocol fee cannot exceed 30%")]
    FeeTooHigh,
    #[msg("Quorum must be between 1 and the maximum voter count")]
    InvalidQuorum,
    #[msg("Liquidity share cannot exceed 100%")]
    InvalidLiquidityShare,
    #[msg("Voting window must be positive and cooldown non-negative")]
    InvalidPeriod,
    #[msg("Too many trait keys")]
    TooManyTraits,
    #[msg("Trait keys must be unique")]
    DuplicateTraitKey,
}
