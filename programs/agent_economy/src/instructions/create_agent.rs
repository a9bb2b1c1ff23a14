//! Agent Creation Pipeline
//!
//! Creating a tradable genesis agent takes two instructions. Solana's 4KB
//! stack cannot hold every account in one frame, so the work is split:
//!
//! Step 1: CreateAgent - Registers the agent and its Token-2022 mint
//!         (payable). The mint routes every transfer through this
//!         program's transfer hook.
//! Step 2: OpenAgentVaults - Creates the curve reserve vault, the
//!         still-closed liquidity pool with its two vaults, and the
//!         hook's extra account list.
//!
//! Agents born from breeding skip step 1 (the winning vote creates them) but
//! still need step 2 before they can be traded.

use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_2022::Token2022,
    token_interface::{transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked},
};
use spl_tlv_account_resolution::state::ExtraAccountMetaList;
use spl_transfer_hook_interface::instruction::ExecuteInstruction;

use crate::amm::TOKEN_DECIMALS;
use crate::guard::{lock_account, persist, OperationLock};
use crate::instructions::{extra_account_metas, EXTRA_ACCOUNT_METAS_LEN, EXTRA_ACCOUNT_METAS_SEED};
use crate::state::{
    validate_agent_id, Agent, AgentProfile, Config, LiquidityPool, MarketState, RegistryError,
    Trait,
};

// =============================================================================
// STEP 1: CREATE AGENT
// =============================================================================

/// Event emitted when an agent is registered (genesis or bred)
#[event]
pub struct AgentDeployed {
    pub agent_id: String,
    pub agent: Pubkey,
    pub mint: Pubkey,
    pub creator: Pubkey,
    pub serial_number: u64,
    pub generation: u32,
    pub family_code: u64,
}

#[derive(Accounts)]
#[instruction(agent_id: String)]
pub struct CreateAgent<'info> {
    /// Agent creator (pays the creation cost and rent)
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        mut,
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, Config>>,

    #[account(
        init,
        payer = creator,
        space = 8 + Agent::INIT_SPACE,
        seeds = [Agent::SEED, agent_id.as_bytes()],
        bump,
    )]
    pub agent: Box<Account<'info, Agent>>,

    /// Agent token mint, minted only by the config PDA
    #[account(
        init,
        payer = creator,
        mint::decimals = TOKEN_DECIMALS,
        mint::authority = config,
        mint::token_program = agent_token_program,
        extensions::transfer_hook::authority = config,
        extensions::transfer_hook::program_id = crate::ID,
        seeds = [Agent::MINT_SEED, agent.key().as_ref()],
        bump,
    )]
    pub agent_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        constraint = payment_mint.key() == config.payment_mint @ CreateAgentError::WrongPaymentMint
    )]
    pub payment_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        associated_token::mint = payment_mint,
        associated_token::authority = creator,
        associated_token::token_program = token_program,
    )]
    pub creator_payment: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Protocol fee treasury
    #[account(
        mut,
        associated_token::mint = payment_mint,
        associated_token::authority = config,
        associated_token::token_program = token_program,
    )]
    pub treasury: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub agent_token_program: Program<'info, Token2022>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

impl<'info> CreateAgent<'info> {
    pub fn create_agent(
        &mut self,
        agent_id: String,
        profile: AgentProfile,
        traits: Vec<Trait>,
        payment: u64,
        bumps: &CreateAgentBumps,
    ) -> Result<()> {
        let clock = Clock::get()?;

        lock_account(&mut *self.config, |config| config)?;

        // Validations
        validate_agent_id(&agent_id)?;
        profile.validate()?;
        require!(
            self.config.matches_trait_universe(&traits),
            RegistryError::TraitSetMismatch
        );
        require!(
            payment >= self.config.creation_cost,
            CreateAgentError::PaymentBelowCost
        );
        require!(
            self.creator_payment.amount >= payment,
            CreateAgentError::InsufficientFunds
        );

        let serial_number = self.config.agent_count;
        let family_code = Agent::genesis_family_code(&agent_id);

        self.agent.set_inner(Agent {
            id: agent_id.clone(),
            mint: self.agent_mint.key(),
            creator: self.creator.key(),
            serial_number,
            generation: 0,
            family_code,
            parent_a: Pubkey::default(),
            parent_b: Pubkey::default(),
            profile,
            market: MarketState::default(),
            fitness: 0,
            created_at: clock.unix_timestamp,
            last_activity_time: clock.unix_timestamp,
            in_cooldown: false,
            cooldown_started_at: 0,
            traits,
            bump: bumps.agent,
        });

        self.config.agent_count += 1;
        persist(&*self.config)?;
        persist(&*self.agent)?;

        // Creation cost goes to the treasury
        transfer_checked(
            CpiContext::new(
                self.token_program.to_account_info(),
                TransferChecked {
                    from: self.creator_payment.to_account_info(),
                    mint: self.payment_mint.to_account_info(),
                    to: self.treasury.to_account_info(),
                    authority: self.creator.to_account_info(),
                },
            ),
            payment,
            self.payment_mint.decimals,
        )?;

        msg!("Agent {} deployed (serial {})", agent_id, serial_number);

        emit!(AgentDeployed {
            agent_id,
            agent: self.agent.key(),
            mint: self.agent_mint.key(),
            creator: self.creator.key(),
            serial_number,
            generation: 0,
            family_code,
        });

        self.config.unlock();

        Ok(())
    }
}

// =============================================================================
// STEP 2: OPEN AGENT VAULTS
// =============================================================================

/// Event emitted when an agent becomes tradable
#[event]
pub struct AgentVaultsOpened {
    pub agent: Pubkey,
    pub reserve_vault: Pubkey,
    pub pool: Pubkey,
}

#[derive(Accounts)]
pub struct OpenAgentVaults<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, Config>>,

    #[account(
        seeds = [Agent::SEED, agent.id.as_bytes()],
        bump = agent.bump,
    )]
    pub agent: Box<Account<'info, Agent>>,

    #[account(address = agent.mint)]
    pub agent_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(address = config.payment_mint)]
    pub payment_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Curve reserve: receives buy costs, pays sell proceeds
    #[account(
        init,
        payer = payer,
        associated_token::mint = payment_mint,
        associated_token::authority = agent,
        associated_token::token_program = token_program,
    )]
    pub reserve_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = payer,
        space = 8 + LiquidityPool::INIT_SPACE,
        seeds = [LiquidityPool::SEED, agent.key().as_ref()],
        bump,
    )]
    pub pool: Box<Account<'info, LiquidityPool>>,

    #[account(
        init,
        payer = payer,
        associated_token::mint = payment_mint,
        associated_token::authority = pool,
        associated_token::token_program = token_program,
    )]
    pub pool_payment_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = payer,
        associated_token::mint = agent_mint,
        associated_token::authority = pool,
        associated_token::token_program = agent_token_program,
    )]
    pub pool_token_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: Written by `open_agent_vaults` as the transfer hook's account list
    #[account(
        init,
        payer = payer,
        space = ExtraAccountMetaList::size_of(EXTRA_ACCOUNT_METAS_LEN)?,
        seeds = [EXTRA_ACCOUNT_METAS_SEED, agent_mint.key().as_ref()],
        bump,
    )]
    pub extra_account_meta_list: AccountInfo<'info>,

    pub token_program: Interface<'info, TokenInterface>,
    pub agent_token_program: Program<'info, Token2022>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

impl<'info> OpenAgentVaults<'info> {
    pub fn open_agent_vaults(&mut self, bumps: &OpenAgentVaultsBumps) -> Result<()> {
        self.pool.set_inner(LiquidityPool {
            agent: self.agent.key(),
            token_mint: self.agent_mint.key(),
            payment_mint: self.payment_mint.key(),
            opened: false,
            opened_at: 0,
            token_reserve: 0,
            payment_reserve: 0,
            bump: bumps.pool,
        });

        let metas = extra_account_metas(&self.agent.key())?;
        let mut data = self.extra_account_meta_list.try_borrow_mut_data()?;
        ExtraAccountMetaList::init::<ExecuteInstruction>(&mut data, &metas)?;

        emit!(AgentVaultsOpened {
            agent: self.agent.key(),
            reserve_vault: self.reserve_vault.key(),
            pool: self.pool.key(),
        });

        Ok(())
    }
}

#[error_code]
pub enum CreateAgentError {
    #[msg("Payment below creation cost")]
    PaymentBelowCost,
    #[msg("Insufficient payment token balance")]
    InsufficientFunds,
    #[msg("Payment mint does not match protocol configuration")]
    WrongPaymentMint,
}
