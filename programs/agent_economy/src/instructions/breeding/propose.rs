//! Breeding Proposals
//!
//! Anyone holding the proposal fee can pair two eligible agents. The pair
//! is checked against the registry at submission time; the child id is
//! reserved only in the sense that it must not exist yet.

use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked},
};

use crate::guard::{lock_account, persist, OperationLock};
use crate::instructions::TradeError;
use crate::state::{
    validate_agent_id, Agent, AgentProfile, BreedingError, BreedingProposal, BreedingRules, Config,
};

/// Event emitted when a breeding proposal is submitted
#[event]
pub struct BreedingProposed {
    pub proposal: Pubkey,
    pub proposal_id: u64,
    pub proposer: Pubkey,
    pub parent_a: Pubkey,
    pub parent_b: Pubkey,
    pub child_id: String,
}

#[derive(Accounts)]
#[instruction(child_id: String)]
pub struct SubmitProposal<'info> {
    #[account(mut)]
    pub proposer: Signer<'info>,

    #[account(
        mut,
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, Config>>,

    /// Reference parent
    #[account(
        seeds = [Agent::SEED, parent_a.id.as_bytes()],
        bump = parent_a.bump,
    )]
    pub parent_a: Box<Account<'info, Agent>>,

    #[account(
        seeds = [Agent::SEED, parent_b.id.as_bytes()],
        bump = parent_b.bump,
    )]
    pub parent_b: Box<Account<'info, Agent>>,

    /// CHECK: Address the child will be registered at; must still be empty
    #[account(
        seeds = [Agent::SEED, child_id.as_bytes()],
        bump,
    )]
    pub child_agent: UncheckedAccount<'info>,

    #[account(
        init,
        payer = proposer,
        space = 8 + BreedingProposal::INIT_SPACE,
        seeds = [
            BreedingProposal::SEED,
            config.key().as_ref(),
            config.proposal_count.to_le_bytes().as_ref(),
        ],
        bump,
    )]
    pub proposal: Box<Account<'info, BreedingProposal>>,

    #[account(address = config.payment_mint)]
    pub payment_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        associated_token::mint = payment_mint,
        associated_token::authority = proposer,
        associated_token::token_program = token_program,
    )]
    pub proposer_payment: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Protocol fee treasury
    #[account(
        mut,
        associated_token::mint = payment_mint,
        associated_token::authority = config,
        associated_token::token_program = token_program,
    )]
    pub treasury: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

impl<'info> SubmitProposal<'info> {
    pub fn submit_proposal(
        &mut self,
        child_id: String,
        child_profile: AgentProfile,
        payment: u64,
        bumps: &SubmitProposalBumps,
    ) -> Result<()> {
        let clock = Clock::get()?;

        lock_account(&mut *self.config, |config| config)?;

        BreedingRules::from_config(&self.config).validate_pair(
            &self.parent_a,
            &self.parent_b,
            clock.unix_timestamp,
        )?;

        validate_agent_id(&child_id)?;
        child_profile.validate()?;
        require!(
            self.child_agent.data_is_empty(),
            BreedingError::ChildAlreadyExists
        );

        require!(
            payment >= self.config.proposal_cost,
            BreedingError::PaymentBelowCost
        );
        require!(
            self.proposer_payment.amount >= payment,
            TradeError::InsufficientFunds
        );

        let proposal_id = self.config.proposal_count;

        self.proposal.set_inner(BreedingProposal {
            id: proposal_id,
            proposer: self.proposer.key(),
            parent_a: self.parent_a.key(),
            parent_b: self.parent_b.key(),
            created_at: clock.unix_timestamp,
            approvals: 0,
            executed: false,
            voters: Vec::new(),
            child_id: child_id.clone(),
            child_profile,
            bump: bumps.proposal,
        });

        self.config.proposal_count += 1;
        persist(&*self.config)?;
        persist(&*self.proposal)?;

        transfer_checked(
            CpiContext::new(
                self.token_program.to_account_info(),
                TransferChecked {
                    from: self.proposer_payment.to_account_info(),
                    mint: self.payment_mint.to_account_info(),
                    to: self.treasury.to_account_info(),
                    authority: self.proposer.to_account_info(),
                },
            ),
            payment,
            self.payment_mint.decimals,
        )?;

        msg!(
            "Breeding proposal {}: {} x {} -> {}",
            proposal_id,
            self.parent_a.id,
            self.parent_b.id,
            child_id
        );

        emit!(BreedingProposed {
            proposal: self.proposal.key(),
            proposal_id,
            proposer: self.proposer.key(),
            parent_a: self.parent_a.key(),
            parent_b: self.parent_b.key(),
            child_id,
        });

        self.config.unlock();

        Ok(())
    }
}
