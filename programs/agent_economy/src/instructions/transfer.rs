//! Agent Token Transfer Hook
//!
//! Agent mints are Token-2022 mints whose transfer hook points at this
//! program, so every `transfer_checked` of an agent token, from any wallet
//! or program, calls back into `transfer_agent_tokens`. A cooling-down
//! agent's token is frozen in place until `end_cooldown` runs.
//!
//! Token-2022 resolves the hook's extra accounts from the list written by
//! `open_agent_vaults`. It holds a single fixed entry, the agent account.
//!
//! Curve trades mint and burn, which never invoke the hook.

use anchor_lang::prelude::*;
use anchor_spl::{
    token_2022::spl_token_2022::{
        extension::{transfer_hook::TransferHookAccount, BaseStateWithExtensions, StateWithExtensions},
        state::Account as Token2022Account,
    },
    token_interface::{Mint, TokenAccount},
};
use spl_tlv_account_resolution::account::ExtraAccountMeta;

use crate::state::Agent;

pub const EXTRA_ACCOUNT_METAS_SEED: &[u8] = b"extra-account-metas";

/// Extra accounts the hook needs beyond the standard execute accounts
pub const EXTRA_ACCOUNT_METAS_LEN: usize = 1;

/// Event emitted for every agent token transfer
#[event]
pub struct AgentTokensTransferred {
    pub agent: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

/// Accounts in the order Token-2022 passes them to a transfer hook
#[derive(Accounts)]
pub struct TransferAgentTokens<'info> {
    #[account(token::mint = agent_mint)]
    pub source_tokens: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(address = agent.mint)]
    pub agent_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(token::mint = agent_mint)]
    pub destination_tokens: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: Owner or delegate of the source account, verified by Token-2022
    pub authority: UncheckedAccount<'info>,

    /// CHECK: Extra account list for this mint
    #[account(
        seeds = [EXTRA_ACCOUNT_METAS_SEED, agent_mint.key().as_ref()],
        bump,
    )]
    pub extra_account_meta_list: UncheckedAccount<'info>,

    #[account(
        seeds = [Agent::SEED, agent.id.as_bytes()],
        bump = agent.bump,
    )]
    pub agent: Box<Account<'info, Agent>>,
}

impl<'info> TransferAgentTokens<'info> {
    pub fn transfer_agent_tokens(&mut self, amount: u64) -> Result<()> {
        // Only Token-2022 mid-transfer may drive the hook
        require!(
            is_transferring(&self.source_tokens.to_account_info())?,
            TransferHookError::NotTransferring
        );

        self.agent.ensure_transferable()?;

        emit!(AgentTokensTransferred {
            agent: self.agent.key(),
            from: self.source_tokens.owner,
            to: self.destination_tokens.owner,
            amount,
        });

        Ok(())
    }
}

/// Accounts Token-2022 appends to every hook call for the agent's mint
pub fn extra_account_metas(agent: &Pubkey) -> Result<Vec<ExtraAccountMeta>> {
    Ok(vec![ExtraAccountMeta::new_with_pubkey(agent, false, false)?])
}

/// Whether Token-2022 flagged the token account as the source of an
/// in-flight transfer
pub fn is_transferring(token_account: &AccountInfo) -> Result<bool> {
    let data = token_account.try_borrow_data()?;
    let account = StateWithExtensions::<Token2022Account>::unpack(&data)?;
    let extension = account.get_extension::<TransferHookAccount>()?;
    Ok(bool::from(extension.transferring))
}

#[error_code]
pub enum TransferHookError {
    #[msg("Hook called outside a token transfer")]
    NotTransferring,
}
