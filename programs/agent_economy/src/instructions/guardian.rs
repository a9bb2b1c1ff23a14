//! Guardian Management
//!
//! The admin grants and revokes the guardian role. Guardians are the only
//! accounts allowed to vote on breeding proposals.

use anchor_lang::prelude::*;

use crate::state::{Config, Guardian};

/// Event emitted when a wallet becomes a guardian
#[event]
pub struct GuardianGranted {
    pub wallet: Pubkey,
    pub granted_by: Pubkey,
}

/// Event emitted when a wallet loses the guardian role
#[event]
pub struct GuardianRevoked {
    pub wallet: Pubkey,
    pub revoked_by: Pubkey,
}

#[derive(Accounts)]
#[instruction(wallet: Pubkey)]
pub struct GrantGuardian<'info> {
    #[account(
        mut,
        constraint = admin.key() == config.admin @ AccessError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = admin,
        space = 8 + Guardian::INIT_SPACE,
        seeds = [Guardian::SEED, wallet.as_ref()],
        bump,
    )]
    pub guardian: Account<'info, Guardian>,

    pub system_program: Program<'info, System>,
}

impl<'info> GrantGuardian<'info> {
    pub fn grant_guardian(&mut self, wallet: Pubkey, bumps: &GrantGuardianBumps) -> Result<()> {
        let clock = Clock::get()?;

        self.guardian.set_inner(Guardian {
            wallet,
            granted_at: clock.unix_timestamp,
            bump: bumps.guardian,
        });

        msg!("Guardian granted: {}", wallet);

        emit!(GuardianGranted {
            wallet,
            granted_by: self.admin.key(),
        });

        Ok(())
    }
}

#[derive(Accounts)]
pub struct RevokeGuardian<'info> {
    #[account(
        mut,
        constraint = admin.key() == config.admin @ AccessError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        close = admin,
        seeds = [Guardian::SEED, guardian.wallet.as_ref()],
        bump = guardian.bump,
    )]
    pub guardian: Account<'info, Guardian>,
}

impl<'info> RevokeGuardian<'info> {
    pub fn revoke_guardian(&mut self) -> Result<()> {
        msg!("Guardian revoked: {}", self.guardian.wallet);

        emit!(GuardianRevoked {
            wallet: self.guardian.wallet,
            revoked_by: self.admin.key(),
        });

        Ok(())
    }
}

#[error_code]
pub enum AccessError {
    #[msg("Only the protocol admin can perform this action")]
    Unauthorized,
}
