//! Agent Registry Maintenance
//!
//! Small instructions that keep agent accounts current:
//! - `end_cooldown` - anyone may release an agent whose cooldown elapsed
//! - `refresh_fitness` - anyone may snapshot the agent's current fitness
//!   for off-chain readers
//! - `set_trait` - the admin adjusts a trait value

use anchor_lang::prelude::*;

use crate::instructions::AccessError;
use crate::state::{Agent, Config};

/// Event emitted when an agent leaves cooldown
#[event]
pub struct CooldownEnded {
    pub agent: Pubkey,
    pub started_at: i64,
    pub ended_at: i64,
}

/// Event emitted when an agent's stored fitness is refreshed
#[event]
pub struct FitnessUpdated {
    pub agent: Pubkey,
    pub fitness: u64,
    pub market_cap: u64,
    pub funding_raised: u64,
}

/// Event emitted when the admin sets a trait value
#[event]
pub struct TraitUpdated {
    pub agent: Pubkey,
    pub key: [u8; 32],
    pub value: u64,
}

/// Accounts shared by the permissionless maintenance instructions
#[derive(Accounts)]
pub struct TouchAgent<'info> {
    pub caller: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, Config>>,

    #[account(
        mut,
        seeds = [Agent::SEED, agent.id.as_bytes()],
        bump = agent.bump,
    )]
    pub agent: Box<Account<'info, Agent>>,
}

impl<'info> TouchAgent<'info> {
    pub fn end_cooldown(&mut self) -> Result<()> {
        let clock = Clock::get()?;
        let started_at = self.agent.cooldown_started_at;

        self.agent
            .end_cooldown(clock.unix_timestamp, self.config.cooldown_period)?;

        msg!("Cooldown ended for {}", self.agent.id);

        emit!(CooldownEnded {
            agent: self.agent.key(),
            started_at,
            ended_at: clock.unix_timestamp,
        });

        Ok(())
    }

    pub fn refresh_fitness(&mut self) -> Result<u64> {
        let clock = Clock::get()?;
        let fitness = self.agent.refresh_fitness(clock.unix_timestamp);

        emit!(FitnessUpdated {
            agent: self.agent.key(),
            fitness,
            market_cap: self.agent.market.market_cap,
            funding_raised: self.agent.market.funding_raised,
        });

        Ok(fitness)
    }
}

#[derive(Accounts)]
pub struct SetTrait<'info> {
    #[account(constraint = admin.key() == config.admin @ AccessError::Unauthorized)]
    pub admin: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, Config>>,

    #[account(
        mut,
        seeds = [Agent::SEED, agent.id.as_bytes()],
        bump = agent.bump,
    )]
    pub agent: Box<Account<'info, Agent>>,
}

impl<'info> SetTrait<'info> {
    pub fn set_trait(&mut self, key: [u8; 32], value: u64) -> Result<()> {
        self.agent.set_trait(&key, value)?;

        emit!(TraitUpdated {
            agent: self.agent.key(),
            key,
            value,
        });

        Ok(())
    }
}
