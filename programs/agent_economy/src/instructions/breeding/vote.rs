//! Guardian Voting and Breeding Execution
//!
//! Each guardian votes at most once per proposal. The vote that reaches
//! quorum also executes the breeding:
//!
//! 1. Proposal marked executed
//! 2. Both parents enter cooldown
//! 3. Child traits inherited from the parents
//! 4. Child mint and child agent account created
//!
//! All of it happens inside the vote transaction, so a failure anywhere
//! leaves no half-bred child behind.
//!
//! The child accounts cannot use `init` (they only exist on the executing
//! vote), so every vote passes them as unchecked PDAs and execution creates
//! them with explicit system program calls. Anyone can send lamports to a
//! PDA address ahead of time, so creation also adopts a pre-funded address.
//!
//! The child mint gets the same transfer hook as a genesis mint.

use anchor_lang::prelude::*;
use anchor_lang::system_program::{
    allocate, assign, create_account, transfer, Allocate, Assign, CreateAccount, Transfer,
};
use anchor_spl::{
    token_2022::{
        spl_token_2022::{extension::ExtensionType, state::Mint as Token2022Mint},
        Token2022,
    },
    token_2022_extensions::{transfer_hook_initialize, TransferHookInitialize},
    token_interface::{initialize_mint2, InitializeMint2},
};

use crate::amm::TOKEN_DECIMALS;
use crate::genetics::{HashEntropy, Inheritance, InheritedTrait, TraitInheritance};
use crate::guard::{lock_account, persist, OperationLock};
use crate::instructions::AgentDeployed;
use crate::state::{Agent, BreedingError, BreedingProposal, Config, Guardian, MarketState};

/// Event emitted for every guardian vote
#[event]
pub struct GuardianVoted {
    pub proposal: Pubkey,
    pub proposal_id: u64,
    pub guardian: Pubkey,
    pub approvals: u8,
}

/// Event emitted for each trait of a new child
#[event]
pub struct TraitInherited {
    pub child_id: String,
    pub key: [u8; 32],
    pub value: u64,
    pub dominance: u64,
    pub mutated: bool,
}

/// Event emitted when a proposal executes
#[event]
pub struct BreedingSuccessful {
    pub proposal: Pubkey,
    pub child: Pubkey,
    pub child_id: String,
    pub parent_a: Pubkey,
    pub parent_b: Pubkey,
    pub generation: u32,
    pub family_code: u64,
}

#[derive(Accounts)]
pub struct Vote<'info> {
    /// Guardian casting the vote (pays child rent if this vote executes)
    #[account(mut)]
    pub voter: Signer<'info>,

    /// Proof of the guardian role
    #[account(
        seeds = [Guardian::SEED, voter.key().as_ref()],
        bump = guardian.bump,
    )]
    pub guardian: Box<Account<'info, Guardian>>,

    #[account(
        mut,
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, Config>>,

    #[account(
        mut,
        seeds = [
            BreedingProposal::SEED,
            config.key().as_ref(),
            proposal.id.to_le_bytes().as_ref(),
        ],
        bump = proposal.bump,
    )]
    pub proposal: Box<Account<'info, BreedingProposal>>,

    #[account(mut, address = proposal.parent_a)]
    pub parent_a: Box<Account<'info, Agent>>,

    #[account(mut, address = proposal.parent_b)]
    pub parent_b: Box<Account<'info, Agent>>,

    /// CHECK: Created on the executing vote
    #[account(
        mut,
        seeds = [Agent::SEED, proposal.child_id.as_bytes()],
        bump,
    )]
    pub child_agent: UncheckedAccount<'info>,

    /// CHECK: Created and initialized on the executing vote
    #[account(
        mut,
        seeds = [Agent::MINT_SEED, child_agent.key().as_ref()],
        bump,
    )]
    pub child_mint: UncheckedAccount<'info>,

    pub agent_token_program: Program<'info, Token2022>,
    pub system_program: Program<'info, System>,
}

impl<'info> Vote<'info> {
    pub fn vote(&mut self, bumps: &VoteBumps) -> Result<()> {
        let clock = Clock::get()?;

        let quorum = self.proposal.record_vote(
            self.voter.key(),
            clock.unix_timestamp,
            self.config.voting_window,
            self.config.required_approvals,
        )?;

        msg!(
            "Guardian {} voted on proposal {} ({}/{})",
            self.voter.key(),
            self.proposal.id,
            self.proposal.approvals,
            self.config.required_approvals
        );

        emit!(GuardianVoted {
            proposal: self.proposal.key(),
            proposal_id: self.proposal.id,
            guardian: self.voter.key(),
            approvals: self.proposal.approvals,
        });

        if quorum {
            self.execute(&clock, bumps)?;
        }

        Ok(())
    }

    fn execute(&mut self, clock: &Clock, bumps: &VoteBumps) -> Result<()> {
        let now = clock.unix_timestamp;

        lock_account(&mut *self.config, |config| config)?;

        self.proposal.mark_executed()?;
        self.parent_a.start_cooldown(now)?;
        self.parent_b.start_cooldown(now)?;

        let mut entropy = HashEntropy::new(&[
            &now.to_le_bytes(),
            &clock.slot.to_le_bytes(),
            self.proposal.key().as_ref(),
            self.voter.key().as_ref(),
        ]);
        let inherited =
            TraitInheritance::inherit(&self.parent_a.traits, &self.parent_b.traits, &mut entropy);

        let serial_number = self.config.agent_count;
        self.config.agent_count += 1;

        persist(&*self.proposal)?;
        persist(&*self.parent_a)?;
        persist(&*self.parent_b)?;
        persist(&*self.config)?;

        let child = offspring(
            &self.proposal,
            &self.parent_a,
            &self.parent_b,
            &inherited,
            self.child_mint.key(),
            serial_number,
            now,
            bumps.child_agent,
        );

        self.create_child_account(&child, bumps.child_agent)?;
        self.create_child_mint(bumps.child_mint)?;

        for gene in &inherited {
            emit!(TraitInherited {
                child_id: child.id.clone(),
                key: gene.inherited.key,
                value: gene.inherited.value,
                dominance: gene.inherited.dominance,
                mutated: matches!(gene.origin, Inheritance::Mutated { .. }),
            });
        }

        msg!(
            "Bred {} (generation {}) from {} x {}",
            child.id,
            child.generation,
            self.parent_a.id,
            self.parent_b.id
        );

        emit!(AgentDeployed {
            agent_id: child.id.clone(),
            agent: self.child_agent.key(),
            mint: child.mint,
            creator: child.creator,
            serial_number,
            generation: child.generation,
            family_code: child.family_code,
        });

        emit!(BreedingSuccessful {
            proposal: self.proposal.key(),
            child: self.child_agent.key(),
            child_id: child.id,
            parent_a: child.parent_a,
            parent_b: child.parent_b,
            generation: child.generation,
            family_code: child.family_code,
        });

        self.config.unlock();

        Ok(())
    }

    /// Allocate the child agent PDA and write the account
    fn create_child_account(&self, child: &Agent, bump: u8) -> Result<()> {
        let agent_seeds = &[Agent::SEED, child.id.as_bytes(), &[bump]];

        self.create_pda(
            &self.child_agent,
            8 + Agent::INIT_SPACE,
            &crate::ID,
            &[&agent_seeds[..]],
        )?;

        let mut data = self.child_agent.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data[..];
        child.try_serialize(&mut writer)?;

        Ok(())
    }

    /// Allocate the child mint PDA, point its transfer hook at this
    /// program and initialize it under the config PDA
    fn create_child_mint(&self, bump: u8) -> Result<()> {
        let agent_key = self.child_agent.key();
        let mint_seeds = &[Agent::MINT_SEED, agent_key.as_ref(), &[bump]];

        self.create_pda(
            &self.child_mint,
            hooked_mint_len()?,
            self.agent_token_program.key,
            &[&mint_seeds[..]],
        )?;

        transfer_hook_initialize(
            CpiContext::new(
                self.agent_token_program.to_account_info(),
                TransferHookInitialize {
                    token_program_id: self.agent_token_program.to_account_info(),
                    mint: self.child_mint.to_account_info(),
                },
            ),
            Some(self.config.key()),
            Some(crate::ID),
        )?;

        initialize_mint2(
            CpiContext::new(
                self.agent_token_program.to_account_info(),
                InitializeMint2 {
                    mint: self.child_mint.to_account_info(),
                },
            ),
            TOKEN_DECIMALS,
            &self.config.key(),
            None,
        )
    }

    /// Give `target` rent-exempt storage owned by `owner`, paid by the voter
    fn create_pda(
        &self,
        target: &UncheckedAccount<'info>,
        space: usize,
        owner: &Pubkey,
        signer: &[&[&[u8]]],
    ) -> Result<()> {
        let rent = Rent::get()?.minimum_balance(space);
        let funding = PdaFunding::plan(
            target.lamports(),
            rent,
            target.data_len(),
            target.owner == &System::id(),
        )?;

        match funding {
            PdaFunding::Create => create_account(
                CpiContext::new_with_signer(
                    self.system_program.to_account_info(),
                    CreateAccount {
                        from: self.voter.to_account_info(),
                        to: target.to_account_info(),
                    },
                    signer,
                ),
                rent,
                space as u64,
                owner,
            ),
            PdaFunding::Adopt { top_up } => {
                if top_up > 0 {
                    transfer(
                        CpiContext::new(
                            self.system_program.to_account_info(),
                            Transfer {
                                from: self.voter.to_account_info(),
                                to: target.to_account_info(),
                            },
                        ),
                        top_up,
                    )?;
                }
                allocate(
                    CpiContext::new_with_signer(
                        self.system_program.to_account_info(),
                        Allocate {
                            account_to_allocate: target.to_account_info(),
                        },
                        signer,
                    ),
                    space as u64,
                )?;
                assign(
                    CpiContext::new_with_signer(
                        self.system_program.to_account_info(),
                        Assign {
                            account_to_assign: target.to_account_info(),
                        },
                        signer,
                    ),
                    owner,
                )
            }
        }
    }
}

/// Size of an agent mint carrying the transfer hook extension
pub fn hooked_mint_len() -> Result<usize> {
    Ok(ExtensionType::try_calculate_account_len::<Token2022Mint>(&[
        ExtensionType::TransferHook,
    ])?)
}

/// How a child PDA gets its storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdaFunding {
    /// Untouched address: `create_account`
    Create,
    /// Address already holds lamports: top up to rent, then allocate and
    /// assign
    Adopt { top_up: u64 },
}

impl PdaFunding {
    /// Only a system-owned address without data can become the child
    pub fn plan(lamports: u64, rent: u64, data_len: usize, system_owned: bool) -> Result<Self> {
        require!(
            system_owned && data_len == 0,
            BreedingError::ChildAlreadyExists
        );

        if lamports == 0 {
            Ok(PdaFunding::Create)
        } else {
            Ok(PdaFunding::Adopt {
                top_up: rent.saturating_sub(lamports),
            })
        }
    }
}

/// Build the child agent of an executing proposal
#[allow(clippy::too_many_arguments)]
pub fn offspring(
    proposal: &BreedingProposal,
    parent_a: &Agent,
    parent_b: &Agent,
    inherited: &[InheritedTrait],
    mint: Pubkey,
    serial_number: u64,
    now: i64,
    bump: u8,
) -> Agent {
    Agent {
        id: proposal.child_id.clone(),
        mint,
        creator: proposal.proposer,
        serial_number,
        generation: parent_a.generation.max(parent_b.generation).saturating_add(1),
        family_code: Agent::child_family_code(parent_a.family_code, parent_b.family_code),
        parent_a: proposal.parent_a,
        parent_b: proposal.parent_b,
        profile: proposal.child_profile.clone(),
        market: MarketState::default(),
        fitness: 0,
        created_at: now,
        last_activity_time: now,
        in_cooldown: false,
        cooldown_started_at: 0,
        traits: inherited.iter().map(|gene| gene.inherited).collect(),
        bump,
    }
}

// ============================================================================
// TESTS
// ============================================================================
