//! Token Trading
//!
//! Handles buying and selling of agent tokens against the exponential
//! bonding curve, and the one-shot liquidity bootstrap that the buy which
//! first reaches the funding goal triggers.

use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_2022::Token2022,
    token_interface::{
        burn, mint_to, transfer_checked, Burn, Mint, MintTo, TokenAccount, TokenInterface,
        TransferChecked,
    },
};

use crate::guard::{lock_account, persist, OperationLock};
use crate::state::{Agent, Config, LiquidityPool};

/// Event emitted when tokens are bought
#[event]
pub struct TokensBought {
    pub agent: Pubkey,
    pub buyer: Pubkey,
    pub amount: u64,
    pub cost: u64,
    pub fee: u64,
    pub supply: u64,
    pub market_cap: u64,
}

/// Event emitted when tokens are sold
#[event]
pub struct TokensSold {
    pub agent: Pubkey,
    pub seller: Pubkey,
    pub amount: u64,
    pub gross: u64,
    pub fee: u64,
    pub proceeds: u64,
    pub supply: u64,
}

/// Event emitted when an agent's pool is opened and seeded
#[event]
pub struct LiquidityBootstrapped {
    pub agent: Pubkey,
    pub pool: Pubkey,
    pub token_amount: u64,
    pub payment_amount: u64,
    pub funding_raised: u64,
}

/// Accounts for trading operations
#[derive(Accounts)]
pub struct Trade<'info> {
    /// Trader
    #[account(mut)]
    pub trader: Signer<'info>,

    /// Protocol configuration (agent mint authority)
    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, Config>>,

    /// Agent being traded
    #[account(
        mut,
        seeds = [Agent::SEED, agent.id.as_bytes()],
        bump = agent.bump,
    )]
    pub agent: Box<Account<'info, Agent>>,

    #[account(
        mut,
        address = agent.mint,
    )]
    pub agent_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(address = config.payment_mint)]
    pub payment_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Trader's payment token account
    #[account(
        mut,
        associated_token::mint = payment_mint,
        associated_token::authority = trader,
        associated_token::token_program = token_program,
    )]
    pub trader_payment: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Trader's agent token account
    #[account(
        init_if_needed,
        payer = trader,
        associated_token::mint = agent_mint,
        associated_token::authority = trader,
        associated_token::token_program = agent_token_program,
    )]
    pub trader_tokens: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Agent's curve reserve
    #[account(
        mut,
        associated_token::mint = payment_mint,
        associated_token::authority = agent,
        associated_token::token_program = token_program,
    )]
    pub reserve_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Protocol fee treasury
    #[account(
        mut,
        associated_token::mint = payment_mint,
        associated_token::authority = config,
        associated_token::token_program = token_program,
    )]
    pub treasury: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [LiquidityPool::SEED, agent.key().as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, LiquidityPool>>,

    #[account(
        mut,
        associated_token::mint = payment_mint,
        associated_token::authority = pool,
        associated_token::token_program = token_program,
    )]
    pub pool_payment_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        associated_token::mint = agent_mint,
        associated_token::authority = pool,
        associated_token::token_program = agent_token_program,
    )]
    pub pool_token_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Token program of the payment mint
    pub token_program: Interface<'info, TokenInterface>,
    /// Agent mints carry the cooldown transfer hook
    pub agent_token_program: Program<'info, Token2022>,
    /// Associated token program
    pub associated_token_program: Program<'info, AssociatedToken>,
    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> Trade<'info> {
    /// Buy `amount` agent tokens
    ///
    /// Returns the total paid (curve cost plus fee).
    pub fn buy_tokens(&mut self, amount: u64, max_payment: u64) -> Result<u64> {
        let clock = Clock::get()?;

        lock_account(&mut *self.agent, |agent| &mut agent.market)?;

        let curve = self.config.curve()?;
        let quote = curve.quote_buy(self.agent.market.supply, amount, self.config.fee_bps)?;

        // A purchase too small to cost anything would mint for free
        require!(quote.cost > 0, TradeError::ZeroCost);
        require!(quote.total <= max_payment, TradeError::SlippageExceeded);
        require!(
            self.trader_payment.amount >= quote.total,
            TradeError::InsufficientFunds
        );

        // Update agent state before any token movement
        let bootstrap = self.agent.market.record_buy(
            &curve,
            amount,
            quote.cost,
            self.config.funding_goal,
        )?;
        self.agent.touch(clock.unix_timestamp);

        let liquidity = if bootstrap {
            let payment_amount = self
                .agent
                .market
                .liquidity_contribution(self.config.liquidity_share_bps)?;
            require!(
                self.pool.open(
                    clock.unix_timestamp,
                    self.config.reserve_allocation,
                    payment_amount
                ),
                TradeError::PoolAlreadyOpen
            );
            Some(payment_amount)
        } else {
            None
        };
        persist(&*self.agent)?;
        persist(&*self.pool)?;

        // Curve cost to the reserve, fee to the treasury
        self.pay_in(&self.reserve_vault, quote.cost)?;
        if quote.fee > 0 {
            self.pay_in(&self.treasury, quote.fee)?;
        }

        // Mint tokens to trader
        self.mint_agent_tokens(&self.trader_tokens, amount)?;

        msg!(
            "Bought {} tokens of {} for {} (+{} fee)",
            amount,
            self.agent.id,
            quote.cost,
            quote.fee
        );

        emit!(TokensBought {
            agent: self.agent.key(),
            buyer: self.trader.key(),
            amount,
            cost: quote.cost,
            fee: quote.fee,
            supply: self.agent.market.supply,
            market_cap: self.agent.market.market_cap,
        });

        if let Some(payment_amount) = liquidity {
            self.bootstrap_liquidity(payment_amount)?;
        }

        self.agent.market.unlock();

        Ok(quote.total)
    }

    /// Sell `amount` agent tokens back to the curve
    ///
    /// Returns the proceeds paid to the trader (curve value minus fee).
    pub fn sell_tokens(&mut self, amount: u64, min_proceeds: u64) -> Result<u64> {
        let clock = Clock::get()?;

        lock_account(&mut *self.agent, |agent| &mut agent.market)?;

        require!(
            self.trader_tokens.amount >= amount,
            TradeError::InsufficientTokens
        );

        let curve = self.config.curve()?;
        let quote = curve.quote_sell(self.agent.market.supply, amount, self.config.fee_bps)?;

        require!(quote.total >= min_proceeds, TradeError::SlippageExceeded);
        require!(
            self.reserve_vault.amount >= quote.cost,
            TradeError::InsufficientReserve
        );

        // Update agent state before any token movement
        self.agent.market.record_sell(&curve, amount, quote.cost)?;
        self.agent.touch(clock.unix_timestamp);
        persist(&*self.agent)?;

        // Burn tokens
        burn(
            CpiContext::new(
                self.agent_token_program.to_account_info(),
                Burn {
                    mint: self.agent_mint.to_account_info(),
                    from: self.trader_tokens.to_account_info(),
                    authority: self.trader.to_account_info(),
                },
            ),
            amount,
        )?;

        // Pay out of the reserve: proceeds to the trader, fee to the treasury
        self.pay_out(&self.trader_payment, quote.total)?;
        if quote.fee > 0 {
            self.pay_out(&self.treasury, quote.fee)?;
        }

        msg!(
            "Sold {} tokens of {} for {} (-{} fee)",
            amount,
            self.agent.id,
            quote.total,
            quote.fee
        );

        emit!(TokensSold {
            agent: self.agent.key(),
            seller: self.trader.key(),
            amount,
            gross: quote.cost,
            fee: quote.fee,
            proceeds: quote.total,
            supply: self.agent.market.supply,
        });

        self.agent.market.unlock();

        Ok(quote.total)
    }

    /// Seed the freshly opened pool with minted tokens and raised funding
    fn bootstrap_liquidity(&self, payment_amount: u64) -> Result<()> {
        let token_amount = self.config.reserve_allocation;

        if token_amount > 0 {
            self.mint_agent_tokens(&self.pool_token_vault, token_amount)?;
        }
        if payment_amount > 0 {
            self.pay_out(&self.pool_payment_vault, payment_amount)?;
        }

        msg!(
            "Liquidity bootstrapped for {}: {} tokens, {} payment",
            self.agent.id,
            token_amount,
            payment_amount
        );

        emit!(LiquidityBootstrapped {
            agent: self.agent.key(),
            pool: self.pool.key(),
            token_amount,
            payment_amount,
            funding_raised: self.agent.market.funding_raised,
        });

        Ok(())
    }

    /// Payment tokens from the trader
    fn pay_in(&self, to: &InterfaceAccount<'info, TokenAccount>, amount: u64) -> Result<()> {
        transfer_checked(
            CpiContext::new(
                self.token_program.to_account_info(),
                TransferChecked {
                    from: self.trader_payment.to_account_info(),
                    mint: self.payment_mint.to_account_info(),
                    to: to.to_account_info(),
                    authority: self.trader.to_account_info(),
                },
            ),
            amount,
            self.payment_mint.decimals,
        )
    }

    /// Payment tokens from the agent's reserve, signed by the agent PDA
    fn pay_out(&self, to: &InterfaceAccount<'info, TokenAccount>, amount: u64) -> Result<()> {
        let agent_seeds = &[
            Agent::SEED,
            self.agent.id.as_bytes(),
            &[self.agent.bump],
        ];
        let agent_signer = &[&agent_seeds[..]];

        transfer_checked(
            CpiContext::new_with_signer(
                self.token_program.to_account_info(),
                TransferChecked {
                    from: self.reserve_vault.to_account_info(),
                    mint: self.payment_mint.to_account_info(),
                    to: to.to_account_info(),
                    authority: self.agent.to_account_info(),
                },
                agent_signer,
            ),
            amount,
            self.payment_mint.decimals,
        )
    }

    /// New agent tokens, signed by the config PDA
    fn mint_agent_tokens(&self, to: &InterfaceAccount<'info, TokenAccount>, amount: u64) -> Result<()> {
        let config_seeds = &[Config::SEED, &[self.config.bump]];
        let signer_seeds = &[&config_seeds[..]];

        mint_to(
            CpiContext::new_with_signer(
                self.agent_token_program.to_account_info(),
                MintTo {
                    mint: self.agent_mint.to_account_info(),
                    to: to.to_account_info(),
                    authority: self.config.to_account_info(),
                },
                signer_seeds,
            ),
            amount,
        )
    }
}

#[error_code]
pub enum TradeError {
    #[msg("Insufficient payment token balance")]
    InsufficientFunds,
    #[msg("Insufficient agent token balance")]
    InsufficientTokens,
    #[msg("Curve reserve cannot cover the payout")]
    InsufficientReserve,
    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,
    #[msg("Trade amount too small to price")]
    ZeroCost,
    #[msg("Liquidity pool is already open")]
    PoolAlreadyOpen,
}
