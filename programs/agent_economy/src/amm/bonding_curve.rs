//! # Exponential Bonding Curve
//!
//! Every agent token is priced on the same exponential curve.
//!
//! ## The Price Function
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                              │
//! │                  price(x) = P0 · e^(k·x)                     │
//! │                                                              │
//! │   Where:                                                     │
//! │   • P0 = initial price (payment units per whole token, WAD)  │
//! │   • k  = growth rate per whole token (WAD)                   │
//! │   • x  = tokens already sold through the curve               │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cost of a Trade
//!
//! Buying `d` tokens at supply `s` costs the area under the curve:
//!
//! ```text
//!            s+d
//! cost  =    ∫   P0 · e^(k·x) dx  =  P0 · (e^(k·(s+d)) − e^(k·s)) / k
//!            s
//! ```
//!
//! Selling walks the same integral backwards, from `s − d` to `s`, so a
//! buy followed by a sell of the same size returns exactly the curve cost
//! minus both fees.
//!
//! ## Fees
//!
//! ```text
//! buy:   pay     = cost + cost · fee_bps / 10_000
//! sell:  receive = cost − cost · fee_bps / 10_000
//! ```

use anchor_lang::prelude::*;

use super::fixed_point::{exp, mul_div, WAD};

/// Errors specific to the exponential bonding curve
///
/// `Overflow`, `ExponentOutOfRange` and `CostUnderflow` mean the requested
/// quantity is outside the curve's safe range. They are never retryable.
#[error_code]
pub enum CurveError {
    #[msg("Arithmetic overflow")]
    Overflow,
    #[msg("Division by zero")]
    DivisionByZero,
    #[msg("Exponent outside the supported range")]
    ExponentOutOfRange,
    #[msg("Curve integral underflowed")]
    CostUnderflow,
    #[msg("Quantity must be positive")]
    ZeroQuantity,
    #[msg("Cannot sell more tokens than the curve supply")]
    InsufficientSupply,
    #[msg("Invalid curve parameters")]
    InvalidParameters,
}

/// Agent token decimals
pub const TOKEN_DECIMALS: u8 = 9;

/// One whole agent token in base units
pub const TOKEN_UNIT: u128 = 1_000_000_000;

/// Basis point denominator
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Amounts of a priced trade, all in payment-token base units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeQuote {
    /// Curve integral over the traded range
    pub cost: u64,
    /// Protocol fee charged on top (buy) or withheld (sell)
    pub fee: u64,
    /// What the trader pays (buy) or receives (sell)
    pub total: u64,
}

/// Exponential bonding curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialCurve {
    /// P0, WAD-scaled payment base units per whole token
    pub initial_price: u128,
    /// k, WAD-scaled growth per whole token
    pub growth_rate: u128,
}

impl ExponentialCurve {
    pub fn new(initial_price: u128, growth_rate: u128) -> Result<Self> {
        require!(initial_price > 0, CurveError::InvalidParameters);
        require!(growth_rate > 0, CurveError::InvalidParameters);
        Ok(Self {
            initial_price,
            growth_rate,
        })
    }

    /// WAD exponent `k · s` for a supply given in base units
    pub fn exponent(&self, supply: u64) -> Result<u128> {
        let scaled = self
            .growth_rate
            .checked_mul(supply as u128)
            .ok_or(CurveError::Overflow)?;
        Ok(scaled / TOKEN_UNIT)
    }

    /// Cost of moving the supply from `supply` to `supply + delta`
    ///
    /// Formula: ⌊⌊P0 · (E2 − E1) / k⌋ / WAD⌋ with `E = exp(k · s)`
    ///
    /// # Arguments
    /// * `supply` - Current curve supply (base units)
    /// * `delta` - Tokens being added (base units)
    ///
    /// # Returns
    /// * Payment-token base units
    pub fn cost(&self, supply: u64, delta: u64) -> Result<u64> {
        require!(delta > 0, CurveError::ZeroQuantity);

        let end_supply = supply.checked_add(delta).ok_or(CurveError::Overflow)?;

        let exp_start = exp(self.exponent(supply)?)?;
        let exp_end = exp(self.exponent(end_supply)?)?;

        // The curve only grows; a shrinking integral is a broken invariant
        let area = exp_end
            .checked_sub(exp_start)
            .ok_or(CurveError::CostUnderflow)?;

        let scaled_cost = mul_div(self.initial_price, area, self.growth_rate)? / WAD;

        Ok(u64::try_from(scaled_cost).map_err(|_| CurveError::Overflow)?)
    }

    /// Marginal price at `supply`, payment base units per whole token
    pub fn spot_price(&self, supply: u64) -> Result<u128> {
        let growth = exp(self.exponent(supply)?)?;
        Ok(mul_div(self.initial_price, growth, WAD)? / WAD)
    }

    /// Spot price times circulating curve supply
    pub fn market_cap(&self, supply: u64) -> Result<u64> {
        let cap = self
            .spot_price(supply)?
            .checked_mul(supply as u128)
            .ok_or(CurveError::Overflow)?
            / TOKEN_UNIT;

        Ok(u64::try_from(cap).map_err(|_| CurveError::Overflow)?)
    }

    /// Price a buy of `amount` tokens at `supply`
    pub fn quote_buy(&self, supply: u64, amount: u64, fee_bps: u64) -> Result<TradeQuote> {
        let cost = self.cost(supply, amount)?;
        let fee = fee_on(cost, fee_bps)?;
        let total = cost.checked_add(fee).ok_or(CurveError::Overflow)?;

        Ok(TradeQuote { cost, fee, total })
    }

    /// Price a sell of `amount` tokens at `supply`
    ///
    /// The integral runs over the decreasing range `[supply − amount, supply]`.
    pub fn quote_sell(&self, supply: u64, amount: u64, fee_bps: u64) -> Result<TradeQuote> {
        require!(amount > 0, CurveError::ZeroQuantity);
        require!(amount <= supply, CurveError::InsufficientSupply);

        let cost = self.cost(supply - amount, amount)?;
        let fee = fee_on(cost, fee_bps)?;
        let total = cost.checked_sub(fee).ok_or(CurveError::Overflow)?;

        Ok(TradeQuote { cost, fee, total })
    }
}

/// `amount · bps / 10_000`, floored
pub fn fee_on(amount: u64, bps: u64) -> Result<u64> {
    let fee = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(CurveError::Overflow)?
        / BPS_DENOMINATOR as u128;

    Ok(u64::try_from(fee).map_err(|_| CurveError::Overflow)?)
}

// ============================================================================
// TESTS
// ============================================================================
