//! # WAD Fixed-Point Math
//!
//! All curve quantities are unsigned integers scaled by [`WAD`] (10^18).
//! Every step floors, exactly like integer division on-chain, so the same
//! inputs always produce the same lamport-level result.
//!
//! ## Exponential
//!
//! ```text
//! e^x ≈ Σ (i = 0..=20)  xⁱ / i!
//!
//!   term₀ = WAD
//!   termᵢ = ⌊termᵢ₋₁ · x / (i · WAD)⌋
//! ```
//!
//! The series stops as soon as a term floors to zero.

use anchor_lang::prelude::*;

use super::CurveError;

/// Fixed-point unit (18 decimals)
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Number of Taylor terms evaluated after the constant term
pub const EXP_TERMS: u128 = 20;

/// Largest accepted exponent (5.0)
///
/// The biggest intermediate `term · x` for x = 5 is ~1.3e38, which still
/// fits in a u128. Anything above is rejected instead of wrapping.
pub const MAX_EXP_INPUT: u128 = 5 * WAD;

/// Approximate e^x for a WAD-scaled, non-negative `x`
///
/// # Errors
/// * `ExponentOutOfRange` - `x` above [`MAX_EXP_INPUT`]
/// * `Overflow` - an intermediate product left 128 bits
///
/// # Example
/// ```ignore
/// let e = exp(WAD)?; // 2.718281828459045226 * WAD
/// ```
pub fn exp(x: u128) -> Result<u128> {
    require!(x <= MAX_EXP_INPUT, CurveError::ExponentOutOfRange);

    let mut sum = WAD;
    let mut term = WAD;

    for i in 1..=EXP_TERMS {
        let divisor = i.checked_mul(WAD).ok_or(CurveError::Overflow)?;
        term = term
            .checked_mul(x)
            .ok_or(CurveError::Overflow)?
            .checked_div(divisor)
            .ok_or(CurveError::DivisionByZero)?;

        if term == 0 {
            break;
        }

        sum = sum.checked_add(term).ok_or(CurveError::Overflow)?;
    }

    Ok(sum)
}

/// Compute ⌊a · b / c⌋ without forming the full product
///
/// Splits `a` into `q·c + r`, so the result is `q·b + ⌊r·b / c⌋`. This is
/// the exact floor as long as both partial products fit in 128 bits.
pub fn mul_div(a: u128, b: u128, c: u128) -> Result<u128> {
    require!(c > 0, CurveError::DivisionByZero);

    let whole = (a / c).checked_mul(b).ok_or(CurveError::Overflow)?;
    let fraction = (a % c)
        .checked_mul(b)
        .ok_or(CurveError::Overflow)?
        / c;

    Ok(whole.checked_add(fraction).ok_or(CurveError::Overflow)?)
}

// ============================================================================
// TESTS
// ============================================================================
