//! # Automated Market Maker (AMM) Module
//!
//! Agent tokens are issued and redeemed against an **exponential bonding
//! curve**: every token sold makes the next one slightly more expensive.
//!
//! ```text
//!   price ▲
//!         │                              ╱
//!         │                           ╱
//!         │                       ╱
//!         │                 _ ─ ╱
//!         │         _ ─ ─      ▒▒ ← cost of buying d tokens
//!      P0 │ ─ ─ ─              ▒▒    = area under the curve
//!         └────────────────────────────▶ supply
//!                              s   s+d
//! ```
//!
//! - [`fixed_point`]: WAD math (`exp`, `mul_div`)
//! - [`bonding_curve`]: integral pricing, fees, market cap

pub mod bonding_curve;
pub mod fixed_point;

pub use bonding_curve::*;
pub use fixed_point::*;
