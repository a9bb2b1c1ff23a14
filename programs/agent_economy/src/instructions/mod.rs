//! Instruction handlers for the agent economy
//!
//! Each instruction represents an action users can take:
//! - `initialize` - Set up the protocol (admin only, once)
//! - `guardian` - Grant/revoke the guardian role (admin only)
//! - `create_agent` - Register a genesis agent and open its vaults
//! - `trade` - Buy/sell agent tokens on the bonding curve
//! - `transfer` - Transfer hook for agent tokens (blocked in cooldown)
//! - `breeding` - Propose pairings and vote them through
//! - `registry` - Cooldown release, fitness refresh, trait updates

pub mod breeding;
pub mod create_agent;
pub mod guardian;
pub mod initialize;
pub mod registry;
pub mod trade;
pub mod transfer;

pub use breeding::*;
pub use create_agent::*;
pub use guardian::*;
pub use initialize::*;
pub use registry::*;
pub use trade::*;
pub use transfer::*;
