//! Breeding workflow
//!
//! - `propose` - Pay the proposal fee and pair two eligible agents
//! - `vote` - Guardian approval; the quorum vote creates the child

pub mod propose;
pub mod vote;

pub use propose::*;
pub use vote::*;
