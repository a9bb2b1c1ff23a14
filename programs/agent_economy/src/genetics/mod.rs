//! # Genetics Module
//!
//! Dominance-weighted crossover with probabilistic mutation.
//!
//! - [`inheritance`]: the crossover rules
//! - [`entropy`]: mutation randomness, injected so the rules never depend
//!   on where the randomness comes from

pub mod entropy;
pub mod inheritance;

pub use entropy::*;
pub use inheritance::*;
