//! Entropy sources for mutation rolls
//!
//! The inheritance algorithm only sees the [`EntropySource`] trait. The
//! on-chain source hashes values every validator (and every observer of the
//! pending transaction) can see, so its rolls are predictable and can be
//! gamed by whoever submits the deciding vote. Anything stronger, such as a
//! VRF oracle, plugs in behind the same trait.

use anchor_lang::solana_program::hash::hashv;

pub trait EntropySource {
    fn next_u64(&mut self) -> u64;
}

/// SHA-256 counter stream over a seed derived from transaction context
///
/// Not cryptographically secure.
pub struct HashEntropy {
    seed: [u8; 32],
    counter: u64,
}

impl HashEntropy {
    pub fn new(parts: &[&[u8]]) -> Self {
        Self {
            seed: hashv(parts).to_bytes(),
            counter: 0,
        }
    }
}

impl EntropySource for HashEntropy {
    fn next_u64(&mut self) -> u64 {
        let digest = hashv(&[&self.seed, &self.counter.to_le_bytes()]).to_bytes();
        self.counter = self.counter.wrapping_add(1);

        let mut buf = [0u8; 8];
        buf.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(buf)
    }
}
