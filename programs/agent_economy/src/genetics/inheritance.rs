//! # Trait Inheritance
//!
//! A child takes exactly the trait keys of its reference parent (parent A).
//! For each key:
//!
//! ```text
//!   dominance A > dominance B   →  A's trait, untouched
//!   dominance B > dominance A   →  B's trait, untouched
//!   dominance A = dominance B   →  value = ⌊(A + B) / 2⌋
//!                                  5% chance: value = ⌊value · f / 100⌋
//!                                             with f uniform in [85, 115]
//! ```
//!
//! A key missing from parent B reads as value 0, dominance 0. Mutated
//! values saturate at `u64::MAX`.

use super::EntropySource;
use crate::state::Trait;

/// Chance of a mutation on a blended trait, in percent
pub const MUTATION_CHANCE_PERCENT: u64 = 5;

/// Mutation factor bounds, in percent (±15%)
pub const MUTATION_MIN_FACTOR: u64 = 85;
pub const MUTATION_MAX_FACTOR: u64 = 115;

/// How a child trait came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inheritance {
    /// Copied from the more dominant parent
    Dominant,
    /// Average of both parents
    Blended,
    /// Average of both parents, then mutated by `factor` percent
    Mutated { factor: u64 },
}

/// One computed child trait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InheritedTrait {
    pub inherited: Trait,
    pub origin: Inheritance,
}

pub struct TraitInheritance;

impl TraitInheritance {
    /// Compute the child genome
    ///
    /// # Arguments
    /// * `reference` - Parent A's traits; defines the child's key set and order
    /// * `other` - Parent B's traits
    /// * `entropy` - Source for mutation rolls
    pub fn inherit<E: EntropySource>(
        reference: &[Trait],
        other: &[Trait],
        entropy: &mut E,
    ) -> Vec<InheritedTrait> {
        reference
            .iter()
            .map(|trait_a| {
                let trait_b = other
                    .iter()
                    .find(|t| t.key == trait_a.key)
                    .copied()
                    .unwrap_or(Trait {
                        key: trait_a.key,
                        value: 0,
                        dominance: 0,
                    });
                Self::cross(trait_a, &trait_b, entropy)
            })
            .collect()
    }

    /// Resolve a single key
    pub fn cross<E: EntropySource>(
        a: &Trait,
        b: &Trait,
        entropy: &mut E,
    ) -> InheritedTrait {
        if a.dominance != b.dominance {
            let winner = if a.dominance > b.dominance { a } else { b };
            return InheritedTrait {
                inherited: Trait {
                    key: a.key,
                    value: winner.value,
                    dominance: winner.dominance,
                },
                origin: Inheritance::Dominant,
            };
        }

        let blended = ((a.value as u128 + b.value as u128) / 2) as u64;

        let roll = entropy.next_u64() % 100;
        let (value, origin) = if roll < MUTATION_CHANCE_PERCENT {
            let span = MUTATION_MAX_FACTOR - MUTATION_MIN_FACTOR + 1;
            let factor = MUTATION_MIN_FACTOR + entropy.next_u64() % span;
            (mutate(blended, factor), Inheritance::Mutated { factor })
        } else {
            (blended, Inheritance::Blended)
        };

        InheritedTrait {
            inherited: Trait {
                key: a.key,
                value,
                dominance: a.dominance,
            },
            origin,
        }
    }
}

fn mutate(value: u64, factor: u64) -> u64 {
    let scaled = (value as u128) * (factor as u128) / 100;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed sequence, repeating the last value
    struct SequenceEntropy {
        values: Vec<u64>,
        cursor: usize,
    }

    impl SequenceEntropy {
        fn new(values: &[u64]) -> Self {
            Self {
                values: values.to_vec(),
                cursor: 0,
            }
        }
    }

    impl EntropySource for SequenceEntropy {
        fn next_u64(&mut self) -> u64 {
            let index = self.cursor.min(self.values.len() - 1);
            self.cursor += 1;
            self.values[index]
        }
    }

    fn gene(key: u8, value: u64, dominance: u64) -> Trait {
        Trait {
            key: [key; 32],
            value,
            dominance,
        }
    }

    #[test]
    fn test_equal_dominance_blends() {
        // Roll 99 → no mutation
        let mut entropy = SequenceEntropy::new(&[99]);
        let child = TraitInheritance::cross(&gene(1, 100, 5), &gene(1, 200, 5), &mut entropy);
        assert_eq!(child.inherited.value, 150);
        assert_eq!(child.origin, Inheritance::Blended);
    }

    #[test]
    fn test_higher_dominance_wins_untouched() {
        // The entropy source must not be consulted
        let mut entropy = SequenceEntropy::new(&[0, 0]);
        let child = TraitInheritance::cross(&gene(1, 100, 5), &gene(1, 200, 3), &mut entropy);
        assert_eq!(child.inherited.value, 100);
        assert_eq!(child.inherited.dominance, 5);
        assert_eq!(child.origin, Inheritance::Dominant);
        assert_eq!(entropy.cursor, 0);

        let child = TraitInheritance::cross(&gene(1, 100, 3), &gene(1, 200, 5), &mut entropy);
        assert_eq!(child.inherited.value, 200);
        assert_eq!(child.inherited.key, [1; 32]);
    }

    #[test]
    fn test_mutation_bounds() {
        // Roll 4 → mutate; 0 → factor 85, 30 → factor 115
        let mut low = SequenceEntropy::new(&[4, 0]);
        let child = TraitInheritance::cross(&gene(1, 100, 5), &gene(1, 200, 5), &mut low);
        assert_eq!(child.inherited.value, 127);
        assert_eq!(child.origin, Inheritance::Mutated { factor: 85 });

        let mut high = SequenceEntropy::new(&[104, 30]);
        let child = TraitInheritance::cross(&gene(1, 100, 5), &gene(1, 200, 5), &mut high);
        assert_eq!(child.inherited.value, 172);
        assert_eq!(child.origin, Inheritance::Mutated { factor: 115 });
    }

    #[test]
    fn test_roll_of_five_does_not_mutate() {
        let mut entropy = SequenceEntropy::new(&[5]);
        let child = TraitInheritance::cross(&gene(1, 101, 2), &gene(1, 200, 2), &mut entropy);
        assert_eq!(child.inherited.value, 150);
    }

    #[test]
    fn test_child_uses_reference_key_set() {
        let reference = [gene(1, 100, 5), gene(2, 10, 1), gene(3, 40, 0)];
        let other = [gene(2, 30, 1), gene(9, 999, 9)];
        let mut entropy = SequenceEntropy::new(&[99]);

        let child = TraitInheritance::inherit(&reference, &other, &mut entropy);
        let keys: Vec<[u8; 32]> = child.iter().map(|t| t.inherited.key).collect();
        assert_eq!(keys, vec![[1; 32], [2; 32], [3; 32]]);

        // Key 1 missing in B → (0, 0), A dominates
        assert_eq!(child[0].inherited.value, 100);
        // Key 2 equal dominance → blend
        assert_eq!(child[1].inherited.value, 20);
        // Key 3 missing in B, both dominance 0 → blend with zero
        assert_eq!(child[2].inherited.value, 20);
    }

    #[test]
    fn test_upward_mutation_saturates() {
        let mut entropy = SequenceEntropy::new(&[0, 30]);
        let child = TraitInheritance::cross(
            &gene(1, u64::MAX, 1),
            &gene(1, u64::MAX, 1),
            &mut entropy,
        );
        assert_eq!(child.inherited.value, u64::MAX);
        assert_eq!(child.origin, Inheritance::Mutated { factor: 115 });

        // Downward mutation of a huge value still scales
        let mut entropy = SequenceEntropy::new(&[0, 0]);
        let child = TraitInheritance::cross(
            &gene(1, u64::MAX, 1),
            &gene(1, u64::MAX, 1),
            &mut entropy,
        );
        assert_eq!(child.inherited.value, (u64::MAX as u128 * 85 / 100) as u64);
    }
}
