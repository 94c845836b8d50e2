//! # Merge Table
//!
//! The learned merge rules: an append-only `{ pair -> minted }` map coupled
//! with the insertion ordering the decoder replays.

use crate::errors::{PolytokError, PtResult};
use crate::types::{PairTokenMap, TokenId, TokenPair, token_scalar};

/// Ordered, append-only mapping from token pairs to minted tokens.
///
/// The map and the ordering stay in bijection: every rule inserted lands in
/// both. The trainer is the single writer; after training the table is
/// persisted and only ever read.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MergeTable {
    merges: PairTokenMap,
    ordering: Vec<TokenPair>,
}

impl MergeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new rule. The caller guarantees `pair` was not seen before.
    pub fn insert(
        &mut self,
        pair: TokenPair,
        minted: TokenId,
    ) {
        self.ordering.push(pair);
        self.merges.insert(pair, minted);
    }

    /// The minted token for `pair`, if that pair was learned.
    pub fn lookup(
        &self,
        pair: TokenPair,
    ) -> Option<TokenId> {
        self.merges.get(&pair).copied()
    }

    /// The rules in the order they were learned.
    pub fn ordering(&self) -> &[TokenPair] {
        &self.ordering
    }

    /// Iterate `(pair, minted)` rules in insertion order.
    pub fn iter_rules(&self) -> impl Iterator<Item = (TokenPair, TokenId)> + '_ {
        self.ordering.iter().map(move |&pair| (pair, self.merges[&pair]))
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.ordering.len()
    }

    /// True when no rules have been learned.
    pub fn is_empty(&self) -> bool {
        self.ordering.is_empty()
    }

    /// The minted id of the earliest rule, if any.
    pub fn first_minted(&self) -> Option<TokenId> {
        self.ordering.first().and_then(|&pair| self.lookup(pair))
    }

    /// Check the structural invariants a well-formed table satisfies:
    ///
    /// - `merges` and `ordering` are in bijection;
    /// - minted ids are contiguous and strictly increasing along `ordering`;
    /// - every pair side is either a scalar below the first minted id or a
    ///   minted id older than its own rule.
    ///
    /// Tables built by the trainer hold these by construction; loaded
    /// artifacts are checked before use.
    pub fn validate(&self) -> PtResult<()> {
        if self.merges.len() != self.ordering.len() {
            return Err(PolytokError::ModelInvariant(format!(
                "{} merges but {} ordering entries",
                self.merges.len(),
                self.ordering.len()
            )));
        }

        let Some(first) = self.first_minted() else {
            return Ok(());
        };

        for (index, &pair) in self.ordering.iter().enumerate() {
            let Some(minted) = self.lookup(pair) else {
                return Err(PolytokError::ModelInvariant(format!(
                    "ordering entry {pair:?} missing from merges"
                )));
            };

            if minted != first + index as TokenId {
                return Err(PolytokError::ModelInvariant(format!(
                    "minted ids not contiguous: rule {index} maps {pair:?} to {minted}"
                )));
            }

            for side in [pair.0, pair.1] {
                let is_scalar = side < first && token_scalar(side).is_some();
                let is_older_mint = (first..minted).contains(&side);
                if !is_scalar && !is_older_mint {
                    return Err(PolytokError::ModelInvariant(format!(
                        "pair {pair:?} side {side} is neither a scalar nor an older mint"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Rewrite `sequence`, fusing every occurrence of `pair` into `minted`.
///
/// Matching is greedy, non-overlapping, left-to-right: a match at `i`
/// consumes positions `i` and `i + 1` and scanning resumes at `i + 2`, so
/// `[a, a, a]` under the rule `(a, a)` becomes `[minted, a]`.
pub fn apply_merge(
    sequence: &[TokenId],
    pair: TokenPair,
    minted: TokenId,
) -> Vec<TokenId> {
    let mut out = Vec::with_capacity(sequence.len());
    let mut index = 0;

    while index < sequence.len() {
        if index + 1 < sequence.len()
            && sequence[index] == pair.0
            && sequence[index + 1] == pair.1
        {
            out.push(minted);
            index += 2;
        } else {
            out.push(sequence[index]);
            index += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc_table() -> MergeTable {
        let mut table = MergeTable::new();
        table.insert((97, 98), 1000);
        table.insert((1000, 99), 1001);
        table
    }

    #[test]
    fn test_insert_lookup_ordering() {
        let table = abc_table();

        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
        assert_eq!(table.lookup((97, 98)), Some(1000));
        assert_eq!(table.lookup((98, 97)), None);
        assert_eq!(table.ordering(), &[(97, 98), (1000, 99)]);
        assert_eq!(table.first_minted(), Some(1000));

        let rules: Vec<_> = table.iter_rules().collect();
        assert_eq!(rules, vec![((97, 98), 1000), ((1000, 99), 1001)]);
    }

    #[test]
    fn test_validate_well_formed() {
        assert!(MergeTable::new().validate().is_ok());
        assert!(abc_table().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_gaps() {
        let mut table = MergeTable::new();
        table.insert((97, 98), 1000);
        table.insert((98, 99), 1002);

        assert!(matches!(
            table.validate(),
            Err(PolytokError::ModelInvariant(_))
        ));
    }

    #[test]
    fn test_validate_rejects_forward_references() {
        // The second rule refers to a mint newer than itself.
        let mut table = MergeTable::new();
        table.insert((97, 98), 1000);
        table.insert((1002, 99), 1001);

        assert!(matches!(
            table.validate(),
            Err(PolytokError::ModelInvariant(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_scalar_sides() {
        let mut table = MergeTable::new();
        table.insert((-5, 98), 1000);

        assert!(matches!(
            table.validate(),
            Err(PolytokError::ModelInvariant(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_ordering() {
        let mut table = MergeTable::new();
        table.insert((97, 98), 1000);
        table.insert((97, 98), 1001);

        assert!(matches!(
            table.validate(),
            Err(PolytokError::ModelInvariant(_))
        ));
    }

    #[test]
    fn test_apply_merge_non_overlapping() {
        assert_eq!(apply_merge(&[97, 98, 97, 98], (97, 98), 256), vec![256, 256]);
        assert_eq!(apply_merge(&[97, 97, 97], (97, 97), 256), vec![256, 97]);
        assert_eq!(apply_merge(&[98, 97, 98], (97, 98), 256), vec![98, 256]);
    }

    #[test]
    fn test_apply_merge_preserves_tail() {
        assert_eq!(apply_merge(&[97, 98, 99], (97, 98), 256), vec![256, 99]);
        assert_eq!(apply_merge(&[99], (97, 98), 256), vec![99]);
        assert_eq!(apply_merge(&[], (97, 98), 256), Vec::<TokenId>::new());
    }
}
