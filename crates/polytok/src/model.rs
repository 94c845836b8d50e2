//! # Loaded Model: Encode and Decode
//!
//! A [`BpeModel`] wraps a validated merge table together with the
//! reconstruction map that expands each minted token back to its text. The
//! model is immutable once built; the HTTP service shares one instance
//! across request handlers without locks.

use std::path::Path;

use crate::artifact;
use crate::errors::{PolytokError, PtResult};
use crate::merges::{MergeTable, apply_merge};
use crate::normalize::normalize;
use crate::stats::PairStats;
use crate::types::{CommonHashMap, TokenId, TokenPair, token_scalar};

/// An immutable trained model.
#[derive(Debug, Clone)]
pub struct BpeModel {
    table: MergeTable,

    /// `{ minted -> expansion }`, built by replaying the rule ordering.
    /// Minted entries shadow scalar values with the same id.
    text_of: CommonHashMap<TokenId, String>,

    /// `{ minted -> pair }`, the inverse rule map behind `components`.
    rule_of: CommonHashMap<TokenId, TokenPair>,
}

impl BpeModel {
    /// Build a model from a merge table, validating it first.
    ///
    /// The reconstruction map is filled by walking the ordering: each minted
    /// token's text is the concatenation of its pair sides, which the table
    /// invariants guarantee are scalars or older mints.
    pub fn from_table(table: MergeTable) -> PtResult<Self> {
        table.validate()?;

        let mut text_of: CommonHashMap<TokenId, String> = CommonHashMap::default();
        let mut rule_of: CommonHashMap<TokenId, TokenPair> = CommonHashMap::default();

        for (pair, minted) in table.iter_rules() {
            let mut expansion = String::new();
            for side in [pair.0, pair.1] {
                match text_of.get(&side) {
                    Some(text) => expansion.push_str(text),
                    None => {
                        let scalar = token_scalar(side).ok_or_else(|| {
                            PolytokError::ModelInvariant(format!(
                                "pair side {side} has no expansion"
                            ))
                        })?;
                        expansion.push(scalar);
                    }
                }
            }
            text_of.insert(minted, expansion);
            rule_of.insert(minted, pair);
        }

        Ok(Self {
            table,
            text_of,
            rule_of,
        })
    }

    /// Load a model artifact from disk and build the model.
    pub fn load(path: impl AsRef<Path>) -> PtResult<Self> {
        Self::from_table(artifact::load(path)?)
    }

    /// The underlying merge table.
    pub fn table(&self) -> &MergeTable {
        &self.table
    }

    /// Encode a raw string into a token sequence.
    ///
    /// The input is normalized and converted to code points; then, while any
    /// learned pair is present, the pair with the minimum minted id (the
    /// earliest-learned rule) is substituted throughout. Applying rules in
    /// learned order reproduces the training dynamics. The empty string
    /// encodes to the empty sequence.
    pub fn encode(
        &self,
        input: &str,
    ) -> Vec<TokenId> {
        let mut sequence: Vec<TokenId> =
            normalize(input).chars().map(|c| c as TokenId).collect();

        loop {
            let mut stats = PairStats::default();
            stats.count_sentence(&sequence);

            let next = stats
                .pairs()
                .filter_map(|pair| self.table.lookup(pair).map(|minted| (minted, pair)))
                .min_by_key(|&(minted, _)| minted);

            let Some((minted, pair)) = next else { break };
            sequence = apply_merge(&sequence, pair, minted);
        }

        sequence
    }

    /// Decode a token sequence back to text.
    ///
    /// Minted tokens resolve through the reconstruction map; scalar ids
    /// resolve to their code point. Anything else fails with
    /// [`PolytokError::UnknownToken`]. The empty sequence decodes to the
    /// empty string.
    pub fn decode(
        &self,
        tokens: &[TokenId],
    ) -> PtResult<String> {
        let mut out = String::new();
        for &token in tokens {
            match self.text_of.get(&token) {
                Some(text) => out.push_str(text),
                None => match token_scalar(token) {
                    Some(scalar) => out.push(scalar),
                    None => return Err(PolytokError::UnknownToken { token }),
                },
            }
        }
        Ok(out)
    }

    /// The text a single token decodes to.
    pub fn token_text(
        &self,
        token: TokenId,
    ) -> PtResult<String> {
        self.decode(core::slice::from_ref(&token))
    }

    /// Render each token of a sequence as its text.
    pub fn token_texts(
        &self,
        tokens: &[TokenId],
    ) -> PtResult<Vec<String>> {
        tokens.iter().map(|&token| self.token_text(token)).collect()
    }

    /// The base code-point strings composing `token`, in order, found by
    /// recursively expanding the merge rules.
    ///
    /// Concatenating the components always agrees with
    /// [`BpeModel::token_text`].
    pub fn components(
        &self,
        token: TokenId,
    ) -> PtResult<Vec<String>> {
        let mut out = Vec::new();
        self.expand_components(token, &mut out)?;
        Ok(out)
    }

    fn expand_components(
        &self,
        token: TokenId,
        out: &mut Vec<String>,
    ) -> PtResult<()> {
        if let Some(&(a, b)) = self.rule_of.get(&token) {
            self.expand_components(a, out)?;
            self.expand_components(b, out)?;
            return Ok(());
        }

        match token_scalar(token) {
            Some(scalar) => {
                out.push(scalar.to_string());
                Ok(())
            }
            None => Err(PolytokError::UnknownToken { token }),
        }
    }
}
