//! # Training Corpus
//!
//! Owns the sentence table: one integer code-point sequence per normalized
//! input sentence. Population is thread-safe behind a mutex; afterwards the
//! trainer is the single writer, and substitution rewrites sentences in
//! parallel into disjoint slots.

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::concurrency::batch_size;
use crate::merges::apply_merge;
use crate::normalize::normalize;
use crate::types::{CommonHashSet, TokenId, TokenPair};

/// The sentence store.
///
/// Sentence order carries no meaning, but it is preserved so a training run
/// can be replayed deterministically.
#[derive(Debug, Default)]
pub struct Corpus {
    sentences: Mutex<Vec<Vec<TokenId>>>,
}

impl Corpus {
    /// Create an empty corpus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize and append a batch of raw sentences.
    ///
    /// Normalization and code-point conversion run outside the critical
    /// section; only the append itself holds the lock. Multiple producers
    /// may call concurrently; acquisition order is unspecified.
    pub fn add_list<I, S>(
        &self,
        raw: I,
    ) where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in raw {
            let sentence: Vec<TokenId> = normalize(raw.as_ref())
                .chars()
                .map(|c| c as TokenId)
                .collect();
            self.sentences.lock().push(sentence);
        }
    }

    /// Number of sentences.
    pub fn len(&self) -> usize {
        self.sentences.lock().len()
    }

    /// True when the corpus holds no sentences.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The largest token id present, or `-1` for an empty corpus.
    pub fn max_token_id(&self) -> TokenId {
        let sentences = self.sentences.lock();
        sentences.iter().flatten().copied().max().unwrap_or(-1)
    }

    /// Sum of sentence lengths.
    pub fn total_length(&self) -> u64 {
        let sentences = self.sentences.lock();
        sentences.iter().map(|s| s.len() as u64).sum()
    }

    /// Number of distinct token ids present.
    pub fn unique_token_count(&self) -> usize {
        let sentences = self.sentences.lock();
        let unique: CommonHashSet<TokenId> = sentences.iter().flatten().copied().collect();
        unique.len()
    }

    /// Run `f` over the sentence table without copying it.
    pub fn with_sentences<R>(
        &self,
        f: impl FnOnce(&[Vec<TokenId>]) -> R,
    ) -> R {
        let sentences = self.sentences.lock();
        f(&sentences)
    }

    /// Substitute every non-overlapping left-to-right occurrence of `pair`
    /// with the single token `minted`, in every sentence.
    ///
    /// Sentences are rewritten in parallel; each worker writes only its own
    /// slots, so the table lock is the only synchronization needed.
    pub fn replace_all(
        &self,
        pair: TokenPair,
        minted: TokenId,
    ) {
        let mut sentences = self.sentences.lock();
        let batch = batch_size(sentences.len());

        sentences.par_chunks_mut(batch).for_each(|chunk| {
            for sentence in chunk {
                if sentence.len() >= 2 {
                    *sentence = apply_merge(sentence, pair, minted);
                }
            }
        });
    }

    /// Consume the corpus, returning the sentence table.
    pub fn into_sentences(self) -> Vec<Vec<TokenId>> {
        self.sentences.into_inner()
    }
}
