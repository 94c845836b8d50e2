//! # Adjacent-Pair Statistics
//!
//! Per-iteration frequency map over adjacent token pairs. One of these is
//! created at the start of each merge iteration and discarded at its end.

use rayon::prelude::*;

use crate::concurrency::batch_size;
use crate::types::{PairCountMap, TokenId, TokenPair};

/// Frequency of adjacent pairs, plus a running argmax.
#[derive(Debug, Default)]
pub struct PairStats {
    freq: PairCountMap,
    best: Option<(TokenPair, u64)>,
}

impl PairStats {
    /// Increment the count for `pair`, updating the running argmax.
    ///
    /// The argmax only moves on a strictly greater count, so among pairs
    /// with equal counts the one counted first wins.
    pub fn insert_pair(
        &mut self,
        pair: TokenPair,
    ) {
        let count = self.freq.entry(pair).or_insert(0);
        *count += 1;

        match self.best {
            Some((_, best)) if *count <= best => {}
            _ => self.best = Some((pair, *count)),
        }
    }

    /// Count every adjacent pair in `sentence`.
    pub fn count_sentence(
        &mut self,
        sentence: &[TokenId],
    ) {
        for window in sentence.windows(2) {
            self.insert_pair((window[0], window[1]));
        }
    }

    /// The most frequent pair and its count, if any pair was counted.
    pub fn argmax(&self) -> Option<(TokenPair, u64)> {
        self.best
    }

    /// Occurrences of `pair`.
    pub fn get(
        &self,
        pair: TokenPair,
    ) -> u64 {
        self.freq.get(&pair).copied().unwrap_or(0)
    }

    /// Number of distinct pairs counted.
    pub fn len(&self) -> usize {
        self.freq.len()
    }

    /// True when nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }

    /// Iterate the distinct pairs, in no particular order.
    pub fn pairs(&self) -> impl Iterator<Item = TokenPair> + '_ {
        self.freq.keys().copied()
    }

    /// Fold another map into this one, summing counts. Leaves the running
    /// argmax stale; [`PairStats::count_corpus`] recomputes it afterwards.
    fn merge(
        &mut self,
        other: PairStats,
    ) {
        for (pair, count) in other.freq {
            *self.freq.entry(pair).or_insert(0) += count;
        }
    }

    /// Recompute the argmax by rescanning sentences in corpus order.
    ///
    /// The winner is the first pair, by sentence index then position, to
    /// carry the maximal count. This is the tie-break the trainer depends on
    /// for deterministic merge ordering.
    fn recompute_argmax(
        &mut self,
        sentences: &[Vec<TokenId>],
    ) {
        self.best = None;
        let mut best = 0;

        for sentence in sentences {
            for window in sentence.windows(2) {
                let pair = (window[0], window[1]);
                let count = self.get(pair);
                if count > best {
                    best = count;
                    self.best = Some((pair, count));
                }
            }
        }
    }

    /// Count every adjacent pair across a whole corpus, in parallel.
    ///
    /// Workers fill thread-local maps over sentence batches; the coordinator
    /// performs one serial reduce and recomputes the argmax in corpus order,
    /// so the result is independent of scheduling.
    pub fn count_corpus(sentences: &[Vec<TokenId>]) -> PairStats {
        let locals: Vec<PairStats> = sentences
            .par_chunks(batch_size(sentences.len()))
            .map(|chunk| {
                let mut local = PairStats::default();
                for sentence in chunk {
                    local.count_sentence(sentence);
                }
                local
            })
            .collect();

        let mut stats = PairStats::default();
        for local in locals {
            stats.merge(local);
        }
        stats.recompute_argmax(sentences);

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_sentence() {
        let mut stats = PairStats::default();
        stats.count_sentence(&[97, 98, 97, 98]);

        assert_eq!(stats.get((97, 98)), 2);
        assert_eq!(stats.get((98, 97)), 1);
        assert_eq!(stats.get((98, 98)), 0);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats.argmax(), Some(((97, 98), 2)));
    }

    #[test]
    fn test_short_sentences_count_nothing() {
        let mut stats = PairStats::default();
        stats.count_sentence(&[]);
        stats.count_sentence(&[42]);

        assert!(stats.is_empty());
        assert_eq!(stats.argmax(), None);
    }

    #[test]
    fn test_argmax_tie_keeps_first() {
        let mut stats = PairStats::default();
        // (1, 2) and (3, 4) both end at count 2; (1, 2) got there first.
        for pair in [(1, 2), (3, 4), (1, 2), (3, 4)] {
            stats.insert_pair(pair);
        }

        assert_eq!(stats.argmax(), Some(((1, 2), 2)));
    }

    #[test]
    fn test_count_corpus_matches_serial() {
        let sentences: Vec<Vec<TokenId>> = (0..500)
            .map(|i| vec![97, 98, 99, 97, 98, i % 7])
            .collect();

        let parallel = PairStats::count_corpus(&sentences);

        let mut serial = PairStats::default();
        for sentence in &sentences {
            serial.count_sentence(sentence);
        }

        assert_eq!(parallel.len(), serial.len());
        for pair in serial.pairs() {
            assert_eq!(parallel.get(pair), serial.get(pair));
        }
        assert_eq!(parallel.argmax(), serial.argmax());
    }

    #[test]
    fn test_count_corpus_tie_break_in_corpus_order() {
        // (5, 6) and (7, 8) both occur twice; (5, 6) appears first by
        // sentence index, so it wins the tie.
        let sentences: Vec<Vec<TokenId>> =
            vec![vec![5, 6], vec![7, 8], vec![5, 6], vec![7, 8]];

        let stats = PairStats::count_corpus(&sentences);
        assert_eq!(stats.argmax(), Some(((5, 6), 2)));
    }

    #[test]
    fn test_count_corpus_empty() {
        let stats = PairStats::count_corpus(&[]);
        assert!(stats.is_empty());
        assert_eq!(stats.argmax(), None);
    }
}
