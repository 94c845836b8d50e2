//! # Merge-Loop Trainer
//!
//! Repeatedly counts adjacent pairs across the corpus, fuses the most
//! frequent pair into a freshly minted token, and records the rule, until
//! the corpus has compressed past the configured ratio.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::artifact::SnapshotWriter;
use crate::corpus::Corpus;
use crate::errors::{PolytokError, PtResult};
use crate::merges::MergeTable;
use crate::stats::PairStats;

/// Tuning knobs for [`Trainer`].
#[derive(Debug, Clone)]
pub struct TrainerOptions {
    /// Stop once `initial_total / current_total` exceeds this ratio.
    pub stop_ratio: f64,

    /// Emit a snapshot each time the ratio crosses a multiple of this step.
    pub checkpoint_step: f64,
}

impl Default for TrainerOptions {
    fn default() -> Self {
        Self {
            stop_ratio: 5.0,
            checkpoint_step: 0.1,
        }
    }
}

impl TrainerOptions {
    /// Sets the termination ratio.
    pub fn with_stop_ratio(
        self,
        stop_ratio: f64,
    ) -> Self {
        Self { stop_ratio, ..self }
    }

    /// Sets the snapshot ratio step.
    pub fn with_checkpoint_step(
        self,
        checkpoint_step: f64,
    ) -> Self {
        Self {
            checkpoint_step,
            ..self
        }
    }

    /// Initializes a [`Trainer`] from these options.
    pub fn init(self) -> Trainer {
        Trainer::new(self)
    }
}

/// The BPE merge loop.
pub struct Trainer {
    /// Trainer options.
    pub options: TrainerOptions,

    cancel: Arc<AtomicBool>,
    snapshots: Option<SnapshotWriter>,
}

impl Trainer {
    /// Create a trainer with no snapshot writer and an unset cancel flag.
    pub fn new(options: TrainerOptions) -> Self {
        Self {
            options,
            cancel: Arc::new(AtomicBool::new(false)),
            snapshots: None,
        }
    }

    /// Install a cooperative cancellation flag, checked between iterations.
    pub fn with_cancel_flag(
        mut self,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        self.cancel = cancel;
        self
    }

    /// Write ratio-step snapshots (and the cancellation snapshot) here.
    pub fn with_snapshots(
        mut self,
        snapshots: SnapshotWriter,
    ) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    /// Run the merge loop over a populated corpus.
    ///
    /// Each iteration counts adjacent pairs in parallel, picks the most
    /// frequent one, substitutes it throughout the corpus, and records the
    /// rule. Minted ids count up from `max_token_id + 1`. The loop ends when
    /// the compression ratio exceeds `stop_ratio`, and stops early when the
    /// best pair occurs fewer than twice, since no compression is possible
    /// past that point.
    ///
    /// Returns [`PolytokError::Cancelled`] when the cancel flag is observed
    /// between iterations; the merge table learned so far is snapshotted
    /// first.
    pub fn train(
        &mut self,
        corpus: &Corpus,
    ) -> PtResult<MergeTable> {
        let mut mint = corpus.max_token_id() + 1;
        let initial_total = corpus.total_length();
        let mut table = MergeTable::new();

        if initial_total == 0 {
            log::warn!("empty corpus, nothing to train");
            return Ok(table);
        }

        log::info!(
            "training over {} sentences, {} tokens, first mint {}",
            corpus.len(),
            initial_total,
            mint
        );

        let mut next_mark = 1.0 + self.options.checkpoint_step;

        loop {
            let stats = corpus.with_sentences(PairStats::count_corpus);

            let Some((pair, count)) = stats.argmax() else {
                log::warn!("no adjacent pairs remain after {} merges", table.len());
                break;
            };
            if count < 2 {
                log::info!(
                    "best pair {pair:?} occurs once, stopping after {} merges",
                    table.len()
                );
                break;
            }

            table.insert(pair, mint);
            corpus.replace_all(pair, mint);

            let new_total = corpus.total_length();
            let ratio = initial_total as f64 / new_total as f64;
            log::info!(
                "merge {}: {pair:?} -> {mint} (count {count}, ratio {ratio:.4})",
                table.len()
            );

            if ratio >= next_mark {
                self.snapshot(&table);
                let step = self.options.checkpoint_step;
                next_mark = (ratio / step).floor() * step + step;
            }

            if self.cancel.load(Ordering::Relaxed) {
                log::info!("cancellation requested, stopping after {} merges", table.len());
                self.snapshot(&table);
                return Err(PolytokError::Cancelled);
            }

            if ratio > self.options.stop_ratio {
                break;
            }

            mint += 1;
        }

        Ok(table)
    }

    /// Best-effort snapshot; failures are logged, never fatal.
    fn snapshot(
        &mut self,
        table: &MergeTable,
    ) {
        if let Some(snapshots) = &mut self.snapshots {
            match snapshots.write(table) {
                Ok(path) => log::debug!("snapshot written to {}", path.display()),
                Err(err) => log::warn!("snapshot failed: {err}"),
            }
        }
    }
}
