//! # Parallelism Heuristics

use core::str::FromStr;
use std::{env, thread};

/// Lower bound on sentences per batch.
const MIN_BATCH: usize = 100;

/// Upper bound on sentences per batch.
const MAX_BATCH: usize = 10_000;

/// Estimate the parallelism available to the worker pool.
///
/// Honors `RAYON_NUM_THREADS` when set, since that caps the pool rayon
/// actually builds.
pub fn est_max_parallelism() -> usize {
    if let Some(n @ 1..) = env::var("RAYON_NUM_THREADS")
        .ok()
        .and_then(|s| usize::from_str(&s).ok())
    {
        return n;
    }

    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Sentences per work batch for `total` sentences.
///
/// Targets roughly four batches per worker, clamped to `[100, 10000]` to
/// balance scheduling overhead against cache locality. A performance
/// guideline, not a correctness constraint.
pub fn batch_size(total: usize) -> usize {
    let workers = est_max_parallelism();
    (total / (4 * workers)).clamp(MIN_BATCH, MAX_BATCH)
}
