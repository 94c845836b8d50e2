#![warn(missing_docs, unused)]
//! # `polytok` Multilingual BPE Tokenizer
//!
//! Trains a byte-pair-encoding tokenizer over multilingual Unicode text and
//! applies it. Training learns an ordered sequence of merge rules, each
//! fusing two adjacent tokens into a freshly minted one, until the corpus
//! compresses past a target ratio. The learned model encodes arbitrary
//! strings into integer token sequences and decodes them back.
//!
//! The pipeline, end to end:
//!
//! * [`normalize`] cleans raw text (printable filter, NFKC, whitespace
//!   collapse, lowercase);
//! * [`Corpus`] holds the normalized sentences as code-point sequences, with
//!   thread-safe population;
//! * [`Trainer`] runs the merge loop, counting pairs and substituting the
//!   winner in parallel each iteration;
//! * [`artifact`] persists the learned [`MergeTable`] as a JSON artifact and
//!   reloads it;
//! * [`BpeModel`] applies a loaded table: encode, decode, and per-token
//!   expansion.
//!
//! ```rust
//! use polytok::{BpeModel, Corpus, TrainerOptions};
//!
//! # fn main() -> polytok::PtResult<()> {
//! let corpus = Corpus::new();
//! corpus.add_list(["the cat sat", "the cat sat", "the mat"]);
//!
//! let table = TrainerOptions::default()
//!     .with_stop_ratio(1.5)
//!     .init()
//!     .train(&corpus)?;
//!
//! let model = BpeModel::from_table(table)?;
//! let tokens = model.encode("the cat");
//! assert_eq!(model.decode(&tokens)?, "the cat");
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod concurrency;
pub mod corpus;
pub mod model;
pub mod normalize;
pub mod source;
pub mod stats;
pub mod trainer;

mod errors;
mod merges;
mod types;

#[doc(inline)]
pub use corpus::Corpus;
#[doc(inline)]
pub use errors::*;
#[doc(inline)]
pub use merges::{MergeTable, apply_merge};
#[doc(inline)]
pub use model::BpeModel;
#[doc(inline)]
pub use normalize::normalize;
#[doc(inline)]
pub use stats::PairStats;
#[doc(inline)]
pub use trainer::{Trainer, TrainerOptions};
#[doc(inline)]
pub use types::*;
