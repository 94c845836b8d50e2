//! # Corpus Sources
//!
//! A corpus source yields units of `{ language tag -> raw sentences }`. The
//! training driver consumes the stream and routes every sentence list into
//! the corpus; source errors are fatal to the training job.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::corpus::Corpus;
use crate::errors::{PolytokError, PtResult};

/// One input unit: language tag to raw sentence list.
pub type LanguageBatch = HashMap<String, Vec<String>>;

/// A stream of corpus input units.
///
/// Sources are plain iterators so the driver can consume an unbounded
/// stream; fetching is the I/O boundary and runs serially.
pub trait CorpusSource: Iterator<Item = PtResult<LanguageBatch>> {}

impl<T: Iterator<Item = PtResult<LanguageBatch>>> CorpusSource for T {}

/// Drain a source into the corpus.
///
/// The sentence lists inside each unit fan out across the worker pool;
/// normalization runs outside the corpus lock, so producers only contend on
/// the append itself.
pub fn populate<S: CorpusSource>(
    corpus: &Corpus,
    source: S,
) -> PtResult<()> {
    for unit in source {
        let unit = unit?;
        unit.into_par_iter()
            .for_each(|(_, sentences)| corpus.add_list(&sentences));
    }
    Ok(())
}

/// Reads `*.json` shard files from a directory, in sorted order.
///
/// Each shard holds one `{ language -> [sentence, ...] }` object, the
/// local-filesystem layout of the corpus store.
#[derive(Debug)]
pub struct ShardDirSource {
    paths: std::vec::IntoIter<PathBuf>,
}

impl ShardDirSource {
    /// List the shard files under `dir`.
    pub fn open(dir: impl AsRef<Path>) -> PtResult<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();

        let entries = fs::read_dir(dir)
            .map_err(|err| PolytokError::Source(format!("{}: {err}", dir.display())))?;
        for entry in entries {
            let entry = entry.map_err(|err| PolytokError::Source(err.to_string()))?;
            let path = entry.path();
            let is_file = entry
                .file_type()
                .map_err(|err| PolytokError::Source(err.to_string()))?
                .is_file();
            if is_file && path.extension().unwrap_or_default() == "json" {
                paths.push(path);
            }
        }
        paths.sort();

        Ok(Self {
            paths: paths.into_iter(),
        })
    }
}

impl Iterator for ShardDirSource {
    type Item = PtResult<LanguageBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.next()?;
        Some(read_shard(&path))
    }
}

fn read_shard(path: &Path) -> PtResult<LanguageBatch> {
    let bytes =
        fs::read(path).map_err(|err| PolytokError::Source(format!("{}: {err}", path.display())))?;

    let text = String::from_utf8(bytes).map_err(|_| {
        PolytokError::InvalidInputText(format!("{} is not valid UTF-8", path.display()))
    })?;

    serde_json::from_str(&text)
        .map_err(|err| PolytokError::Source(format!("{}: {err}", path.display())))
}
