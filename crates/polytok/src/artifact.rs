//! # Model Artifact IO
//!
//! The persisted model is a single JSON object:
//!
//! ```json
//! { "merges": { "97,98": 256 }, "ordering": [[97, 98]] }
//! ```
//!
//! Keys are `"<a>,<b>"` with base-10 signed integers; `ordering` lists the
//! rules in the order they were learned. Saves are atomic (same-directory
//! temp file plus rename). Loads parse the file typed, narrow the string
//! keys, and validate the merge-table invariants before returning.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{PolytokError, PtResult};
use crate::merges::MergeTable;
use crate::types::{TokenId, TokenPair};

/// On-disk shape of the model artifact.
#[derive(Debug, Serialize, Deserialize)]
struct ArtifactFile {
    merges: HashMap<String, TokenId>,
    ordering: Vec<[TokenId; 2]>,
}

fn pair_key(pair: TokenPair) -> String {
    format!("{},{}", pair.0, pair.1)
}

fn parse_pair_key(key: &str) -> PtResult<TokenPair> {
    let malformed = || PolytokError::ModelParse(format!("malformed merge key {key:?}"));

    let (a, b) = key.split_once(',').ok_or_else(&malformed)?;
    let a = a.parse::<TokenId>().map_err(|_| malformed())?;
    let b = b.parse::<TokenId>().map_err(|_| malformed())?;

    Ok((a, b))
}

/// Atomically write `table` to `path`.
///
/// The artifact lands under a temporary name first and is renamed into
/// place, so readers never observe a partial file.
pub fn save(
    table: &MergeTable,
    path: impl AsRef<Path>,
) -> PtResult<()> {
    let path = path.as_ref();

    let artifact = ArtifactFile {
        merges: table
            .iter_rules()
            .map(|(pair, minted)| (pair_key(pair), minted))
            .collect(),
        ordering: table.ordering().iter().map(|&(a, b)| [a, b]).collect(),
    };

    let data = serde_json::to_vec(&artifact)
        .map_err(|err| PolytokError::ModelParse(err.to_string()))?;

    let tmp = tmp_path(path);
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load a model artifact and validate it.
///
/// Fails with [`PolytokError::Io`] on filesystem errors,
/// [`PolytokError::ModelParse`] on invalid JSON or malformed keys, and
/// [`PolytokError::ModelInvariant`] when the table fails validation.
pub fn load(path: impl AsRef<Path>) -> PtResult<MergeTable> {
    let bytes = fs::read(path.as_ref())?;
    let artifact: ArtifactFile = serde_json::from_slice(&bytes)
        .map_err(|err| PolytokError::ModelParse(err.to_string()))?;

    let mut merges = HashMap::with_capacity(artifact.merges.len());
    for (key, minted) in &artifact.merges {
        merges.insert(parse_pair_key(key)?, *minted);
    }

    let mut table = MergeTable::new();
    for entry in &artifact.ordering {
        let pair = (entry[0], entry[1]);
        let minted = merges.get(&pair).ok_or_else(|| {
            PolytokError::ModelInvariant(format!("ordering pair {pair:?} missing from merges"))
        })?;
        table.insert(pair, *minted);
    }

    table.validate()?;
    Ok(table)
}

/// Writes periodic merge-table snapshots with a monotonic index.
///
/// Snapshots land next to the final model as `merges_<k>.json`, `k` counting
/// up from 0. Snapshot failures are the caller's to log; they never clobber
/// the final artifact.
#[derive(Debug)]
pub struct SnapshotWriter {
    dir: PathBuf,
    next_index: usize,
}

impl SnapshotWriter {
    /// Snapshot into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_index: 0,
        }
    }

    /// Write the next `merges_<k>.json` snapshot, returning its path.
    pub fn write(
        &mut self,
        table: &MergeTable,
    ) -> PtResult<PathBuf> {
        let path = self.dir.join(format!("merges_{}.json", self.next_index));
        save(table, &path)?;
        self.next_index += 1;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn sample_table() -> MergeTable {
        let mut table = MergeTable::new();
        table.insert((97, 98), 123);
        table.insert((123, 99), 124);
        table.insert((-1, 124), 125);
        table
    }

    #[test]
    fn test_pair_key_round_trip() {
        assert_eq!(pair_key((97, 98)), "97,98");
        assert_eq!(parse_pair_key("97,98").unwrap(), (97, 98));
        assert_eq!(parse_pair_key("-1,124").unwrap(), (-1, 124));
    }

    #[test]
    fn test_parse_pair_key_rejects_garbage() {
        for key in ["", "97", "97,", ",98", "a,b", "1,2,3", "1.5,2"] {
            assert!(
                matches!(parse_pair_key(key), Err(PolytokError::ModelParse(_))),
                "accepted {key:?}"
            );
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new("polytok-artifact").unwrap();
        let path = dir.path().join("merges.json");

        let mut table = MergeTable::new();
        table.insert((97, 98), 123);
        table.insert((123, 99), 124);

        save(&table, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, table);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new("polytok-artifact").unwrap();
        let path = dir.path().join("merges.json");

        let mut table = MergeTable::new();
        table.insert((97, 98), 123);
        save(&table, &path).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["merges.json".to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new("polytok-artifact").unwrap();
        let result = load(dir.path().join("nope.json"));

        assert!(matches!(result, Err(PolytokError::Io(_))));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = TempDir::new("polytok-artifact").unwrap();
        let path = dir.path().join("merges.json");
        fs::write(&path, b"{ not json").unwrap();

        assert!(matches!(load(&path), Err(PolytokError::ModelParse(_))));
    }

    #[test]
    fn test_load_rejects_malformed_keys() {
        let dir = TempDir::new("polytok-artifact").unwrap();
        let path = dir.path().join("merges.json");
        fs::write(&path, br#"{"merges": {"oops": 256}, "ordering": [[97, 98]]}"#).unwrap();

        assert!(matches!(load(&path), Err(PolytokError::ModelParse(_))));
    }

    #[test]
    fn test_load_rejects_invariant_violations() {
        let dir = TempDir::new("polytok-artifact").unwrap();
        let path = dir.path().join("merges.json");

        // Ordering entry without a merges key.
        fs::write(&path, br#"{"merges": {"97,98": 256}, "ordering": [[1, 2]]}"#).unwrap();
        assert!(matches!(load(&path), Err(PolytokError::ModelInvariant(_))));

        // Minted ids with a gap.
        fs::write(
            &path,
            br#"{"merges": {"97,98": 256, "98,99": 300}, "ordering": [[97, 98], [98, 99]]}"#,
        )
        .unwrap();
        assert!(matches!(load(&path), Err(PolytokError::ModelInvariant(_))));
    }

    #[test]
    fn test_invalid_sample_table_round_trips_to_error() {
        // A side of -1 is not a scalar; save succeeds, load rejects.
        let dir = TempDir::new("polytok-artifact").unwrap();
        let path = dir.path().join("merges.json");

        save(&sample_table(), &path).unwrap();
        assert!(matches!(load(&path), Err(PolytokError::ModelInvariant(_))));
    }

    #[test]
    fn test_snapshot_writer_names() {
        let dir = TempDir::new("polytok-artifact").unwrap();
        let mut writer = SnapshotWriter::new(dir.path());

        let mut table = MergeTable::new();
        table.insert((97, 98), 123);

        let first = writer.write(&table).unwrap();
        let second = writer.write(&table).unwrap();

        assert_eq!(first, dir.path().join("merges_0.json"));
        assert_eq!(second, dir.path().join("merges_1.json"));
        assert_eq!(load(&first).unwrap(), table);
    }
}
