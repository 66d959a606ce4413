//! Batch directory layout for bulk solver runs.
//!
//! A batch is written once as a JSON array document and then split into one
//! compact record file per element, named `config.<kind>.<suffix>` where the
//! suffix is a five-letter ordinal (`aaaaa`, `aaaab`, ...). Lexicographic
//! order of the files is record order.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tempfile::TempDir;
use tracing::debug;

use crate::errors::{ContractViolation, SolverError};

pub const RECORD_PREFIX: &str = "config";
pub const SPLITS_RECORD: &str = "splits";
pub const ALGORITHM_RECORD: &str = "alg";
pub const PROPAGATE_RECORD: &str = "prob";
pub const SUFFIX_LEN: usize = 5;

/// Temporary directory holding one batch. Removed on drop.
#[derive(Debug)]
pub struct BatchDir {
    dir: TempDir,
}

impl BatchDir {
    pub fn create_in(parent: &Path) -> Result<Self, SolverError> {
        let dir = tempfile::Builder::new()
            .prefix("batch_")
            .tempdir_in(parent)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `records` as an array document, then split it into record files.
    pub fn write_records<T: Serialize>(
        &self,
        kind: &str,
        records: &[T],
    ) -> Result<Vec<PathBuf>, SolverError> {
        let array_path = self.path().join(format!("batch_{kind}.json"));
        let mut writer = BufWriter::new(File::create(&array_path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;
        self.split_array(kind, &array_path)
    }

    fn split_array(&self, kind: &str, array_path: &Path) -> Result<Vec<PathBuf>, SolverError> {
        let records: Vec<Value> = serde_json::from_reader(BufReader::new(File::open(array_path)?))?;
        let paths = records
            .iter()
            .enumerate()
            .map(|(ordinal, record)| {
                let suffix =
                    ordinal_suffix(ordinal).ok_or(SolverError::BatchTooLarge(records.len()))?;
                let path = self.path().join(format!("{RECORD_PREFIX}.{kind}.{suffix}"));
                fs::write(&path, format!("{}\n", serde_json::to_string(record)?))?;
                Ok(path)
            })
            .collect::<Result<Vec<_>, SolverError>>()?;
        debug!(kind, records = paths.len(), dir = %self.path().display(), "split batch");
        Ok(paths)
    }

    /// Record files of `kind`, in record order.
    pub fn records(&self, kind: &str) -> Result<Vec<PathBuf>, SolverError> {
        let prefix = format!("{RECORD_PREFIX}.{kind}.");
        let mut paths = Vec::new();
        for entry in fs::read_dir(self.path())? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }
}

/// Five-letter base-26 name of `ordinal`, or `None` past `zzzzz`.
pub fn ordinal_suffix(mut ordinal: usize) -> Option<String> {
    let mut letters = [b'a'; SUFFIX_LEN];
    for slot in letters.iter_mut().rev() {
        *slot = b'a' + (ordinal % 26) as u8;
        ordinal /= 26;
    }
    if ordinal > 0 {
        return None;
    }
    Some(letters.iter().map(|&b| char::from(b)).collect())
}

fn record_suffix(path: &Path) -> Option<&str> {
    path.extension().and_then(OsStr::to_str)
}

/// Pair split records with algorithm records by position. Both lists must
/// have the same length and matching suffixes at every position.
pub fn pair_records(
    splits: &[PathBuf],
    algorithms: &[PathBuf],
) -> Result<Vec<(PathBuf, PathBuf)>, SolverError> {
    if splits.len() != algorithms.len() {
        return Err(ContractViolation::BatchPairingMismatch {
            split: format!("{} split records", splits.len()),
            algorithm: format!("{} algorithm records", algorithms.len()),
        }
        .into());
    }
    splits
        .iter()
        .zip(algorithms)
        .map(|(split, algorithm)| {
            if record_suffix(split).is_none() || record_suffix(split) != record_suffix(algorithm) {
                return Err(ContractViolation::BatchPairingMismatch {
                    split: split.display().to_string(),
                    algorithm: algorithm.display().to_string(),
                }
                .into());
            }
            Ok((split.clone(), algorithm.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn suffixes_count_in_base_26() {
        assert_eq!(ordinal_suffix(0).as_deref(), Some("aaaaa"));
        assert_eq!(ordinal_suffix(1).as_deref(), Some("aaaab"));
        assert_eq!(ordinal_suffix(26).as_deref(), Some("aaaba"));
        assert_eq!(ordinal_suffix(26usize.pow(5) - 1).as_deref(), Some("zzzzz"));
        assert_eq!(ordinal_suffix(26usize.pow(5)), None);
    }

    #[test]
    fn records_split_one_per_file_in_order() {
        let parent = tempfile::tempdir().unwrap();
        let batch = BatchDir::create_in(parent.path()).unwrap();
        let docs: Vec<_> = (0..30).map(|i| json!({"n": i})).collect();
        let written = batch.write_records(PROPAGATE_RECORD, &docs).unwrap();
        let listed = batch.records(PROPAGATE_RECORD).unwrap();
        assert_eq!(written, listed);
        assert_eq!(listed.len(), 30);
        let last = fs::read_to_string(&listed[29]).unwrap();
        assert_eq!(last.trim(), r#"{"n":29}"#);
        assert!(batch.records(SPLITS_RECORD).unwrap().is_empty());
    }

    #[test]
    fn batch_dir_is_removed_on_drop() {
        let parent = tempfile::tempdir().unwrap();
        let path = {
            let batch = BatchDir::create_in(parent.path()).unwrap();
            batch.write_records(SPLITS_RECORD, &[json!(1)]).unwrap();
            batch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn pairing_requires_matching_suffixes() {
        let s = vec![PathBuf::from("config.splits.aaaaa"), PathBuf::from("config.splits.aaaab")];
        let a = vec![PathBuf::from("config.alg.aaaaa"), PathBuf::from("config.alg.aaaac")];
        assert!(matches!(
            pair_records(&s, &a),
            Err(SolverError::ContractViolation(ContractViolation::BatchPairingMismatch { .. }))
        ));
        assert!(pair_records(&s, &a[..1]).is_err());
        assert_eq!(pair_records(&s[..1], &a[..1]).unwrap().len(), 1);
    }
}
