//! Bulk loading of SMILES files into prepared molecules.
//!
//! Every loaded record goes through the same steps: parse without
//! sanitization, refresh the property cache with the strict valence check,
//! then annotate conjugation. Records that fail a step are skipped and
//! reported to a [`SkipSink`] unless the [`FailurePolicy`] says otherwise.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::conjugation::set_conjugation;
use crate::error::LoadError;
use crate::mol::Mol;
use crate::smiles::{parse_smiles, SmilesError};
use crate::supplier::{RawRecord, SmilesSupplier, SupplierItem};
use crate::valence::{update_property_cache, ValenceError};

/// What a load does with a record that fails the valence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Report it to the skip sink and carry on.
    #[default]
    Skip,
    /// End the load with [`LoadError::Record`].
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Stop after this many loaded molecules. `None` and `Some(0)` read the
    /// whole input.
    pub max_count: Option<usize>,
    /// Characters that separate fields.
    pub delimiters: String,
    pub smiles_column: usize,
    /// Column holding the record name; `None` names records by line number.
    pub name_column: Option<usize>,
    /// Skip the first line of the input.
    pub title_line: bool,
    pub policy: FailurePolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_count: None,
            delimiters: " \t".to_string(),
            smiles_column: 1,
            name_column: Some(0),
            title_line: false,
            policy: FailurePolicy::Skip,
        }
    }
}

impl LoadOptions {
    fn limit(&self) -> Option<usize> {
        self.max_count.filter(|&n| n > 0)
    }
}

/// A parsed molecule with its cache refreshed and conjugation annotated.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeRecord {
    pub mol: Mol<Atom, Bond>,
    pub name: String,
    /// 1-based line number in the input.
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadStats {
    /// Non-blank records examined.
    pub lines: usize,
    pub loaded: usize,
    pub skipped: usize,
}

/// The records of one load, in input order.
#[derive(Debug, Clone, Default)]
pub struct MoleculeCollection {
    pub records: Vec<MoleculeRecord>,
    pub stats: LoadStats,
}

impl MoleculeCollection {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoleculeRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a MoleculeCollection {
    type Item = &'a MoleculeRecord;
    type IntoIter = std::slice::Iter<'a, MoleculeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("missing SMILES column {column}")]
    MissingColumn { column: usize },
    #[error("invalid UTF-8 at byte {offset}")]
    Encoding { offset: usize },
    #[error(transparent)]
    Smiles(#[from] SmilesError),
    #[error(transparent)]
    Valence(#[from] ValenceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub line: usize,
    pub reason: SkipReason,
}

/// Receives every record a load skips.
pub trait SkipSink {
    fn skipped(&mut self, skip: &SkippedRecord);
}

impl<F: FnMut(&SkippedRecord)> SkipSink for F {
    fn skipped(&mut self, skip: &SkippedRecord) {
        self(skip)
    }
}

/// Logs each skip at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSkips;

impl SkipSink for LogSkips {
    fn skipped(&mut self, skip: &SkippedRecord) {
        debug!(line = skip.line, reason = %skip.reason, "skipping record");
    }
}

/// Loads the SMILES file at `path`, logging skipped records.
pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<MoleculeCollection, LoadError> {
    load_with_sink(path, options, &mut LogSkips)
}

pub fn load_with_sink<S: SkipSink>(
    path: impl AsRef<Path>,
    options: &LoadOptions,
    sink: &mut S,
) -> Result<MoleculeCollection, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    read_records(BufReader::new(file), options, sink, path)
}

/// Loads from any buffered reader, logging skipped records.
pub fn load_from_reader<R: BufRead>(
    reader: R,
    options: &LoadOptions,
) -> Result<MoleculeCollection, LoadError> {
    load_from_reader_with_sink(reader, options, &mut LogSkips)
}

pub fn load_from_reader_with_sink<R: BufRead, S: SkipSink>(
    reader: R,
    options: &LoadOptions,
    sink: &mut S,
) -> Result<MoleculeCollection, LoadError> {
    read_records(reader, options, sink, Path::new("<reader>"))
}

fn read_records<R: BufRead, S: SkipSink>(
    reader: R,
    options: &LoadOptions,
    sink: &mut S,
    path: &Path,
) -> Result<MoleculeCollection, LoadError> {
    let supplier = SmilesSupplier::new(reader)
        .delimiters(options.delimiters.as_str())
        .smiles_column(options.smiles_column)
        .name_column(options.name_column)
        .title_line(options.title_line);
    let limit = options.limit();

    let mut collection = MoleculeCollection::default();
    for item in supplier {
        if limit.is_some_and(|n| collection.stats.loaded >= n) {
            break;
        }
        let item = item.map_err(|e| LoadError::io(path, e))?;
        collection.stats.lines += 1;

        let outcome = match item {
            SupplierItem::Record(raw) => prepare(&raw).map(|mol| (raw, mol)),
            SupplierItem::MissingColumn { line, column } => Err(SkippedRecord {
                line,
                reason: SkipReason::MissingColumn { column },
            }),
            SupplierItem::InvalidUtf8 { line, offset } => Err(SkippedRecord {
                line,
                reason: SkipReason::Encoding { offset },
            }),
        };
        match outcome {
            Ok((raw, mol)) => {
                trace!(line = raw.line, name = %raw.name, atoms = mol.atom_count(), "loaded record");
                collection.records.push(MoleculeRecord {
                    mol,
                    name: raw.name,
                    line: raw.line,
                });
                collection.stats.loaded += 1;
            }
            Err(SkippedRecord {
                line,
                reason: SkipReason::Valence(source),
            }) if options.policy == FailurePolicy::Abort => {
                return Err(LoadError::Record { line, source });
            }
            Err(skip) => {
                sink.skipped(&skip);
                collection.stats.skipped += 1;
            }
        }
    }

    info!("read: {} mols.", collection.len());
    Ok(collection)
}

fn prepare(raw: &RawRecord) -> Result<Mol<Atom, Bond>, SkippedRecord> {
    let skip = |reason: SkipReason| SkippedRecord {
        line: raw.line,
        reason,
    };
    let mut mol = parse_smiles(&raw.smiles).map_err(|e| skip(e.into()))?;
    update_property_cache(&mut mol, true).map_err(|e| skip(e.into()))?;
    set_conjugation(&mut mol);
    Ok(mol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn load_str(input: &str, options: &LoadOptions) -> (MoleculeCollection, Vec<SkippedRecord>) {
        let mut skips = Vec::new();
        let collection = load_from_reader_with_sink(Cursor::new(input), options, &mut |s: &SkippedRecord| {
            skips.push(s.clone())
        })
        .unwrap();
        (collection, skips)
    }

    #[test]
    fn records_are_prepared() {
        let (collection, skips) = load_str("acid CC(=O)O\n", &LoadOptions::default());
        assert!(skips.is_empty());
        let record = &collection.records[0];
        assert_eq!(record.name, "acid");
        assert_eq!(record.line, 1);
        let mol = &record.mol;
        assert!(mol.atoms().all(|i| mol.atom(i).cache.is_some()));
        assert!(mol.has_conjugation());
    }

    #[test]
    fn bad_records_are_skipped() {
        let input = "a CCO\nb C1CC\nc\nd CC(C)(C)(C)C\ne c1ccccc1\n";
        let (collection, skips) = load_str(input, &LoadOptions::default());
        let names: Vec<_> = collection.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "e"]);
        assert_eq!(
            collection.stats,
            LoadStats {
                lines: 5,
                loaded: 2,
                skipped: 3
            }
        );

        assert_eq!(skips.len(), 3);
        assert_eq!(skips[0].line, 2);
        assert!(matches!(skips[0].reason, SkipReason::Smiles(SmilesError::UnclosedRing { digit: 1 })));
        assert_eq!(skips[1].reason, SkipReason::MissingColumn { column: 1 });
        assert!(matches!(skips[2].reason, SkipReason::Valence(_)));
    }

    #[test]
    fn incomplete_smiles_are_skipped() {
        let input = "a C=\nb =C\nc -C\nd C1C1\ne .\nf C..C\ng C(=)C\nh C=C\n";
        let (collection, skips) = load_str(input, &LoadOptions::default());
        let names: Vec<_> = collection.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["h"]);
        assert_eq!(skips.len(), 7);
        assert!(skips
            .iter()
            .all(|s| matches!(s.reason, SkipReason::Smiles(_))));
        assert_eq!(
            skips[3].reason,
            SkipReason::Smiles(SmilesError::DuplicateBond { digit: 1, pos: 3 })
        );
    }

    #[test]
    fn badly_encoded_lines_are_skipped() {
        let input: &[u8] = b"a CCO\ncaf\xe9 CCN\nc CCC\n";
        let mut skips = Vec::new();
        let collection =
            load_from_reader_with_sink(input, &LoadOptions::default(), &mut |s: &SkippedRecord| {
                skips.push(s.clone())
            })
            .unwrap();
        let names: Vec<_> = collection.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(
            skips,
            vec![SkippedRecord {
                line: 2,
                reason: SkipReason::Encoding { offset: 3 },
            }]
        );
        assert_eq!(collection.stats.skipped, 1);
    }

    #[test]
    fn max_count_ignores_skipped_records() {
        let options = LoadOptions {
            max_count: Some(2),
            ..LoadOptions::default()
        };
        let (collection, _) = load_str("a C\nb C(\nc N\nd O\n", &options);
        let names: Vec<_> = collection.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(collection.stats.lines, 3);
    }

    #[test]
    fn zero_max_count_is_unbounded() {
        let options = LoadOptions {
            max_count: Some(0),
            ..LoadOptions::default()
        };
        let (collection, _) = load_str("a C\nb N\nc O\n", &options);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn abort_policy_stops_on_valence_errors() {
        let options = LoadOptions {
            policy: FailurePolicy::Abort,
            ..LoadOptions::default()
        };
        let err = load_from_reader(Cursor::new("a C(\nb CC(C)(C)(C)C\nc C\n"), &options).unwrap_err();
        match err {
            LoadError::Record { line, source } => {
                assert_eq!(line, 2);
                assert_eq!(source.atom_idx, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_input_loads_nothing() {
        let (collection, skips) = load_str("\n\n", &LoadOptions::default());
        assert!(collection.is_empty());
        assert!(skips.is_empty());
        assert_eq!(collection.stats, LoadStats::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load("does/not/exist.smi", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("exist.smi"));
    }
}
