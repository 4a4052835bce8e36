use std::path::PathBuf;

use tauthash::loader::load_with_sink;
use tauthash::{
    hash_all, load, FailurePolicy, HashFunction, LoadError, LoadOptions, LoadStats, SkipReason,
    SkippedRecord,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn names(collection: &tauthash::MoleculeCollection) -> Vec<&str> {
    collection.iter().map(|r| r.name.as_str()).collect()
}

#[test]
fn loads_valid_records_in_order() {
    let mols = load(fixture("mixed.smi"), &LoadOptions::default()).unwrap();
    assert_eq!(
        names(&mols),
        ["aspirin", "paracetamol", "caffeine", "hydroxypyridine", "pyridone"]
    );
    assert_eq!(
        mols.stats,
        LoadStats {
            lines: 8,
            loaded: 5,
            skipped: 3
        }
    );
    let lines: Vec<_> = mols.iter().map(|r| r.line).collect();
    assert_eq!(lines, [1, 3, 6, 8, 9]);
}

#[test]
fn every_loaded_molecule_is_prepared() {
    let mols = load(fixture("mixed.smi"), &LoadOptions::default()).unwrap();
    for record in &mols {
        let mol = &record.mol;
        assert!(mol.atoms().all(|i| mol.atom(i).cache.is_some()), "{}", record.name);
        assert!(mol.has_conjugation(), "{}", record.name);
    }
}

#[test]
fn skips_reach_the_sink() {
    let mut skips: Vec<SkippedRecord> = Vec::new();
    let mut sink = |s: &SkippedRecord| skips.push(s.clone());
    let mols = load_with_sink(fixture("mixed.smi"), &LoadOptions::default(), &mut sink).unwrap();
    assert_eq!(mols.stats.skipped, skips.len());

    let lines: Vec<_> = skips.iter().map(|s| s.line).collect();
    assert_eq!(lines, [2, 5, 7]);
    assert!(matches!(skips[0].reason, SkipReason::Smiles(_)));
    assert_eq!(skips[1].reason, SkipReason::MissingColumn { column: 1 });
    assert!(matches!(skips[2].reason, SkipReason::Valence(_)));
}

#[test]
fn max_count_limits_loaded_records() {
    let options = LoadOptions {
        max_count: Some(2),
        ..LoadOptions::default()
    };
    let mols = load(fixture("mixed.smi"), &options).unwrap();
    assert_eq!(names(&mols), ["aspirin", "paracetamol"]);
    assert_eq!(mols.stats.loaded, 2);
    assert_eq!(mols.stats.skipped, 1);
}

#[test]
fn abort_policy_fails_on_the_overvalent_record() {
    let options = LoadOptions {
        policy: FailurePolicy::Abort,
        ..LoadOptions::default()
    };
    match load(fixture("mixed.smi"), &options) {
        Err(LoadError::Record { line, source }) => {
            assert_eq!(line, 7);
            assert_eq!(source.valence, 5);
        }
        other => panic!("expected a record error, got {other:?}"),
    }
}

#[test]
fn nonexistent_path_is_an_error() {
    let err = load(fixture("missing.smi"), &LoadOptions::default()).unwrap_err();
    match err {
        LoadError::Io { path, source } => {
            assert!(path.ends_with("missing.smi"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected an io error, got {other:?}"),
    }
}

#[test]
fn csv_with_title_line() {
    let options = LoadOptions {
        delimiters: ",".to_string(),
        smiles_column: 0,
        name_column: Some(1),
        title_line: true,
        ..LoadOptions::default()
    };
    let mols = load(fixture("titled.csv"), &options).unwrap();
    assert_eq!(names(&mols), ["ethanol", "acetamide", "imidic acid"]);
    assert_eq!(mols.stats.skipped, 0);

    let hashes = hash_all(&mols, HashFunction::HetAtomTautomer);
    assert_ne!(hashes[0].hash, hashes[1].hash);
    assert_eq!(hashes[1].hash, hashes[2].hash);
}

#[test]
fn tautomers_in_a_file_hash_alike() {
    let mols = load(fixture("mixed.smi"), &LoadOptions::default()).unwrap();
    let hashes = hash_all(&mols, HashFunction::default());
    assert_eq!(hashes.len(), mols.len());
    assert_eq!(hashes[3].name, "hydroxypyridine");
    assert_eq!(hashes[3].hash, hashes[4].hash);
    assert_ne!(hashes[0].hash, hashes[1].hash);
}
