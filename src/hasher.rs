use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::loader::{MoleculeCollection, MoleculeRecord};
use crate::molhash::{mol_hash, HashFunction, HashValue};

/// A record name paired with its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedRecord {
    pub name: String,
    pub line: usize,
    pub hash: HashValue,
}

/// Hashes every record of `collection` in order.
pub fn hash_all(collection: &MoleculeCollection, function: HashFunction) -> Vec<HashedRecord> {
    let mut out = Vec::with_capacity(collection.len());
    hash_each(collection, function, |record, hash| {
        out.push(HashedRecord {
            name: record.name.clone(),
            line: record.line,
            hash,
        })
    });
    out
}

/// Hashes every record of `collection` in order, handing each hash to `f`
/// instead of keeping it.
pub fn hash_each<F>(collection: &MoleculeCollection, function: HashFunction, mut f: F)
where
    F: FnMut(&MoleculeRecord, HashValue),
{
    for record in collection {
        let hash = mol_hash(&record.mol, function);
        trace!(line = record.line, %hash, "hashed record");
        f(record, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_from_reader, LoadOptions};
    use std::io::Cursor;

    fn collection(input: &str) -> MoleculeCollection {
        load_from_reader(Cursor::new(input), &LoadOptions::default()).unwrap()
    }

    #[test]
    fn hashes_follow_collection_order() {
        let mols = collection("hp Oc1ccccn1\npy O=c1cccc[nH]1\nbz c1ccccc1\n");
        let hashes = hash_all(&mols, HashFunction::HetAtomTautomer);
        let names: Vec<_> = hashes.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["hp", "py", "bz"]);
        assert_eq!(hashes[0].hash, hashes[1].hash);
        assert_ne!(hashes[0].hash, hashes[2].hash);
        assert_eq!(hashes[2].line, 3);
    }

    #[test]
    fn hashing_is_repeatable_and_leaves_records_alone() {
        let mols = collection("a CC(=O)[O-]\nb OC=CC\n");
        let before = mols.records.clone();
        let first = hash_all(&mols, HashFunction::HetAtomTautomer);
        let second = hash_all(&mols, HashFunction::HetAtomTautomer);
        assert_eq!(first, second);
        assert_eq!(mols.records, before);
    }

    #[test]
    fn hash_each_streams_every_record() {
        let mols = collection("a C\nb CC\nc CCC\n");
        let mut seen = Vec::new();
        hash_each(&mols, HashFunction::MolFormula, |record, hash| {
            seen.push(format!("{}={hash}", record.name))
        });
        assert_eq!(seen, ["a=CH4", "b=C2H6", "c=C3H8"]);
    }

    #[test]
    fn empty_collection_hashes_to_nothing() {
        assert!(hash_all(&MoleculeCollection::default(), HashFunction::default()).is_empty());
    }
}
