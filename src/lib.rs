//! Bulk SMILES loading and tautomer-invariant molecule hashing.
//!
//! [`loader::load`] reads a delimited SMILES file into a
//! [`MoleculeCollection`] of parsed, valence-checked and
//! conjugation-annotated molecules; [`hasher::hash_all`] turns that into one
//! [`HashValue`] per record.
//!
//! ```
//! use std::io::Cursor;
//! use tauthash::{hash_all, load_from_reader, HashFunction, LoadOptions};
//!
//! let input = "hydroxy Oc1ccccn1\npyridone O=c1cccc[nH]1\n";
//! let mols = load_from_reader(Cursor::new(input), &LoadOptions::default()).unwrap();
//! let hashes = hash_all(&mols, HashFunction::HetAtomTautomer);
//! assert_eq!(hashes[0].hash, hashes[1].hash);
//! ```

pub mod atom;
pub mod bond;
pub mod canonical;
pub mod conjugation;
pub mod element;
pub mod error;
pub mod graph_ops;
pub mod hasher;
pub mod loader;
pub mod mol;
pub mod molhash;
pub mod radical;
pub mod smiles;
pub mod supplier;
pub mod timer;
pub mod traits;
pub mod valence;

pub use atom::{Atom, PropertyCache};
pub use bond::{Bond, BondOrder};
pub use element::Element;
pub use error::LoadError;
pub use hasher::{hash_all, hash_each, HashedRecord};
pub use loader::{
    load, load_from_reader, FailurePolicy, LoadOptions, LoadStats, MoleculeCollection,
    MoleculeRecord, SkipReason, SkipSink, SkippedRecord,
};
pub use mol::Mol;
pub use molhash::{mol_hash, HashFunction, HashValue};
pub use smiles::{parse_smiles, to_canonical_smiles, to_smiles, SmilesError};
pub use timer::PhaseTimer;
pub use traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasConjugation, HasFormalCharge,
    HasHydrogenCount, HasIsotope,
};
pub use valence::{update_property_cache, ValenceError};
