//! Molecule hashes.
//!
//! Every [`HashFunction`] reduces a molecule to a string that is equal for
//! molecules the function considers the same. The tautomer hash erases the
//! hydrogens on heteroatoms and the bond orders of conjugated systems, so
//! 2-hydroxypyridine and 2-pyridone hash alike while keto and enol forms,
//! which differ in carbon hydrogens, do not.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::conjugation::set_conjugation;
use crate::element::Element;
use crate::mol::Mol;
use crate::smiles::to_canonical_smiles;
use crate::valence::refresh_property_cache;

/// Which hash [`mol_hash`] computes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum HashFunction {
    /// Connectivity only: every atom `*`, every bond single.
    AnonymousGraph,
    /// Connectivity and elements.
    ElementGraph,
    CanonicalSmiles,
    /// Hill formula with hydrogens and net charge.
    MolFormula,
    /// `atoms,bonds`.
    AtomBondCounts,
    /// Number of atoms with degree 4, 3, 2 and 1.
    DegreeVector,
    NetCharge,
    /// Resonance-invariant: conjugated bonds single, charges summed.
    Mesomer,
    /// Heteroatom-tautomer-invariant: heteroatom hydrogens and charges
    /// summed, conjugated bonds single.
    #[default]
    HetAtomTautomer,
    /// As [`HashFunction::HetAtomTautomer`] with hydrogens and charge folded
    /// into one protonation count.
    HetAtomProtomer,
}

impl HashFunction {
    pub fn name(self) -> &'static str {
        match self {
            HashFunction::AnonymousGraph => "anonymous-graph",
            HashFunction::ElementGraph => "element-graph",
            HashFunction::CanonicalSmiles => "canonical-smiles",
            HashFunction::MolFormula => "mol-formula",
            HashFunction::AtomBondCounts => "atom-bond-counts",
            HashFunction::DegreeVector => "degree-vector",
            HashFunction::NetCharge => "net-charge",
            HashFunction::Mesomer => "mesomer",
            HashFunction::HetAtomTautomer => "het-atom-tautomer",
            HashFunction::HetAtomProtomer => "het-atom-protomer",
        }
    }

    /// Whether the function reads bond conjugation.
    fn needs_conjugation(self) -> bool {
        matches!(
            self,
            HashFunction::Mesomer | HashFunction::HetAtomTautomer | HashFunction::HetAtomProtomer
        )
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The string a hash function produced for one molecule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashValue(String);

impl HashValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for HashValue {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Hashes `mol` without modifying it.
///
/// The molecule is expected to have a refreshed property cache; atoms that
/// were never refreshed are refreshed leniently on the working copy, and
/// conjugation is perceived on the copy when a function needs it and the
/// bonds do not carry it yet.
pub fn mol_hash(mol: &Mol<Atom, Bond>, function: HashFunction) -> HashValue {
    let mut work = mol.clone();
    if work.atoms().any(|idx| work.atom(idx).cache.is_none()) {
        refresh_property_cache(&mut work);
    }
    if function.needs_conjugation() && !work.has_conjugation() {
        set_conjugation(&mut work);
    }

    let hash = match function {
        HashFunction::AnonymousGraph => graph_hash(work, true),
        HashFunction::ElementGraph => graph_hash(work, false),
        HashFunction::CanonicalSmiles => to_canonical_smiles(&work),
        HashFunction::MolFormula => mol_formula(&work),
        HashFunction::AtomBondCounts => format!("{},{}", work.atom_count(), work.bond_count()),
        HashFunction::DegreeVector => degree_vector(&work),
        HashFunction::NetCharge => net_charge(&work).to_string(),
        HashFunction::Mesomer => mesomer_hash(work),
        HashFunction::HetAtomTautomer => {
            let (smiles, hcount, charge) = tautomer_core(work);
            format!("{smiles}_{hcount}_{charge}")
        }
        HashFunction::HetAtomProtomer => {
            let (smiles, hcount, charge) = tautomer_core(work);
            format!("{smiles}_{}", hcount as i64 - charge)
        }
    };
    HashValue(hash)
}

fn net_charge(mol: &Mol<Atom, Bond>) -> i64 {
    mol.atoms()
        .map(|idx| mol.atom(idx).formal_charge as i64)
        .sum()
}

/// Canonical SMILES of the bare skeleton. Atoms are reset to unrefreshed
/// bare atoms so the writer prints them without hydrogens or brackets.
fn graph_hash(mut mol: Mol<Atom, Bond>, anonymous: bool) -> String {
    for atom in mol.atoms_mut() {
        *atom = Atom {
            atomic_num: if anonymous { 0 } else { atom.atomic_num },
            ..Atom::default()
        };
    }
    for bond in mol.bonds_mut() {
        bond.order = BondOrder::Single;
    }
    to_canonical_smiles(&mol)
}

fn degree_vector(mol: &Mol<Atom, Bond>) -> String {
    let mut counts = [0usize; 4];
    for idx in mol.atoms() {
        if let Some(slot) = (1..=4).rev().position(|d| d == mol.degree(idx)) {
            counts[slot] += 1;
        }
    }
    counts
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Hill formula: carbon, then hydrogen, then the rest alphabetically; all
/// alphabetical without carbon. Net charge is appended as `+`, `2+`, `-`, ...
fn mol_formula(mol: &Mol<Atom, Bond>) -> String {
    let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        if let Some(elem) = Element::from_atomic_num(atom.atomic_num) {
            *counts.entry(elem.symbol()).or_default() += 1;
        }
        let hs = atom.total_hs() as u32;
        if hs > 0 {
            *counts.entry("H").or_default() += hs;
        }
    }

    let mut result = String::new();
    if let Some(c) = counts.remove("C") {
        append_element(&mut result, "C", c);
        if let Some(h) = counts.remove("H") {
            append_element(&mut result, "H", h);
        }
    }
    for (sym, count) in &counts {
        append_element(&mut result, sym, *count);
    }

    let charge = net_charge(mol);
    match charge {
        1 => result.push('+'),
        -1 => result.push('-'),
        c if c > 1 => result.push_str(&format!("{c}+")),
        c if c < -1 => result.push_str(&format!("{}-", c.unsigned_abs())),
        _ => {}
    }
    result
}

fn append_element(out: &mut String, symbol: &str, count: u32) {
    out.push_str(symbol);
    if count > 1 {
        out.push_str(&count.to_string());
    }
}

fn mesomer_hash(mut mol: Mol<Atom, Bond>) -> String {
    let mut charge: i64 = 0;
    for atom in mol.atoms_mut() {
        atom.freeze_hs();
        charge += atom.formal_charge as i64;
        atom.formal_charge = 0;
        atom.is_aromatic = false;
    }
    for bond in mol.bonds_mut() {
        if bond.is_conjugated == Some(true) {
            bond.order = BondOrder::Single;
        }
    }
    format!("{}_{charge}", to_canonical_smiles(&mol))
}

/// Skeleton SMILES, heteroatom hydrogen count and net charge shared by the
/// tautomer and protomer hashes.
fn tautomer_core(mut mol: Mol<Atom, Bond>) -> (String, u32, i64) {
    let mut hcount: u32 = 0;
    let mut charge: i64 = 0;
    for atom in mol.atoms_mut() {
        charge += atom.formal_charge as i64;
        atom.formal_charge = 0;
        if matches!(atom.atomic_num, 1 | 6) {
            atom.freeze_hs();
        } else {
            hcount += atom.total_hs() as u32;
            atom.strip_hs();
        }
        atom.is_aromatic = false;
    }
    for bond in mol.bonds_mut() {
        let delocalized = bond.is_conjugated == Some(true) || bond.order == BondOrder::Aromatic;
        if bond.order != BondOrder::Single && delocalized {
            bond.order = BondOrder::Single;
        }
    }
    (to_canonical_smiles(&mol), hcount, charge)
}
