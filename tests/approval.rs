use serde::Deserialize;

use tauthash::conjugation::set_conjugation;
use tauthash::{mol_hash, parse_smiles, update_property_cache, HashFunction, HashValue};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Group {
    name: String,
    smiles: Vec<String>,
}

#[derive(Deserialize)]
struct TautomerData {
    tautomer_groups: Vec<Group>,
    distinct_pairs: Vec<(String, String)>,
    protomer_groups: Vec<Group>,
}

fn data() -> TautomerData {
    serde_json::from_str(include_str!("approval_data/tautomers.json")).unwrap()
}

fn hash(smiles: &str, function: HashFunction) -> HashValue {
    let mut mol = parse_smiles(smiles).unwrap_or_else(|e| panic!("{smiles:?}: {e}"));
    update_property_cache(&mut mol, true).unwrap_or_else(|e| panic!("{smiles:?}: {e}"));
    set_conjugation(&mut mol);
    mol_hash(&mol, function)
}

fn check_groups(groups: &[Group], function: HashFunction) -> Vec<String> {
    let mut failures = Vec::new();
    for group in groups {
        let first = hash(&group.smiles[0], function);
        for smiles in &group.smiles[1..] {
            let other = hash(smiles, function);
            if other != first {
                failures.push(format!(
                    "[{}] {}: {:?} gives {other}, {:?} gives {first}",
                    function, group.name, smiles, group.smiles[0]
                ));
            }
        }
    }
    failures
}

fn report(what: &str, failures: Vec<String>) {
    if !failures.is_empty() {
        panic!(
            "{} {what} failures:\n{}",
            failures.len(),
            failures.join("\n")
        );
    }
}

// ---------------------------------------------------------------------------
// 1. Tautomers hash alike
// ---------------------------------------------------------------------------

#[test]
fn approval_tautomer_groups() {
    let data = data();
    report(
        "tautomer group",
        check_groups(&data.tautomer_groups, HashFunction::HetAtomTautomer),
    );
}

#[test]
fn approval_tautomer_groups_are_distinct() {
    let data = data();
    let mut failures = Vec::new();
    for (i, a) in data.tautomer_groups.iter().enumerate() {
        for b in &data.tautomer_groups[i + 1..] {
            if hash(&a.smiles[0], HashFunction::HetAtomTautomer)
                == hash(&b.smiles[0], HashFunction::HetAtomTautomer)
            {
                failures.push(format!("{} and {} collide", a.name, b.name));
            }
        }
    }
    report("group collision", failures);
}

// ---------------------------------------------------------------------------
// 2. Non-tautomers hash apart
// ---------------------------------------------------------------------------

#[test]
fn approval_distinct_pairs() {
    let mut failures = Vec::new();
    for (a, b) in &data().distinct_pairs {
        let ha = hash(a, HashFunction::HetAtomTautomer);
        if ha == hash(b, HashFunction::HetAtomTautomer) {
            failures.push(format!("{a:?} and {b:?} both give {ha}"));
        }
    }
    report("distinct pair", failures);
}

// ---------------------------------------------------------------------------
// 3. Protonation states
// ---------------------------------------------------------------------------

#[test]
fn approval_protomer_groups() {
    let data = data();
    report(
        "protomer group",
        check_groups(&data.protomer_groups, HashFunction::HetAtomProtomer),
    );
}

#[test]
fn approval_protomers_differ_under_tautomer_hash() {
    let mut failures = Vec::new();
    for group in &data().protomer_groups {
        let first = hash(&group.smiles[0], HashFunction::HetAtomTautomer);
        let second = hash(&group.smiles[1], HashFunction::HetAtomTautomer);
        if first == second {
            failures.push(format!("{}: {first}", group.name));
        }
    }
    report("protomer separation", failures);
}

// ---------------------------------------------------------------------------
// 4. Input order
// ---------------------------------------------------------------------------

#[test]
fn approval_hashes_ignore_atom_order() {
    let data = data();
    let mut failures = Vec::new();
    for group in &data.tautomer_groups {
        for smiles in &group.smiles {
            let mut mol = parse_smiles(smiles).unwrap();
            update_property_cache(&mut mol, true).unwrap();
            set_conjugation(&mut mol);
            let reversed: Vec<usize> = (0..mol.atom_count()).rev().collect();
            let renumbered = tauthash::graph_ops::renumber_atoms(&mol, &reversed).unwrap();
            for function in [HashFunction::HetAtomTautomer, HashFunction::CanonicalSmiles] {
                let a = mol_hash(&mol, function);
                let b = mol_hash(&renumbered, function);
                if a != b {
                    failures.push(format!("[{function}] {smiles:?}: {a} vs {b}"));
                }
            }
        }
    }
    report("atom order", failures);
}
