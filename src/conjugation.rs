use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::{outer_shell_electrons, Element};
use crate::mol::Mol;
use crate::radical::num_radical_electrons;
use crate::traits::{HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};
use crate::valence::total_valence;

fn total_degree<A: HasHydrogenCount, B>(mol: &Mol<A, B>, idx: NodeIndex) -> u8 {
    (mol.degree(idx) as u8).saturating_add(mol.atom(idx).hydrogen_count())
}

fn count_atom_elec<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> i16
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let anum = atom.atomic_num();

    let dv = Element::from_atomic_num(anum)
        .map(|e| e.default_valences())
        .unwrap_or(&[]);
    if dv.is_empty() || dv[0] <= 1 {
        return -1;
    }
    let default_val = dv[0] as i16;

    let degree = total_degree(mol, idx) as i16;
    if degree > 3 {
        return -1;
    }

    let nouter = outer_shell_electrons(anum) as i16;
    let nlp = (nouter - default_val - atom.formal_charge() as i16).max(0);
    let n_radicals = num_radical_electrons(mol, idx) as i16;

    (default_val - degree) + nlp - n_radicals
}

fn is_conj_candidate<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> bool
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let anum = atom.atomic_num();

    let dv = Element::from_atomic_num(anum)
        .map(|e| e.default_valences())
        .unwrap_or(&[]);
    if dv.is_empty() || dv[0] <= 1 {
        return false;
    }

    if atom.formal_charge() == 0 && total_valence(mol, idx) > dv[0] {
        return false;
    }

    let nouter = outer_shell_electrons(anum);
    let row_check = anum <= 10
        || (nouter != 5 && nouter != 6)
        || (nouter == 6 && mol.degree(idx) < 2);

    row_check && count_atom_elec(mol, idx) > 0
}

/// Conjugation flag for every bond, indexed by `EdgeIndex::index()`.
///
/// Aromatic bonds are always conjugated. Around each candidate atom with
/// two or three substituents, a multiple (or aromatic) bond to another
/// candidate is conjugated together with the atom's other bonds to
/// candidates that have at most three substituents.
pub fn assign_conjugation<A, B>(mol: &Mol<A, B>) -> Vec<bool>
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity,
    B: HasBondOrder,
{
    let mut conjugated = vec![false; mol.bond_count()];

    for edge in mol.bonds() {
        if mol.bond(edge).bond_order() == BondOrder::Aromatic {
            conjugated[edge.index()] = true;
        }
    }

    for atom_idx in mol.atoms() {
        if !is_conj_candidate(mol, atom_idx) {
            continue;
        }
        if !(2..=3).contains(&total_degree(mol, atom_idx)) {
            continue;
        }

        let bonds: Vec<EdgeIndex> = mol.bonds_of(atom_idx).collect();

        for &bnd1 in &bonds {
            if mol.bond(bnd1).bond_order() == BondOrder::Single {
                continue;
            }
            let Some(at1) = mol.other_atom(bnd1, atom_idx) else {
                continue;
            };
            if !is_conj_candidate(mol, at1) {
                continue;
            }

            for &bnd2 in &bonds {
                if bnd1 == bnd2 {
                    continue;
                }
                let Some(at2) = mol.other_atom(bnd2, atom_idx) else {
                    continue;
                };
                if total_degree(mol, at2) > 3 {
                    continue;
                }
                if is_conj_candidate(mol, at2) {
                    conjugated[bnd1.index()] = true;
                    conjugated[bnd2.index()] = true;
                }
            }
        }
    }

    conjugated
}

/// Stores the perceived conjugation on every bond of `mol`.
///
/// Hydrogen counts come from the property cache, which should be fresh.
pub fn set_conjugation(mol: &mut Mol<Atom, Bond>) {
    let flags = assign_conjugation(mol);
    for (bond, flag) in mol.bonds_mut().zip(flags) {
        bond.is_conjugated = Some(flag);
    }
}
