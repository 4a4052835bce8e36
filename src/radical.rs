//! Radical electron counting.
//!
//! The count is inferred from the gap between the atom's valence shell
//! capacity and its bonding plus lone-pair electrons, so `[CH3]` has one
//! unpaired electron and `[CH2]` has two.

use petgraph::graph::NodeIndex;

use crate::element::{outer_shell_electrons, Element};
use crate::mol::Mol;
use crate::traits::{HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};
use crate::valence::total_valence;

/// Count unpaired electrons on an atom.
///
/// Returns 0 for atoms in a normal bonding state. Hydrogen counts are read
/// through [`HasHydrogenCount`], so bare atoms need their property cache
/// refreshed first.
pub fn num_radical_electrons<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> u8
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let atomic_num = atom.atomic_num();
    let charge = atom.formal_charge() as i16;

    let elem = match Element::from_atomic_num(atomic_num) {
        Some(e) => e,
        None => return 0,
    };
    let n_outer = outer_shell_electrons(atomic_num) as i16;

    let default_valences = elem.default_valences();
    if default_valences.is_empty() {
        if mol.degree(idx) > 0 {
            return 0;
        }
        let n_valence = n_outer - charge;
        if n_valence < 0 {
            return 0;
        }
        return (n_valence % 2) as u8;
    }

    let valence = total_valence(mol, idx) as i16;
    let base_count: i16 = if atomic_num <= 2 { 2 } else { 8 };

    let mut num_radicals = base_count - n_outer - valence + charge;
    if num_radicals < 0 {
        num_radicals = 0;
        if default_valences.len() > 1 {
            if let Some(r) = default_valences
                .iter()
                .map(|&v| v as i16 - valence + charge)
                .find(|&r| r >= 0)
            {
                num_radicals = r;
            }
        }
    }

    let from_outer = n_outer - valence - charge;
    if (0..num_radicals).contains(&from_outer) {
        num_radicals = from_outer;
    }

    num_radicals.max(0) as u8
}
