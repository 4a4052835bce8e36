//! Explicit valence, implicit hydrogens and the strict valence check.
//!
//! Valences are accumulated in half-bond units so that aromatic bonds
//! (1.5) sum exactly; an aromatic atom that overshoots its allowed valence
//! by at most 1.5 is pulled back to it.

use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::atom::{Atom, PropertyCache};
use crate::bond::Bond;
use crate::element::{outer_shell_electrons, Element};
use crate::mol::Mol;
use crate::traits::{HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

/// An atom whose explicit valence exceeds every valence its element allows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "explicit valence {valence} for atom {atom_idx} ({}) is greater than permitted {allowed:?}",
    symbol_of(.atomic_num)
)]
pub struct ValenceError {
    pub atom_idx: usize,
    pub atomic_num: u8,
    pub valence: u8,
    pub allowed: Vec<u8>,
}

fn symbol_of(atomic_num: &u8) -> &'static str {
    Element::from_atomic_num(*atomic_num).map_or("*", |e| e.symbol())
}

/// Default valences of `atomic_num` shifted by `charge`, ascending.
///
/// Empty for elements without a default valence list (metals, noble gases,
/// the anonymous atom).
pub fn allowed_valences(atomic_num: u8, charge: i8) -> Vec<u8> {
    let defaults = match Element::from_atomic_num(atomic_num) {
        Some(e) => e.default_valences(),
        None => return Vec::new(),
    };
    let q = charge as i16;
    let outer = outer_shell_electrons(atomic_num);
    let mut shifted: Vec<u8> = defaults
        .iter()
        .map(|&v| {
            let v = v as i16;
            match outer.cmp(&4) {
                std::cmp::Ordering::Equal => v - q.abs(),
                std::cmp::Ordering::Greater => v + q,
                std::cmp::Ordering::Less => v - q,
            }
        })
        .filter(|&v| (0..=u8::MAX as i16).contains(&v))
        .map(|v| v as u8)
        .collect();
    shifted.sort_unstable();
    shifted.dedup();
    shifted
}

/// Bond valence plus `hydrogens`, in half units, before any clamping.
fn half_valence<A, B: HasBondOrder>(mol: &Mol<A, B>, idx: NodeIndex, hydrogens: u8) -> u16 {
    let bonds: u16 = mol
        .bonds_of(idx)
        .map(|e| mol.bond(e).bond_order().half_valence() as u16)
        .sum();
    bonds + 2 * hydrogens as u16
}

/// Rounds a half-unit valence to whole units, clamping aromatic overshoot.
fn resolve_valence(half: u16, is_aromatic: bool, allowed: &[u8]) -> u8 {
    let mut half = half;
    if is_aromatic {
        if let Some(&first) = allowed.first() {
            if half > 2 * first as u16 {
                let nearest = allowed
                    .iter()
                    .map(|&v| 2 * v as u16)
                    .take_while(|&v| v <= half)
                    .last()
                    .unwrap_or(2 * first as u16);
                if half - nearest <= 3 {
                    half = nearest;
                }
            }
        }
    }
    ((half + 1) / 2).min(u8::MAX as u16) as u8
}

/// Total valence of an atom: bonds plus all of its hydrogens.
pub fn total_valence<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> u8
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount + HasAromaticity,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let allowed = allowed_valences(atom.atomic_num(), atom.formal_charge());
    let half = half_valence(mol, idx, atom.hydrogen_count());
    resolve_valence(half, atom.is_aromatic(), &allowed)
}

/// Bond valence plus explicitly written hydrogens.
pub fn explicit_valence(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    let atom = mol.atom(idx);
    let allowed = allowed_valences(atom.atomic_num, atom.formal_charge);
    let half = half_valence(mol, idx, atom.explicit_hs);
    resolve_valence(half, atom.is_aromatic, &allowed)
}

/// Hydrogens a reader would give this atom if it were written without brackets.
pub(crate) fn bare_implicit_hs(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    let atom = mol.atom(idx);
    let allowed = allowed_valences(atom.atomic_num, 0);
    let explicit = resolve_valence(half_valence(mol, idx, 0), atom.is_aromatic, &allowed);
    allowed
        .iter()
        .copied()
        .find(|&v| v >= explicit)
        .map_or(0, |v| v - explicit)
}

/// Fresh cache for one atom, plus the error a strict refresh would raise.
fn compute_cache(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> (PropertyCache, Option<ValenceError>) {
    let atom = mol.atom(idx);
    let allowed = allowed_valences(atom.atomic_num, atom.formal_charge);
    let explicit = explicit_valence(mol, idx);

    let target = allowed.iter().copied().find(|&v| v >= explicit);
    let implicit_hs = match target {
        Some(v) if !atom.no_implicit => v - explicit,
        _ => 0,
    };
    let cache = PropertyCache {
        explicit_valence: explicit,
        implicit_hs,
    };

    let error = (target.is_none() && !allowed.is_empty()).then(|| ValenceError {
        atom_idx: idx.index(),
        atomic_num: atom.atomic_num,
        valence: explicit,
        allowed,
    });
    (cache, error)
}

/// Recomputes explicit valence and implicit hydrogens for every atom.
///
/// With `strict` set, the first atom whose explicit valence exceeds all of
/// its allowed valences fails the whole molecule and the caches are left as
/// they were. Without it, such atoms simply get no implicit hydrogens.
pub fn update_property_cache(mol: &mut Mol<Atom, Bond>, strict: bool) -> Result<(), ValenceError> {
    let view: &Mol<Atom, Bond> = mol;
    let mut caches = Vec::with_capacity(view.atom_count());
    for idx in view.atoms() {
        let (cache, error) = compute_cache(view, idx);
        if let (true, Some(err)) = (strict, error) {
            return Err(err);
        }
        caches.push(cache);
    }
    for (atom, cache) in mol.atoms_mut().zip(caches) {
        atom.cache = Some(cache);
    }
    Ok(())
}

/// Lenient refresh that never fails.
pub fn refresh_property_cache(mol: &mut Mol<Atom, Bond>) {
    let view: &Mol<Atom, Bond> = mol;
    let caches: Vec<PropertyCache> = view.atoms().map(|idx| compute_cache(view, idx).0).collect();
    for (atom, cache) in mol.atoms_mut().zip(caches) {
        atom.cache = Some(cache);
    }
}
