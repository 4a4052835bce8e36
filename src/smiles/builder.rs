use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::smiles::parse_tree::ParseTree;
use crate::smiles::tokenizer::BondToken;

/// Turns a parse tree into a molecular graph exactly as written.
///
/// No hydrogens are inferred and no valence is checked: bare atoms get
/// `explicit_hs == 0` and are left open for implicit hydrogens, bracket atoms
/// carry their written count and are closed.
pub fn build_mol(tree: &ParseTree) -> Mol<Atom, Bond> {
    let bond_hint: usize = tree.atoms.iter().map(|a| a.neighbors.len()).sum::<usize>() / 2;
    let mut mol = Mol::with_capacity(tree.atoms.len(), bond_hint);

    let node_indices: Vec<NodeIndex> = tree
        .atoms
        .iter()
        .map(|parse_atom| {
            mol.add_atom(Atom {
                atomic_num: parse_atom.element.atomic_num(),
                formal_charge: parse_atom.charge,
                isotope: parse_atom.isotope,
                explicit_hs: parse_atom.hcount,
                no_implicit: parse_atom.is_bracket,
                is_aromatic: parse_atom.is_aromatic,
                cache: None,
            })
        })
        .collect();

    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        for neighbor in &parse_atom.neighbors {
            let j = neighbor.atom_idx;
            // each bond is listed on both ends; keep the lower-index copy
            if j < i {
                continue;
            }
            let order = resolve_bond_order(
                neighbor.bond,
                parse_atom.is_aromatic,
                tree.atoms[j].is_aromatic,
            );
            mol.add_bond(node_indices[i], node_indices[j], Bond::new(order));
        }
    }

    mol
}

fn resolve_bond_order(bond_tok: Option<BondToken>, from_aromatic: bool, to_aromatic: bool) -> BondOrder {
    match bond_tok {
        Some(BondToken::Single) => BondOrder::Single,
        Some(BondToken::Double) => BondOrder::Double,
        Some(BondToken::Triple) => BondOrder::Triple,
        Some(BondToken::Aromatic) => BondOrder::Aromatic,
        None if from_aromatic && to_aromatic => BondOrder::Aromatic,
        None => BondOrder::Single,
    }
}
