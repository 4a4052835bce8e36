use std::collections::{BTreeSet, HashMap};

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::canonical::canonical_ordering;
use crate::element::Element;
use crate::graph_ops::connected_components;
use crate::mol::Mol;
use crate::valence::bare_implicit_hs;

/// SMILES for `mol`, fragments and atoms in input order.
pub fn to_smiles(mol: &Mol<Atom, Bond>) -> String {
    connected_components(mol)
        .iter()
        .map(|component| write_fragment(mol, component, None))
        .collect::<Vec<_>>()
        .join(".")
}

/// SMILES that depends only on the molecular graph.
///
/// Every fragment is written from its lowest-ranked atom, branches in rank
/// order, and the fragments are joined in lexical order.
pub fn to_canonical_smiles(mol: &Mol<Atom, Bond>) -> String {
    let ranks = canonical_ordering(mol);
    let mut parts: Vec<String> = connected_components(mol)
        .iter()
        .map(|component| write_fragment(mol, component, Some(&ranks)))
        .collect();
    parts.sort();
    parts.join(".")
}

struct RingClosure {
    ring_id: usize,
    order: BondOrder,
    other: NodeIndex,
}

struct DfsContext {
    children: Vec<Vec<NodeIndex>>,
    ring_opens: Vec<Vec<RingClosure>>,
    ring_closes: Vec<Vec<RingClosure>>,
}

/// Ring-closure digits handed out while writing, lowest free first.
#[derive(Default)]
struct RingDigits {
    in_use: BTreeSet<usize>,
    by_ring: HashMap<usize, usize>,
}

impl RingDigits {
    fn open(&mut self, ring_id: usize) -> usize {
        let digit = (1usize..)
            .find(|d| !self.in_use.contains(d))
            .unwrap_or(usize::MAX);
        self.in_use.insert(digit);
        self.by_ring.insert(ring_id, digit);
        digit
    }

    fn close(&mut self, ring_id: usize) -> usize {
        match self.by_ring.remove(&ring_id) {
            Some(digit) => {
                self.in_use.remove(&digit);
                digit
            }
            None => self.open(ring_id),
        }
    }
}

fn write_fragment(mol: &Mol<Atom, Bond>, component: &[NodeIndex], ranks: Option<&[usize]>) -> String {
    let n = mol.atom_count();
    let start = match ranks {
        Some(r) => component.iter().copied().min_by_key(|node| r[node.index()]),
        None => component.first().copied(),
    };
    let Some(start) = start else {
        return String::new();
    };

    let mut visited = vec![false; n];
    let mut parent = vec![None::<NodeIndex>; n];
    let mut ring_opens: Vec<Vec<RingClosure>> = (0..n).map(|_| Vec::new()).collect();
    let mut ring_closes: Vec<Vec<RingClosure>> = (0..n).map(|_| Vec::new()).collect();
    let mut children: Vec<Vec<NodeIndex>> = (0..n).map(|_| Vec::new()).collect();
    let mut next_ring_id: usize = 0;

    let neighbor_lists: Vec<Vec<NodeIndex>> = mol
        .atoms()
        .map(|node| {
            let mut neighbors: Vec<NodeIndex> = mol.neighbors(node).collect();
            match ranks {
                Some(r) => neighbors.sort_by_key(|nb| r[nb.index()]),
                None => neighbors.sort(),
            }
            neighbors
        })
        .collect();

    let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];
    visited[start.index()] = true;

    while let Some(&mut (node, ref mut ni)) = stack.last_mut() {
        let neighbors = &neighbor_lists[node.index()];
        if *ni >= neighbors.len() {
            stack.pop();
            continue;
        }
        let neighbor = neighbors[*ni];
        *ni += 1;

        if !visited[neighbor.index()] {
            visited[neighbor.index()] = true;
            parent[neighbor.index()] = Some(node);
            children[node.index()].push(neighbor);
            stack.push((neighbor, 0));
            continue;
        }
        if parent[node.index()] == Some(neighbor) {
            continue;
        }
        let already = ring_opens[node.index()].iter().any(|rc| rc.other == neighbor)
            || ring_closes[node.index()].iter().any(|rc| rc.other == neighbor);
        if already {
            continue;
        }
        let Some(edge) = mol.bond_between(node, neighbor) else {
            continue;
        };
        let order = mol.bond(edge).order;
        ring_opens[neighbor.index()].push(RingClosure {
            ring_id: next_ring_id,
            order,
            other: node,
        });
        ring_closes[node.index()].push(RingClosure {
            ring_id: next_ring_id,
            order,
            other: neighbor,
        });
        next_ring_id += 1;
    }

    let ctx = DfsContext {
        children,
        ring_opens,
        ring_closes,
    };

    let mut out = String::new();
    let mut digits = RingDigits::default();
    write_node(mol, start, &ctx, &mut digits, &mut out);
    out
}

fn write_node(
    mol: &Mol<Atom, Bond>,
    node: NodeIndex,
    ctx: &DfsContext,
    digits: &mut RingDigits,
    out: &mut String,
) {
    write_atom_symbol(mol, node, out);

    for rc in &ctx.ring_opens[node.index()] {
        write_bond_between(mol, rc.order, node, rc.other, out);
        write_ring_digit(digits.open(rc.ring_id), out);
    }

    for rc in &ctx.ring_closes[node.index()] {
        write_bond_between(mol, rc.order, node, rc.other, out);
        write_ring_digit(digits.close(rc.ring_id), out);
    }

    let kids = &ctx.children[node.index()];
    let Some(last) = kids.len().checked_sub(1) else {
        return;
    };
    for (i, &child) in kids.iter().enumerate() {
        let is_branch = i < last;
        if is_branch {
            out.push('(');
        }
        if let Some(edge) = mol.bond_between(node, child) {
            write_bond_between(mol, mol.bond(edge).order, node, child, out);
        }
        write_node(mol, child, ctx, digits, out);
        if is_branch {
            out.push(')');
        }
    }
}

fn write_bond_between(
    mol: &Mol<Atom, Bond>,
    order: BondOrder,
    from: NodeIndex,
    to: NodeIndex,
    out: &mut String,
) {
    let both_aromatic = mol.atom(from).is_aromatic && mol.atom(to).is_aromatic;
    match order {
        BondOrder::Aromatic if both_aromatic => {}
        BondOrder::Single if both_aromatic => out.push('-'),
        _ => {
            if let Some(symbol) = order.symbol() {
                out.push(symbol);
            }
        }
    }
}

fn write_ring_digit(digit: usize, out: &mut String) {
    match digit {
        0..=9 => out.push_str(&digit.to_string()),
        10..=99 => {
            out.push('%');
            out.push_str(&digit.to_string());
        }
        _ => {
            out.push_str("%(");
            out.push_str(&digit.to_string());
            out.push(')');
        }
    }
}

fn push_symbol(symbol: &str, is_aromatic: bool, out: &mut String) {
    if is_aromatic {
        out.extend(symbol.chars().map(|c| c.to_ascii_lowercase()));
    } else {
        out.push_str(symbol);
    }
}

fn write_atom_symbol(mol: &Mol<Atom, Bond>, node: NodeIndex, out: &mut String) {
    let atom = mol.atom(node);
    let elem = Element::from_atomic_num(atom.atomic_num);

    match elem {
        Some(e) if can_write_bare(mol, node, e) => push_symbol(e.symbol(), atom.is_aromatic, out),
        None if atom.isotope == 0 && atom.formal_charge == 0 && atom.total_hs() == 0 => {
            out.push('*')
        }
        _ => write_bracket_atom(atom, elem, out),
    }
}

fn can_write_bare(mol: &Mol<Atom, Bond>, node: NodeIndex, elem: Element) -> bool {
    let atom = mol.atom(node);
    if !elem.is_organic_subset() || (atom.is_aromatic && !elem.has_aromatic_form()) {
        return false;
    }
    if atom.isotope != 0 || atom.formal_charge != 0 {
        return false;
    }
    match atom.cache {
        // never refreshed: a bare atom stays bare
        None => !atom.no_implicit && atom.explicit_hs == 0,
        Some(_) => atom.total_hs() == bare_implicit_hs(mol, node),
    }
}

fn write_bracket_atom(atom: &Atom, elem: Option<Element>, out: &mut String) {
    out.push('[');

    if atom.isotope != 0 {
        out.push_str(&atom.isotope.to_string());
    }

    match elem {
        Some(e) => push_symbol(e.symbol(), atom.is_aromatic, out),
        None => out.push('*'),
    }

    let hs = atom.total_hs();
    if hs > 0 {
        out.push('H');
        if hs > 1 {
            out.push_str(&hs.to_string());
        }
    }

    if atom.formal_charge > 0 {
        out.push('+');
        if atom.formal_charge > 1 {
            out.push_str(&atom.formal_charge.to_string());
        }
    } else if atom.formal_charge < 0 {
        out.push('-');
        if atom.formal_charge < -1 {
            out.push_str(&atom.formal_charge.unsigned_abs().to_string());
        }
    }

    out.push(']');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_ops::renumber_atoms;
    use crate::smiles::parse_smiles;
    use crate::valence::update_property_cache;

    fn mol(smiles: &str) -> Mol<Atom, Bond> {
        let mut mol = parse_smiles(smiles).unwrap();
        update_property_cache(&mut mol, true).unwrap();
        mol
    }

    fn canon(smiles: &str) -> String {
        to_canonical_smiles(&mol(smiles))
    }

    fn assert_same_structure(mol1: &Mol<Atom, Bond>, mol2: &Mol<Atom, Bond>, ctx: &str) {
        assert_eq!(mol1.atom_count(), mol2.atom_count(), "{ctx}: atom count");
        assert_eq!(mol1.bond_count(), mol2.bond_count(), "{ctx}: bond count");

        let mut e1: Vec<(u8, u8)> = mol1
            .atoms()
            .map(|n| (mol1.atom(n).atomic_num, mol1.atom(n).total_hs()))
            .collect();
        let mut e2: Vec<(u8, u8)> = mol2
            .atoms()
            .map(|n| (mol2.atom(n).atomic_num, mol2.atom(n).total_hs()))
            .collect();
        e1.sort();
        e2.sort();
        assert_eq!(e1, e2, "{ctx}: elements and hydrogens");
    }

    fn round_trip(smiles: &str) -> String {
        let mol1 = mol(smiles);
        let written = to_smiles(&mol1);
        let mol2 = mol(&written);
        assert_same_structure(&mol1, &mol2, smiles);
        written
    }

    #[test]
    fn simple_molecules_stay_bare() {
        assert_eq!(round_trip("C"), "C");
        assert_eq!(round_trip("CC"), "CC");
        assert_eq!(round_trip("O"), "O");
        assert_eq!(round_trip("CC(=O)O"), "CC(=O)O");
        assert_eq!(round_trip("C#N"), "C#N");
    }

    #[test]
    fn rings_round_trip() {
        assert_eq!(round_trip("C1CCCCC1"), "C1CCCCC1");
        assert_eq!(round_trip("c1ccccc1"), "c1ccccc1");
        round_trip("c1ccc2ccccc2c1");
        round_trip("C12CC1C2");
    }

    #[test]
    fn aromatic_link_is_explicit() {
        assert_eq!(round_trip("c1ccccc1-c1ccccc1"), "c1ccccc1-c1ccccc1");
    }

    #[test]
    fn brackets_where_needed() {
        assert_eq!(round_trip("[Na+].[Cl-]"), "[Na+].[Cl-]");
        assert_eq!(round_trip("[Fe]"), "[Fe]");
        assert_eq!(round_trip("[13CH4]"), "[13CH4]");
        assert_eq!(round_trip("[CH3]"), "[CH3]");
        assert_eq!(round_trip("O=c1cccc[nH]1"), "O=c1cccc[nH]1");
        assert_eq!(round_trip("[NH4+]"), "[NH4+]");
        assert_eq!(round_trip("C[N+](C)(C)C"), "C[N+](C)(C)C");
        assert_eq!(round_trip("[O-2]"), "[O-2]");
    }

    #[test]
    fn uncached_atoms_are_written_as_parsed() {
        let mol = parse_smiles("CC(=O)[O-]").unwrap();
        assert_eq!(to_smiles(&mol), "CC(=O)[O-]");
    }

    #[test]
    fn ring_digits_are_reused() {
        assert_eq!(round_trip("C1CC1C1CC1"), "C1CC1C1CC1");
    }

    #[test]
    fn ring_digit_spelling() {
        let mut out = String::new();
        write_ring_digit(7, &mut out);
        write_ring_digit(42, &mut out);
        write_ring_digit(123, &mut out);
        assert_eq!(out, "7%42%(123)");
    }

    #[test]
    fn canonical_is_order_independent() {
        for smiles in ["OCC", "NCC(=O)O", "c1ccncc1C", "CC(C)(C)Cl", "C1CC1C1CCC1", "[Na+].[O-]C=O"] {
            let m = mol(smiles);
            let expected = to_canonical_smiles(&m);
            let n = m.atom_count();
            for offset in 1..n {
                let perm: Vec<usize> = (0..n).map(|i| (i + offset) % n).collect();
                let renum = renumber_atoms(&m, &perm).unwrap();
                assert_eq!(to_canonical_smiles(&renum), expected, "{smiles} offset {offset}");
            }
        }
    }

    #[test]
    fn canonical_is_idempotent() {
        for smiles in ["OCC", "c1ccc2ccccc2c1", "CC(=O)Nc1ccc(O)cc1", "C1CC2CCC1C2"] {
            let first = canon(smiles);
            assert_eq!(canon(&first), first, "{smiles}");
        }
    }

    #[test]
    fn canonical_spellings_agree() {
        assert_eq!(canon("OCC"), canon("CCO"));
        assert_eq!(canon("C(C)(C)O"), canon("CC(O)C"));
        assert_eq!(canon("[Cl-].[Na+]"), canon("[Na+].[Cl-]"));
        assert_ne!(canon("CCO"), canon("COC"));
    }
}
