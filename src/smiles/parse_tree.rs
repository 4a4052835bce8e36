use std::collections::HashMap;

use crate::element::Element;
use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, Token};

#[derive(Debug, Clone)]
pub struct ParseAtom {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub hcount: u8,
    pub charge: i8,
    pub is_bracket: bool,
    pub neighbors: Vec<Neighbor>,
}

#[derive(Debug, Clone)]
pub struct Neighbor {
    pub bond: Option<BondToken>,
    pub atom_idx: usize,
}

#[derive(Debug, Clone)]
pub struct ParseTree {
    pub atoms: Vec<ParseAtom>,
}

impl ParseTree {
    fn connect(&mut self, a: usize, b: usize, bond: Option<BondToken>) {
        self.atoms[a].neighbors.push(Neighbor { bond, atom_idx: b });
        self.atoms[b].neighbors.push(Neighbor { bond, atom_idx: a });
    }

    fn bonded(&self, a: usize, b: usize) -> bool {
        self.atoms[a].neighbors.iter().any(|n| n.atom_idx == b)
    }
}

pub fn build_parse_tree(tokens: &[Token]) -> Result<ParseTree, SmilesError> {
    let mut tree = ParseTree { atoms: Vec::new() };
    // (branch point atom, position of its '(')
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<usize> = None;
    // bond symbol waiting for its second atom, with its position
    let mut pending_bond: Option<(BondToken, usize)> = None;
    let mut ring_opens: HashMap<u16, (usize, Option<BondToken>)> = HashMap::new();

    for token in tokens {
        match token {
            Token::Atom(atom_tok) => {
                let idx = tree.atoms.len();
                tree.atoms.push(parse_atom_from_token(atom_tok));

                let bond = pending_bond.take().map(|(b, _)| b);
                if let Some(cur) = current {
                    tree.connect(cur, idx, bond);
                }

                current = Some(idx);
            }
            Token::Bond(b, pos) => {
                if let Some((_, earlier)) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos: earlier });
                }
                if current.is_none() {
                    return Err(SmilesError::DanglingBond { pos: *pos });
                }
                pending_bond = Some((*b, *pos));
            }
            Token::RingClosure { bond, digit, pos } => {
                let cur = current.ok_or(SmilesError::InvalidRingBond {
                    digit: *digit,
                    pos: *pos,
                })?;
                let bond = bond.or(pending_bond.take().map(|(b, _)| b));

                match ring_opens.remove(digit) {
                    Some((open_idx, _)) if open_idx == cur => {
                        return Err(SmilesError::InvalidRingBond {
                            digit: *digit,
                            pos: *pos,
                        });
                    }
                    Some((open_idx, _)) if tree.bonded(open_idx, cur) => {
                        return Err(SmilesError::DuplicateBond {
                            digit: *digit,
                            pos: *pos,
                        });
                    }
                    Some((open_idx, open_bond)) => {
                        let ring_bond = match (bond, open_bond) {
                            (Some(b1), Some(b2)) if b1 != b2 => {
                                return Err(SmilesError::RingBondConflict { digit: *digit });
                            }
                            (b1, b2) => b1.or(b2),
                        };
                        tree.connect(open_idx, cur, ring_bond);
                    }
                    None => {
                        ring_opens.insert(*digit, (cur, bond));
                    }
                }
            }
            Token::OpenParen(pos) => {
                if let Some((_, bond_pos)) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                let cur = current.ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                stack.push((cur, *pos));
            }
            Token::CloseParen(pos) => {
                if let Some((_, bond_pos)) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                let (branch_point, _) =
                    stack.pop().ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                current = Some(branch_point);
            }
            Token::Dot(pos) => {
                if let Some((_, bond_pos)) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                if current.is_none() {
                    return Err(SmilesError::EmptyFragment { pos: *pos });
                }
                current = None;
            }
        }
    }

    if let Some((_, pos)) = pending_bond {
        return Err(SmilesError::DanglingBond { pos });
    }

    if let Some(&(_, pos)) = stack.last() {
        return Err(SmilesError::UnmatchedParen { pos });
    }

    if let Some(Token::Dot(pos)) = tokens.last() {
        return Err(SmilesError::EmptyFragment { pos: *pos });
    }

    if let Some(&digit) = ring_opens.keys().min() {
        return Err(SmilesError::UnclosedRing { digit });
    }

    Ok(tree)
}

fn parse_atom_from_token(tok: &AtomToken) -> ParseAtom {
    ParseAtom {
        element: tok.element,
        is_aromatic: tok.is_aromatic,
        isotope: tok.isotope,
        hcount: tok.hcount,
        charge: tok.charge,
        is_bracket: tok.is_bracket,
        neighbors: Vec::new(),
    }
}
