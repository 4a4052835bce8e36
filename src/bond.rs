#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    /// Delocalized bond between two lowercase SMILES atoms, left as written
    /// because molecules are never kekulized.
    Aromatic,
}

impl BondOrder {
    /// Valence contribution in half-bond units (aromatic counts as 1.5).
    pub fn half_valence(self) -> u8 {
        match self {
            BondOrder::Single => 2,
            BondOrder::Double => 4,
            BondOrder::Triple => 6,
            BondOrder::Aromatic => 3,
        }
    }

    pub fn symbol(self) -> Option<char> {
        match self {
            BondOrder::Single => None,
            BondOrder::Double => Some('='),
            BondOrder::Triple => Some('#'),
            BondOrder::Aromatic => Some(':'),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bond {
    pub order: BondOrder,
    /// `None` until conjugation has been perceived.
    pub is_conjugated: Option<bool>,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            is_conjugated: None,
        }
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}

impl crate::traits::HasConjugation for Bond {
    fn is_conjugated(&self) -> Option<bool> {
        self.is_conjugated
    }
}
