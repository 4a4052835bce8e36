/// Default atom type for a molecular graph node.
///
/// `Atom` stores what the SMILES text says about an atom plus, once
/// [`update_property_cache`](crate::valence::update_property_cache) has run,
/// the derived valence data in [`Atom::cache`]. Parsing never fills the cache
/// and never checks valence; that is left to the caller so that unsanitized
/// input can be loaded first and validated later.
///
/// # Examples
///
/// ```
/// use tauthash::Atom;
///
/// let carbon = Atom {
///     atomic_num: 6,
///     ..Atom::default()
/// };
/// assert_eq!(carbon.total_hs(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, …). `0` is an anonymous atom,
    /// only produced by the graph-shape hash functions.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units (e.g. −1 for a carboxylate oxygen).
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance (the common case).
    pub isotope: u16,
    /// Hydrogens written explicitly, i.e. the `H` count of a bracket atom.
    pub explicit_hs: u8,
    /// When set, the atom never receives implicit hydrogens.
    ///
    /// Bracket atoms always carry this flag: `[C]` is a bare carbon with no
    /// hydrogens, not methane.
    pub no_implicit: bool,
    /// Whether the atom was written in lowercase (aromatic) form.
    pub is_aromatic: bool,
    /// Derived valence data, `None` until the property cache is refreshed.
    pub cache: Option<PropertyCache>,
}

/// Per-atom values computed by the property cache refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyCache {
    /// Bond valence plus explicit hydrogens.
    pub explicit_valence: u8,
    /// Hydrogens implied by the atom's default valence.
    pub implicit_hs: u8,
}

impl Atom {
    pub fn implicit_hs(&self) -> u8 {
        self.cache.map_or(0, |c| c.implicit_hs)
    }

    /// Explicit plus implicit hydrogens.
    pub fn total_hs(&self) -> u8 {
        self.explicit_hs.saturating_add(self.implicit_hs())
    }

    /// Turns the current hydrogen count into an explicit one so that later
    /// edits to the bonds around this atom cannot change it.
    pub fn freeze_hs(&mut self) {
        self.explicit_hs = self.total_hs();
        self.no_implicit = true;
        if let Some(cache) = self.cache.as_mut() {
            cache.implicit_hs = 0;
        }
    }

    /// Drops every hydrogen and keeps the atom from gaining implicit ones.
    pub fn strip_hs(&mut self) {
        self.explicit_hs = 0;
        self.no_implicit = true;
        if let Some(cache) = self.cache.as_mut() {
            cache.implicit_hs = 0;
        }
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.total_hs()
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_hs_includes_cache() {
        let mut atom = Atom {
            atomic_num: 7,
            explicit_hs: 1,
            ..Atom::default()
        };
        assert_eq!(atom.total_hs(), 1);
        atom.cache = Some(PropertyCache {
            explicit_valence: 2,
            implicit_hs: 1,
        });
        assert_eq!(atom.total_hs(), 2);
    }

    #[test]
    fn freeze_moves_implicit_into_explicit() {
        let mut atom = Atom {
            atomic_num: 6,
            cache: Some(PropertyCache {
                explicit_valence: 1,
                implicit_hs: 3,
            }),
            ..Atom::default()
        };
        atom.freeze_hs();
        assert_eq!(atom.explicit_hs, 3);
        assert_eq!(atom.implicit_hs(), 0);
        assert_eq!(atom.total_hs(), 3);
        assert!(atom.no_implicit);
    }

    #[test]
    fn strip_removes_all_hydrogens() {
        let mut atom = Atom {
            atomic_num: 8,
            explicit_hs: 1,
            cache: Some(PropertyCache {
                explicit_valence: 2,
                implicit_hs: 1,
            }),
            ..Atom::default()
        };
        atom.strip_hs();
        assert_eq!(atom.total_hs(), 0);
        assert!(atom.no_implicit);
    }
}
