use thiserror::Error;

/// Errors produced when parsing a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    /// The input string was empty or contained only whitespace.
    #[error("empty SMILES string")]
    EmptyInput,
    /// An unexpected character was encountered at the given position.
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    /// An unrecognized element symbol was found.
    #[error("invalid element '{text}' at position {pos}")]
    InvalidElement { pos: usize, text: String },
    /// A bracket atom `[` was opened but never closed with `]`.
    #[error("unclosed bracket atom starting at position {pos}")]
    UnclosedBracket { pos: usize },
    /// A ring-opening digit was never matched by a ring-closing digit.
    #[error("unclosed ring {digit}")]
    UnclosedRing { digit: u16 },
    /// A parenthesis was opened without a matching close, or vice versa.
    #[error("unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    /// A charge specifier inside a bracket atom could not be parsed.
    #[error("invalid charge in bracket atom at position {pos}")]
    InvalidCharge { pos: usize },
    /// An isotope or hydrogen count inside a bracket atom overflowed.
    #[error("number out of range in bracket atom at position {pos}")]
    NumberOverflow { pos: usize },
    /// A ring-closure digit appears before any atom, or closes onto its own atom.
    #[error("invalid ring bond {digit} at position {pos}")]
    InvalidRingBond { digit: u16, pos: usize },
    /// Two ring-closure bonds on the same digit specify conflicting bond types.
    #[error("conflicting bond types on ring closure {digit}")]
    RingBondConflict { digit: u16 },
    /// A ring closure joins two atoms that are already bonded.
    #[error("ring closure {digit} at position {pos} duplicates an existing bond")]
    DuplicateBond { digit: u16, pos: usize },
    /// A bond symbol without an atom on both sides.
    #[error("dangling bond at position {pos}")]
    DanglingBond { pos: usize },
    /// A `.` with no atom before or after it.
    #[error("empty fragment at position {pos}")]
    EmptyFragment { pos: usize },
}
