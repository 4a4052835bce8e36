use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond(BondToken, usize),
    RingClosure {
        bond: Option<BondToken>,
        digit: u16,
        pos: usize,
    },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

/// One atom as written. Chirality and atom classes are consumed but not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub hcount: u8,
    pub charge: i8,
    pub is_bracket: bool,
}

/// Directional bonds (`/`, `\`) are read as plain single bonds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '[' => {
                let (tok, next) = parse_bracket_atom(&chars, i)?;
                tokens.push(Token::Atom(tok));
                i = next;
            }
            'B' if chars.get(i + 1) == Some(&'r') => {
                tokens.push(Token::Atom(bare_atom(Element::Br, false)));
                i += 2;
            }
            'C' if chars.get(i + 1) == Some(&'l') => {
                tokens.push(Token::Atom(bare_atom(Element::Cl, false)));
                i += 2;
            }
            ch @ ('B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I') => {
                tokens.push(Token::Atom(bare_atom(organic_element(ch), false)));
                i += 1;
            }
            ch @ ('b' | 'c' | 'n' | 'o' | 'p' | 's') => {
                let element = organic_element(ch.to_ascii_uppercase());
                tokens.push(Token::Atom(bare_atom(element, true)));
                i += 1;
            }
            '-' | '/' | '\\' => {
                tokens.push(Token::Bond(BondToken::Single, i));
                i += 1;
            }
            '=' => {
                tokens.push(Token::Bond(BondToken::Double, i));
                i += 1;
            }
            '#' => {
                tokens.push(Token::Bond(BondToken::Triple, i));
                i += 1;
            }
            ':' => {
                tokens.push(Token::Bond(BondToken::Aromatic, i));
                i += 1;
            }
            '(' => {
                tokens.push(Token::OpenParen(i));
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen(i));
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot(i));
                i += 1;
            }
            '%' => {
                let (digit, next) = parse_percent_ring(&chars, i)?;
                let bond = try_consume_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure { bond, digit, pos: i });
                i = next;
            }
            d @ '0'..='9' => {
                let bond = try_consume_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure {
                    bond,
                    digit: digit_value(d),
                    pos: i,
                });
                i += 1;
            }
            ch => return Err(SmilesError::UnexpectedChar { pos: i, ch }),
        }
    }

    Ok(tokens)
}

fn organic_element(ch: char) -> Element {
    match ch {
        'B' => Element::B,
        'C' => Element::C,
        'N' => Element::N,
        'O' => Element::O,
        'P' => Element::P,
        'S' => Element::S,
        'F' => Element::F,
        _ => Element::I,
    }
}

fn digit_value(d: char) -> u16 {
    (d as u16) - b'0' as u16
}

fn bare_atom(element: Element, aromatic: bool) -> AtomToken {
    AtomToken {
        element,
        is_aromatic: aromatic,
        isotope: 0,
        hcount: 0,
        charge: 0,
        is_bracket: false,
    }
}

fn try_consume_pending_bond(tokens: &mut Vec<Token>) -> Option<BondToken> {
    if let Some(Token::Bond(b, _)) = tokens.last() {
        let b = *b;
        tokens.pop();
        return Some(b);
    }
    None
}

/// `%nn` (two digits) or the extended `%(n...)` form.
fn parse_percent_ring(chars: &[char], start: usize) -> Result<(u16, usize), SmilesError> {
    let err = SmilesError::UnexpectedChar {
        pos: start,
        ch: '%',
    };
    let i = start + 1;
    if chars.get(i) == Some(&'(') {
        let mut j = i + 1;
        let mut val: u16 = 0;
        while j < chars.len() && chars[j].is_ascii_digit() {
            val = val
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit_value(chars[j])))
                .ok_or(SmilesError::NumberOverflow { pos: start })?;
            j += 1;
        }
        if j == i + 1 || chars.get(j) != Some(&')') {
            return Err(err);
        }
        return Ok((val, j + 1));
    }
    match (chars.get(i), chars.get(i + 1)) {
        (Some(d1), Some(d2)) if d1.is_ascii_digit() && d2.is_ascii_digit() => {
            Ok((digit_value(*d1) * 10 + digit_value(*d2), i + 2))
        }
        _ => Err(err),
    }
}

fn parse_bracket_atom(chars: &[char], start: usize) -> Result<(AtomToken, usize), SmilesError> {
    let mut i = start + 1; // skip '['

    let isotope = parse_isotope(chars, &mut i, start)?;
    let (element, is_aromatic) = parse_bracket_element(chars, &mut i, start)?;
    skip_chirality(chars, &mut i);
    let hcount = parse_hcount(chars, &mut i, start)?;
    let charge = parse_charge(chars, &mut i, start)?;
    skip_atom_class(chars, &mut i);

    if i >= chars.len() || chars[i] != ']' {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }
    i += 1; // skip ']'

    Ok((
        AtomToken {
            element,
            is_aromatic,
            isotope,
            hcount,
            charge,
            is_bracket: true,
        },
        i,
    ))
}

fn parse_isotope(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<u16, SmilesError> {
    let mut val: u16 = 0;
    while *i < chars.len() && chars[*i].is_ascii_digit() {
        val = val
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit_value(chars[*i])))
            .ok_or(SmilesError::NumberOverflow { pos: bracket_start })?;
        *i += 1;
    }
    Ok(val)
}

fn parse_bracket_element(
    chars: &[char],
    i: &mut usize,
    bracket_start: usize,
) -> Result<(Element, bool), SmilesError> {
    if *i >= chars.len() {
        return Err(SmilesError::UnclosedBracket { pos: bracket_start });
    }

    let aromatic_map: &[(&str, Element)] = &[
        ("se", Element::Se),
        ("te", Element::Te),
        ("as", Element::As),
        ("b", Element::B),
        ("c", Element::C),
        ("n", Element::N),
        ("o", Element::O),
        ("p", Element::P),
        ("s", Element::S),
    ];

    for &(pat, elem) in aromatic_map {
        let end = *i + pat.len();
        if end > chars.len() || !chars[*i..end].iter().copied().eq(pat.chars()) {
            continue;
        }
        let next_is_lower = chars.get(end).is_some_and(|c| c.is_ascii_lowercase());
        if !next_is_lower || pat.len() == 2 {
            *i = end;
            return Ok((elem, true));
        }
    }

    // Try two-char uppercase element first, then one-char
    if *i + 1 < chars.len() && chars[*i].is_ascii_uppercase() && chars[*i + 1].is_ascii_lowercase()
    {
        let sym: String = chars[*i..=*i + 1].iter().collect();
        if let Some(e) = Element::from_symbol(&sym) {
            *i += 2;
            return Ok((e, false));
        }
    }

    if chars[*i].is_ascii_uppercase() {
        if let Some(e) = Element::from_symbol(&chars[*i].to_string()) {
            *i += 1;
            return Ok((e, false));
        }
    }

    Err(SmilesError::InvalidElement {
        pos: *i,
        text: chars[*i].to_string(),
    })
}

fn skip_chirality(chars: &[char], i: &mut usize) {
    while *i < chars.len() && chars[*i] == '@' {
        *i += 1;
    }
    // @TH1, @AL2, @SP3, @TB10, @OH25
    let has_class = chars[*i..]
        .get(..2)
        .is_some_and(|c| matches!(c, ['T', 'H'] | ['A', 'L'] | ['S', 'P'] | ['T', 'B'] | ['O', 'H']));
    if *i > 0 && chars[*i - 1] == '@' && has_class {
        *i += 2;
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            *i += 1;
        }
    }
}

fn parse_hcount(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<u8, SmilesError> {
    if *i >= chars.len() || chars[*i] != 'H' {
        return Ok(0);
    }
    *i += 1;
    if *i >= chars.len() || !chars[*i].is_ascii_digit() {
        return Ok(1);
    }
    let mut count: u8 = 0;
    while *i < chars.len() && chars[*i].is_ascii_digit() {
        count = count
            .checked_mul(10)
            .and_then(|v| v.checked_add(chars[*i] as u8 - b'0'))
            .ok_or(SmilesError::NumberOverflow { pos: bracket_start })?;
        *i += 1;
    }
    Ok(count)
}

fn parse_charge(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<i8, SmilesError> {
    let sign: i8 = match chars.get(*i) {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Ok(0),
    };
    let sign_char = chars[*i];
    *i += 1;

    let err = SmilesError::InvalidCharge { pos: bracket_start };
    if chars.get(*i) == Some(&sign_char) {
        let mut count: i8 = 1;
        while chars.get(*i) == Some(&sign_char) {
            count = count.checked_add(1).ok_or(err.clone())?;
            *i += 1;
        }
        return Ok(sign * count);
    }
    if chars.get(*i).is_some_and(|c| c.is_ascii_digit()) {
        let mut val: i8 = 0;
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            val = val
                .checked_mul(10)
                .and_then(|v| v.checked_add((chars[*i] as u8 - b'0') as i8))
                .ok_or(err.clone())?;
            *i += 1;
        }
        return Ok(sign * val);
    }
    Ok(sign)
}

fn skip_atom_class(chars: &[char], i: &mut usize) {
    if chars.get(*i) == Some(&':') {
        *i += 1;
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            *i += 1;
        }
    }
}
