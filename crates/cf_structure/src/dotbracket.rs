//! Dot-bracket constraint strings.
//!
//! Strand breaks may be written as whitespace or `+` and are skipped, so a
//! constraint lines up with the concatenated sequence of a complex.
//!

use crate::NAIDX;
use crate::Pair;
use crate::PairSet;
use crate::StructureError;

/// A single dot-bracket symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotBracket {
    Unpaired,
    Open,
    Close,
}

impl TryFrom<char> for DotBracket {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '.' => Ok(DotBracket::Unpaired),
            '(' => Ok(DotBracket::Open),
            ')' => Ok(DotBracket::Close),
            _ => Err(c),
        }
    }
}

impl From<DotBracket> for char {
    fn from(db: DotBracket) -> Self {
        match db {
            DotBracket::Unpaired => '.',
            DotBracket::Open => '(',
            DotBracket::Close => ')',
        }
    }
}

/// Read a dot-bracket string (breaks ignored) into a `PairSet`.
pub fn parse_dot_bracket(s: &str) -> Result<PairSet, StructureError> {
    let symbols: Vec<char> = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '+')
        .collect();
    if symbols.len() >= NAIDX::MAX as usize {
        return Err(StructureError::TooLong(symbols.len()));
    }

    let mut pairs = PairSet::new(symbols.len());
    let mut stack: Vec<usize> = Vec::new();
    for (pos, &c) in symbols.iter().enumerate() {
        match DotBracket::try_from(c) {
            Ok(DotBracket::Open) => stack.push(pos),
            Ok(DotBracket::Close) => {
                let i = stack.pop().ok_or(StructureError::UnmatchedClose(pos))?;
                pairs.insert(Pair::new(i as NAIDX, pos as NAIDX))?;
            }
            Ok(_) => {}
            Err(symbol) => return Err(StructureError::InvalidSymbol { symbol, pos }),
        }
    }
    if let Some(&open) = stack.last() {
        return Err(StructureError::UnmatchedOpen(open));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_hairpin() {
        let ps = parse_dot_bracket("((..))").unwrap();
        assert_eq!(ps.length(), 6);
        assert_eq!(ps.to_vec(), vec![Pair::new(0, 5), Pair::new(1, 4)]);
    }

    #[test]
    fn test_parse_skips_strand_breaks() {
        let ps = parse_dot_bracket("((. ))").unwrap();
        assert_eq!(ps.length(), 5);
        assert_eq!(ps.to_vec(), vec![Pair::new(0, 4), Pair::new(1, 3)]);
        let ps = parse_dot_bracket("(+)").unwrap();
        assert_eq!(ps.to_vec(), vec![Pair::new(0, 1)]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_dot_bracket("(()"), Err(StructureError::UnmatchedOpen(0)));
        assert_eq!(parse_dot_bracket("())"), Err(StructureError::UnmatchedClose(2)));
        assert_eq!(
            parse_dot_bracket("(a)"),
            Err(StructureError::InvalidSymbol { symbol: 'a', pos: 1 })
        );
    }

    #[test]
    fn test_symbol_roundtrip() {
        for c in ['.', '(', ')'] {
            assert_eq!(char::from(DotBracket::try_from(c).unwrap()), c);
        }
    }
}
