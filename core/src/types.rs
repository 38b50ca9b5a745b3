use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Single coordinate axis used for grid rows, columns, and positions.
pub type Coord = u8;

/// Two-dimensional coordinates `(row, col)`, zero-based.
pub type Coord2 = (Coord, Coord);

/// Numeric clue label as printed in the grid.
pub type ClueId = u16;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

/// Axis a word runs along. Across words read right-to-left, down words
/// top-to-bottom; the sign conventions live in the traversal module.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Across => Self::Down,
            Self::Down => Self::Across,
        }
    }
}

bitflags! {
    /// Set of directions a clue number starts words in.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DirSet: u8 {
        const ACROSS = 1;
        const DOWN   = 1 << 1;
    }
}

impl From<Direction> for DirSet {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Across => DirSet::ACROSS,
            Direction::Down => DirSet::DOWN,
        }
    }
}

impl DirSet {
    /// The sole member, when the set has exactly one. Drives the
    /// auto-direction snap on anchor-cell clicks.
    pub fn single(self) -> Option<Direction> {
        match self {
            DirSet::ACROSS => Some(Direction::Across),
            DirSet::DOWN => Some(Direction::Down),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirset_single_is_none_for_empty_and_both() {
        assert_eq!(DirSet::empty().single(), None);
        assert_eq!(DirSet::all().single(), None);
        assert_eq!(DirSet::ACROSS.single(), Some(Direction::Across));
        assert_eq!(DirSet::DOWN.single(), Some(Direction::Down));
    }
}
