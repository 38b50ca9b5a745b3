use crate::*;

/// Which way to walk along the current word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Motion {
    Next,
    Previous,
}

impl Motion {
    pub const fn reversed(self) -> Self {
        match self {
            Self::Next => Self::Previous,
            Self::Previous => Self::Next,
        }
    }
}

/// The two axes are deliberately asymmetric: across words are written
/// right-to-left, so "next" along Across decreases the column, while "next"
/// along Down increases the row. `None` from `step` is the word-boundary
/// sentinel, not an error.
impl Grid {
    pub fn is_open(&self, (row, col): Coord2) -> bool {
        let (rows, cols) = self.size();
        row < rows && col < cols && self.cell_at((row, col)).is_open()
    }

    pub fn step(&self, (row, col): Coord2, direction: Direction, motion: Motion) -> Option<Coord2> {
        use Direction::*;
        use Motion::*;

        // A blocked or out-of-range source is not part of any word and has
        // no neighbors.
        if !self.is_open((row, col)) {
            return None;
        }

        let coords = match (direction, motion) {
            (Across, Next) => (row, col.checked_sub(1)?),
            (Across, Previous) => (row, col.checked_add(1)?),
            (Down, Next) => (row.checked_add(1)?, col),
            (Down, Previous) => (row.checked_sub(1)?, col),
        };
        self.is_open(coords).then_some(coords)
    }

    /// Anchor cell of the word containing `coords`: the last open cell
    /// reached by walking "previous". Terminates because the grid is finite
    /// and each step strictly shrinks the remaining run along one axis.
    pub fn word_start(&self, coords: Coord2, direction: Direction) -> Coord2 {
        let mut cur = coords;
        while let Some(prev) = self.step(cur, direction, Motion::Previous) {
            cur = prev;
        }
        cur
    }

    /// All cells of the word containing `coords`, ordered from the anchor to
    /// the final cell. Defines the highlighted set for the active word.
    pub fn word_extent(&self, coords: Coord2, direction: Direction) -> Vec<Coord2> {
        let mut cur = self.word_start(coords, direction);
        let mut extent = vec![cur];
        while let Some(next) = self.step(cur, direction, Motion::Next) {
            extent.push(next);
            cur = next;
        }
        extent
    }

    /// Whether `coords` has any open neighbor along `direction`. An isolated
    /// single-letter "word" has none, and navigation flips direction rather
    /// than highlight it.
    pub fn has_extent(&self, coords: Coord2, direction: Direction) -> bool {
        self.step(coords, direction, Motion::Next).is_some()
            || self.step(coords, direction, Motion::Previous).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::testutil::grid;
    use Direction::*;
    use Motion::*;

    #[test]
    fn step_signs_encode_rtl_across_and_ttb_down() {
        // Pins the directional convention: Across runs toward column 0,
        // Down toward the last row.
        let g = grid(&[&["", ""], &["", ""]], &[], &[]);

        assert_eq!(g.step((0, 1), Across, Next), Some((0, 0)));
        assert_eq!(g.step((0, 0), Across, Previous), Some((0, 1)));
        assert_eq!(g.step((0, 0), Down, Next), Some((1, 0)));
        assert_eq!(g.step((1, 0), Down, Previous), Some((0, 0)));
    }

    #[test]
    fn step_is_its_own_inverse() {
        let g = grid(&[&["", "", ""], &["", "#", ""]], &[], &[]);

        for row in 0..2 {
            for col in 0..3 {
                let coords = (row, col);
                for direction in [Across, Down] {
                    if let Some(next) = g.step(coords, direction, Next) {
                        assert_eq!(g.step(next, direction, Previous), Some(coords));
                    }
                }
            }
        }
    }

    #[test]
    fn step_stops_at_blocked_cells_and_edges() {
        let g = grid(&[&["", "#", ""]], &[], &[]);

        assert_eq!(g.step((0, 2), Across, Next), None);
        assert_eq!(g.step((0, 0), Across, Previous), None);
        assert_eq!(g.step((0, 0), Down, Next), None);
        assert_eq!(g.step((0, 0), Down, Previous), None);
    }

    #[test]
    fn step_from_blocked_cell_is_none() {
        // A blocked cell must never act as a source either; otherwise
        // stepping out of it would not be invertible.
        let g = grid(&[&["", "", ""], &["", "#", ""]], &[], &[]);

        for direction in [Across, Down] {
            for motion in [Next, Previous] {
                assert_eq!(g.step((1, 1), direction, motion), None);
            }
        }
    }

    #[test]
    fn word_start_finds_the_rightmost_across_cell() {
        let g = grid(&[&["#", "", "", "1"]], &[1], &[]);

        assert_eq!(g.word_start((0, 1), Across), (0, 3));
        assert_eq!(g.word_start((0, 3), Across), (0, 3));
    }

    #[test]
    fn word_extent_is_a_contiguous_bounded_run() {
        let g = grid(&[&["", "", "", "#", ""]], &[], &[]);

        let extent = g.word_extent((0, 1), Across);
        assert_eq!(extent, vec![(0, 2), (0, 1), (0, 0)]);
        assert!(extent.contains(&(0, 1)));
        assert_eq!(g.word_extent((0, 4), Across), vec![(0, 4)]);
    }

    #[test]
    fn word_extent_down_runs_top_to_bottom() {
        let g = grid(&[&["1"], &[""], &["#"]], &[], &[1]);

        assert_eq!(g.word_extent((1, 0), Down), vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn isolated_cell_has_no_extent() {
        let g = grid(&[&["", "#"], &["#", "#"]], &[], &[]);

        assert!(!g.has_extent((0, 0), Across));
        assert!(!g.has_extent((0, 0), Down));
    }
}
