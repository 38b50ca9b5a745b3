use ndarray::Array2;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::*;

/// Marks a blocked tile in puzzle input.
pub const BLOCKED_TILE: &str = "#";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Dimensions {
    pub rows: Coord,
    pub columns: Coord,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Definitions {
    #[serde(default)]
    pub across: BTreeMap<ClueId, String>,
    #[serde(default)]
    pub down: BTreeMap<ClueId, String>,
}

impl Definitions {
    pub fn for_direction(&self, direction: Direction) -> &BTreeMap<ClueId, String> {
        match direction {
            Direction::Across => &self.across,
            Direction::Down => &self.down,
        }
    }
}

/// Puzzle input as fetched, already validated upstream. Cells are `"#"` for
/// blocked, `""` for open, or a digit string for open-with-clue-number.
#[derive(Clone, Debug, Deserialize)]
pub struct PuzzleInfo {
    pub id: u32,
    pub author: String,
    pub dimensions: Dimensions,
    pub grid: Vec<Vec<String>>,
    pub definitions: Definitions,
    #[serde(default)]
    pub sol_hash: Option<String>,
    #[serde(default)]
    pub sol_grid: Option<Vec<Vec<String>>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    /// Not part of any word, never addressable by navigation.
    Blocked,
    /// Addressable; `clue` is present only on anchor cells.
    Open { clue: Option<ClueId> },
}

impl Cell {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClueEntry {
    pub anchor: Coord2,
    pub directions: DirSet,
}

/// Static per-puzzle model: cell kinds plus the clue index. Built once at
/// load, immutable afterwards.
#[derive(Clone, Debug)]
pub struct Grid {
    puzzle_id: u32,
    cells: Array2<Cell>,
    clues: BTreeMap<ClueId, ClueEntry>,
}

impl Grid {
    pub fn build(info: &PuzzleInfo) -> Result<Self, GridError> {
        let rows = info.dimensions.rows as usize;
        let cols = info.dimensions.columns as usize;

        if info.grid.len() != rows || info.grid.iter().any(|row| row.len() != cols) {
            return Err(GridError::ShapeMismatch);
        }

        let mut clues: BTreeMap<ClueId, ClueEntry> = BTreeMap::new();
        let mut cells = Vec::with_capacity(rows * cols);
        for (row, row_labels) in info.grid.iter().enumerate() {
            for (col, label) in row_labels.iter().enumerate() {
                let cell = match label.as_str() {
                    BLOCKED_TILE => Cell::Blocked,
                    "" => Cell::Open { clue: None },
                    label => {
                        let id: ClueId = label
                            .parse()
                            .map_err(|_| GridError::BadLabel(label.to_string()))?;
                        let anchor = (row as Coord, col as Coord);
                        let entry = ClueEntry {
                            anchor,
                            directions: DirSet::empty(),
                        };
                        if clues.insert(id, entry).is_some() {
                            return Err(GridError::DuplicateAnchor(id));
                        }
                        Cell::Open { clue: Some(id) }
                    }
                };
                cells.push(cell);
            }
        }

        let cells = Array2::from_shape_vec((rows, cols), cells)
            .map_err(|_| GridError::ShapeMismatch)?;

        let mut grid = Self {
            puzzle_id: info.id,
            cells,
            clues,
        };
        for direction in [Direction::Across, Direction::Down] {
            for &id in info.definitions.for_direction(direction).keys() {
                grid.register_direction(id, direction)?;
            }
        }
        log::debug!(
            "built grid for puzzle {}: {}x{}, {} clues",
            grid.puzzle_id,
            rows,
            cols,
            grid.clues.len()
        );
        Ok(grid)
    }

    /// Records that `id` starts a word along `direction`, as listed in the
    /// per-direction definition tables.
    fn register_direction(&mut self, id: ClueId, direction: Direction) -> Result<(), GridError> {
        let entry = self.clues.get_mut(&id).ok_or(GridError::MissingAnchor(id))?;
        entry.directions |= direction.into();
        Ok(())
    }

    pub fn puzzle_id(&self) -> u32 {
        self.puzzle_id
    }

    pub fn size(&self) -> Coord2 {
        // Shape came from `Dimensions`, so both axes fit in a Coord.
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn rows(&self) -> usize {
        self.cells.dim().0
    }

    pub fn cols(&self) -> usize {
        self.cells.dim().1
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    pub fn clue(&self, id: ClueId) -> Option<&ClueEntry> {
        self.clues.get(&id)
    }

    pub fn clue_at(&self, coords: Coord2) -> Option<ClueId> {
        match self.cell_at(coords) {
            Cell::Open { clue } => clue,
            Cell::Blocked => None,
        }
    }

    pub fn iter_clues(&self) -> impl Iterator<Item = (ClueId, &ClueEntry)> {
        self.clues.iter().map(|(&id, entry)| (id, entry))
    }

    /// Highest clue id starting a word along `direction`, 0 when none do.
    /// Sizes the per-direction solved bitstrings.
    pub fn max_clue_id(&self, direction: Direction) -> ClueId {
        let dir: DirSet = direction.into();
        self.clues
            .iter()
            .filter(|(_, entry)| entry.directions.contains(dir))
            .map(|(&id, _)| id)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    pub fn puzzle(
        grid: &[&[&str]],
        across: &[ClueId],
        down: &[ClueId],
    ) -> PuzzleInfo {
        let rows = grid.len() as Coord;
        let columns = grid.first().map_or(0, |row| row.len()) as Coord;
        let clue_map = |ids: &[ClueId]| {
            ids.iter()
                .map(|&id| (id, format!("clue {id}")))
                .collect::<BTreeMap<_, _>>()
        };
        PuzzleInfo {
            id: 1,
            author: "test".to_string(),
            dimensions: Dimensions { rows, columns },
            grid: grid
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
            definitions: Definitions {
                across: clue_map(across),
                down: clue_map(down),
            },
            sol_hash: None,
            sol_grid: None,
        }
    }

    pub fn grid(cells: &[&[&str]], across: &[ClueId], down: &[ClueId]) -> Grid {
        Grid::build(&puzzle(cells, across, down)).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;

    #[test]
    fn build_derives_cells_and_clue_anchors() {
        let grid = grid(
            &[&["1", "", "#"], &["2", "", ""]],
            &[1, 2],
            &[1],
        );

        assert_eq!(grid.size(), (2, 3));
        assert_eq!(grid.cell_at((0, 2)), Cell::Blocked);
        assert_eq!(grid.cell_at((0, 1)), Cell::Open { clue: None });
        assert_eq!(grid.clue_at((0, 0)), Some(1));
        assert_eq!(
            grid.clue(1).unwrap(),
            &ClueEntry {
                anchor: (0, 0),
                directions: DirSet::all(),
            }
        );
        assert_eq!(grid.clue(2).unwrap().directions, DirSet::ACROSS);
    }

    #[test]
    fn definition_without_anchor_cell_is_fatal() {
        let info = puzzle(&[&["1", ""]], &[1, 7], &[]);

        assert_eq!(Grid::build(&info).unwrap_err(), GridError::MissingAnchor(7));
    }

    #[test]
    fn ragged_grid_input_is_fatal() {
        let mut info = puzzle(&[&["", ""], &["", ""]], &[], &[]);
        info.grid[1].pop();

        assert_eq!(Grid::build(&info).unwrap_err(), GridError::ShapeMismatch);
    }

    #[test]
    fn non_numeric_label_is_fatal() {
        let info = puzzle(&[&["x", ""]], &[], &[]);

        assert_eq!(
            Grid::build(&info).unwrap_err(),
            GridError::BadLabel("x".to_string())
        );
    }

    #[test]
    fn max_clue_id_is_per_direction() {
        let grid = grid(&[&["1", "3", ""], &["", "", "5"]], &[1, 5], &[3]);

        assert_eq!(grid.max_clue_id(Direction::Across), 5);
        assert_eq!(grid.max_clue_id(Direction::Down), 3);
    }
}
