use crate::*;

/// Input events consumed by the navigation machine. Clicks and keys arrive
/// from the rendering shell already mapped to grid terms.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NavEvent {
    /// Click or tap on a grid cell.
    CellClick(Coord2),
    /// Click on a clue's text; forces the clue's direction.
    ClueClick(ClueId, Direction),
    Letter(char),
    Backspace,
    Delete,
    /// Click outside any cell.
    BackgroundClick,
}

/// Side-effect requests emitted by a transition. The machine never touches
/// storage or the DOM itself; the shell interprets these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Highlight exactly these cells, clearing any previous highlight.
    Highlight(Vec<Coord2>),
    /// Display this clue's text for the active word.
    ShowClue(ClueId, Direction),
    /// Focus the input proxy at this cell, for on-screen keyboards.
    Focus(Coord2),
    WriteLetter(Coord2, char),
    ClearLetter(Coord2),
    ClearHighlight,
}

/// Active-cell/direction state. `active == None` is the idle state: nothing
/// selected, no highlight.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NavState {
    active: Option<Coord2>,
    previous: Option<Coord2>,
    direction: Direction,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            active: None,
            previous: None,
            direction: Direction::Across,
        }
    }
}

impl NavState {
    pub fn active(&self) -> Option<Coord2> {
        self.active
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Single transition function: consumes one event, updates the state,
    /// and returns the side effects the shell must apply. Read-only shared
    /// snapshots are enforced upstream by not delivering mutating events;
    /// the machine is unaware of that mode.
    pub fn apply(&mut self, grid: &Grid, event: NavEvent) -> Vec<Effect> {
        use NavEvent::*;

        match event {
            CellClick(coords) => {
                if !grid.is_open(coords) {
                    return vec![];
                }
                self.previous = self.active;
                self.active = Some(coords);

                if self.previous == Some(coords) {
                    // Same tile re-clicked: the user disambiguates a cell
                    // shared by two words.
                    self.direction = self.direction.toggled();
                } else if let Some(snap) = grid
                    .clue_at(coords)
                    .and_then(|id| grid.clue(id))
                    .and_then(|entry| entry.directions.single())
                {
                    // Anchor of exactly one word: assume the user wants to
                    // move along it.
                    self.direction = snap;
                }
                self.select_effects(grid)
            }
            ClueClick(id, direction) => {
                let Some(entry) = grid.clue(id) else {
                    log::warn!("clue click for unknown clue {id}");
                    return vec![];
                };
                self.previous = self.active;
                self.active = Some(entry.anchor);
                self.direction = direction;
                self.select_effects(grid)
            }
            Letter(letter) => {
                let Some(coords) = self.active else {
                    return vec![];
                };
                let mut effects = vec![Effect::WriteLetter(coords, letter)];
                // At the end of the word the active cell stays put, still
                // highlighted.
                if let Some(next) = grid.step(coords, self.direction, Motion::Next) {
                    self.previous = Some(coords);
                    self.active = Some(next);
                }
                effects.extend(self.select_effects(grid));
                effects
            }
            Backspace => {
                let Some(coords) = self.active else {
                    return vec![];
                };
                let mut effects = vec![Effect::ClearLetter(coords)];
                if let Some(prev) = grid.step(coords, self.direction, Motion::Previous) {
                    self.previous = Some(coords);
                    self.active = Some(prev);
                }
                effects.extend(self.select_effects(grid));
                effects
            }
            Delete => match self.active {
                Some(coords) => vec![Effect::ClearLetter(coords)],
                None => vec![],
            },
            BackgroundClick => {
                self.active = None;
                self.previous = None;
                vec![Effect::ClearHighlight]
            }
        }
    }

    /// Recomputed after every transition that changes `active` or
    /// `direction`: highlight the word extent, look up its anchor clue, and
    /// request focus on the active cell's input proxy.
    fn select_effects(&mut self, grid: &Grid) -> Vec<Effect> {
        let Some(coords) = self.active else {
            return vec![Effect::ClearHighlight];
        };

        // A cell with no neighbors along the current axis is never
        // highlighted as a one-letter word there; flip once and recompute.
        if !grid.has_extent(coords, self.direction) {
            self.direction = self.direction.toggled();
        }

        let extent = grid.word_extent(coords, self.direction);
        let anchor = extent[0];
        let mut effects = vec![Effect::Highlight(extent)];
        if let Some(id) = grid.clue_at(anchor) {
            let starts_here = grid
                .clue(id)
                .is_some_and(|entry| entry.directions.contains(self.direction.into()));
            if starts_here {
                effects.push(Effect::ShowClue(id, self.direction));
            }
        }
        effects.push(Effect::Focus(coords));
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::testutil::grid;
    use Direction::*;
    use NavEvent::*;

    fn highlight(effects: &[Effect]) -> Option<&Vec<Coord2>> {
        effects.iter().find_map(|effect| match effect {
            Effect::Highlight(cells) => Some(cells),
            _ => None,
        })
    }

    #[test]
    fn click_on_blocked_cell_is_ignored() {
        let g = grid(&[&["", "#"]], &[], &[]);
        let mut nav = NavState::default();

        assert!(nav.apply(&g, CellClick((0, 1))).is_empty());
        assert_eq!(nav.active(), None);
    }

    #[test]
    fn click_activates_and_highlights_word() {
        let g = grid(&[&["1", "", ""], &["", "#", "#"]], &[1], &[]);
        let mut nav = NavState::default();

        let effects = nav.apply(&g, CellClick((0, 1)));

        assert_eq!(nav.active(), Some((0, 1)));
        assert_eq!(highlight(&effects).unwrap(), &vec![(0, 2), (0, 1), (0, 0)]);
        assert!(effects.contains(&Effect::Focus((0, 1))));
    }

    #[test]
    fn reclick_toggles_direction() {
        let g = grid(&[&["", ""], &["", ""]], &[], &[]);
        let mut nav = NavState::default();

        nav.apply(&g, CellClick((0, 0)));
        assert_eq!(nav.direction(), Across);
        nav.apply(&g, CellClick((0, 0)));
        assert_eq!(nav.direction(), Down);
        nav.apply(&g, CellClick((0, 0)));
        assert_eq!(nav.direction(), Across);
    }

    #[test]
    fn single_direction_anchor_snaps_direction() {
        // Clue 2 starts a down word only; clicking its anchor must switch
        // direction even though the previous selection was across.
        let g = grid(&[&["1", "2"], &["#", ""]], &[1], &[2]);
        let mut nav = NavState::default();

        nav.apply(&g, CellClick((0, 0)));
        assert_eq!(nav.direction(), Across);
        nav.apply(&g, CellClick((0, 1)));
        assert_eq!(nav.direction(), Down);
    }

    #[test]
    fn two_direction_anchor_preserves_direction() {
        let g = grid(&[&["1", ""], &["", ""]], &[1], &[1]);
        let mut nav = NavState::default();

        nav.apply(&g, CellClick((1, 1)));
        assert_eq!(nav.direction(), Across);
        nav.apply(&g, CellClick((0, 0)));
        assert_eq!(nav.direction(), Across);
    }

    #[test]
    fn clue_click_forces_direction_and_jumps_to_anchor() {
        let g = grid(&[&["1", ""], &["", ""]], &[1], &[1]);
        let mut nav = NavState::default();

        let effects = nav.apply(&g, ClueClick(1, Down));

        assert_eq!(nav.active(), Some((0, 0)));
        assert_eq!(nav.direction(), Down);
        assert!(effects.contains(&Effect::ShowClue(1, Down)));
    }

    #[test]
    fn letters_advance_right_to_left_across() {
        // The 1x5 all-open example: typing from the anchor walks toward
        // column 0.
        let g = grid(&[&["1", "", "", "", ""]], &[1], &[]);
        let mut nav = NavState::default();

        nav.apply(&g, CellClick((0, 4)));
        assert_eq!(nav.active(), Some((0, 4)));

        let mut writes = vec![];
        for letter in "hello".chars() {
            let effects = nav.apply(&g, Letter(letter));
            writes.extend(effects.into_iter().filter_map(|effect| match effect {
                Effect::WriteLetter(coords, letter) => Some((coords, letter)),
                _ => None,
            }));
        }

        assert_eq!(
            writes,
            vec![
                ((0, 4), 'h'),
                ((0, 3), 'e'),
                ((0, 2), 'l'),
                ((0, 1), 'l'),
                ((0, 0), 'o'),
            ]
        );
        // End of the word: no further advance, still active and highlighted.
        assert_eq!(nav.active(), Some((0, 0)));
        let effects = nav.apply(&g, Letter('x'));
        assert!(highlight(&effects).is_some());
        assert_eq!(nav.active(), Some((0, 0)));
    }

    #[test]
    fn backspace_clears_and_retreats() {
        let g = grid(&[&["1", "", ""]], &[1], &[]);
        let mut nav = NavState::default();

        nav.apply(&g, CellClick((0, 2)));
        nav.apply(&g, Letter('a'));
        assert_eq!(nav.active(), Some((0, 1)));

        let effects = nav.apply(&g, Backspace);
        assert!(effects.contains(&Effect::ClearLetter((0, 1))));
        assert_eq!(nav.active(), Some((0, 2)));

        // At the word start there is no previous cell; stay put.
        nav.apply(&g, Backspace);
        assert_eq!(nav.active(), Some((0, 2)));
    }

    #[test]
    fn delete_clears_without_moving() {
        let g = grid(&[&["1", ""]], &[1], &[]);
        let mut nav = NavState::default();

        nav.apply(&g, CellClick((0, 1)));
        let effects = nav.apply(&g, Delete);

        assert_eq!(effects, vec![Effect::ClearLetter((0, 1))]);
        assert_eq!(nav.active(), Some((0, 1)));
    }

    #[test]
    fn background_click_goes_idle() {
        let g = grid(&[&["1", ""]], &[1], &[]);
        let mut nav = NavState::default();

        nav.apply(&g, CellClick((0, 0)));
        let effects = nav.apply(&g, BackgroundClick);

        assert_eq!(effects, vec![Effect::ClearHighlight]);
        assert_eq!(nav.active(), None);
        assert!(nav.apply(&g, Letter('a')).is_empty());
    }

    #[test]
    fn isolated_cell_flips_direction_once() {
        // (2, 0) only extends down; clicking it while in Across flips.
        let g = grid(&[&["", "#"], &["", "#"], &["", "#"]], &[], &[]);
        let mut nav = NavState::default();

        nav.apply(&g, CellClick((1, 0)));
        assert_eq!(nav.direction(), Down);
    }
}
