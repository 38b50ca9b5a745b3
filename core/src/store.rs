use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::*;

/// Reserved placeholder for an unfilled open cell in the persisted row
/// strings. Distinct from the empty string, which only appears in
/// not-yet-migrated legacy records.
pub const FILLER: char = '_';

/// Durable record key prefix; the puzzle id is appended.
pub const STORAGE_KEY_PREFIX: &str = "crossword_";

/// Suffix of the sibling key holding the pre-import snapshot.
pub const BACKUP_SUFFIX: &str = "_backup";

/// Global structural-version marker. A mismatch wipes every puzzle's durable
/// state before proceeding; this is an all-or-nothing migration gate, not
/// per-key.
pub const VERSION_MARKER_KEY: &str = "VCN";
pub const VERSION_MARKER_VALUE: &str = "2";

/// Schema version carried inside each record.
pub const SCHEMA_VERSION: &str = "2";

/// Where the active puzzle state was obtained. `UrlParam` means someone
/// else's shared snapshot; the shell keeps those views read-only by not
/// wiring the mutating listeners.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StorageSource {
    None,
    LocalStorage,
    UrlParam,
}

/// Injected keyed-store interface so the persistence layer is testable
/// without a browser. Initialized once per page load, never torn down.
pub trait StoragePort {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn clear(&self);
}

/// In-memory port backing tests and native builds. Clones share the same
/// underlying map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl StoragePort for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvedClues {
    pub across: String,
    pub down: String,
}

/// Durable representation of one puzzle's solving progress. Row strings are
/// fixed-width; bit position = clue id (1-based, position 0 is padding).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub input: Vec<String>,
    pub solved_clues: SolvedClues,
    pub version: String,
}

/// The two shapes a durable record can take, detected structurally: the
/// legacy encoding is a raw nested array, the current one a keyed object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Current(PersistedState),
    Legacy(Vec<Vec<String>>),
}

/// Maps Hebrew final-letter forms to their non-final equivalents. Final
/// forms are never stored.
pub fn normalize_letter(letter: char) -> char {
    match letter {
        'ם' => 'מ',
        'ן' => 'נ',
        'ף' => 'פ',
        'ץ' => 'צ',
        'ך' => 'כ',
        letter => letter,
    }
}

/// Display-only rule: Latin input is rendered in a distinct color, storage
/// is unchanged.
pub fn is_latin_letter(letter: char) -> bool {
    letter.is_ascii_alphabetic()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Geometry {
    rows: usize,
    cols: usize,
    across_bits: usize,
    down_bits: usize,
}

impl Geometry {
    fn of(grid: &Grid) -> Self {
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            across_bits: grid.max_clue_id(Direction::Across) as usize + 1,
            down_bits: grid.max_clue_id(Direction::Down) as usize + 1,
        }
    }

    fn fresh(self) -> PersistedState {
        let row: String = core::iter::repeat(FILLER).take(self.cols).collect();
        PersistedState {
            input: vec![row; self.rows],
            solved_clues: SolvedClues {
                across: "0".repeat(self.across_bits),
                down: "0".repeat(self.down_bits),
            },
            version: SCHEMA_VERSION.to_string(),
        }
    }

    /// A snapshot is either trusted whole or not at all; any dimension or
    /// bitstring mismatch invalidates it.
    fn validate(self, state: &PersistedState) -> bool {
        state.version == SCHEMA_VERSION
            && state.input.len() == self.rows
            && state.input.iter().all(|row| row.chars().count() == self.cols)
            && is_bitstring(&state.solved_clues.across, self.across_bits)
            && is_bitstring(&state.solved_clues.down, self.down_bits)
    }

    /// Widens a legacy nested-array record into the current format. Empty
    /// cells become the filler glyph; solved flags are synthesized as all
    /// zero, never fabricated.
    fn migrate_legacy(self, rows: &[Vec<String>]) -> Option<PersistedState> {
        if rows.len() != self.rows || rows.iter().any(|row| row.len() != self.cols) {
            return None;
        }
        let mut input = Vec::with_capacity(self.rows);
        for row in rows {
            let mut joined = String::with_capacity(self.cols);
            for cell in row {
                let mut chars = cell.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => joined.push(FILLER),
                    (Some(letter), None) => joined.push(normalize_letter(letter)),
                    (Some(_), Some(_)) => return None,
                }
            }
            input.push(joined);
        }
        Some(PersistedState {
            input,
            solved_clues: SolvedClues {
                across: "0".repeat(self.across_bits),
                down: "0".repeat(self.down_bits),
            },
            version: SCHEMA_VERSION.to_string(),
        })
    }
}

fn is_bitstring(bits: &str, len: usize) -> bool {
    bits.len() == len && bits.bytes().all(|b| b == b'0' || b == b'1')
}

/// Owns the durable state for one puzzle id: load-or-initialize with
/// migration, write-through mutation, export/import, provenance.
#[derive(Debug)]
pub struct PuzzleStore<S: StoragePort> {
    port: S,
    key: String,
    geometry: Geometry,
    state: PersistedState,
    source: StorageSource,
}

impl<S: StoragePort> PuzzleStore<S> {
    /// Load order: URL snapshot token, then the durable record, then fresh.
    /// Every failure falls through silently; a malformed snapshot is an
    /// empty grid, never a user-visible error.
    pub fn open(port: S, grid: &Grid, url_snapshot: Option<&str>) -> Self {
        check_version_marker(&port);

        let key = format!("{STORAGE_KEY_PREFIX}{}", grid.puzzle_id());
        let geometry = Geometry::of(grid);

        if let Some(token) = url_snapshot {
            match decode_shared_snapshot(token) {
                Ok(state) if geometry.validate(&state) => {
                    log::debug!("loaded shared snapshot for {key}");
                    return Self {
                        port,
                        key,
                        geometry,
                        state,
                        source: StorageSource::UrlParam,
                    };
                }
                Ok(_) => log::warn!("shared snapshot does not fit puzzle, ignoring"),
                Err(err) => log::warn!("undecodable shared snapshot, ignoring: {err}"),
            }
        }

        if let Some(state) = load_record(&port, &key, geometry) {
            return Self {
                port,
                key,
                geometry,
                state,
                source: StorageSource::LocalStorage,
            };
        }

        Self {
            port,
            key,
            geometry,
            state: geometry.fresh(),
            source: StorageSource::None,
        }
    }

    pub fn source(&self) -> StorageSource {
        self.source
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn get_letter(&self, coords: Coord2) -> Result<Option<char>, StoreError> {
        let (row, col) = self.checked(coords)?;
        let letter = self.state.input[row]
            .chars()
            .nth(col)
            .ok_or(StoreError::InvalidCoords)?;
        Ok((letter != FILLER).then_some(letter))
    }

    /// Stores a normalized letter (or the filler glyph for `None`) at one
    /// cell and writes through immediately. Returns the character as stored,
    /// for display.
    pub fn set_letter(&mut self, coords: Coord2, letter: Option<char>) -> Result<char, StoreError> {
        let (row, col) = self.checked(coords)?;
        let stored = letter.map_or(FILLER, normalize_letter);
        // Fixed-width replacement of a single char position; rows never
        // grow or shrink.
        self.state.input[row] = self.state.input[row]
            .chars()
            .enumerate()
            .map(|(i, cur)| if i == col { stored } else { cur })
            .collect();
        self.persist();
        Ok(stored)
    }

    pub fn get_clue_solved(&self, id: ClueId, direction: Direction) -> Result<bool, StoreError> {
        let bits = self.bits(direction);
        match bits.as_bytes().get(id as usize) {
            Some(&bit) => Ok(bit == b'1'),
            None => Err(StoreError::InvalidClue(id)),
        }
    }

    pub fn set_clue_solved(
        &mut self,
        id: ClueId,
        direction: Direction,
        solved: bool,
    ) -> Result<(), StoreError> {
        let index = id as usize;
        let bits = self.bits_mut(direction);
        if index >= bits.len() {
            return Err(StoreError::InvalidClue(id));
        }
        // The bitstrings are validated ASCII, so this is a plain byte swap.
        bits.replace_range(index..index + 1, if solved { "1" } else { "0" });
        self.persist();
        Ok(())
    }

    /// Serializes the full state for the snapshot codec.
    pub fn export(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&self.state)?)
    }

    /// Force-writes a freshly decoded snapshot, archiving the previous
    /// durable value under the backup key first.
    pub fn import(&mut self, state: PersistedState) -> Result<(), StoreError> {
        if !self.geometry.validate(&state) {
            return Err(StoreError::InvalidSnapshot);
        }
        if let Some(previous) = self.port.get(&self.key) {
            self.port.set(&format!("{}{BACKUP_SUFFIX}", self.key), &previous);
        }
        self.state = state;
        self.source = StorageSource::LocalStorage;
        self.persist();
        Ok(())
    }

    fn checked(&self, (row, col): Coord2) -> Result<(usize, usize), StoreError> {
        let (row, col) = (row as usize, col as usize);
        if row < self.geometry.rows && col < self.geometry.cols {
            Ok((row, col))
        } else {
            Err(StoreError::InvalidCoords)
        }
    }

    fn bits(&self, direction: Direction) -> &String {
        match direction {
            Direction::Across => &self.state.solved_clues.across,
            Direction::Down => &self.state.solved_clues.down,
        }
    }

    fn bits_mut(&mut self, direction: Direction) -> &mut String {
        match direction {
            Direction::Across => &mut self.state.solved_clues.across,
            Direction::Down => &mut self.state.solved_clues.down,
        }
    }

    /// Every mutation is durable before the call returns; there is no
    /// in-memory-only mode.
    fn persist(&self) {
        match serde_json::to_string(&self.state) {
            Ok(json) => self.port.set(&self.key, &json),
            Err(err) => log::error!("could not persist {}: {err}", self.key),
        }
    }
}

fn check_version_marker(port: &impl StoragePort) {
    if port.get(VERSION_MARKER_KEY).as_deref() != Some(VERSION_MARKER_VALUE) {
        log::info!("storage version marker mismatch, clearing all puzzle state");
        port.clear();
    }
    port.set(VERSION_MARKER_KEY, VERSION_MARKER_VALUE);
}

fn decode_shared_snapshot(token: &str) -> Result<PersistedState, StoreError> {
    let json = snapshot::decompress(token).map_err(|err| {
        log::debug!("snapshot decompression failed: {err}");
        StoreError::InvalidSnapshot
    })?;
    Ok(serde_json::from_str(&json)?)
}

fn load_record(port: &impl StoragePort, key: &str, geometry: Geometry) -> Option<PersistedState> {
    let raw = port.get(key)?;
    let record: StoredRecord = match serde_json::from_str(&raw) {
        Ok(record) => record,
        Err(err) => {
            log::warn!("malformed record under {key}, starting fresh: {err}");
            return None;
        }
    };
    match record {
        StoredRecord::Current(state) if geometry.validate(&state) => Some(state),
        StoredRecord::Current(_) => {
            log::warn!("record under {key} does not fit puzzle, starting fresh");
            None
        }
        StoredRecord::Legacy(rows) => {
            let state = geometry.migrate_legacy(&rows);
            if state.is_none() {
                log::warn!("legacy record under {key} does not fit puzzle, starting fresh");
            }
            state
        }
    }
}
