//! Core model of a Hebrew crossword player: the grid/clue index, the
//! direction-aware traversal engine, the click/keyboard navigation state
//! machine, and the versioned persistence layer with its URL snapshot codec.
//! Rendering, fetching, and DOM wiring live in the web crate.

pub use error::*;
pub use grid::*;
pub use nav::*;
pub use store::*;
pub use traversal::*;
pub use types::*;

mod error;
mod grid;
mod nav;
pub mod snapshot;
mod store;
mod traversal;
mod types;
