#![doc = "checkin-board: core logic for an event attendee check-in board."]

//! Raw pasted text, CSV or spreadsheet content is normalized into a tabular
//! board of attendees, either heuristically ([`normalize`]) or through the
//! text-completion collaborator ([`extract`]). Boards persist in a hosted
//! document database behind the [`contract::DocumentStore`] trait; the
//! [`boards`] service reconciles concurrent edits with a merge policy that
//! never loses a positive check-in, and [`export`] renders a board back to
//! CSV or XLSX.
//!
//! Collaborators (store, auth, completion, workbook reading) are injected
//! trait objects — see [`contract`] — so the whole core runs against fakes.

pub mod boards;
pub mod cli;
pub mod completion;
pub mod config;
pub mod contract;
pub mod csv;
pub mod error;
pub mod export;
pub mod extract;
pub mod heuristics;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod store;

pub use boards::{items_from_table, BoardService};
pub use error::BoardError;
pub use extract::parse_items_from_csv_with_ai;
pub use model::{Board, BoardFilters, BoardUpdate, Item, NewBoard};
pub use normalize::{normalize_flexible_input, ImportResult, NormalizedTable};
