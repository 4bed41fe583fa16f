//! Flexible-input normalizer: raw pasted text → a uniform column/row table.
//!
//! People paste attendee lists in every shape: a comma-separated run of IDs,
//! "Firstname Lastname" pairs, free text with IDs glued to names, or a real
//! CSV with a header row. Normalization is an explicit ordered chain of
//! matchers, each a predicate plus a transform over the tokenized input,
//! evaluated until one applies. Proper multi-column CSV is the canonical
//! mode and always wins; the mixed free-text matcher is the tail and always
//! applies, so the chain is total. Empty input yields an empty table, never
//! an error.
//!
//! The leading `Check` column is a synthetic placeholder for the
//! not-yet-persisted check-in state of a new import: every value is empty,
//! and it never survives into a stored board's column order (board creation
//! folds it into the `checkedIn` flag).

use std::collections::BTreeMap;

use tracing::debug;

use crate::csv;
use crate::heuristics::{self, ColumnGuess};

/// Name of the synthetic leading placeholder column.
pub const CHECK_COLUMN: &str = "Check";

/// A normalized table: ordered unique column names plus keyed rows. Every
/// row carries exactly the table's key set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

/// Ephemeral result of an import preview. Not persisted.
#[derive(Debug, Clone)]
pub struct ImportResult {
    /// Original input text, kept for debugging and undo.
    pub raw: String,
    pub columns: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
    /// Per-column heuristic guesses over the tokenized input.
    pub column_guesses: Vec<ColumnGuess>,
    /// Tokenized rows before any reshaping.
    pub original_rows: Vec<Vec<String>>,
}

/// Tokenized input as seen by the matchers.
struct MatchInput {
    /// Rows from the CSV tokenizer.
    rows: Vec<Vec<String>>,
    /// Newline-flattened, comma-split, trimmed non-empty items.
    items: Vec<String>,
}

/// One step of the normalization chain.
struct Matcher {
    name: &'static str,
    applies: fn(&MatchInput) -> bool,
    build: fn(&MatchInput) -> NormalizedTable,
}

/// Ordered chain. The canonical CSV-header mode is first; the mixed
/// matcher's predicate is always true, so every input lands somewhere.
const MATCHERS: [Matcher; 4] = [
    Matcher {
        name: "csv_header",
        applies: is_genuine_csv,
        build: build_csv_header,
    },
    Matcher {
        name: "id_list",
        applies: is_id_list,
        build: build_id_list,
    },
    Matcher {
        name: "name_pairs",
        applies: is_name_pairs,
        build: build_name_pairs,
    },
    Matcher {
        name: "mixed",
        applies: |_| true,
        build: build_mixed,
    },
];

/// Normalize arbitrary pasted text into a previewable table.
pub fn normalize_flexible_input(raw: &str) -> ImportResult {
    let rows = csv::tokenize(raw);
    let items = flatten_items(raw);
    let input = MatchInput {
        rows: rows.clone(),
        items,
    };

    let table = if input.rows.is_empty() {
        NormalizedTable::default()
    } else {
        let matcher = MATCHERS
            .iter()
            .find(|m| (m.applies)(&input))
            .expect("the mixed matcher always applies");
        debug!(matcher = matcher.name, rows = input.rows.len(), "normalized input");
        (matcher.build)(&input)
    };

    let column_guesses = heuristics::guess_columns(&rows);

    ImportResult {
        raw: raw.to_string(),
        columns: table.columns,
        rows: table.rows,
        column_guesses,
        original_rows: rows,
    }
}

/// Flatten line breaks to spaces, then split on commas.
fn flatten_items(raw: &str) -> Vec<String> {
    raw.replace(['\r', '\n'], " ")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// At least one word of the value carries a digit ("f0079rn", "12345").
fn looks_like_id(value: &str) -> bool {
    value
        .split_whitespace()
        .any(|word| word.chars().any(|c| c.is_ascii_digit()))
}

fn word_count(value: &str) -> usize {
    value.split_whitespace().count()
}

// --- csv_header -------------------------------------------------------------

/// Genuine row/column CSV: several lines and at least one multi-cell row.
fn is_genuine_csv(input: &MatchInput) -> bool {
    input.rows.len() >= 2 && input.rows.iter().any(|row| row.len() >= 2)
}

fn build_csv_header(input: &MatchInput) -> NormalizedTable {
    let columns = unique_header(&input.rows[0]);
    let rows = input.rows[1..]
        .iter()
        .map(|row| {
            columns
                .iter()
                .enumerate()
                // Short rows pad with "", long rows truncate to the header.
                .map(|(i, col)| (col.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect();
    NormalizedTable { columns, rows }
}

/// Trim header cells, name blanks `field<N>`, disambiguate duplicates.
fn unique_header(header: &[String]) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = if cell.trim().is_empty() {
                format!("field{}", i + 1)
            } else {
                cell.trim().to_string()
            };
            let count = seen.entry(base.to_lowercase()).or_insert(0);
            *count += 1;
            if *count == 1 {
                base
            } else {
                format!("{base} {count}")
            }
        })
        .collect()
}

// --- id_list ----------------------------------------------------------------

fn is_id_list(input: &MatchInput) -> bool {
    !input.items.is_empty()
        && input
            .items
            .iter()
            .all(|item| word_count(item) == 1 && looks_like_id(item))
}

fn build_id_list(input: &MatchInput) -> NormalizedTable {
    let columns = vec![CHECK_COLUMN.to_string(), "ID".to_string()];
    let rows = input
        .items
        .iter()
        .map(|id| {
            BTreeMap::from([
                (CHECK_COLUMN.to_string(), String::new()),
                ("ID".to_string(), id.clone()),
            ])
        })
        .collect();
    NormalizedTable { columns, rows }
}

// --- name_pairs -------------------------------------------------------------

fn is_name_pairs(input: &MatchInput) -> bool {
    !input.items.is_empty()
        && input
            .items
            .iter()
            .all(|item| word_count(item) == 2 && !looks_like_id(item))
}

fn build_name_pairs(input: &MatchInput) -> NormalizedTable {
    let columns = vec![
        CHECK_COLUMN.to_string(),
        "Name".to_string(),
        "Lastname".to_string(),
    ];
    let rows = input
        .items
        .iter()
        .map(|full| {
            let mut words = full.split_whitespace();
            BTreeMap::from([
                (CHECK_COLUMN.to_string(), String::new()),
                (
                    "Name".to_string(),
                    words.next().unwrap_or_default().to_string(),
                ),
                (
                    "Lastname".to_string(),
                    words.next().unwrap_or_default().to_string(),
                ),
            ])
        })
        .collect();
    NormalizedTable { columns, rows }
}

// --- mixed ------------------------------------------------------------------

/// Split a free-text item into name / lastname / id parts. The last
/// digit-bearing token is the ID; leading tokens become the name parts.
fn split_name_and_id(value: &str) -> (String, String, String) {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let id_idx = parts.iter().rposition(|word| word.chars().any(|c| c.is_ascii_digit()));

    match id_idx {
        None => match parts.len() {
            0 => (String::new(), String::new(), String::new()),
            1 => (parts[0].to_string(), String::new(), String::new()),
            2 => (parts[0].to_string(), parts[1].to_string(), String::new()),
            _ => (value.trim().to_string(), String::new(), String::new()),
        },
        Some(idx) => {
            let id = parts[idx].to_string();
            let name_parts = &parts[..idx];
            match name_parts.len() {
                0 => (String::new(), String::new(), id),
                1 => (name_parts[0].to_string(), String::new(), id),
                2 => (name_parts[0].to_string(), name_parts[1].to_string(), id),
                _ => (name_parts.join(" "), String::new(), id),
            }
        }
    }
}

fn build_mixed(input: &MatchInput) -> NormalizedTable {
    let mut has_name = false;
    let mut has_lastname = false;
    let mut has_id = false;

    let parsed: Vec<(String, String, String)> = input
        .items
        .iter()
        .map(|item| {
            let (name, lastname, id) = split_name_and_id(item);
            has_name |= !name.is_empty();
            has_lastname |= !lastname.is_empty();
            has_id |= !id.is_empty();
            (name, lastname, id)
        })
        .collect();

    let mut columns = vec![CHECK_COLUMN.to_string()];
    if has_name {
        columns.push("Name".to_string());
    }
    if has_lastname {
        columns.push("Lastname".to_string());
    }
    if has_id {
        columns.push("ID".to_string());
    }

    let rows = parsed
        .into_iter()
        .map(|(name, lastname, id)| {
            let mut row = BTreeMap::from([(CHECK_COLUMN.to_string(), String::new())]);
            for col in &columns[1..] {
                let value = match col.as_str() {
                    "Name" => name.clone(),
                    "Lastname" => lastname.clone(),
                    "ID" => id.clone(),
                    _ => String::new(),
                };
                row.insert(col.clone(), value);
            }
            row
        })
        .collect();

    NormalizedTable { columns, rows }
}
