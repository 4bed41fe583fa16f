//! Heuristic column classifier.
//!
//! Given tokenized rows, guess each column's semantic meaning (email, id,
//! status, name...) from a bounded sample of values. Rules are evaluated in
//! priority order and a column takes the first rule its whole sample
//! satisfies, so the result is total: every column gets exactly one guess,
//! falling back to a synthetic `field<N>` name at confidence 0.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.+-]+@[\w.-]+\.[a-zA-Z]{2,}$").unwrap());
static ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4,}$").unwrap());
static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+(?: [A-Z][a-z]+)*$").unwrap());

/// Status words recognized by the `status` rule (case-insensitive).
const STATUS_WORDS: [&str; 2] = ["pending", "checked-in"];

/// Rows sampled per column when guessing.
const SAMPLE_ROWS: usize = 10;

/// A guessed column: proposed name, confidence 0–100, and the sampled
/// values the guess was based on. Not persisted; drives row reshaping only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGuess {
    pub name: String,
    pub confidence: u8,
    pub sample_data: Vec<String>,
}

/// Guess the meaning of each column from the first few rows.
pub fn guess_columns(rows: &[Vec<String>]) -> Vec<ColumnGuess> {
    if rows.is_empty() {
        return Vec::new();
    }

    let sample_count = rows.len().min(SAMPLE_ROWS);
    let column_count = rows[0].len();
    let mut guesses = Vec::with_capacity(column_count);

    for col in 0..column_count {
        let samples: Vec<String> = rows[..sample_count]
            .iter()
            .map(|row| row.get(col).cloned().unwrap_or_default())
            .collect();

        let (name, confidence) = classify_samples(&samples, col);
        guesses.push(ColumnGuess {
            name,
            confidence,
            sample_data: samples,
        });
    }
    guesses
}

/// First matching rule wins; `col` is used only for the fallback name.
fn classify_samples(samples: &[String], col: usize) -> (String, u8) {
    if samples.iter().all(|v| EMAIL_REGEX.is_match(v)) {
        ("email".to_string(), 100)
    } else if samples.iter().all(|v| ID_REGEX.is_match(v)) {
        ("id".to_string(), 90)
    } else if samples
        .iter()
        .all(|v| STATUS_WORDS.contains(&v.to_lowercase().as_str()))
    {
        ("status".to_string(), 90)
    } else if samples
        .iter()
        .all(|v| v.split(' ').count() == 2 && NAME_REGEX.is_match(v))
    {
        ("name_lastname".to_string(), 80)
    } else if samples
        .iter()
        .all(|v| v.split(' ').count() == 1 && NAME_REGEX.is_match(v))
    {
        ("name".to_string(), 70)
    } else {
        (format!("field{}", col + 1), 0)
    }
}

/// Reshape raw rows into keyed records according to the guesses.
/// A `name_lastname` column is split into `name` + `lastname`.
pub fn normalize_rows(
    rows: &[Vec<String>],
    guesses: &[ColumnGuess],
) -> Vec<BTreeMap<String, String>> {
    rows.iter()
        .map(|row| {
            let mut record = BTreeMap::new();
            for (i, guess) in guesses.iter().enumerate() {
                let value = row.get(i).cloned().unwrap_or_default();
                if guess.name == "name_lastname" {
                    let mut parts = value.splitn(2, ' ');
                    record.insert(
                        "name".to_string(),
                        parts.next().unwrap_or_default().to_string(),
                    );
                    record.insert(
                        "lastname".to_string(),
                        parts.next().unwrap_or_default().to_string(),
                    );
                } else {
                    record.insert(guess.name.clone(), value);
                }
            }
            record
        })
        .collect()
}
