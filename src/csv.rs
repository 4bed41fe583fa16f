//! CSV tokenizer: raw delimited text → rows of string cells.
//!
//! This is the first stage of the import pipeline. It is deliberately a
//! total function: pasted attendee lists arrive in every state of disrepair,
//! so malformed quoting is repaired best-effort instead of rejected. The
//! worst case is a degenerate single-cell row, never an error.
//!
//! Cells are always `String`; a missing cell is the empty string. Fully
//! blank lines are dropped.

/// Delimiters considered during auto-detection, in tie-break order.
const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Number of leading non-empty lines sampled when sniffing the delimiter.
const SNIFF_LINES: usize = 10;

/// Tokenize `text` with delimiter auto-detection.
pub fn tokenize(text: &str) -> Vec<Vec<String>> {
    tokenize_with(text, None)
}

/// Tokenize `text`, using `delimiter` if given, otherwise sniffing one.
pub fn tokenize_with(text: &str, delimiter: Option<char>) -> Vec<Vec<String>> {
    let delim = delimiter.unwrap_or_else(|| sniff_delimiter(text));

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    // Doubled quote is a literal quote character.
                    chars.next();
                    cell.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
        } else if c == '"' {
            // A quote opens quoted mode wherever it appears; text already
            // accumulated in the cell is kept (repair, not rejection).
            in_quotes = true;
        } else if c == delim {
            row.push(std::mem::take(&mut cell));
        } else if c == '\r' || c == '\n' {
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            row.push(std::mem::take(&mut cell));
            push_row(&mut rows, std::mem::take(&mut row));
        } else {
            cell.push(c);
        }
    }
    // An unterminated quote runs to end of input; flush whatever is left.
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        push_row(&mut rows, row);
    }

    rows
}

/// Append `row` unless it is entirely empty (a blank line).
fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    if row.iter().any(|cell| !cell.trim().is_empty()) {
        rows.push(row);
    }
}

/// Pick the delimiter with the highest count outside quotes over the first
/// few non-empty lines. Falls back to a comma when nothing scores.
fn sniff_delimiter(text: &str) -> char {
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    for line in text.lines().filter(|l| !l.trim().is_empty()).take(SNIFF_LINES) {
        let mut in_quotes = false;
        for c in line.chars() {
            if c == '"' {
                in_quotes = !in_quotes;
            } else if !in_quotes {
                if let Some(i) = CANDIDATE_DELIMITERS.iter().position(|&d| d == c) {
                    counts[i] += 1;
                }
            }
        }
    }
    counts
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .max_by_key(|(_, &count)| count)
        .map(|(i, _)| CANDIDATE_DELIMITERS[i])
        .unwrap_or(',')
}
