//! AI-assisted row extraction: delegate normalization of messy CSV text to
//! the text-completion collaborator and validate what comes back.
//!
//! This path is selected by the caller as an alternative to the heuristic
//! normalizer — never chained automatically as a fallback. The collaborator
//! is treated as unreliable: the response must be raw JSON, is parsed and
//! shape-checked here, and any row identifiers it invents are discarded in
//! favor of freshly assigned uids.

use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::contract::{CompletionClient, CompletionError};
use crate::model::Item;

/// Extraction failures carry the raw response for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("failed to parse AI response as JSON: {raw}")]
    UnparseableJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("AI response is neither an array nor a string: {raw}")]
    WrongShape { raw: String },
}

/// Fixed instruction template wrapping the raw CSV.
pub fn build_csv_items_prompt(csv: &str) -> String {
    format!(
        r#"You process CSV data for an attendee check-in table. The input may be malformed, missing headers, or inconsistently delimited. Given the CSV below, return a JSON array with one object per input row.

Rules:
- Include a property for each column header, except check-in columns.
- If a column is a check-in column (header contains "check", "attendance", "present", or similar, OR values look like "X", "Yes", "True"), output a boolean property named exactly "checkedIn" and omit the original column. At most one column maps to "checkedIn". If no check-in indicator exists, still emit "checkedIn": false on every row.
- All other property values are strings. Improve headers where obvious (capitalize, fix typos); if headers are absent, infer them from the values (names, last names, IDs, emails).
- Keep the column set identical across all rows. A value missing in some row becomes an empty string or the placeholder "null" — never an omitted key.
- Order properties with the most important attributes first.
- Output ONLY the raw JSON array. No prose, no markdown fencing.

CSV:
{csv}
"#
    )
}

/// Call the completion collaborator and parse its response into row
/// objects. Accepts either a JSON array directly or a JSON string that
/// itself parses to an array.
pub async fn fetch_items_from_ai<C>(client: &C, csv: &str) -> Result<Vec<Map<String, Value>>, ExtractError>
where
    C: CompletionClient + ?Sized,
{
    let prompt = build_csv_items_prompt(csv);
    debug!(csv_len = csv.len(), "requesting AI row extraction");
    let raw = client.complete(&prompt, None).await?;

    let value: Value = serde_json::from_str(raw.trim()).map_err(|source| {
        ExtractError::UnparseableJson {
            raw: raw.clone(),
            source,
        }
    })?;

    let rows = match value {
        Value::Array(rows) => rows,
        // Some models double-encode: a JSON string whose content is the array.
        Value::String(inner) => match serde_json::from_str(&inner) {
            Ok(Value::Array(rows)) => rows,
            Ok(_) => return Err(ExtractError::WrongShape { raw }),
            Err(source) => return Err(ExtractError::UnparseableJson { raw, source }),
        },
        _ => return Err(ExtractError::WrongShape { raw }),
    };

    rows.into_iter()
        .map(|row| match row {
            Value::Object(obj) => Ok(obj),
            other => Err(ExtractError::WrongShape {
                raw: other.to_string(),
            }),
        })
        .collect()
}

/// Assign a fresh uid to every extracted row. Collaborator-supplied
/// identifiers are never trusted.
pub fn add_uid_to_items(rows: Vec<Map<String, Value>>) -> Vec<Item> {
    rows.into_iter()
        .map(|obj| {
            let mut item = Item::from_value(&Value::Object(obj));
            item.uid = Uuid::new_v4().to_string();
            item
        })
        .collect()
}

/// Full AI import path: prompt, parse, validate, assign uids.
pub async fn parse_items_from_csv_with_ai<C>(client: &C, csv: &str) -> Result<Vec<Item>, ExtractError>
where
    C: CompletionClient + ?Sized,
{
    let rows = fetch_items_from_ai(client, csv).await?;
    let items = add_uid_to_items(rows);
    info!(items = items.len(), "AI extraction produced items");
    Ok(items)
}
