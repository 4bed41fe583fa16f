//! Data model: boards, items and the JSON document shape the store persists.
//!
//! An item is one attendee row: a stable `uid` (assigned once, never derived
//! from content, never shown as a column), the distinguished boolean
//! `checkedIn` flag, and an open string-keyed map for every other column.
//! Documents in the store are flat JSON objects with `uid` and `checkedIn`
//! alongside the domain fields.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Reserved key: stable row identifier. Never part of the visible columns.
pub const UID_FIELD: &str = "uid";

/// Reserved key: the boolean check-in flag. Conceptually always present.
pub const CHECKED_IN_FIELD: &str = "checkedIn";

/// One attendee row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub uid: String,
    pub checked_in: bool,
    /// Domain columns; ordering is the board's concern, not the row's.
    pub fields: BTreeMap<String, String>,
}

impl Item {
    /// A new row with a fresh uid and `checkedIn` false.
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Item {
            uid: Uuid::new_v4().to_string(),
            checked_in: false,
            fields,
        }
    }

    /// Flat JSON object as persisted: uid + checkedIn + domain fields.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(UID_FIELD.to_string(), json!(self.uid));
        obj.insert(CHECKED_IN_FIELD.to_string(), json!(self.checked_in));
        for (key, value) in &self.fields {
            obj.insert(key.clone(), json!(value));
        }
        Value::Object(obj)
    }

    /// Rebuild a row from a stored document object. Defensive: a missing
    /// uid gets a fresh one, non-string field values are stringified, and
    /// truthy strings ("x", "yes", "true") count as checked in.
    pub fn from_value(value: &Value) -> Self {
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => return Item::new(BTreeMap::new()),
        };

        let uid = obj
            .get(UID_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let checked_in = obj
            .get(CHECKED_IN_FIELD)
            .map(truthy)
            .unwrap_or(false);

        let fields = obj
            .iter()
            .filter(|(key, _)| key.as_str() != UID_FIELD && key.as_str() != CHECKED_IN_FIELD)
            .map(|(key, value)| (key.clone(), stringify(value)))
            .collect();

        Item {
            uid,
            checked_in,
            fields,
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "x" | "yes" | "true" | "checked-in"
        ),
        _ => false,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// The top-level persisted entity: a named collection of attendee rows
/// owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    /// Persisted display/export order of the visible data columns.
    /// If empty, consumers fall back to the first row's keys.
    pub column_order: Vec<String>,
    pub items: Vec<Item>,
    /// RFC3339, store-assigned.
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Board {
    /// Rebuild a board from its stored document.
    pub fn from_doc(id: &str, doc: &Value) -> Self {
        let string_of = |key: &str| {
            doc.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let items = doc
            .get("items")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(Item::from_value).collect())
            .unwrap_or_default();
        let column_order = doc
            .get("columnOrder")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Board {
            id: id.to_string(),
            name: string_of("name"),
            description: string_of("description"),
            owner_id: string_of("ownerId"),
            column_order,
            items,
            created_at: doc.get("createdAt").and_then(Value::as_str).map(str::to_string),
            updated_at: doc.get("updatedAt").and_then(Value::as_str).map(str::to_string),
        }
    }
}

/// Fields for creating a board.
#[derive(Debug, Clone, Default)]
pub struct NewBoard {
    pub owner_id: String,
    /// Requested name; collisions get a numeric suffix. Defaults to "Board".
    pub name: Option<String>,
    pub items: Vec<Item>,
    pub description: Option<String>,
}

/// Partial board update. `None` fields are left untouched; an item list,
/// when present, goes through the merge engine.
#[derive(Debug, Clone, Default)]
pub struct BoardUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub column_order: Option<Vec<String>>,
    pub items: Option<Vec<Item>>,
}

/// Query filters for listing a user's boards.
#[derive(Debug, Clone, Default)]
pub struct BoardFilters {
    pub name: Option<String>,
    /// Only boards updated strictly after this RFC3339 instant.
    pub updated_after: Option<String>,
    /// Only boards updated strictly before this RFC3339 instant.
    pub updated_before: Option<String>,
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_items_get_distinct_uids() {
        let a = Item::new(BTreeMap::new());
        let b = Item::new(BTreeMap::new());
        assert_ne!(a.uid, b.uid);
        assert!(!a.checked_in);
    }

    #[test]
    fn item_round_trips_through_value() {
        let mut fields = BTreeMap::new();
        fields.insert("Name".to_string(), "Ana".to_string());
        let mut item = Item::new(fields);
        item.checked_in = true;

        let back = Item::from_value(&item.to_value());
        assert_eq!(back, item);
    }

    #[test]
    fn from_value_tolerates_missing_uid_and_odd_types() {
        let value = json!({"Name": "Ana", "age": 30, "checkedIn": "Yes"});
        let item = Item::from_value(&value);
        assert!(!item.uid.is_empty());
        assert!(item.checked_in);
        assert_eq!(item.fields["age"], "30");
    }

    #[test]
    fn uid_is_never_a_visible_field() {
        let item = Item::from_value(&json!({"uid": "u1", "Name": "Ana"}));
        assert_eq!(item.uid, "u1");
        assert!(!item.fields.contains_key(UID_FIELD));
    }

    #[test]
    fn board_from_doc_reads_items_and_order() {
        let doc = json!({
            "name": "Launch party",
            "ownerId": "user-1",
            "columnOrder": ["Name", "ID"],
            "items": [{"uid": "u1", "checkedIn": true, "Name": "Ana"}],
            "createdAt": "2024-01-01T00:00:00Z",
        });
        let board = Board::from_doc("b1", &doc);
        assert_eq!(board.name, "Launch party");
        assert_eq!(board.column_order, vec!["Name", "ID"]);
        assert!(board.items[0].checked_in);
        assert_eq!(board.description, "");
    }
}
