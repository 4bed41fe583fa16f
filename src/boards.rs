//! Board service: the operations the surrounding UI/CLI calls, generic over
//! the [`DocumentStore`] collaborator.
//!
//! Create enforces per-owner name uniqueness with a numeric suffix. Update
//! is a single non-transactional read-then-write: the current board is read,
//! an incoming item list is reconciled through the merge engine, and the
//! result is written back. That narrow guarantee — a positive check-in is
//! never reverted by a stale snapshot — is the whole concurrency story;
//! there is no transactional isolation and no retry.

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::contract::{
    DocumentQuery, DocumentSnapshot, DocumentStore, SortDirection, StoreError, SubscriptionHandle,
};
use crate::error::BoardError;
use crate::merge::merge_items;
use crate::model::{Board, BoardFilters, BoardUpdate, Item, NewBoard};
use crate::normalize::{NormalizedTable, CHECK_COLUMN};

/// Collection boards live in.
pub const BOARDS_COLLECTION: &str = "boards";

/// Fallback board name when none is requested.
const DEFAULT_BOARD_NAME: &str = "Board";

/// Board operations over an injected document store.
pub struct BoardService<S> {
    store: S,
}

impl<S: DocumentStore> BoardService<S> {
    pub fn new(store: S) -> Self {
        BoardService { store }
    }

    /// Create a board. The requested name is disambiguated against the
    /// owner's existing boards ("Board", "Board 2", "Board 3", ...),
    /// case-insensitively.
    pub async fn create_board(&self, new: NewBoard) -> Result<String, BoardError> {
        if new.owner_id.trim().is_empty() {
            return Err(BoardError::Validation("owner id is required".to_string()));
        }

        let existing = self
            .store
            .query(
                BOARDS_COLLECTION,
                DocumentQuery::default().filter("ownerId", json!(new.owner_id)),
            )
            .await?;
        let taken: Vec<String> = existing
            .iter()
            .filter_map(|(_, doc)| doc.get("name").and_then(Value::as_str))
            .map(str::to_lowercase)
            .collect();

        let base = new
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_BOARD_NAME)
            .to_string();
        let mut final_name = base.clone();
        let mut count = 1;
        while taken.contains(&final_name.to_lowercase()) {
            count += 1;
            final_name = format!("{base} {count}");
        }

        let items: Vec<Value> = new.items.iter().map(Item::to_value).collect();
        let fields = json!({
            "name": final_name,
            "ownerId": new.owner_id,
            "description": new.description.unwrap_or_default(),
            "items": items,
        });

        let id = self.store.create(BOARDS_COLLECTION, fields).await?;
        info!(board_id = %id, name = %final_name, items = new.items.len(), "created board");
        Ok(id)
    }

    /// List an owner's boards, newest update first. Filters narrow the
    /// result by exact name and by an update-time window (strict RFC3339
    /// bounds).
    pub async fn fetch_boards(
        &self,
        owner_id: &str,
        filters: BoardFilters,
    ) -> Result<Vec<Board>, BoardError> {
        if owner_id.trim().is_empty() {
            return Err(BoardError::Validation("owner id is required".to_string()));
        }

        let mut query = DocumentQuery::default()
            .filter("ownerId", json!(owner_id))
            .order_by("updatedAt", SortDirection::Descending);
        if let Some(name) = &filters.name {
            query = query.filter("name", json!(name));
        }
        if let Some(after) = &filters.updated_after {
            query = query.filter_greater_than("updatedAt", json!(after));
        }
        if let Some(before) = &filters.updated_before {
            query = query.filter_less_than("updatedAt", json!(before));
        }
        if let Some(limit) = filters.limit {
            query = query.limit(limit);
        }

        let docs = self.store.query(BOARDS_COLLECTION, query).await?;
        Ok(docs
            .iter()
            .map(|(id, doc)| Board::from_doc(id, doc))
            .collect())
    }

    /// Fetch one board. Absence is `Ok(None)`.
    pub async fn fetch_board_by_id(&self, board_id: &str) -> Result<Option<Board>, BoardError> {
        require_id(board_id)?;
        let doc = self.store.get_by_id(BOARDS_COLLECTION, board_id).await?;
        Ok(doc.map(|doc| Board::from_doc(board_id, &doc)))
    }

    /// Apply a partial update. An item list, when present, is reconciled
    /// against the current board through the merge engine; everything else
    /// is a shallow field merge. The store refreshes `updatedAt`.
    pub async fn update_board_by_id(
        &self,
        board_id: &str,
        update: BoardUpdate,
    ) -> Result<Board, BoardError> {
        require_id(board_id)?;

        let current_doc = self
            .store
            .get_by_id(BOARDS_COLLECTION, board_id)
            .await?
            .ok_or_else(|| BoardError::NotFound(board_id.to_string()))?;
        let current = Board::from_doc(board_id, &current_doc);

        let mut partial = Map::new();
        if let Some(name) = update.name {
            partial.insert("name".to_string(), json!(name));
        }
        if let Some(description) = update.description {
            partial.insert("description".to_string(), json!(description));
        }
        if let Some(column_order) = update.column_order {
            partial.insert("columnOrder".to_string(), json!(column_order));
        }
        if let Some(incoming) = update.items {
            let merged = merge_items(&current.items, incoming);
            debug!(board_id, items = merged.len(), "merged incoming item list");
            partial.insert(
                "items".to_string(),
                Value::Array(merged.iter().map(Item::to_value).collect()),
            );
        }

        self.store
            .update_by_id(BOARDS_COLLECTION, board_id, Value::Object(partial))
            .await
            .map_err(|err| not_found_or(err, board_id))?;

        let updated = self
            .store
            .get_by_id(BOARDS_COLLECTION, board_id)
            .await?
            .ok_or_else(|| BoardError::NotFound(board_id.to_string()))?;
        Ok(Board::from_doc(board_id, &updated))
    }

    /// Delete a board. Deleting a missing board is an error.
    pub async fn delete_board(&self, board_id: &str) -> Result<(), BoardError> {
        require_id(board_id)?;
        self.store
            .delete_by_id(BOARDS_COLLECTION, board_id)
            .await
            .map_err(|err| not_found_or(err, board_id))?;
        info!(board_id, "deleted board");
        Ok(())
    }

    /// Subscribe to one board. The callback receives the current board on
    /// every change, or `None` once it no longer exists.
    pub fn subscribe_to_board_by_id(
        &self,
        board_id: &str,
        callback: impl Fn(Option<Board>) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let id = board_id.to_string();
        self.store.subscribe_by_id(
            BOARDS_COLLECTION,
            board_id,
            Box::new(move |snapshot| match snapshot {
                DocumentSnapshot::Updated(doc) => callback(Some(Board::from_doc(&id, &doc))),
                DocumentSnapshot::NotFound => callback(None),
            }),
        )
    }
}

fn require_id(board_id: &str) -> Result<(), BoardError> {
    if board_id.trim().is_empty() {
        Err(BoardError::Validation("board id is required".to_string()))
    } else {
        Ok(())
    }
}

fn not_found_or(err: StoreError, board_id: &str) -> BoardError {
    match err {
        StoreError::NotFound { .. } => BoardError::NotFound(board_id.to_string()),
        other => BoardError::Store(other),
    }
}

/// Turn a normalized preview table into fresh items. The synthetic `Check`
/// placeholder column folds into the `checkedIn` flag and does not survive
/// as a data column.
pub fn items_from_table(table: &NormalizedTable) -> Vec<Item> {
    table
        .rows
        .iter()
        .map(|row| {
            let mut fields = row.clone();
            let check = fields.remove(CHECK_COLUMN).unwrap_or_default();
            let mut item = Item::new(fields);
            item.checked_in = matches!(
                check.trim().to_lowercase().as_str(),
                "x" | "yes" | "true" | "checked-in"
            );
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn check_column_folds_into_the_flag() {
        let table = NormalizedTable {
            columns: vec!["Check".to_string(), "Name".to_string()],
            rows: vec![
                BTreeMap::from([
                    ("Check".to_string(), "x".to_string()),
                    ("Name".to_string(), "Ana".to_string()),
                ]),
                BTreeMap::from([
                    ("Check".to_string(), String::new()),
                    ("Name".to_string(), "Luis".to_string()),
                ]),
            ],
        };
        let items = items_from_table(&table);
        assert!(items[0].checked_in);
        assert!(!items[1].checked_in);
        assert!(!items[0].fields.contains_key("Check"));
        assert_ne!(items[0].uid, items[1].uid);
    }
}
