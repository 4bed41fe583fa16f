//! In-memory [`DocumentStore`] implementation.
//!
//! Stands in for the hosted document database in tests and in the CLI's
//! local mode. Behaves like the real thing where the core depends on it:
//! store-assigned ids and RFC3339 `createdAt`/`updatedAt` timestamps,
//! shallow-merge updates, equality-filter queries with ordering and limit,
//! and per-document subscriptions that fire on every change and deliver
//! `NotFound` once the document stops existing.
//!
//! Callbacks are invoked outside the lock; delivery order across
//! subscribers is unspecified, matching the best-effort contract.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::contract::{
    Comparison, DocumentQuery, DocumentSnapshot, DocumentStore, FieldFilter, SnapshotCallback,
    SortDirection, StoreError, SubscriptionHandle,
};

use async_trait::async_trait;

type DocKey = (String, String);

#[derive(Default)]
struct Inner {
    /// collection → id → document fields.
    collections: HashMap<String, BTreeMap<String, Value>>,
    /// (collection, id) → subscriber id → callback.
    subscribers: HashMap<DocKey, HashMap<u64, Arc<SnapshotCallback>>>,
    next_subscriber: u64,
}

/// Thread-safe in-memory document store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot subscribers for one document, taken under the lock so the
    /// callbacks themselves can run without it.
    fn subscribers_for(inner: &Inner, collection: &str, id: &str) -> Vec<Arc<SnapshotCallback>> {
        inner
            .subscribers
            .get(&(collection.to_string(), id.to_string()))
            .map(|subs| subs.values().cloned().collect())
            .unwrap_or_default()
    }

    fn notify(callbacks: Vec<Arc<SnapshotCallback>>, snapshot: DocumentSnapshot) {
        for callback in callbacks {
            (*callback)(snapshot.clone());
        }
    }
}

fn filter_matches(doc: &Value, filter: &FieldFilter) -> bool {
    let actual = doc.get(&filter.field);
    match filter.op {
        Comparison::Equal => actual == Some(&filter.value),
        Comparison::GreaterThan => {
            compare_values(actual, &filter.value) == Some(std::cmp::Ordering::Greater)
        }
        Comparison::LessThan => {
            compare_values(actual, &filter.value) == Some(std::cmp::Ordering::Less)
        }
    }
}

/// Strings (e.g. RFC3339 timestamps) compare lexicographically, numbers
/// numerically. Missing or mixed-type values never match a range filter.
fn compare_values(actual: Option<&Value>, expected: &Value) -> Option<std::cmp::Ordering> {
    match (actual?, expected) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        _ => None,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, fields: Value) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let now = Utc::now().to_rfc3339();

        let mut doc = match fields {
            Value::Object(obj) => obj,
            other => {
                return Err(StoreError::Transient(format!(
                    "document fields must be an object, got {other}"
                )))
            }
        };
        doc.insert("createdAt".to_string(), Value::String(now.clone()));
        doc.insert("updatedAt".to_string(), Value::String(now));

        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), Value::Object(doc));
        debug!(collection, id = %id, "created document");
        Ok(id)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn query(
        &self,
        collection: &str,
        query: DocumentQuery,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let docs = match inner.collections.get(collection) {
            Some(docs) => docs,
            None => return Ok(Vec::new()),
        };

        let mut results: Vec<(String, Value)> = docs
            .iter()
            .filter(|(_, doc)| query.filters.iter().all(|f| filter_matches(doc, f)))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect();

        if let Some((field, direction)) = &query.order_by {
            results.sort_by(|(_, a), (_, b)| {
                let left = a.get(field).and_then(Value::as_str).unwrap_or_default();
                let right = b.get(field).and_then(Value::as_str).unwrap_or_default();
                match direction {
                    SortDirection::Ascending => left.cmp(right),
                    SortDirection::Descending => right.cmp(left),
                }
            });
        }
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        partial: Value,
    ) -> Result<(), StoreError> {
        let partial = match partial {
            Value::Object(obj) => obj,
            other => {
                return Err(StoreError::Transient(format!(
                    "update fields must be an object, got {other}"
                )))
            }
        };

        let (callbacks, snapshot) = {
            let mut inner = self.inner.lock().expect("store lock poisoned");
            let doc = inner
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;

            let obj = doc
                .as_object_mut()
                .expect("stored documents are always objects");
            for (key, value) in partial {
                obj.insert(key, value);
            }
            obj.insert(
                "updatedAt".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );

            let snapshot = DocumentSnapshot::Updated(doc.clone());
            (Self::subscribers_for(&inner, collection, id), snapshot)
        };
        Self::notify(callbacks, snapshot);
        Ok(())
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let callbacks = {
            let mut inner = self.inner.lock().expect("store lock poisoned");
            let removed = inner
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.remove(id));
            if removed.is_none() {
                return Err(StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                });
            }
            debug!(collection, id, "deleted document");
            Self::subscribers_for(&inner, collection, id)
        };
        Self::notify(callbacks, DocumentSnapshot::NotFound);
        Ok(())
    }

    fn subscribe_by_id(
        &self,
        collection: &str,
        id: &str,
        callback: SnapshotCallback,
    ) -> SubscriptionHandle {
        let callback = Arc::new(callback);
        let key: DocKey = (collection.to_string(), id.to_string());

        let (subscriber_id, initial) = {
            let mut inner = self.inner.lock().expect("store lock poisoned");
            inner.next_subscriber += 1;
            let subscriber_id = inner.next_subscriber;
            inner
                .subscribers
                .entry(key.clone())
                .or_default()
                .insert(subscriber_id, callback.clone());

            let initial = match inner
                .collections
                .get(collection)
                .and_then(|docs| docs.get(id))
            {
                Some(doc) => DocumentSnapshot::Updated(doc.clone()),
                None => DocumentSnapshot::NotFound,
            };
            (subscriber_id, initial)
        };
        // Snapshot listeners fire once immediately with current state.
        (*callback)(initial);

        let inner = self.inner.clone();
        SubscriptionHandle::new(move || {
            let mut inner = inner.lock().expect("store lock poisoned");
            if let Some(subs) = inner.subscribers.get_mut(&key) {
                subs.remove(&subscriber_id);
            }
        })
    }
}
