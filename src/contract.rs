//! Collaborator interfaces the core consumes.
//!
//! The hosted services this system sits on — authentication, the document
//! database with real-time subscriptions, the text-completion service, and
//! spreadsheet file reading — are out of scope and appear here only as the
//! interfaces the core needs. Implement these traits to plug in a real
//! backend; the traits are annotated for `mockall` so consumers can generate
//! deterministic mocks for unit and integration tests.
//!
//! All handles are explicitly constructed and injected; there is no ambient
//! global client state anywhere in the crate.

use async_trait::async_trait;
use serde_json::Value;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Errors from the document store collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Update/delete targeted a document that does not exist. Read paths
    /// report absence as `Ok(None)` instead.
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },
    /// Network or backend failure. Attempted once, never retried here.
    #[error("store operation failed: {0}")]
    Transient(String),
}

/// What a subscription callback receives on every server-side change.
#[derive(Debug, Clone)]
pub enum DocumentSnapshot {
    /// Current document fields after the change.
    Updated(Value),
    /// The subscribed document no longer exists. Delivered as data, not as
    /// an error, so a deleted board tears down cleanly.
    NotFound,
}

/// Callback invoked on every snapshot. Delivery is best-effort: no ordering
/// guarantee across subscribers, last update wins on visible state.
pub type SnapshotCallback = Box<dyn Fn(DocumentSnapshot) + Send + Sync>;

/// Cancelation handle for an active subscription. Dropping the handle does
/// not cancel; call [`SubscriptionHandle::unsubscribe`].
pub struct SubscriptionHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        SubscriptionHandle {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel (useful for mocks).
    pub fn noop() -> Self {
        SubscriptionHandle { cancel: None }
    }

    /// Stop receiving snapshots.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Sort direction for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Field comparison operators available to queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    GreaterThan,
    LessThan,
}

/// One predicate on a document field.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    pub field: String,
    pub op: Comparison,
    pub value: Value,
}

/// A document query: field filters, optional ordering, optional limit.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<(String, SortDirection)>,
    pub limit: Option<usize>,
}

impl DocumentQuery {
    fn push_filter(mut self, field: &str, op: Comparison, value: Value) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            op,
            value,
        });
        self
    }

    /// Keep documents whose `field` equals `value`.
    pub fn filter(self, field: &str, value: Value) -> Self {
        self.push_filter(field, Comparison::Equal, value)
    }

    /// Keep documents whose `field` is strictly greater than `value`.
    /// Strings compare lexicographically, which is sufficient for the
    /// store-assigned RFC3339 timestamps.
    pub fn filter_greater_than(self, field: &str, value: Value) -> Self {
        self.push_filter(field, Comparison::GreaterThan, value)
    }

    /// Keep documents whose `field` is strictly less than `value`.
    pub fn filter_less_than(self, field: &str, value: Value) -> Self {
        self.push_filter(field, Comparison::LessThan, value)
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Hosted document database with real-time subscriptions. Documents are
/// flat JSON objects; `createdAt`/`updatedAt` (RFC3339) are assigned by the
/// store on create and update.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document, returning its assigned id.
    async fn create(&self, collection: &str, fields: Value) -> Result<String, StoreError>;

    /// Fetch a document. Absence is `Ok(None)`.
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Run a query, returning `(id, fields)` pairs.
    async fn query(
        &self,
        collection: &str,
        query: DocumentQuery,
    ) -> Result<Vec<(String, Value)>, StoreError>;

    /// Shallow-merge `partial` into an existing document.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        partial: Value,
    ) -> Result<(), StoreError>;

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Subscribe to changes of one document. The callback fires on every
    /// server-side change and receives [`DocumentSnapshot::NotFound`] once
    /// the document stops existing.
    fn subscribe_by_id(
        &self,
        collection: &str,
        id: &str,
        callback: SnapshotCallback,
    ) -> SubscriptionHandle;
}

/// The signed-in user, as far as the core cares. Only `id` is required for
/// ownership checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("auth operation failed: {0}")]
pub struct AuthError(pub String);

/// Hosted authentication provider.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_user(&self) -> Option<UserProfile>;
    async fn sign_in(&self) -> Result<UserProfile, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Errors from the text-completion collaborator.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion response contained no text")]
    Empty,
}

/// Large-language-model text completion. The core treats this as an opaque,
/// possibly-unreliable function producing JSON-ish text; each call is
/// attempted once, failures surface to the caller.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete `prompt`. `response_format_hint` is an optional example
    /// schema appended to the prompt for guidance only.
    async fn complete<'a>(
        &self,
        prompt: &str,
        response_format_hint: Option<&'a str>,
    ) -> Result<String, CompletionError>;
}

#[derive(Debug, thiserror::Error)]
#[error("could not read workbook: {0}")]
pub struct WorkbookError(pub String);

/// Spreadsheet binary formats are parsed by a collaborator; the core only
/// needs the first sheet back as CSV-like text.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait WorkbookReader: Send + Sync {
    fn read_workbook_first_sheet_as_csv(&self, bytes: &[u8]) -> Result<String, WorkbookError>;
}
