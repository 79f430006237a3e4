pub mod memory;
pub mod mongo;

use std::{error::Error, fmt, future::Future};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use todo_api::v1::TodoView;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewTodo {
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl NewTodo {
    pub fn now(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            created_at: Utc::now(),
        }
    }
}

impl From<TodoRecord> for TodoView {
    fn from(record: TodoRecord) -> Self {
        Self {
            id: record.id.0,
            title: record.title,
            completed: record.completed,
            created_at: record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("todo not found")]
    NotFound,

    #[error("{0}")]
    Backend(#[source] Box<dyn Error + Send + Sync>),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Every call is one round trip to the backend and is never retried.
pub trait TodoStore: Send + Sync + 'static {
    /// Validates a client supplied identifier against the backend's id format.
    fn parse_id(&self, raw: &str) -> Option<TodoId>;

    fn find_all(&self) -> impl Future<Output = Result<Vec<TodoRecord>, StoreError>> + Send;

    /// Stores a new uncompleted todo and returns its generated id.
    fn insert(&self, todo: NewTodo) -> impl Future<Output = Result<TodoId, StoreError>> + Send;

    fn update(
        &self,
        id: &TodoId,
        title: &str,
        completed: bool,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete(&self, id: &TodoId) -> impl Future<Output = Result<(), StoreError>> + Send;
}
