use async_trait::async_trait;
use crate::application::errors::StorageError;
use crate::domain::entities::HistoryRecord;

/// Per-account history: restored elapsed time and the role-3 list
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn find(&self, userid: &str) -> Result<Option<HistoryRecord>, StorageError>;

    /// Insert or update an account's login settings, keeping `time` and `blacklist`
    async fn upsert_account(
        &self,
        userid: &str,
        prefix: &str,
        admins: &[String],
        enabled_commands: &[String],
    ) -> Result<(), StorageError>;

    /// Write elapsed seconds for the given accounts
    async fn record_times(&self, times: &[(String, u64)]) -> Result<(), StorageError>;
}

/// Thread id -> admin ids, materialized lazily per thread
#[async_trait]
pub trait ThreadAdminStore: Send + Sync {
    /// `None` when the thread has not been seen yet
    async fn admins(&self, thread_id: &str) -> Result<Option<Vec<String>>, StorageError>;

    async fn insert(&self, thread_id: &str, admins: &[String]) -> Result<(), StorageError>;
}
