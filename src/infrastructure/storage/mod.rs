//! Flat-file storage implementation
//!
//! Each store reads its JSON file in full and rewrites it in full. An async
//! mutex serializes the read-modify-write cycle inside this process; other
//! processes writing the same file can still race.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

use crate::application::errors::StorageError;
use crate::domain::entities::HistoryRecord;
use crate::domain::traits::{HistoryStore, ThreadAdminStore};

async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StorageError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(T::default()),
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, content).await?;
    Ok(())
}

fn upsert_record(
    records: &mut Vec<HistoryRecord>,
    userid: &str,
    prefix: &str,
    admins: &[String],
    enabled_commands: &[String],
) {
    let index = match records.iter().position(|r| r.userid == userid) {
        Some(index) => index,
        None => {
            records.push(HistoryRecord::new(userid));
            records.len() - 1
        }
    };
    let record = &mut records[index];
    record.prefix = Some(prefix.to_string());
    record.admin = admins.to_vec();
    record.enable_commands = enabled_commands.to_vec();
}

fn apply_times(records: &mut Vec<HistoryRecord>, times: &[(String, u64)]) {
    for (userid, time) in times {
        match records.iter_mut().find(|r| &r.userid == userid) {
            Some(record) => record.time = *time,
            None => records.push(HistoryRecord {
                time: *time,
                ..HistoryRecord::new(userid.clone())
            }),
        }
    }
}

/// `history.json`: an array of per-account records
pub struct JsonHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn records(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        read_json(&self.path).await
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn find(&self, userid: &str) -> Result<Option<HistoryRecord>, StorageError> {
        let records = self.records().await?;
        Ok(records.into_iter().find(|r| r.userid == userid))
    }

    async fn upsert_account(
        &self,
        userid: &str,
        prefix: &str,
        admins: &[String],
        enabled_commands: &[String],
    ) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.records().await?;
        upsert_record(&mut records, userid, prefix, admins, enabled_commands);
        write_json(&self.path, &records).await
    }

    async fn record_times(&self, times: &[(String, u64)]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.records().await?;
        apply_times(&mut records, times);
        write_json(&self.path, &records).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct AdminRef {
    id: String,
}

/// One single-key record: `{ "<threadId>": [{ "id": ... }] }`
type ThreadEntry = BTreeMap<String, Vec<AdminRef>>;

/// `database.json`: an ordered array of single-key thread records
pub struct JsonThreadAdminStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonThreadAdminStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn entries(&self) -> Result<Vec<ThreadEntry>, StorageError> {
        read_json(&self.path).await
    }
}

#[async_trait]
impl ThreadAdminStore for JsonThreadAdminStore {
    async fn admins(&self, thread_id: &str) -> Result<Option<Vec<String>>, StorageError> {
        let entries = self.entries().await?;
        Ok(entries
            .into_iter()
            .find_map(|mut entry| entry.remove(thread_id))
            .map(|admins| admins.into_iter().map(|a| a.id).collect()))
    }

    async fn insert(&self, thread_id: &str, admins: &[String]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.entries().await?;
        let refs: Vec<AdminRef> = admins.iter().map(|id| AdminRef { id: id.clone() }).collect();

        match entries.iter_mut().find(|entry| entry.contains_key(thread_id)) {
            Some(entry) => {
                entry.insert(thread_id.to_string(), refs);
            }
            None => entries.push(BTreeMap::from([(thread_id.to_string(), refs)])),
        }
        write_json(&self.path, &entries).await
    }
}

/// In-memory history store for embedding and tests
#[derive(Default)]
pub struct MemoryHistoryStore {
    records: RwLock<Vec<HistoryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<HistoryRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn find(&self, userid: &str) -> Result<Option<HistoryRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.userid == userid).cloned())
    }

    async fn upsert_account(
        &self,
        userid: &str,
        prefix: &str,
        admins: &[String],
        enabled_commands: &[String],
    ) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        upsert_record(&mut records, userid, prefix, admins, enabled_commands);
        Ok(())
    }

    async fn record_times(&self, times: &[(String, u64)]) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        apply_times(&mut records, times);
        Ok(())
    }
}

/// In-memory thread admin store for embedding and tests
#[derive(Default)]
pub struct MemoryThreadAdminStore {
    threads: RwLock<Vec<(String, Vec<String>)>>,
}

impl MemoryThreadAdminStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadAdminStore for MemoryThreadAdminStore {
    async fn admins(&self, thread_id: &str) -> Result<Option<Vec<String>>, StorageError> {
        let threads = self.threads.read().await;
        Ok(threads
            .iter()
            .find(|(id, _)| id == thread_id)
            .map(|(_, admins)| admins.clone()))
    }

    async fn insert(&self, thread_id: &str, admins: &[String]) -> Result<(), StorageError> {
        let mut threads = self.threads.write().await;
        match threads.iter_mut().find(|(id, _)| id == thread_id) {
            Some((_, existing)) => *existing = admins.to_vec(),
            None => threads.push((thread_id.to_string(), admins.to_vec())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_history_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("data/history.json"));
        assert!(store.find("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_upsert_keeps_time_and_blacklist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        tokio::fs::write(
            &path,
            r#"[{"userid":"1","time":50,"blacklist":["9"],"state":"opaque"}]"#,
        )
        .await
        .unwrap();

        let store = JsonHistoryStore::new(&path);
        store
            .upsert_account("1", "!", &["owner".to_string()], &[])
            .await
            .unwrap();
        store.upsert_account("2", "/", &[], &["help".to_string()]).await.unwrap();

        let first = store.find("1").await.unwrap().unwrap();
        assert_eq!(first.time, 50);
        assert_eq!(first.blacklist, vec!["9".to_string()]);
        assert_eq!(first.prefix.as_deref(), Some("!"));
        assert_eq!(first.extra["state"], "opaque");

        let second = store.find("2").await.unwrap().unwrap();
        assert_eq!(second.time, 0);
        assert_eq!(second.enable_commands, vec!["help".to_string()]);
    }

    #[tokio::test]
    async fn test_history_record_times() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        store.upsert_account("1", "!", &[], &[]).await.unwrap();
        store
            .record_times(&[("1".to_string(), 30), ("2".to_string(), 5)])
            .await
            .unwrap();

        let records = store.records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].time, 30);
        assert_eq!(records[1].userid, "2");
    }

    #[tokio::test]
    async fn test_thread_admin_file_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("database.json");
        let store = JsonThreadAdminStore::new(&path);

        assert!(store.admins("t1").await.unwrap().is_none());
        store.insert("t1", &["a".to_string(), "b".to_string()]).await.unwrap();
        store.insert("t2", &[]).await.unwrap();

        assert_eq!(
            store.admins("t1").await.unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(store.admins("t2").await.unwrap(), Some(vec![]));

        let raw: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!([{"t1": [{"id": "a"}, {"id": "b"}]}, {"t2": []}])
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("database.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = JsonThreadAdminStore::new(&path);
        assert!(matches!(
            store.admins("t1").await,
            Err(StorageError::Serialization(_))
        ));
    }
}
