//! Local JSON persistence for the no-backend variant.
//!
//! The whole commission collection and the commission type set are stored
//! as JSON strings under fixed, versioned keys. Loading never fails: absent,
//! malformed or non-array content falls back to the bundled defaults and the
//! failure is logged. Inside a readable array, only the unreadable records
//! are dropped.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::commission::{
    Commission, NewCommission, DEFAULT_CLIENT_NAME, DEFAULT_TITLE, UNKNOWN_ARTIST,
};
use crate::commission_types::CommissionTypeRegistry;
use crate::error::StoreError;
use crate::seed::default_commissions;
use crate::status::CommissionStatus;
use crate::store::{sort_newest_first, CommissionStore};
use crate::types::today;

// ---------------------------------------------------------------------------
// Storage keys
// ---------------------------------------------------------------------------

pub const COMMISSIONS_KEY: &str = "arttrack_commissions_zh_v1";
pub const COMMISSION_TYPES_KEY: &str = "arttrack_commission_types_v1";
pub const SESSION_KEY: &str = "arttrack_session_v1";

// ---------------------------------------------------------------------------
// Key/value storage
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        StoreError::Transport(err.to_string())
    }
}

/// String storage addressed by key.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Commission collection
// ---------------------------------------------------------------------------

/// Parse a stored collection.
///
/// Records without an owner are migrated to [`UNKNOWN_ARTIST`] and blank
/// client names and titles get the creation placeholders. A record that
/// still cannot be read is skipped with a warning so the rest survive.
/// Anything but a JSON array is an error.
pub fn decode_commissions(raw: &str) -> Result<Vec<Commission>, serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    let total = values.len();
    let commissions: Vec<Commission> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, mut value)| {
            if let Some(record) = value.as_object_mut() {
                fill_missing_text(record, "artistId", UNKNOWN_ARTIST);
                fill_missing_text(record, "clientName", DEFAULT_CLIENT_NAME);
                fill_missing_text(record, "title", DEFAULT_TITLE);
            }
            match serde_json::from_value(value) {
                Ok(commission) => Some(commission),
                Err(e) => {
                    tracing::warn!(key = COMMISSIONS_KEY, index, error = %e, "Skipping unreadable stored commission");
                    None
                }
            }
        })
        .collect();
    if commissions.len() < total {
        tracing::warn!(
            key = COMMISSIONS_KEY,
            kept = commissions.len(),
            total,
            "Some stored commissions were dropped"
        );
    }
    Ok(commissions)
}

fn fill_missing_text(
    record: &mut serde_json::Map<String, serde_json::Value>,
    field: &str,
    placeholder: &str,
) {
    let present = record
        .get(field)
        .and_then(|v| v.as_str())
        .is_some_and(|s| !s.trim().is_empty());
    if !present {
        record.insert(
            field.to_string(),
            serde_json::Value::String(placeholder.to_string()),
        );
    }
}

pub fn encode_commissions(commissions: &[Commission]) -> Result<String, serde_json::Error> {
    serde_json::to_string(commissions)
}

/// Load the collection, or the bundled dataset when nothing usable is
/// stored.
pub fn load_commissions(storage: &dyn KeyValueStorage) -> Vec<Commission> {
    match storage.get(COMMISSIONS_KEY) {
        Ok(Some(raw)) => match decode_commissions(&raw) {
            Ok(commissions) => commissions,
            Err(e) => {
                tracing::error!(key = COMMISSIONS_KEY, error = %e, "Stored commissions are malformed, using bundled dataset");
                default_commissions()
            }
        },
        Ok(None) => default_commissions(),
        Err(e) => {
            tracing::error!(key = COMMISSIONS_KEY, error = %e, "Failed to read stored commissions, using bundled dataset");
            default_commissions()
        }
    }
}

pub fn save_commissions(
    storage: &mut dyn KeyValueStorage,
    commissions: &[Commission],
) -> Result<(), StorageError> {
    storage.set(COMMISSIONS_KEY, &encode_commissions(commissions)?)
}

// ---------------------------------------------------------------------------
// Commission type set
// ---------------------------------------------------------------------------

/// Load the type set, or the default labels when nothing usable is stored.
pub fn load_commission_types(storage: &dyn KeyValueStorage) -> CommissionTypeRegistry {
    let raw = match storage.get(COMMISSION_TYPES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return CommissionTypeRegistry::default(),
        Err(e) => {
            tracing::error!(key = COMMISSION_TYPES_KEY, error = %e, "Failed to read commission types, using defaults");
            return CommissionTypeRegistry::default();
        }
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(labels) => CommissionTypeRegistry::from_labels(labels),
        Err(e) => {
            tracing::warn!(key = COMMISSION_TYPES_KEY, error = %e, "Stored commission types are malformed, using defaults");
            CommissionTypeRegistry::default()
        }
    }
}

pub fn save_commission_types(
    storage: &mut dyn KeyValueStorage,
    types: &CommissionTypeRegistry,
) -> Result<(), StorageError> {
    storage.set(COMMISSION_TYPES_KEY, &serde_json::to_string(types)?)
}

// ---------------------------------------------------------------------------
// Local collaborator
// ---------------------------------------------------------------------------

struct LocalState<K> {
    storage: K,
    commissions: Vec<Commission>,
}

impl<K: KeyValueStorage> LocalState<K> {
    /// Persist `next` and adopt it; on a storage failure nothing changes.
    fn commit(&mut self, next: Vec<Commission>) -> Result<(), StoreError> {
        save_commissions(&mut self.storage, &next)?;
        self.commissions = next;
        Ok(())
    }
}

/// [`CommissionStore`] over a [`KeyValueStorage`], for running without a
/// backend. Every mutation rewrites the whole collection.
pub struct LocalCommissionStore<K> {
    state: Mutex<LocalState<K>>,
}

impl<K: KeyValueStorage> LocalCommissionStore<K> {
    pub fn open(storage: K) -> Self {
        let commissions = load_commissions(&storage);
        tracing::debug!(count = commissions.len(), "Local commission store opened");
        Self {
            state: Mutex::new(LocalState {
                storage,
                commissions,
            }),
        }
    }

    /// Give back the underlying storage.
    pub fn into_storage(self) -> K {
        self.state.into_inner().storage
    }
}

/// `c-<millis>`, bumped until unique within `existing`.
fn next_id(existing: &[Commission], now_millis: i64) -> String {
    let mut millis = now_millis;
    loop {
        let id = format!("c-{millis}");
        if existing.iter().all(|c| c.id != id) {
            return id;
        }
        millis += 1;
    }
}

#[async_trait]
impl<K: KeyValueStorage> CommissionStore for LocalCommissionStore<K> {
    async fn list_all(&self) -> Result<Vec<Commission>, StoreError> {
        let mut all = self.state.lock().await.commissions.clone();
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn list_for_owner(&self, artist_id: &str) -> Result<Vec<Commission>, StoreError> {
        let mut owned: Vec<Commission> = self
            .state
            .lock()
            .await
            .commissions
            .iter()
            .filter(|c| c.is_owned_by(artist_id))
            .cloned()
            .collect();
        sort_newest_first(&mut owned);
        Ok(owned)
    }

    async fn create(&self, data: NewCommission) -> Result<Commission, StoreError> {
        let mut state = self.state.lock().await;
        let id = next_id(&state.commissions, chrono::Utc::now().timestamp_millis());
        let created = data.with_id(id);

        let mut next = Vec::with_capacity(state.commissions.len() + 1);
        next.push(created.clone());
        next.extend(state.commissions.iter().cloned());
        state.commit(next)?;
        Ok(created)
    }

    async fn set_status(&self, id: &str, status: CommissionStatus) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.commissions.clone();
        let commission = next
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::Transport(format!("Commission {id} not found")))?;
        commission.apply_status(status, today());
        state.commit(next)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let next: Vec<Commission> = state
            .commissions
            .iter()
            .filter(|c| c.id != id)
            .cloned()
            .collect();
        state.commit(next)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn storage_with(raw: &str) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        storage.set(COMMISSIONS_KEY, raw).unwrap();
        storage
    }

    #[test]
    fn empty_storage_loads_bundled_dataset() {
        assert_eq!(load_commissions(&MemoryStorage::new()), default_commissions());
    }

    #[test]
    fn malformed_content_falls_back() {
        assert_eq!(load_commissions(&storage_with("{not json")), default_commissions());
    }

    #[test]
    fn non_array_content_falls_back() {
        let raw = r#"{"id":"c-1"}"#;
        assert_eq!(load_commissions(&storage_with(raw)), default_commissions());
    }

    #[test]
    fn round_trip_migrates_missing_owner() {
        let mut original = default_commissions();
        let encoded = encode_commissions(&original).unwrap();

        let mut values: Vec<serde_json::Value> = serde_json::from_str(&encoded).unwrap();
        values[1].as_object_mut().unwrap().remove("artistId");
        let stripped = serde_json::to_string(&values).unwrap();

        let loaded = load_commissions(&storage_with(&stripped));
        original[1].artist_id = UNKNOWN_ARTIST.to_string();
        assert_eq!(loaded, original);
    }

    #[test]
    fn one_bad_record_does_not_discard_the_rest() {
        let raw = r#"[
            {"id":"c-mine-1","artistId":"兔兔老師","clientName":"A","title":"T1",
             "type":"插畫","price":100,"status":"queue",
             "dateAdded":"2023-10-01","lastUpdated":"2023-10-01","notes":null},
            {"id":"c-mine-2","artistId":"兔兔老師","clientName":"B",
             "type":"插畫","price":100,"status":"sketch",
             "dateAdded":"2023-10-02","lastUpdated":"2023-10-02"},
            {"id":"c-mine-3","artistId":"兔兔老師","clientName":"C","title":"T3",
             "type":"插畫","price":100,"status":"mystery",
             "dateAdded":"2023-10-03","lastUpdated":"2023-10-03"}
        ]"#;
        let loaded = load_commissions(&storage_with(raw));

        let ids: Vec<_> = loaded.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c-mine-1", "c-mine-2"]);
        assert_eq!(loaded[0].notes, None);
        assert_eq!(loaded[1].title, DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn mutating_after_partial_load_keeps_user_records() {
        let raw = r#"[
            {"id":"c-mine-1","artistId":"兔兔老師","clientName":"A","title":"T1",
             "type":"插畫","price":100,"status":"queue",
             "dateAdded":"2023-10-01","lastUpdated":"2023-10-01"},
            {"id":"c-mine-2","artistId":"兔兔老師","title":"T2",
             "type":"插畫","price":100,"status":"queue",
             "dateAdded":"2023-10-02","lastUpdated":"2023-10-02"}
        ]"#;
        let store = LocalCommissionStore::open(storage_with(raw));
        store.delete("c-mine-1").await.unwrap();

        let reloaded = load_commissions(&store.into_storage());
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].id, "c-mine-2");
        assert_eq!(reloaded[0].client_name, DEFAULT_CLIENT_NAME);
        assert!(reloaded.iter().all(|c| !c.id.starts_with("c-10")));
    }

    #[test]
    fn legacy_status_labels_load() {
        let raw = r#"[{"id":"c-1","artistId":"兔兔老師","clientName":"A","title":"T",
            "type":"插畫","price":100,"status":"上色",
            "dateAdded":"2023-10-01","lastUpdated":"2023-10-02"}]"#;
        let loaded = load_commissions(&storage_with(raw));
        assert_eq!(loaded[0].status, CommissionStatus::Color);
        assert_eq!(loaded[0].description, "");
    }

    #[test]
    fn types_round_trip_and_fall_back() {
        let mut storage = MemoryStorage::new();
        assert_eq!(load_commission_types(&storage), CommissionTypeRegistry::default());

        let mut types = CommissionTypeRegistry::default();
        types.add("明信片").unwrap();
        save_commission_types(&mut storage, &types).unwrap();
        assert!(load_commission_types(&storage).contains("明信片"));

        storage.set(COMMISSION_TYPES_KEY, "42").unwrap();
        assert_eq!(load_commission_types(&storage), CommissionTypeRegistry::default());
    }

    #[test]
    fn ids_are_unique_within_collection() {
        let mut existing = default_commissions();
        existing[0].id = "c-1000".to_string();
        assert_eq!(next_id(&existing, 1000), "c-1001");
        assert_eq!(next_id(&existing, 5), "c-5");
    }

    #[test]
    fn file_storage_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("data"));
        assert_eq!(storage.get(SESSION_KEY).unwrap(), None);

        storage.set(SESSION_KEY, "token").unwrap();
        let reopened = FileStorage::new(dir.path().join("data"));
        assert_eq!(reopened.get(SESSION_KEY).unwrap().as_deref(), Some("token"));

        storage.remove(SESSION_KEY).unwrap();
        storage.remove(SESSION_KEY).unwrap();
        assert_eq!(reopened.get(SESSION_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn local_store_persists_every_mutation() {
        let store = LocalCommissionStore::open(MemoryStorage::new());
        let data = default_commissions()[0].clone();
        let new = NewCommission {
            artist_id: data.artist_id,
            user_id: data.user_id,
            client_name: "新客人".to_string(),
            contact: None,
            title: "新委託".to_string(),
            description: String::new(),
            commission_type: "插畫".to_string(),
            price: 0.0,
            status: CommissionStatus::Queue,
            date_added: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            last_updated: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            thumbnail_url: None,
            notes: None,
        };

        let created = store.create(new).await.unwrap();
        assert!(created.id.starts_with("c-"));
        store.set_status("c-103", CommissionStatus::Sketch).await.unwrap();
        store.delete("c-104").await.unwrap();

        let storage = store.into_storage();
        let reloaded = load_commissions(&storage);
        assert_eq!(reloaded.len(), 4);
        assert_eq!(reloaded[0].id, created.id);
        let c103 = reloaded.iter().find(|c| c.id == "c-103").unwrap();
        assert_eq!(c103.status, CommissionStatus::Sketch);
        assert!(reloaded.iter().all(|c| c.id != "c-104"));
    }

    #[tokio::test]
    async fn local_store_lists_newest_first_per_owner() {
        let store = LocalCommissionStore::open(MemoryStorage::new());
        let owned = store.list_for_owner("兔兔老師").await.unwrap();
        let ids: Vec<_> = owned.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c-103", "c-101"]);
    }

    #[tokio::test]
    async fn set_status_on_missing_record_fails() {
        let store = LocalCommissionStore::open(MemoryStorage::new());
        let err = store
            .set_status("c-missing", CommissionStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }
}
