use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{CompanyInfoRow, PreferencesRow, Record, Remark, SettingsRow};
use super::store::{Store, StoreError};

#[derive(Default)]
struct Tables {
    records: HashMap<String, Vec<Record>>,
    settings: HashMap<String, SettingsRow>,
    preferences: HashMap<String, PreferencesRow>,
    remarks: BTreeMap<String, Remark>,
    company_info: HashMap<String, CompanyInfoRow>,
}

/// Process-local store for development (`GENBA_STORE=memory`) and tests.
///
/// Counts every operation and can be switched into a failing mode, which
/// makes it possible to observe whether a request reached the store at all.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    operations: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations attempted so far.
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// While set, every operation fails with `StoreError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is in failing mode".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.enter()
    }

    async fn list_records(&self, resource: &str, include_inactive: bool) -> Result<Vec<Record>, StoreError> {
        self.enter()?;
        let tables = self.tables.read().await;
        Ok(tables
            .records
            .get(resource)
            .map(|rows| {
                rows.iter()
                    .filter(|r| include_inactive || r.is_active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_record(&self, resource: &str, id: Uuid) -> Result<Option<Record>, StoreError> {
        self.enter()?;
        let tables = self.tables.read().await;
        Ok(tables
            .records
            .get(resource)
            .and_then(|rows| rows.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn insert_record(&self, resource: &str, data: Map<String, Value>) -> Result<Record, StoreError> {
        self.enter()?;
        let record = Record::new(resource, data);
        let mut tables = self.tables.write().await;
        tables
            .records
            .entry(resource.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        resource: &str,
        id: Uuid,
        changes: Map<String, Value>,
    ) -> Result<Option<Record>, StoreError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        let Some(record) = tables
            .records
            .get_mut(resource)
            .and_then(|rows| rows.iter_mut().find(|r| r.id == id))
        else {
            return Ok(None);
        };
        record.data.extend(changes);
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn set_record_active(&self, resource: &str, id: Uuid, active: bool) -> Result<Option<Record>, StoreError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        let Some(record) = tables
            .records
            .get_mut(resource)
            .and_then(|rows| rows.iter_mut().find(|r| r.id == id))
        else {
            return Ok(None);
        };
        record.is_active = active;
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete_record(&self, resource: &str, id: Uuid) -> Result<bool, StoreError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.records.get_mut(resource) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }

    async fn find_settings(&self, key: &str) -> Result<Option<SettingsRow>, StoreError> {
        self.enter()?;
        Ok(self.tables.read().await.settings.get(key).cloned())
    }

    async fn upsert_settings(&self, row: SettingsRow) -> Result<SettingsRow, StoreError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        tables.settings.insert(row.key.clone(), row.clone());
        Ok(row)
    }

    async fn insert_settings_if_absent(&self, row: SettingsRow) -> Result<SettingsRow, StoreError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        Ok(tables.settings.entry(row.key.clone()).or_insert(row).clone())
    }

    async fn find_preferences(&self, user_id: &str) -> Result<Option<PreferencesRow>, StoreError> {
        self.enter()?;
        Ok(self.tables.read().await.preferences.get(user_id).cloned())
    }

    async fn upsert_preferences(&self, row: PreferencesRow) -> Result<PreferencesRow, StoreError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        tables.preferences.insert(row.user_id.clone(), row.clone());
        Ok(row)
    }

    async fn list_remarks(&self, from: Option<&str>, to: Option<&str>) -> Result<Vec<Remark>, StoreError> {
        self.enter()?;
        let tables = self.tables.read().await;
        Ok(tables
            .remarks
            .values()
            .filter(|r| from.map_or(true, |from| r.date_key.as_str() >= from))
            .filter(|r| to.map_or(true, |to| r.date_key.as_str() <= to))
            .cloned()
            .collect())
    }

    async fn upsert_remark(&self, remark: Remark) -> Result<Remark, StoreError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        tables.remarks.insert(remark.date_key.clone(), remark.clone());
        Ok(remark)
    }

    async fn delete_remark(&self, date_key: &str) -> Result<bool, StoreError> {
        self.enter()?;
        Ok(self.tables.write().await.remarks.remove(date_key).is_some())
    }

    async fn find_company_info(&self, key: &str) -> Result<Option<CompanyInfoRow>, StoreError> {
        self.enter()?;
        Ok(self.tables.read().await.company_info.get(key).cloned())
    }

    async fn upsert_company_info(&self, row: CompanyInfoRow) -> Result<CompanyInfoRow, StoreError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        tables.company_info.insert(row.key.clone(), row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn soft_deleted_records_hidden_by_default() {
        let store = MemoryStore::new();
        let kept = store.insert_record("customers", data(json!({"name": "A"}))).await.unwrap();
        let gone = store.insert_record("customers", data(json!({"name": "B"}))).await.unwrap();
        store.set_record_active("customers", gone.id, false).await.unwrap();

        let active = store.list_records("customers", false).await.unwrap();
        assert_eq!(active.iter().map(|r| r.id).collect::<Vec<_>>(), vec![kept.id]);
        assert_eq!(store.list_records("customers", true).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_merges_shallowly() {
        let store = MemoryStore::new();
        let rec = store
            .insert_record("projects", data(json!({"name": "Bridge", "status": "draft"})))
            .await
            .unwrap();
        let updated = store
            .update_record("projects", rec.id, data(json!({"status": "active"})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.data["name"], "Bridge");
        assert_eq!(updated.data["status"], "active");
        assert!(store.update_record("projects", Uuid::new_v4(), Map::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_if_absent_keeps_existing_settings() {
        let store = MemoryStore::new();
        let saved = SettingsRow {
            key: "default".into(),
            total_members: 12,
            display_order: None,
            hidden_member_ids: None,
            updated_at: Utc::now(),
        };
        store.upsert_settings(saved.clone()).await.unwrap();

        let defaults = SettingsRow {
            total_members: 20,
            ..saved.clone()
        };
        let stored = store.insert_settings_if_absent(defaults).await.unwrap();
        assert_eq!(stored, saved);
        assert_eq!(store.find_settings("default").await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn failing_mode_counts_and_fails() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(matches!(store.ping().await, Err(StoreError::Unavailable(_))));
        assert_eq!(store.operations(), 1);
    }
}
