use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::models::{CompanyInfoRow, PreferencesRow, Record, Remark, SettingsRow};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Persistence boundary used by every handler. Built once by the composition
/// root and shared through `AppState`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    // Registry resources
    async fn list_records(&self, resource: &str, include_inactive: bool) -> Result<Vec<Record>, StoreError>;
    async fn find_record(&self, resource: &str, id: Uuid) -> Result<Option<Record>, StoreError>;
    async fn insert_record(&self, resource: &str, data: Map<String, Value>) -> Result<Record, StoreError>;
    /// Shallow-merges `changes` into the record's data.
    async fn update_record(
        &self,
        resource: &str,
        id: Uuid,
        changes: Map<String, Value>,
    ) -> Result<Option<Record>, StoreError>;
    async fn set_record_active(&self, resource: &str, id: Uuid, active: bool) -> Result<Option<Record>, StoreError>;
    async fn delete_record(&self, resource: &str, id: Uuid) -> Result<bool, StoreError>;

    // Schedule settings
    async fn find_settings(&self, key: &str) -> Result<Option<SettingsRow>, StoreError>;
    async fn upsert_settings(&self, row: SettingsRow) -> Result<SettingsRow, StoreError>;
    /// Stores `row` only when its key is free; returns whichever row is stored.
    async fn insert_settings_if_absent(&self, row: SettingsRow) -> Result<SettingsRow, StoreError>;

    // Per-user preferences
    async fn find_preferences(&self, user_id: &str) -> Result<Option<PreferencesRow>, StoreError>;
    async fn upsert_preferences(&self, row: PreferencesRow) -> Result<PreferencesRow, StoreError>;

    // Daily remarks, keyed by YYYY-MM-DD
    async fn list_remarks(&self, from: Option<&str>, to: Option<&str>) -> Result<Vec<Remark>, StoreError>;
    async fn upsert_remark(&self, remark: Remark) -> Result<Remark, StoreError>;
    async fn delete_remark(&self, date_key: &str) -> Result<bool, StoreError>;

    // Company information
    async fn find_company_info(&self, key: &str) -> Result<Option<CompanyInfoRow>, StoreError>;
    async fn upsert_company_info(&self, row: CompanyInfoRow) -> Result<CompanyInfoRow, StoreError>;
}
