use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::api::codec;

/// Fixed key of singleton configuration rows.
pub const DEFAULT_KEY: &str = "default";

pub const DEFAULT_TOTAL_MEMBERS: i32 = 20;

/// A registry resource row. Business attributes live in `data` and are
/// flattened next to the system fields on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    #[serde(skip)]
    pub resource: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(resource: &str, data: Map<String, Value>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            resource: resource.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
            data,
        }
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// Persisted `schedule_settings` row; list columns hold encoded JSON text.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SettingsRow {
    pub key: String,
    pub total_members: i32,
    pub display_order: Option<String>,
    pub hidden_member_ids: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSettings {
    pub id: String,
    pub total_members: i32,
    pub display_order: Vec<String>,
    pub hidden_member_ids: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleSettings {
    pub fn defaults() -> Self {
        Self {
            id: DEFAULT_KEY.to_string(),
            total_members: DEFAULT_TOTAL_MEMBERS,
            display_order: Vec::new(),
            hidden_member_ids: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn to_row(&self) -> SettingsRow {
        SettingsRow {
            key: self.id.clone(),
            total_members: self.total_members,
            display_order: codec::encode(Some(&self.display_order)),
            hidden_member_ids: codec::encode(Some(&self.hidden_member_ids)),
            updated_at: self.updated_at,
        }
    }
}

impl From<SettingsRow> for ScheduleSettings {
    fn from(row: SettingsRow) -> Self {
        Self {
            id: row.key,
            total_members: row.total_members,
            display_order: codec::decode(row.display_order.as_deref(), Vec::new()),
            hidden_member_ids: codec::decode(row.hidden_member_ids.as_deref(), Vec::new()),
            updated_at: row.updated_at,
        }
    }
}

/// Persisted `user_preferences` row, keyed by session user id.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PreferencesRow {
    pub user_id: String,
    pub favorite_project_ids: Option<String>,
    pub column_order: Option<String>,
    pub default_view: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub user_id: String,
    pub favorite_project_ids: Vec<String>,
    pub column_order: Option<Vec<String>>,
    pub default_view: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserPreferences {
    pub fn defaults(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            favorite_project_ids: Vec::new(),
            column_order: None,
            default_view: None,
            updated_at: None,
        }
    }

    pub fn to_row(&self) -> PreferencesRow {
        PreferencesRow {
            user_id: self.user_id.clone(),
            favorite_project_ids: codec::encode(Some(&self.favorite_project_ids)),
            column_order: codec::encode(self.column_order.as_ref()),
            default_view: self.default_view.clone(),
            updated_at: self.updated_at.unwrap_or_else(Utc::now),
        }
    }
}

impl From<PreferencesRow> for UserPreferences {
    fn from(row: PreferencesRow) -> Self {
        Self {
            user_id: row.user_id,
            favorite_project_ids: codec::decode(row.favorite_project_ids.as_deref(), Vec::new()),
            column_order: codec::decode(row.column_order.as_deref(), None),
            default_view: row.default_view,
            updated_at: Some(row.updated_at),
        }
    }
}

/// Free-text note attached to one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Remark {
    pub date_key: String,
    pub text: String,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub bank_name: String,
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub account_type: String,
    pub account_number: String,
    #[serde(default)]
    pub account_holder: String,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CompanyInfoRow {
    pub key: String,
    pub name: String,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub representative: Option<String>,
    pub registration_number: Option<String>,
    pub bank_accounts: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub id: String,
    pub name: String,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub representative: Option<String>,
    pub registration_number: Option<String>,
    pub bank_accounts: Vec<BankAccount>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyInfo {
    pub fn to_row(&self) -> CompanyInfoRow {
        CompanyInfoRow {
            key: self.id.clone(),
            name: self.name.clone(),
            postal_code: self.postal_code.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            fax: self.fax.clone(),
            email: self.email.clone(),
            representative: self.representative.clone(),
            registration_number: self.registration_number.clone(),
            bank_accounts: codec::encode(Some(&self.bank_accounts)),
            updated_at: self.updated_at,
        }
    }
}

impl From<CompanyInfoRow> for CompanyInfo {
    fn from(row: CompanyInfoRow) -> Self {
        Self {
            id: row.key,
            name: row.name,
            postal_code: row.postal_code,
            address: row.address,
            phone: row.phone,
            fax: row.fax,
            email: row.email,
            representative: row.representative,
            registration_number: row.registration_number,
            bank_accounts: codec::decode(row.bank_accounts.as_deref(), Vec::new()),
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_row_with_corrupt_lists_degrades_to_defaults() {
        let row = SettingsRow {
            key: DEFAULT_KEY.into(),
            total_members: 12,
            display_order: Some("[\"a\",".into()),
            hidden_member_ids: None,
            updated_at: Utc::now(),
        };
        let settings = ScheduleSettings::from(row);
        assert_eq!(settings.total_members, 12);
        assert!(settings.display_order.is_empty());
        assert!(settings.hidden_member_ids.is_empty());
    }

    #[test]
    fn preferences_without_column_order_persist_null() {
        let prefs = UserPreferences {
            favorite_project_ids: vec!["p-1".into()],
            ..UserPreferences::defaults("u-1")
        };
        let row = prefs.to_row();
        assert_eq!(row.favorite_project_ids.as_deref(), Some(r#"["p-1"]"#));
        assert_eq!(row.column_order, None);

        let back = UserPreferences::from(row);
        assert_eq!(back.favorite_project_ids, vec!["p-1".to_string()]);
        assert_eq!(back.column_order, None);
    }

    #[test]
    fn record_flattens_data_on_the_wire() {
        let mut data = Map::new();
        data.insert("name".into(), Value::from("Yamada Kensetsu"));
        let record = Record::new("customers", data);
        let wire = serde_json::to_value(&record).unwrap();
        assert_eq!(wire["name"], "Yamada Kensetsu");
        assert_eq!(wire["isActive"], true);
        assert!(wire.get("resource").is_none());
    }
}
