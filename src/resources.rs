//! Registry of CRUD resources served under `/api/resources/:resource`.

use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use crate::api::codec;
use crate::auth::Role;
use crate::client::customer_filter::normalize_search;
use crate::database::models::Record;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Flip `isActive` to false.
    Soft,
    /// Ephemeral rows are physically removed.
    Hard,
}

#[derive(Debug)]
pub struct ResourceSpec {
    pub name: &'static str,
    /// Human label used in messages ("Customer not found").
    pub label: &'static str,
    pub required: &'static [&'static str],
    /// Fields holding `YYYY-MM-DD` dates.
    pub date_fields: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub write_roles: &'static [Role],
    pub delete: DeletePolicy,
    /// Included in `GET /api/master-data`.
    pub master: bool,
    /// List fields persisted as JSON text. Read back as `[]` when the
    /// stored text is absent or malformed.
    pub json_fields: &'static [&'static str],
}

const OFFICE: &[Role] = &[Role::Admin, Role::Manager];
const EVERYONE: &[Role] = &[Role::Admin, Role::Manager, Role::Staff];

static RESOURCES: Lazy<HashMap<&'static str, ResourceSpec>> = Lazy::new(|| {
    let specs = [
        ResourceSpec {
            name: "customers",
            label: "Customer",
            required: &["name"],
            date_fields: &[],
            search_fields: &["name", "nameKana", "phone", "address"],
            write_roles: OFFICE,
            delete: DeletePolicy::Soft,
            master: false,
            json_fields: &[],
        },
        ResourceSpec {
            name: "projects",
            label: "Project",
            required: &["name", "customerId"],
            date_fields: &["startDate", "endDate"],
            search_fields: &["name", "siteAddress", "status"],
            write_roles: OFFICE,
            delete: DeletePolicy::Soft,
            master: false,
            json_fields: &["memberIds"],
        },
        ResourceSpec {
            name: "estimates",
            label: "Estimate",
            required: &["customerId", "title"],
            date_fields: &["issueDate", "validUntil"],
            search_fields: &["title", "estimateNumber"],
            write_roles: OFFICE,
            delete: DeletePolicy::Soft,
            master: false,
            json_fields: &["items"],
        },
        ResourceSpec {
            name: "invoices",
            label: "Invoice",
            required: &["customerId", "title"],
            date_fields: &["issueDate", "dueDate"],
            search_fields: &["title", "invoiceNumber"],
            write_roles: OFFICE,
            delete: DeletePolicy::Soft,
            master: false,
            json_fields: &["items"],
        },
        ResourceSpec {
            name: "daily_reports",
            label: "Daily report",
            required: &["date", "projectId"],
            date_fields: &["date"],
            search_fields: &["content", "weather"],
            write_roles: EVERYONE,
            delete: DeletePolicy::Soft,
            master: false,
            json_fields: &["workerIds", "photos"],
        },
        ResourceSpec {
            name: "dispatch_schedules",
            label: "Dispatch schedule",
            required: &["date", "projectId"],
            date_fields: &["date"],
            search_fields: &["note"],
            write_roles: OFFICE,
            delete: DeletePolicy::Hard,
            master: false,
            json_fields: &["memberIds", "vehicleIds"],
        },
        ResourceSpec {
            name: "vacation_records",
            label: "Vacation record",
            required: &["date", "staffId"],
            date_fields: &["date"],
            search_fields: &["reason"],
            write_roles: EVERYONE,
            delete: DeletePolicy::Hard,
            master: false,
            json_fields: &[],
        },
        ResourceSpec {
            name: "work_types",
            label: "Work type",
            required: &["name"],
            date_fields: &[],
            search_fields: &["name"],
            write_roles: OFFICE,
            delete: DeletePolicy::Soft,
            master: true,
            json_fields: &[],
        },
        ResourceSpec {
            name: "vehicles",
            label: "Vehicle",
            required: &["name"],
            date_fields: &["inspectionDate"],
            search_fields: &["name", "plateNumber"],
            write_roles: OFFICE,
            delete: DeletePolicy::Soft,
            master: true,
            json_fields: &[],
        },
        ResourceSpec {
            name: "staff",
            label: "Staff member",
            required: &["name"],
            date_fields: &[],
            search_fields: &["name", "nameKana"],
            write_roles: OFFICE,
            delete: DeletePolicy::Soft,
            master: true,
            json_fields: &["qualifications"],
        },
        ResourceSpec {
            name: "suppliers",
            label: "Supplier",
            required: &["name"],
            date_fields: &[],
            search_fields: &["name", "phone"],
            write_roles: OFFICE,
            delete: DeletePolicy::Soft,
            master: true,
            json_fields: &[],
        },
    ];
    specs.into_iter().map(|spec| (spec.name, spec)).collect()
});

pub fn lookup(name: &str) -> Option<&'static ResourceSpec> {
    RESOURCES.get(name)
}

/// Master-data resources, in a stable order.
pub fn master_resources() -> Vec<&'static ResourceSpec> {
    let mut specs: Vec<_> = RESOURCES.values().filter(|spec| spec.master).collect();
    specs.sort_by_key(|spec| spec.name);
    specs
}

impl ResourceSpec {
    /// Checks a create payload: every required field is a non-empty string
    /// and every date field present parses as `YYYY-MM-DD`.
    pub fn validate_create(&self, data: &Map<String, Value>) -> Result<(), ApiError> {
        for field in self.required {
            match data.get(*field) {
                Some(Value::String(s)) if !s.trim().is_empty() => {}
                _ => return Err(ApiError::validation(format!("{} is required", field))),
            }
        }
        self.validate_dates(data)?;
        self.validate_lists(data)
    }

    /// Checks an update payload: required fields may be omitted but not blanked.
    pub fn validate_update(&self, data: &Map<String, Value>) -> Result<(), ApiError> {
        for field in self.required {
            match data.get(*field) {
                None => {}
                Some(Value::String(s)) if !s.trim().is_empty() => {}
                Some(_) => return Err(ApiError::validation(format!("{} must not be empty", field))),
            }
        }
        self.validate_dates(data)?;
        self.validate_lists(data)
    }

    fn validate_lists(&self, data: &Map<String, Value>) -> Result<(), ApiError> {
        for field in self.json_fields {
            match data.get(*field) {
                None | Some(Value::Null) | Some(Value::Array(_)) => {}
                Some(_) => return Err(ApiError::validation(format!("{} must be an array", field))),
            }
        }
        Ok(())
    }

    fn validate_dates(&self, data: &Map<String, Value>) -> Result<(), ApiError> {
        for field in self.date_fields {
            match data.get(*field) {
                None | Some(Value::Null) => {}
                Some(Value::String(s)) if is_date_key(s) => {}
                Some(_) => {
                    return Err(ApiError::validation(format!("{} must be a date (YYYY-MM-DD)", field)));
                }
            }
        }
        Ok(())
    }

    /// Serialize structured JSON fields to text before persisting.
    pub fn encode_json_fields(&self, data: &mut Map<String, Value>) {
        for field in self.json_fields {
            if let Some(value) = data.get_mut(*field) {
                *value = match codec::encode(Some(&*value)) {
                    Some(raw) => Value::String(raw),
                    None => Value::Null,
                };
            }
        }
    }

    /// Decode JSON text fields of a stored record for the response.
    pub fn present(&self, mut record: Record) -> Record {
        if self.json_fields.is_empty() {
            return record;
        }
        let defaults: Map<String, Value> = self.json_fields.iter().map(|f| (f.to_string(), json!([]))).collect();
        record.data = codec::decode_fields(&record.data, &defaults);
        record
    }

    /// Case-insensitive substring match over the resource's search fields.
    pub fn matches(&self, record: &Record, query: &str) -> bool {
        let needle = normalize_search(query);
        if needle.is_empty() {
            return true;
        }
        self.search_fields
            .iter()
            .filter_map(|field| record.str_field(field))
            .any(|value| normalize_search(value).contains(&needle))
    }
}

pub fn is_date_key(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn registry_lookup() {
        assert_eq!(lookup("customers").unwrap().label, "Customer");
        assert_eq!(lookup("vacation_records").unwrap().delete, DeletePolicy::Hard);
        assert!(lookup("payroll").is_none());
        let masters: Vec<_> = master_resources().iter().map(|s| s.name).collect();
        assert_eq!(masters, vec!["staff", "suppliers", "vehicles", "work_types"]);
    }

    #[test]
    fn create_requires_non_empty_strings() {
        let spec = lookup("projects").unwrap();
        assert!(spec.validate_create(&obj(json!({"name": "Bridge", "customerId": "c1"}))).is_ok());
        let err = spec.validate_create(&obj(json!({"name": "  ", "customerId": "c1"}))).unwrap_err();
        assert_eq!(err.message(), "name is required");
        let err = spec.validate_create(&obj(json!({"name": "Bridge", "customerId": 7}))).unwrap_err();
        assert_eq!(err.message(), "customerId is required");
    }

    #[test]
    fn dates_must_be_calendar_days() {
        let spec = lookup("daily_reports").unwrap();
        assert!(spec.validate_create(&obj(json!({"date": "2024-02-29", "projectId": "p"}))).is_ok());
        assert!(spec.validate_create(&obj(json!({"date": "2023-02-29", "projectId": "p"}))).is_err());
        assert!(spec.validate_update(&obj(json!({"date": "29/02/2024"}))).is_err());
        assert!(spec.validate_update(&obj(json!({"content": "rain"}))).is_ok());
    }

    #[test]
    fn json_fields_persist_as_text_and_read_back_structured() {
        let spec = lookup("dispatch_schedules").unwrap();
        let mut data = obj(json!({"date": "2024-05-01", "projectId": "p", "memberIds": ["s1", "s2"], "vehicleIds": null}));
        spec.encode_json_fields(&mut data);
        assert_eq!(data["memberIds"], json!(r#"["s1","s2"]"#));
        assert_eq!(data["vehicleIds"], Value::Null);

        data.insert("vehicleIds".into(), json!("{corrupt"));
        let record = spec.present(Record::new("dispatch_schedules", data));
        assert_eq!(record.data["memberIds"], json!(["s1", "s2"]));
        assert_eq!(record.data["vehicleIds"], json!([]));
    }

    #[test]
    fn list_fields_must_be_arrays() {
        let spec = lookup("projects").unwrap();
        let err = spec
            .validate_create(&obj(json!({"name": "B", "customerId": "c", "memberIds": "s-1"})))
            .unwrap_err();
        assert_eq!(err.message(), "memberIds must be an array");
        assert!(spec.validate_update(&obj(json!({"memberIds": {"id": "s-1"}}))).is_err());
        assert!(spec.validate_update(&obj(json!({"memberIds": null}))).is_ok());
        assert!(spec.validate_update(&obj(json!({"memberIds": ["s-1"]}))).is_ok());
    }

    #[test]
    fn search_ignores_case_and_spacing() {
        let spec = lookup("customers").unwrap();
        let record = Record::new("customers", obj(json!({"name": "Yamada Kensetsu", "phone": "03-1234-5678"})));
        assert!(spec.matches(&record, "yamada"));
        assert!(spec.matches(&record, "0312345678"));
        assert!(!spec.matches(&record, "tanaka"));
        assert!(spec.matches(&record, ""));
    }
}
