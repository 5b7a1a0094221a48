use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::format::{body_object, flag};
use crate::auth::Session;
use crate::database::models::Record;
use crate::error::{run_operation, ApiError, OperationError};
use crate::middleware::{ApiResponse, ApiResult};
use crate::resources::{self, DeletePolicy, ResourceSpec};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// `true` includes soft-deleted records.
    pub include_inactive: Option<String>,
    /// Substring search over the resource's search fields.
    pub q: Option<String>,
}

fn resource_spec(name: &str) -> Result<&'static ResourceSpec, ApiError> {
    resources::lookup(name).ok_or_else(|| ApiError::not_found("Resource"))
}

/// Ids that are not UUIDs cannot exist.
fn record_id(spec: &ResourceSpec, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(spec.label))
}

fn op_label(verb: &str, spec: &ResourceSpec) -> String {
    format!("{} {}", verb, spec.label.to_lowercase())
}

/// GET /api/resources/:resource
pub async fn list(
    State(state): State<AppState>,
    _session: Session,
    Path(resource): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Record>> {
    let spec = resource_spec(&resource)?;
    let include_inactive = flag(query.include_inactive.as_deref());

    let records = run_operation(&format!("Fetch {}", spec.name), async {
        let records = state.store.list_records(spec.name, include_inactive).await?;
        Ok::<_, OperationError>(records)
    })
    .await?;

    let records = records
        .into_iter()
        .filter(|r| query.q.as_deref().map_or(true, |q| spec.matches(r, q)))
        .map(|r| spec.present(r))
        .collect();

    Ok(ApiResponse::success(records).with_cache(state.config.list_cache()))
}

/// POST /api/resources/:resource
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Path(resource): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    let spec = resource_spec(&resource)?;
    session.require_role(spec.write_roles)?;

    let mut data = body_object(body)?;
    spec.validate_create(&data)?;
    spec.encode_json_fields(&mut data);

    let record = run_operation(&op_label("Create", spec), async {
        let record = state.store.insert_record(spec.name, data).await?;
        Ok::<_, OperationError>(record)
    })
    .await?;

    tracing::info!("{} {} created by {}", spec.label, record.id, session.user.id);
    Ok(ApiResponse::created(spec.present(record)))
}

/// GET /api/resources/:resource/:id
pub async fn show(
    State(state): State<AppState>,
    _session: Session,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Record> {
    let spec = resource_spec(&resource)?;
    let id = record_id(spec, &id)?;

    let record = run_operation(&op_label("Fetch", spec), async {
        let record = state.store.find_record(spec.name, id).await?;
        Ok::<_, OperationError>(record.ok_or_else(|| ApiError::not_found(spec.label))?)
    })
    .await?;

    Ok(ApiResponse::success(spec.present(record)).no_store())
}

/// PUT /api/resources/:resource/:id
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path((resource, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    let spec = resource_spec(&resource)?;
    session.require_role(spec.write_roles)?;
    let id = record_id(spec, &id)?;

    let mut changes = body_object(body)?;
    spec.validate_update(&changes)?;
    spec.encode_json_fields(&mut changes);

    let record = run_operation(&op_label("Update", spec), async {
        let record = state.store.update_record(spec.name, id, changes).await?;
        Ok::<_, OperationError>(record.ok_or_else(|| ApiError::not_found(spec.label))?)
    })
    .await?;

    Ok(ApiResponse::success(spec.present(record)))
}

/// DELETE /api/resources/:resource/:id
///
/// Soft delete (`isActive = false`) unless the resource is ephemeral.
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let spec = resource_spec(&resource)?;
    session.require_role(spec.write_roles)?;
    let id = record_id(spec, &id)?;

    run_operation(&op_label("Delete", spec), async {
        let found = match spec.delete {
            DeletePolicy::Soft => state.store.set_record_active(spec.name, id, false).await?.is_some(),
            DeletePolicy::Hard => state.store.delete_record(spec.name, id).await?,
        };
        if !found {
            return Err(ApiError::not_found(spec.label).into());
        }
        Ok::<_, OperationError>(())
    })
    .await?;

    tracing::info!("{} {} deleted by {}", spec.label, id, session.user.id);
    Ok(ApiResponse::success(json!({ "success": true })))
}

/// POST /api/resources/:resource/:id/restore
pub async fn restore(
    State(state): State<AppState>,
    session: Session,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Record> {
    let spec = resource_spec(&resource)?;
    session.require_role(spec.write_roles)?;
    let id = record_id(spec, &id)?;

    if spec.delete == DeletePolicy::Hard {
        return Err(ApiError::validation(format!("{} cannot be restored", spec.label)));
    }

    let record = run_operation(&op_label("Restore", spec), async {
        let record = state.store.set_record_active(spec.name, id, true).await?;
        Ok::<_, OperationError>(record.ok_or_else(|| ApiError::not_found(spec.label))?)
    })
    .await?;

    Ok(ApiResponse::success(spec.present(record)))
}
