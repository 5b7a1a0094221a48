use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::format::body_object;
use crate::auth::{Role, Session};
use crate::database::models::Remark;
use crate::error::{run_operation, ApiError, OperationError};
use crate::middleware::{ApiResponse, ApiResult};
use crate::resources::is_date_key;
use crate::state::AppState;

const WRITE_ROLES: &[Role] = &[Role::Admin, Role::Manager];

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

fn date_param(name: &str, value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(v) if !is_date_key(v) => Err(ApiError::validation(format!("{} must be a date (YYYY-MM-DD)", name))),
        _ => Ok(()),
    }
}

/// GET /api/remarks?from=YYYY-MM-DD&to=YYYY-MM-DD
pub async fn list(
    State(state): State<AppState>,
    _session: Session,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Vec<Remark>> {
    date_param("from", range.from.as_deref())?;
    date_param("to", range.to.as_deref())?;

    let remarks = run_operation("Fetch remarks", async {
        let remarks = state
            .store
            .list_remarks(range.from.as_deref(), range.to.as_deref())
            .await?;
        Ok::<_, OperationError>(remarks)
    })
    .await?;

    Ok(ApiResponse::success(remarks).no_store())
}

/// POST /api/remarks
///
/// Upserts the remark for `dateKey`; blank text deletes it instead.
pub async fn post(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    session.require_role(WRITE_ROLES)?;

    let body = body_object(body)?;
    let date_key = match body.get("dateKey").and_then(Value::as_str) {
        Some(key) if is_date_key(key) => key.to_string(),
        _ => return Err(ApiError::validation("dateKey is required (YYYY-MM-DD)")),
    };
    let text = match body.get("text") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(_) => return Err(ApiError::validation("text must be a string")),
    };

    let payload = run_operation("Save remark", async {
        if text.is_empty() {
            state.store.delete_remark(&date_key).await?;
            return Ok(json!({ "success": true, "deleted": true }));
        }

        let remark = state
            .store
            .upsert_remark(Remark {
                date_key: date_key.clone(),
                text,
                updated_by: Some(session.user.id.clone()),
                updated_at: Utc::now(),
            })
            .await?;
        Ok::<_, OperationError>(json!({ "success": true, "remark": remark }))
    })
    .await?;

    Ok(ApiResponse::success(payload))
}
