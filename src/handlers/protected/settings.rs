use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::api::format::{body_object, optional_field};
use crate::auth::{Role, Session};
use crate::database::models::{ScheduleSettings, DEFAULT_KEY};
use crate::error::{run_operation, ApiError, OperationError};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const WRITE_ROLES: &[Role] = &[Role::Admin, Role::Manager];

/// GET /api/settings/schedule
///
/// Creates the default row on first access.
pub async fn get(State(state): State<AppState>, _session: Session) -> ApiResult<ScheduleSettings> {
    let settings = run_operation("Fetch schedule settings", async {
        if let Some(row) = state.store.find_settings(DEFAULT_KEY).await? {
            return Ok(ScheduleSettings::from(row));
        }
        tracing::info!("No schedule settings yet; creating defaults");
        // A row saved concurrently wins over the defaults
        let row = state
            .store
            .insert_settings_if_absent(ScheduleSettings::defaults().to_row())
            .await?;
        Ok::<_, OperationError>(ScheduleSettings::from(row))
    })
    .await?;

    Ok(ApiResponse::success(settings).no_store())
}

/// POST /api/settings/schedule
///
/// `totalMembers` is required; list fields are replaced when present.
pub async fn post(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ScheduleSettings> {
    session.require_role(WRITE_ROLES)?;

    let body = body_object(body)?;
    let total_members = parse_total_members(body.get("totalMembers"))?;
    let display_order: Option<Option<Vec<String>>> =
        optional_field(&body, "displayOrder", "an array of strings")?;
    let hidden_member_ids: Option<Option<Vec<String>>> =
        optional_field(&body, "hiddenMemberIds", "an array of strings")?;

    let settings = run_operation("Update schedule settings", async {
        let mut settings = match state.store.find_settings(DEFAULT_KEY).await? {
            Some(row) => ScheduleSettings::from(row),
            None => ScheduleSettings::defaults(),
        };
        settings.total_members = total_members;
        if let Some(order) = display_order {
            settings.display_order = order.unwrap_or_default();
        }
        if let Some(hidden) = hidden_member_ids {
            settings.hidden_member_ids = hidden.unwrap_or_default();
        }
        settings.updated_at = Utc::now();

        let row = state.store.upsert_settings(settings.to_row()).await?;
        Ok::<_, OperationError>(ScheduleSettings::from(row))
    })
    .await?;

    tracing::info!("Schedule settings updated by {}", session.user.id);
    Ok(ApiResponse::success(settings).no_store())
}

fn parse_total_members(value: Option<&Value>) -> Result<i32, ApiError> {
    value
        .and_then(Value::as_i64)
        .filter(|n| *n >= 1)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| ApiError::validation("totalMembers must be a number >= 1"))
}
