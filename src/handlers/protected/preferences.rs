use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::api::format::{body_object, optional_field};
use crate::auth::Session;
use crate::database::models::UserPreferences;
use crate::error::{run_operation, OperationError};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/preferences - the caller's own row, or defaults when none is stored
pub async fn get(State(state): State<AppState>, session: Session) -> ApiResult<UserPreferences> {
    let user_id = session.user.id;

    let prefs = run_operation("Fetch preferences", async {
        let row = state.store.find_preferences(&user_id).await?;
        Ok::<_, OperationError>(row.map(UserPreferences::from).unwrap_or_else(|| UserPreferences::defaults(&user_id)))
    })
    .await?;

    Ok(ApiResponse::success(prefs).no_store())
}

/// PUT /api/preferences
pub async fn put(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<UserPreferences> {
    let user_id = session.user.id;

    let body = body_object(body)?;
    let favorites: Option<Option<Vec<String>>> =
        optional_field(&body, "favoriteProjectIds", "an array of strings")?;
    let column_order: Option<Option<Vec<String>>> = optional_field(&body, "columnOrder", "an array of strings")?;
    let default_view: Option<Option<String>> = optional_field(&body, "defaultView", "a string")?;

    let prefs = run_operation("Save preferences", async {
        let mut prefs = match state.store.find_preferences(&user_id).await? {
            Some(row) => UserPreferences::from(row),
            None => UserPreferences::defaults(&user_id),
        };
        if let Some(favorites) = favorites {
            prefs.favorite_project_ids = favorites.unwrap_or_default();
        }
        if let Some(order) = column_order {
            prefs.column_order = order;
        }
        if let Some(view) = default_view {
            prefs.default_view = view;
        }
        prefs.updated_at = Some(Utc::now());

        let row = state.store.upsert_preferences(prefs.to_row()).await?;
        Ok::<_, OperationError>(UserPreferences::from(row))
    })
    .await?;

    Ok(ApiResponse::success(prefs).no_store())
}
