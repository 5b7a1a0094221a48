use axum::extract::{Path, State};

use crate::auth::Session;
use crate::client::PostalAddress;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/postal-code/:code - `null` when the code is malformed or unknown
pub async fn get(
    State(state): State<AppState>,
    _session: Session,
    Path(code): Path<String>,
) -> ApiResult<Option<PostalAddress>> {
    let address = state.postal.lookup(&code).await;
    Ok(ApiResponse::success(address).with_cache(state.config.list_cache()))
}
