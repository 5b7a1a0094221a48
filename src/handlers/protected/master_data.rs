use anyhow::Context;
use axum::extract::State;
use futures::future::try_join_all;
use serde_json::{Map, Value};

use crate::auth::Session;
use crate::error::{run_operation, OperationError};
use crate::middleware::{ApiResponse, ApiResult};
use crate::resources::master_resources;
use crate::state::AppState;

/// GET /api/master-data
///
/// All active master lists keyed by resource name. The lists are fetched
/// concurrently; the response is built once every fetch has completed.
pub async fn get(State(state): State<AppState>, _session: Session) -> ApiResult<Map<String, Value>> {
    let specs = master_resources();

    let payload = run_operation("Fetch master data", async {
        let fetches = specs.iter().map(|spec| state.store.list_records(spec.name, false));
        let lists = try_join_all(fetches).await?;

        let mut payload = Map::new();
        for (spec, records) in specs.iter().zip(lists) {
            let records: Vec<_> = records.into_iter().map(|r| spec.present(r)).collect();
            let list = serde_json::to_value(records).context("Serialize master data list")?;
            payload.insert(spec.name.to_string(), list);
        }
        Ok::<_, OperationError>(payload)
    })
    .await?;

    Ok(ApiResponse::success(payload).with_cache(state.config.list_cache()))
}
