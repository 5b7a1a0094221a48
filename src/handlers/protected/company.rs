use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::api::format::body_object;
use crate::auth::{Role, Session};
use crate::database::models::{BankAccount, CompanyInfo, DEFAULT_KEY};
use crate::error::{run_operation, ApiError, OperationError};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyInfoInput {
    #[serde(default)]
    name: String,
    postal_code: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    fax: Option<String>,
    email: Option<String>,
    representative: Option<String>,
    registration_number: Option<String>,
    #[serde(default)]
    bank_accounts: Vec<BankAccount>,
}

/// GET /api/company-info
pub async fn get(State(state): State<AppState>, _session: Session) -> ApiResult<CompanyInfo> {
    let info = run_operation("Fetch company info", async {
        let row = state.store.find_company_info(DEFAULT_KEY).await?;
        Ok::<_, OperationError>(row.ok_or_else(|| ApiError::not_found("Company info"))?)
    })
    .await?;

    Ok(ApiResponse::success(CompanyInfo::from(info)).no_store())
}

/// PUT /api/company-info - admin only, replaces the singleton row
pub async fn put(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<CompanyInfo> {
    session.require_role(&[Role::Admin])?;

    let body = body_object(body)?;
    let input: CompanyInfoInput = serde_json::from_value(Value::Object(body))
        .map_err(|e| ApiError::validation(format!("Invalid company info: {}", e)))?;
    if input.name.trim().is_empty() {
        return Err(ApiError::validation("name is required"));
    }

    let info = CompanyInfo {
        id: DEFAULT_KEY.to_string(),
        name: input.name.trim().to_string(),
        postal_code: input.postal_code,
        address: input.address,
        phone: input.phone,
        fax: input.fax,
        email: input.email,
        representative: input.representative,
        registration_number: input.registration_number,
        bank_accounts: input.bank_accounts,
        updated_at: Utc::now(),
    };

    let saved = run_operation("Update company info", async {
        let row = state.store.upsert_company_info(info.to_row()).await?;
        Ok::<_, OperationError>(CompanyInfo::from(row))
    })
    .await?;

    tracing::info!("Company info updated by {}", session.user.id);
    Ok(ApiResponse::success(saved).no_store())
}
