use crate::auth::Session;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/auth/whoami
pub async fn whoami(session: Session) -> ApiResult<Session> {
    Ok(ApiResponse::success(session).no_store())
}
