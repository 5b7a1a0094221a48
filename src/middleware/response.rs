use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// `Cache-Control` advertised on a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    NoStore,
    /// Short private window for list-type data that may be briefly stale.
    ShortPrivate { max_age_secs: u64, stale_while_revalidate_secs: u64 },
}

impl CachePolicy {
    pub fn header_value(&self) -> String {
        match self {
            CachePolicy::NoStore => "no-store".to_string(),
            CachePolicy::ShortPrivate {
                max_age_secs,
                stale_while_revalidate_secs,
            } => format!(
                "private, max-age={}, stale-while-revalidate={}",
                max_age_secs, stale_while_revalidate_secs
            ),
        }
    }
}

/// Successful response: the domain payload serialized as-is, plus status and
/// optional cache header.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    pub cache: Option<CachePolicy>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
            cache: None,
        }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self {
            data,
            status_code: Some(StatusCode::CREATED),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn no_store(self) -> Self {
        self.with_cache(CachePolicy::NoStore)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let body = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => return ApiError::server_error("Serialize response", e).into_response(),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(cache) = self.cache {
            if let Ok(value) = HeaderValue::from_str(&cache.header_value()) {
                response.headers_mut().insert(header::CACHE_CONTROL, value);
            }
        }
        response
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn created_sets_status_and_header() {
        let response = ApiResponse::created(json!({ "id": "x" }))
            .with_cache(CachePolicy::NoStore)
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[test]
    fn short_private_header_format() {
        let policy = CachePolicy::ShortPrivate {
            max_age_secs: 60,
            stale_while_revalidate_secs: 300,
        };
        assert_eq!(policy.header_value(), "private, max-age=60, stale-while-revalidate=300");
    }
}
