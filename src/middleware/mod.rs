pub mod auth;
pub mod response;

pub use response::{ApiResponse, ApiResult, CachePolicy};
