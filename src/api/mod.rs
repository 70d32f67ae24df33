// ==========================================
// Tecnova POS - API layer
// ==========================================
// Responsibility: business entry points called by the HTTP layer
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult, ErrorBody};
pub use import_api::{ImportApi, ImportRequest, RateLimitSettings};
