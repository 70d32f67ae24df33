// ==========================================
// Tecnova POS - application layer
// ==========================================
// Responsibility: wires the APIs to the HTTP transport
// ==========================================

pub mod rate_limit;
pub mod state;

#[cfg(feature = "http")]
pub mod http;

pub use rate_limit::{RateLimiter, SlidingWindowRateLimiter};
pub use state::{get_default_db_path, AppState};

#[cfg(feature = "http")]
pub use http::{router, serve};
