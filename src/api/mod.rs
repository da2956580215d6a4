//! HTTP API surface.
//!
//! Two route families: `/api/files` proxies the content store with the
//! portal's `{success, data}` envelope, and `/api/tracker/*` serves the
//! views derived from the task tracker document.

mod files;
mod routes;
mod tracker;
mod types;

pub use routes::{router, serve, AppState};
pub use types::ApiResponse;
