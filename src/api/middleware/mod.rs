//! Middleware components for request processing.
//!
//! Request ids, logging, metrics, error normalization, authentication and
//! rate limiting. The order they wrap the router is set in `api::routes`.

mod auth;
mod error_handler;
mod logging;
mod metrics;
mod rate_limit;
mod request_id;

pub use auth::{AuthUser, CurrentUser, auth_middleware, optional_auth_middleware, require_admin};
pub use error_handler::{error_to_code, error_to_status_code, global_error_handler, handle_panic};
pub use logging::{PROCESS_TIME_HEADER, client_ip, logging_middleware};
pub use metrics::{Metrics, metrics_middleware};
pub use rate_limit::{LIMIT_HEADER, REMAINING_HEADER, rate_limit_middleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
