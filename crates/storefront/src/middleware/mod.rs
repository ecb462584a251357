//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing, `request_id` span field)
//! 3. Request ID (reuse or generate `x-request-id`)
//!
//! Identity is not a layer: handlers that need a user take [`RequireUser`].

pub mod auth;
pub mod request_id;

pub use auth::{RequireUser, USER_ID_HEADER};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
