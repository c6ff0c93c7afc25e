//! Observability module - request correlation for logs.

mod request_id;

pub use request_id::RequestIdMiddleware;
