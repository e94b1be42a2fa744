//! Request middleware and the extractors that read what it stores.

pub mod auth;
pub mod request_id;

pub use auth::{AuthUser, auth_middleware};
pub use request_id::{CorrelationId, REQUEST_ID_HEADER, strip_blank_request_id};
