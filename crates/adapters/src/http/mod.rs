//! HTTP infrastructure

mod gateway;

pub use gateway::{request_timeout_ms, HttpGateway, DEFAULT_REQUEST_TIMEOUT_MS};
