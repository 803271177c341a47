//! # creditx API
//!
//! HTTP surface of the scoring service: the actix-web application, the
//! shared [`ServiceState`], and the error-to-status mapping.

pub mod error;
pub mod rest;
pub mod state;

pub use error::ApiError;
pub use rest::{configure, RestApi};
pub use state::ServiceState;
