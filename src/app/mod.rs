//! Application layer: request validation and dispatch to the services.
//!
//! [`AgentApp`] is the single entry point used by the binary. Every operation
//! returns a [`ServiceResult`]; callers render failures with
//! [`ServiceError::to_error_json`].

mod agent;
mod error;

pub use agent::{resolve_api_key, AgentApp};
pub use error::{ServiceError, ServiceResult};
