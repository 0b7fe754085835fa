//! HTTP inbound adapter exposing REST endpoints.

pub mod agent;
pub mod envelope;
pub mod error;
pub mod health;
pub mod login;
pub mod pool_manager;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod tasks;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod workspace_images;

pub use error::ApiResult;
