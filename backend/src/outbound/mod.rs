//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **pool_manager**: REST client for the container Pool Manager
//! - **object_storage**: S3 presigning and deletes for workspace logos
//! - **language_model**: Anthropic Messages API client
//! - **crypto**: AES-256-GCM field cipher
//!
//! Adapters translate between domain types and wire or row formats. They
//! contain no business logic.

pub mod crypto;
mod http_body;
pub mod language_model;
pub mod object_storage;
pub mod persistence;
pub mod pool_manager;
