//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories here only translate between Diesel rows and domain types.
//! Row structs and the schema stay private to this module; every database
//! failure is mapped onto the owning port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use hive_backend::outbound::persistence::{DbPool, DieselTaskRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/hive")).await?;
//! let tasks = DieselTaskRepository::new(pool);
//! ```

mod diesel_chat_message_repository;
mod diesel_github_credentials_repository;
mod diesel_swarm_repository;
mod diesel_task_repository;
mod diesel_workspace_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_chat_message_repository::DieselChatMessageRepository;
pub use diesel_github_credentials_repository::DieselGithubCredentialsRepository;
pub use diesel_swarm_repository::DieselSwarmRepository;
pub use diesel_task_repository::DieselTaskRepository;
pub use diesel_workspace_repository::DieselWorkspaceRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
