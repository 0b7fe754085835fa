//! Pool Manager outbound adapter.
//!
//! A thin reqwest client for the Pool Manager REST API implementing the
//! `PoolManager` port.

mod dto;
mod http_client;

pub use http_client::PoolManagerHttpClient;
