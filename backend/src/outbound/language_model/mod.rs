//! Language model outbound adapters.

mod anthropic;
mod sse;

pub use anthropic::{AnthropicConfig, AnthropicLanguageModel};
