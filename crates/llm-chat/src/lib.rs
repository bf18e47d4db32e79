//! `llm-chat`. Minimal async client for OpenAI-compatible chat completions.
//!
//! # Architecture
//!
//! ```text
//! ChatConfig ──► ChatClient::complete(&[ChatMessage])
//!                    │  POST {base_url}/chat/completions
//!                    ▼
//!                Completion { content, model, usage }
//! ```
//!
//! The client performs exactly one request per call. Retries and fallbacks
//! belong to the caller.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use llm_chat::{ChatClient, ChatConfig, ChatMessage};
//!
//! let client = ChatClient::new(ChatConfig {
//!     api_key: Some(key),
//!     ..ChatConfig::default()
//! })?;
//! let reply = client
//!     .complete(&[ChatMessage::system("Be brief."), ChatMessage::user("hello")])
//!     .await?;
//! println!("{}", reply.content);
//! ```

pub mod client;
pub mod error;
pub mod types;


pub use client::{ChatClient, ChatConfig};
pub use error::ChatError;
pub use types::{ChatMessage, ChatRole, Completion, TokenUsage};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ChatError>;
