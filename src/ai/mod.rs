//! AI Integration Layer
//!
//! Chat provider abstraction and the retry/pacing wrapper that every agent
//! call goes through.

pub mod provider;
pub mod retry;

pub use provider::{
    create_provider, ChatMessage, ChatProvider, OpenAiProvider, ProviderConfig, SharedProvider,
};
pub use retry::{RetryPolicy, RetryingProvider};
