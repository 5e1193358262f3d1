pub mod error;
pub mod factory;
pub mod http;
pub mod types;

pub mod anthropic;
pub mod mock;
pub mod openai;

pub use error::ProviderError;
pub use factory::{ProviderKind, ProviderSettings, create_provider};
pub use types::ApiKey;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAIProvider;
