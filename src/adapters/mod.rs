pub mod embedded_prompts;
pub mod http_model_client;

pub use embedded_prompts::EmbeddedPromptCatalog;
pub use http_model_client::HttpModelClient;
