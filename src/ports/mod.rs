mod model_client;
mod prompt_catalog;

pub use model_client::{ChatMessage, ChatRequest, ChatRole, ModelClient};
pub use prompt_catalog::PromptCatalog;
