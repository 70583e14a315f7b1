//! Prompt text source port definition.

use crate::domain::{AppError, GenerationParams, StageName};

/// Source of the system instruction and per-stage prompts.
pub trait PromptCatalog: Send + Sync {
    /// Fixed instruction sent as the first message of every call.
    fn system_instruction(&self) -> &str;

    /// Stage-specific instruction rendered for `params`.
    fn stage_prompt(&self, stage: StageName, params: &GenerationParams) -> Result<String, AppError>;
}
