//! Generate command implementation.

use clap::Args;

use super::output::{OutputFormat, render};
use crate::domain::{AppError, ContentLength, ContentType, DesignSettings, GenerationParams};

/// Design values that override anything the model proposes.
#[derive(Debug, Clone, Default, Args)]
pub struct DesignArgs {
    /// Theme name
    #[arg(long)]
    pub theme: Option<String>,
    /// Accent color, e.g. #1f6feb
    #[arg(long)]
    pub accent_color: Option<String>,
    /// Background color
    #[arg(long)]
    pub background_color: Option<String>,
    /// Font family
    #[arg(long)]
    pub font_family: Option<String>,
}

impl From<DesignArgs> for DesignSettings {
    fn from(args: DesignArgs) -> Self {
        DesignSettings {
            theme: args.theme,
            background_color: args.background_color,
            accent_color: args.accent_color,
            font_family: args.font_family,
        }
    }
}

pub struct GenerateArgs {
    pub prompt: String,
    pub audience: String,
    pub tone: String,
    pub length: ContentLength,
    pub content_type: Option<ContentType>,
    pub with_image: bool,
    pub design: DesignArgs,
}

impl From<GenerateArgs> for GenerationParams {
    fn from(args: GenerateArgs) -> Self {
        GenerationParams {
            prompt: args.prompt,
            audience: args.audience,
            tone: args.tone,
            length: args.length,
            content_type: args.content_type,
            with_image: args.with_image,
            design: args.design.into(),
        }
    }
}

pub fn run_generate(args: GenerateArgs, format: OutputFormat) -> Result<(), AppError> {
    if args.prompt.trim().is_empty() {
        return Err(AppError::config_error("Prompt must not be empty"));
    }

    let params = GenerationParams::from(args);
    let spec = crate::generate(&params)?;
    println!("{}", render(&spec, format)?.trim_end());
    Ok(())
}
