//! CLI Adapter.

mod config;
mod generate;
mod output;
mod validate;

use clap::{Parser, Subcommand};

use crate::domain::{AppError, ContentLength, ContentType};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "deckchain")]
#[command(version)]
#[command(
    about = "Generate structured slide specifications through chained model calls",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a slide specification from a prompt
    #[clap(visible_alias = "g")]
    Generate {
        /// What the slide is about
        prompt: String,
        /// Intended audience
        #[arg(long, default_value = "general")]
        audience: String,
        /// Writing tone
        #[arg(long, default_value = "professional")]
        tone: String,
        /// Amount of content: short, medium or long
        #[arg(long, default_value = "medium")]
        length: ContentLength,
        /// Content shape: bullets, paragraph, chart, table or quote
        #[arg(short = 'c', long)]
        content_type: Option<ContentType>,
        /// Run the image-prompt stage
        #[arg(short = 'i', long)]
        with_image: bool,
        #[command(flatten)]
        design: generate::DesignArgs,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Validate, repair and enforce a slide specification file (JSON or YAML)
    #[clap(visible_alias = "v")]
    Validate {
        /// Path to the specification file
        file: std::path::PathBuf,
        /// Content shape to enforce (defaults to bullets)
        #[arg(short = 'c', long)]
        content_type: Option<ContentType>,
        /// Keep image prompts and image layouts
        #[arg(short = 'i', long)]
        with_image: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print the resolved configuration
    Config,
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();

    let result: Result<i32, AppError> = match cli.command {
        Commands::Generate {
            prompt,
            audience,
            tone,
            length,
            content_type,
            with_image,
            design,
            format,
        } => {
            let params = generate::GenerateArgs {
                prompt,
                audience,
                tone,
                length,
                content_type,
                with_image,
                design,
            };
            generate::run_generate(params, format).map(|_| 0)
        }
        Commands::Validate { file, content_type, with_image, format } => {
            validate::run_validate(&file, content_type, with_image, format)
        }
        Commands::Config => config::run_config().map(|_| 0),
    };

    match result {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
