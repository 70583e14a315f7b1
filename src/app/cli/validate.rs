//! Validate command implementation.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::output::{OutputFormat, render};
use crate::domain::{AppError, ContentType};

pub fn run_validate(
    file: &Path,
    content_type: Option<ContentType>,
    with_image: bool,
    format: OutputFormat,
) -> Result<i32, AppError> {
    let content = fs::read_to_string(file)?;
    let raw = parse_document(file, &content)?;

    match crate::validate_spec(&raw, content_type, with_image) {
        Ok(spec) => {
            println!("{}", render(&spec, format)?.trim_end());
            Ok(0)
        }
        Err(AppError::InvalidSpec(errors)) => {
            eprintln!("❌ {} is not a valid slide specification:", file.display());
            for error in &errors {
                eprintln!("  • {}", error);
            }
            Ok(1)
        }
        Err(e) => Err(e),
    }
}

/// JSON by extension or leading brace, YAML otherwise.
fn parse_document(file: &Path, content: &str) -> Result<Value, AppError> {
    let is_json = file.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        || content.trim_start().starts_with('{');

    if is_json {
        serde_json::from_str(content).map_err(|e| AppError::ParseError {
            what: file.display().to_string(),
            details: e.to_string(),
        })
    } else {
        serde_yaml::from_str(content).map_err(|e| AppError::ParseError {
            what: file.display().to_string(),
            details: e.to_string(),
        })
    }
}
