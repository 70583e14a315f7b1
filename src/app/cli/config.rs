//! Config command implementation.

use crate::domain::AppError;

pub fn run_config() -> Result<(), AppError> {
    let config = crate::resolved_config()?;
    let rendered = toml::to_string_pretty(&config).map_err(|e| AppError::Serialize {
        what: "configuration".into(),
        details: e.to_string(),
    })?;
    println!("{}", rendered.trim_end());
    Ok(())
}
