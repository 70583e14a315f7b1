//! Caller-supplied generation intent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{AppError, DesignSettings};

/// The single content shape a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Bullets,
    Paragraph,
    Chart,
    Table,
    Quote,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Bullets,
        ContentType::Paragraph,
        ContentType::Chart,
        ContentType::Table,
        ContentType::Quote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Bullets => "bullets",
            ContentType::Paragraph => "paragraph",
            ContentType::Chart => "chart",
            ContentType::Table => "table",
            ContentType::Quote => "quote",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ContentType::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == normalized)
            .ok_or_else(|| AppError::ParseError {
                what: "content type".into(),
                details: format!(
                    "'{}' is not one of bullets, paragraph, chart, table, quote",
                    s.trim()
                ),
            })
    }
}

/// Target content-length bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ContentLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentLength::Short => "short",
            ContentLength::Medium => "medium",
            ContentLength::Long => "long",
        }
    }

    /// Guidance on how many items/sentences the model should aim for.
    pub fn item_hint(&self) -> &'static str {
        match self {
            ContentLength::Short => "2-3",
            ContentLength::Medium => "3-5",
            ContentLength::Long => "5-7",
        }
    }
}

impl FromStr for ContentLength {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(ContentLength::Short),
            "medium" => Ok(ContentLength::Medium),
            "long" => Ok(ContentLength::Long),
            other => Err(AppError::ParseError {
                what: "content length".into(),
                details: format!("'{}' is not one of short, medium, long", other),
            }),
        }
    }
}

/// Everything the caller wants from one generation run. Immutable during the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub prompt: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default)]
    pub length: ContentLength,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub with_image: bool,
    /// Design values that always win over anything the model proposes.
    #[serde(default)]
    pub design: DesignSettings,
}

fn default_audience() -> String {
    "general".to_string()
}

fn default_tone() -> String {
    "professional".to_string()
}

impl GenerationParams {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            audience: default_audience(),
            tone: default_tone(),
            length: ContentLength::default(),
            content_type: None,
            with_image: false,
            design: DesignSettings::default(),
        }
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn with_image(mut self, with_image: bool) -> Self {
        self.with_image = with_image;
        self
    }

    /// Content shape that enforcement will produce.
    pub fn effective_content_type(&self) -> ContentType {
        self.content_type.unwrap_or(ContentType::Bullets)
    }
}
