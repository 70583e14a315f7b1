//! Generation stages and per-attempt bookkeeping.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::ErrorKind;

/// One of the four sequential generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageName {
    /// Slide content from the raw prompt.
    Content,
    /// Layout refinement of the content stage output.
    Layout,
    /// Image prompt generation. Skipped when images are disabled.
    Image,
    /// Final polish of the latest output.
    Refinement,
}

impl StageName {
    pub const ALL: [StageName; 4] =
        [StageName::Content, StageName::Layout, StageName::Image, StageName::Refinement];

    /// Stages to run, in order, for a generation.
    pub fn sequence(with_image: bool) -> Vec<StageName> {
        Self::ALL.into_iter().filter(|stage| with_image || *stage != StageName::Image).collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Content => "content",
            StageName::Layout => "layout",
            StageName::Image => "image",
            StageName::Refinement => "refinement",
        }
    }

    /// Only the content stage may degrade to a placeholder instead of failing.
    pub fn degrades_to_placeholder(&self) -> bool {
        matches!(self, StageName::Content)
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which configured model served an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Primary,
    Fallback,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Primary => "primary",
            ModelTier::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single stage attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    Failed(ErrorKind),
}

/// Ephemeral record of one stage execution. Logged, then dropped.
#[derive(Debug, Clone)]
pub struct StageAttempt {
    pub stage: StageName,
    /// 1-based attempt counter across both model tiers.
    pub attempt: u32,
    pub tier: ModelTier,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub outcome: AttemptOutcome,
}
