pub mod cancellation;
pub mod classified_error;
pub mod classifier;
pub mod config;
pub mod enforcement;
pub mod error;
pub mod params;
pub mod recovery;
pub mod schema;
pub mod spec;
pub mod stage;

pub use cancellation::{CancellationToken, Cancelled};
pub use classified_error::{ClassifiedError, ErrorKind};
pub use classifier::{ModelCallError, RawFailure, classify};
pub use config::{ModelConfig, PipelineConfig, RetryConfig};
pub use enforcement::{PLACEHOLDER_PARAGRAPH, enforce, enforce_as, placeholder_spec};
pub use error::AppError;
pub use params::{ContentLength, ContentType, GenerationParams};
pub use recovery::{PLACEHOLDER_TITLE, recover};
pub use schema::validate;
pub use spec::{
    ChartData, ChartKind, ChartSeries, ContentShape, DesignSettings, FinalSpec, Layout,
    PartialSpec, QuoteData, TableData,
};
pub use stage::{AttemptOutcome, ModelTier, StageAttempt, StageName};
