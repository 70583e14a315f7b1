//! Four-stage generation pipeline.

use std::sync::Arc;

use crate::app::backoff::BackoffPolicy;
use crate::app::controller::{StageController, StageOutcome};
use crate::domain::{
    CancellationToken, ClassifiedError, ContentType, ErrorKind, FinalSpec, GenerationParams,
    PartialSpec, PipelineConfig, StageName, enforce, enforce_as,
};
use crate::ports::{ModelClient, PromptCatalog};

/// Runs content, layout, image and refinement stages, then enforces the content shape.
///
/// A `Pipeline` holds no per-run state and can serve concurrent runs.
pub struct Pipeline {
    controller: StageController,
}

impl Pipeline {
    pub fn new(
        client: Arc<dyn ModelClient>,
        prompts: Arc<dyn PromptCatalog>,
        config: &PipelineConfig,
    ) -> Self {
        let controller = StageController::new(
            client,
            prompts,
            config.model.clone(),
            BackoffPolicy::from_config(&config.retry),
        );
        Self { controller }
    }

    pub fn generate(&self, params: &GenerationParams) -> Result<FinalSpec, ClassifiedError> {
        self.generate_with_cancel(params, &CancellationToken::new())
    }

    pub fn generate_with_cancel(
        &self,
        params: &GenerationParams,
        cancel: &CancellationToken,
    ) -> Result<FinalSpec, ClassifiedError> {
        let mut latest: Option<PartialSpec> = None;

        for stage in StageName::sequence(params.with_image) {
            match self.controller.run_stage(stage, latest.as_ref(), params, cancel)? {
                StageOutcome::Completed(spec) => latest = Some(spec),
                StageOutcome::Degraded(placeholder) => {
                    // The placeholder carries prose only; later stages are not run.
                    let shape = params.content_type.unwrap_or(ContentType::Paragraph);
                    return Ok(enforce_as(placeholder, shape, params.with_image));
                }
            }
        }

        let spec = latest.ok_or_else(|| {
            ClassifiedError::new(
                ErrorKind::Unknown,
                StageName::Refinement,
                "pipeline finished without a specification",
            )
        })?;
        Ok(enforce(spec, params))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::adapters::EmbeddedPromptCatalog;
    use crate::domain::{
        ContentShape, DesignSettings, Layout, ModelCallError, ModelConfig, PLACEHOLDER_PARAGRAPH,
        RetryConfig,
    };
    use crate::testing::{Scripted, ScriptedModelClient};

    fn config() -> PipelineConfig {
        PipelineConfig {
            model: ModelConfig {
                primary: "primary-model".to_string(),
                fallback: "fallback-model".to_string(),
                timeout_ms: 1_000,
                ..ModelConfig::default()
            },
            retry: RetryConfig { max_retries: 2, base_delay_ms: 1, max_backoff_ms: 4 },
        }
    }

    fn pipeline(client: Arc<ScriptedModelClient>) -> Pipeline {
        let prompts = EmbeddedPromptCatalog::new().expect("embedded prompts load");
        Pipeline::new(client, Arc::new(prompts), &config())
    }

    fn stage_prompt(request: &crate::ports::ChatRequest) -> &str {
        &request.messages[1].content
    }

    #[test]
    fn skips_image_stage_and_enforces_bullets() {
        let client = ScriptedModelClient::new(vec![
            Scripted::reply(json!({"title": "Roadmap", "paragraph": "Draft text."})),
            Scripted::reply(json!({"title": "Roadmap", "layout": "two-column", "paragraph": "Draft text."})),
            Scripted::reply(json!({
                "title": "Roadmap 2025",
                "layout": "two-column",
                "bullets": ["Plan", "Build", "Ship"],
                "paragraph": "Leftover prose",
                "imagePrompt": "a rocket"
            })),
        ]);

        let spec = pipeline(client.clone()).generate(&GenerationParams::new("Roadmap")).unwrap();

        assert_eq!(client.call_count(), 3);
        assert_eq!(spec.title, "Roadmap 2025");
        assert_eq!(spec.layout, Layout::TwoColumn);
        assert_eq!(
            spec.content,
            ContentShape::Bullets(vec!["Plan".into(), "Build".into(), "Ship".into()])
        );
        assert_eq!(spec.image_prompt, "");

        let requests = client.requests();
        assert!(stage_prompt(&requests[0]).starts_with("Write the content"));
        assert!(stage_prompt(&requests[1]).starts_with("Choose the best layout"));
        assert!(stage_prompt(&requests[2]).starts_with("Polish the slide"));
    }

    #[test]
    fn each_stage_sees_only_the_previous_output() {
        let client = ScriptedModelClient::new(vec![
            Scripted::reply(json!({"title": "From content"})),
            Scripted::reply(json!({"title": "From layout"})),
            Scripted::reply(json!({"title": "From image", "imagePrompt": "sunrise over hills"})),
            Scripted::reply(json!({"title": "Final", "imagePrompt": "sunrise over hills"})),
        ]);
        let params = GenerationParams::new("Morning routines").with_image(true);

        let spec = pipeline(client.clone()).generate(&params).unwrap();

        let requests = client.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[0].messages.len(), 2);
        assert!(stage_prompt(&requests[2]).starts_with("Write an image generation prompt"));
        let prior_of_refinement = &requests[3].messages[2].content;
        assert!(prior_of_refinement.contains("From image"));
        assert!(!prior_of_refinement.contains("From content"));
        assert_eq!(spec.image_prompt, "sunrise over hills");
    }

    #[test]
    fn degraded_content_stage_yields_placeholder_paragraph() {
        let client = ScriptedModelClient::new(vec![
            Scripted::fail(ModelCallError::ContentFiltered),
            Scripted::fail(ModelCallError::ContentFiltered),
        ]);

        let spec = pipeline(client.clone()).generate(&GenerationParams::new("Risky topic")).unwrap();

        assert_eq!(client.call_count(), 2);
        assert_eq!(spec.title, "Risky topic");
        match spec.content {
            ContentShape::Paragraph(text) => assert!(text.starts_with(PLACEHOLDER_PARAGRAPH)),
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn degraded_content_honours_requested_shape() {
        let client = ScriptedModelClient::new(vec![
            Scripted::text("nope"),
            Scripted::text("still nope"),
        ]);
        let params = GenerationParams::new("Sales by region").with_content_type(ContentType::Chart);

        let spec = pipeline(client).generate(&params).unwrap();

        assert!(matches!(spec.content, ContentShape::Chart(ref chart) if !chart.is_empty()));
    }

    #[test]
    fn failed_later_stage_aborts_the_run() {
        let network = || {
            Scripted::fail(ModelCallError::Transport { message: "connection reset".to_string() })
        };
        let client = ScriptedModelClient::new(vec![
            Scripted::reply(json!({"title": "Content ok"})),
            network(),
            network(),
            network(),
        ]);

        let err = pipeline(client.clone()).generate(&GenerationParams::new("Topic")).unwrap_err();

        assert_eq!(err.stage, StageName::Layout);
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(client.call_count(), 4);
    }

    #[test]
    fn caller_design_overrides_reach_final_spec() {
        let client = ScriptedModelClient::new(vec![
            Scripted::reply(json!({"title": "A", "design": {"theme": "dark"}})),
            Scripted::reply(json!({"title": "A", "design": {"theme": "dark"}})),
            Scripted::reply(json!({"title": "A", "design": {"theme": "neon", "fontFamily": "Inter"}})),
        ]);
        let params = GenerationParams {
            design: DesignSettings { theme: Some("corporate".to_string()), ..Default::default() },
            ..GenerationParams::new("Branding")
        };

        let spec = pipeline(client).generate(&params).unwrap();

        assert_eq!(spec.design.theme.as_deref(), Some("corporate"));
        assert_eq!(spec.design.font_family.as_deref(), Some("Inter"));
    }

    #[test]
    fn concurrent_runs_share_one_pipeline() {
        let replies: Vec<Scripted> =
            (0..6).map(|i| Scripted::reply(json!({"title": format!("Slide {}", i)}))).collect();
        let client = ScriptedModelClient::new(replies);
        let pipeline = Arc::new(pipeline(client.clone()));

        let handles: Vec<_> = (0..2)
            .map(|i| {
                let pipeline = Arc::clone(&pipeline);
                thread::spawn(move || pipeline.generate(&GenerationParams::new(format!("Topic {}", i))))
            })
            .collect();

        for handle in handles {
            let spec = handle.join().unwrap().unwrap();
            assert!(spec.title.starts_with("Slide"));
        }
        assert_eq!(client.call_count(), 6);
    }

    #[test]
    fn cancelled_run_returns_cancelled() {
        let client = ScriptedModelClient::new(vec![Scripted::delayed(
            Duration::from_millis(500),
            Scripted::reply(json!({"title": "Too late"})),
        )]);
        let cancel = CancellationToken::new();
        let remote = cancel.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            remote.cancel();
        });

        let err = pipeline(client)
            .generate_with_cancel(&GenerationParams::new("Topic"), &cancel)
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Cancelled);
        assert_eq!(err.stage, StageName::Content);
        handle.join().unwrap();
    }
}
