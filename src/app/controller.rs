//! Retry and fallback-model escalation around the stage executor.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::app::attempt_log;
use crate::app::backoff::BackoffPolicy;
use crate::app::executor::{StageCall, StageExecutor};
use crate::domain::{
    AttemptOutcome, CancellationToken, ClassifiedError, ErrorKind, GenerationParams, ModelConfig,
    ModelTier, PartialSpec, StageAttempt, StageName, placeholder_spec,
};
use crate::ports::{ModelClient, PromptCatalog};

/// How a stage ended when it did not fail outright.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// A model produced a validated spec.
    Completed(PartialSpec),
    /// Every model failed; this is a placeholder built from the raw prompt.
    Degraded(PartialSpec),
}

impl StageOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded(_))
    }

    pub fn into_spec(self) -> PartialSpec {
        match self {
            StageOutcome::Completed(spec) | StageOutcome::Degraded(spec) => spec,
        }
    }
}

/// Drives one stage through primary retries and at most one fallback attempt.
pub struct StageController {
    executor: StageExecutor,
    prompts: Arc<dyn PromptCatalog>,
    models: ModelConfig,
    backoff: BackoffPolicy,
}

impl StageController {
    pub fn new(
        client: Arc<dyn ModelClient>,
        prompts: Arc<dyn PromptCatalog>,
        models: ModelConfig,
        backoff: BackoffPolicy,
    ) -> Self {
        let executor = StageExecutor::new(client, models.temperature, models.max_tokens);
        Self { executor, prompts, models, backoff }
    }

    pub fn run_stage(
        &self,
        stage: StageName,
        prior: Option<&PartialSpec>,
        params: &GenerationParams,
        cancel: &CancellationToken,
    ) -> Result<StageOutcome, ClassifiedError> {
        let prompt = self.prompts.stage_prompt(stage, params).map_err(|e| {
            ClassifiedError::new(
                ErrorKind::Unknown,
                stage,
                format!("failed to build {} prompt", stage),
            )
            .with_cause(e)
        })?;

        let mut call = StageCall {
            stage,
            attempt: 0,
            tier: ModelTier::Primary,
            model: self.models.primary.trim(),
            system: self.prompts.system_instruction(),
            prompt: &prompt,
            prior,
            design_overrides: &params.design,
            timeout: self.models.timeout(),
        };

        let fallback = self.models.fallback_model();
        let max_retries = self.backoff.max_retries();
        let mut capped_retries = 0;

        let primary_error = loop {
            call.attempt += 1;
            let error = match self.attempt(&call, cancel) {
                Ok(spec) => return Ok(StageOutcome::Completed(spec)),
                Err(error) => error,
            };

            if error.kind == ErrorKind::Cancelled {
                return Err(error);
            }
            if !error.is_retryable() {
                break error;
            }

            let cap_reached = error.kind.retry_cap().is_some_and(|cap| capped_retries >= cap);
            let exhausted = call.attempt >= max_retries || cap_reached;
            if exhausted && fallback.is_none() {
                break error;
            }

            let delay = self.backoff.delay_for(call.attempt, error.retry_after);
            attempt_log::log_backoff(stage, call.attempt, max_retries, delay);
            if cancel.sleep(delay).is_err() {
                return Err(cancelled(stage, &call));
            }
            if exhausted {
                break error;
            }
            if error.kind.retry_cap().is_some() {
                capped_retries += 1;
            }
        };

        let Some(fallback) = fallback.filter(|_| primary_error.kind.escalates()) else {
            return self.give_up(stage, params, primary_error);
        };

        attempt_log::log_escalation(stage, fallback, &primary_error);
        call.attempt += 1;
        call.tier = ModelTier::Fallback;
        call.model = fallback;

        match self.attempt(&call, cancel) {
            Ok(spec) => Ok(StageOutcome::Completed(spec)),
            Err(error) if error.kind == ErrorKind::Cancelled => Err(error),
            Err(error) => self.give_up(stage, params, error),
        }
    }

    fn attempt(
        &self,
        call: &StageCall<'_>,
        cancel: &CancellationToken,
    ) -> Result<PartialSpec, ClassifiedError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let result = self.executor.execute(call, cancel);

        let record = StageAttempt {
            stage: call.stage,
            attempt: call.attempt,
            tier: call.tier,
            model: call.model.to_string(),
            started_at,
            duration: clock.elapsed(),
            outcome: match &result {
                Ok(_) => AttemptOutcome::Succeeded,
                Err(error) => AttemptOutcome::Failed(error.kind),
            },
        };
        attempt_log::log_attempt(&record, result.as_ref().err());

        result
    }

    fn give_up(
        &self,
        stage: StageName,
        params: &GenerationParams,
        error: ClassifiedError,
    ) -> Result<StageOutcome, ClassifiedError> {
        if !stage.degrades_to_placeholder() {
            return Err(error);
        }

        attempt_log::log_degraded(stage, &error);
        let placeholder = placeholder_spec(&params.prompt);
        let design = placeholder.design.clone().overlay(&params.design);
        Ok(StageOutcome::Degraded(PartialSpec { design, ..placeholder }))
    }
}

fn cancelled(stage: StageName, call: &StageCall<'_>) -> ClassifiedError {
    ClassifiedError::new(ErrorKind::Cancelled, stage, "generation cancelled during backoff")
        .with_attempt(call.attempt, call.tier)
}
