use crate::error::AnalyzerError;
use analytics::AnalyticsEngine;
use configuration::{InferenceSettings, Settings};
use core_types::{AgentError, AnalysisArtifact, ArtifactSource, ErrorCode, RawMetricsInput};
use events::Envelope;
use inference_client::{GenerateRequest, HealthStatus, HttpInferenceClient, InferenceClient};
use orchestrator::{Orchestrator, RingBufferErrorLog, TaskConfig, TaskOutcome};
use std::sync::Arc;
use synthesizer::{FallbackSynthesizer, PartialArtifact};

pub mod error;
pub mod prompt;

/// Explanation attached when the quota ran out and heuristics stood in.
pub const QUOTA_EXPLANATION: &str =
    "The AI quota is exhausted; this analysis was computed from the metrics alone.";
/// Explanation attached when the model answered without usable structure.
pub const UNSTRUCTURED_EXPLANATION: &str =
    "The AI response contained no usable structured sections; every section was computed from the metrics.";
/// Explanation attached when some sections were backfilled.
pub const PARTIAL_EXPLANATION: &str =
    "Some sections were missing from the AI response and were computed from the metrics.";
/// Explanation attached to offline runs.
pub const OFFLINE_EXPLANATION: &str = "Offline analysis; no inference service was consulted.";

/// The backtest analysis pipeline: prompt, generate, extract, backfill, score.
pub struct Analyzer {
    client: Arc<dyn InferenceClient>,
    orchestrator: Orchestrator,
    synthesizer: FallbackSynthesizer,
    settings: InferenceSettings,
}

impl Analyzer {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        orchestrator: Orchestrator,
        synthesizer: FallbackSynthesizer,
        settings: InferenceSettings,
    ) -> Self {
        Self {
            client,
            orchestrator,
            synthesizer,
            settings,
        }
    }

    /// Wires the HTTP client, a ring-buffer error log and the synthesizer from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, AnalyzerError> {
        let client = HttpInferenceClient::new(&settings.inference)?;
        let error_log = Arc::new(RingBufferErrorLog::new(settings.error_log.capacity));
        let orchestrator = Orchestrator::new(settings.analysis.agent_id.clone(), error_log);
        let synthesizer = FallbackSynthesizer::new(settings.analysis.min_sample_size);

        Ok(Self::new(
            Arc::new(client),
            orchestrator,
            synthesizer,
            settings.inference.clone(),
        ))
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Runs the full pipeline under the orchestrator.
    ///
    /// Invalid input fails without retries. An exhausted quota is not an
    /// error for the caller: the result is a heuristic artifact flagged as
    /// degraded, with an explanation.
    pub async fn analyze(&self, input: &RawMetricsInput, config: &TaskConfig) -> Envelope<AnalysisArtifact> {
        let envelope = self
            .orchestrator
            .run(|| self.attempt(input), config)
            .await;

        match &envelope.error {
            Some(error) if error.code == ErrorCode::AiQuotaExceeded => {
                tracing::warn!(error = %error, "Inference quota exhausted, recovering with heuristics.");
                let mut artifact = self.synthesizer.synthesize(input, None);
                artifact.metadata.degraded = true;
                Envelope::done(self.orchestrator.agent_id(), artifact).with_explanation(QUOTA_EXPLANATION)
            }
            _ => match envelope.data.as_ref().map(|a| a.metadata.source) {
                Some(ArtifactSource::Heuristic) => envelope.with_explanation(UNSTRUCTURED_EXPLANATION),
                Some(ArtifactSource::Hybrid) => envelope.with_explanation(PARTIAL_EXPLANATION),
                _ => envelope,
            },
        }
    }

    /// Heuristic-only analysis; never calls the inference service.
    ///
    /// Uses the timeout and progress callback of `config`, but a single attempt.
    pub async fn analyze_offline(
        &self,
        input: &RawMetricsInput,
        config: &TaskConfig,
    ) -> Envelope<AnalysisArtifact> {
        let config = TaskConfig {
            max_retries: 1,
            ..config.clone()
        };
        let envelope = self
            .orchestrator
            .run(
                || async {
                    match input.validate() {
                        Ok(()) => TaskOutcome::Ok(self.synthesizer.synthesize(input, None)),
                        Err(e) => TaskOutcome::Fatal(AgentError::from(e)),
                    }
                },
                &config,
            )
            .await;

        if envelope.is_done() {
            envelope.with_explanation(OFFLINE_EXPLANATION)
        } else {
            envelope
        }
    }

    pub async fn health(&self) -> Result<HealthStatus, AgentError> {
        self.client
            .health_check()
            .await
            .map_err(|e| AgentError::from(e).with_agent_id(self.orchestrator.agent_id()))
    }

    async fn attempt(&self, input: &RawMetricsInput) -> TaskOutcome<AnalysisArtifact> {
        if let Err(e) = input.validate() {
            return TaskOutcome::Fatal(AgentError::from(e).with_agent_id(self.orchestrator.agent_id()));
        }

        let report = AnalyticsEngine::new().calculate(input);
        let request = match prompt::build(input, &report) {
            Ok(prompt) => GenerateRequest::new(prompt, self.settings.temperature, self.settings.max_tokens)
                .with_model(self.settings.model.clone())
                .with_system_instruction(prompt::SYSTEM_INSTRUCTION),
            Err(e) => return TaskOutcome::Fatal(AnalyzerError::from(e).into()),
        };

        let response = match self.client.generate(&request).await {
            Ok(response) => response,
            Err(e) => {
                let error = AgentError::from(e).with_agent_id(self.orchestrator.agent_id());
                return TaskOutcome::from_error(error);
            }
        };

        let extraction = extractor::extract(&response.content);
        if !extraction.success {
            tracing::info!(
                response_len = response.content.len(),
                "No structured output in the AI response, falling back to heuristics."
            );
        }
        let partial = extraction.parsed.as_ref().map(PartialArtifact::from_value);

        TaskOutcome::Ok(self.synthesizer.synthesize(input, partial.as_ref()))
    }
}
