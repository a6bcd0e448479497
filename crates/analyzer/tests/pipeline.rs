use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use analyzer::{Analyzer, OFFLINE_EXPLANATION, QUOTA_EXPLANATION, UNSTRUCTURED_EXPLANATION};
use async_trait::async_trait;
use chrono::Utc;
use configuration::InferenceSettings;
use core_types::{
    ArtifactSource, ConfidenceLevel, ErrorCode, LetterGrade, RawMetricsInput, RiskLevel, SectionKind, TradeRecord,
    TradeSide,
};
use events::TaskStatus;
use inference_client::error::InferenceError;
use inference_client::{GenerateRequest, GenerateResponse, HealthStatus, InferenceClient};
use orchestrator::{ErrorLog, Orchestrator, RingBufferErrorLog, TaskConfig};
use rust_decimal_macros::dec;
use synthesizer::FallbackSynthesizer;

/// Replays a fixed script of responses, one per `generate` call.
#[derive(Default)]
struct ScriptedClient {
    script: Mutex<VecDeque<Result<GenerateResponse, InferenceError>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(script: Vec<Result<GenerateResponse, InferenceError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn replying(content: &str) -> Self {
        Self::new(vec![Ok(GenerateResponse {
            content: content.to_string(),
        })])
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, InferenceError> {
        assert!(request.system_instruction.is_some());
        assert_eq!(request.model.as_deref(), Some("default"));
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(InferenceError::Network("script exhausted".into())))
    }

    async fn health_check(&self) -> Result<HealthStatus, InferenceError> {
        Ok(HealthStatus {
            status: "ok".into(),
        })
    }
}

fn analyzer(client: Arc<ScriptedClient>) -> (Analyzer, Arc<RingBufferErrorLog>) {
    let log = Arc::new(RingBufferErrorLog::new(50));
    let analyzer = Analyzer::new(
        client,
        Orchestrator::new("backtest-analyzer", log.clone()),
        FallbackSynthesizer::new(30),
        InferenceSettings::default(),
    );
    (analyzer, log)
}

fn config() -> TaskConfig {
    TaskConfig::new(Duration::from_secs(5), 3).with_base_delay(Duration::from_millis(10))
}

fn returns_input() -> RawMetricsInput {
    RawMetricsInput::from_returns(vec![0.01, -0.02, 0.03, -0.01, 0.02])
}

const FULL_RESPONSE: &str = r#"Here is my review.
```json
{
  "overallAssessment": { "grade": "B", "score": 0.55, "summary": "Solid.", "strengths": ["Positive drift"], "weaknesses": [] },
  "performanceAnalysis": { "totalReturn": 0.03, "annualizedReturn": 3.3, "sharpeRatio": 0.29, "sortinoRatio": 0.85, "calmarRatio": 166.0, "volatility": 0.33 },
  "riskAnalysis": { "riskLevel": "moderate", "maxDrawdown": 0.02, "var95": -0.02, "expectedShortfall": -0.02, "tailRisk": 0.0007 },
  "tradeAnalysis": { "totalTrades": 0, "winRate": 0.0, "profitFactor": 0.0, "expectancy": 0.0 },
  "recommendations": [{ "title": "Extend the sample", "priority": "high" }],
  "educationalInsights": ["Five observations say little about a strategy."]
}
```"#;

#[tokio::test(start_paused = true)]
async fn fenced_response_is_used_verbatim() {
    let client = Arc::new(ScriptedClient::replying(FULL_RESPONSE));
    let (analyzer, log) = analyzer(client.clone());

    let envelope = analyzer.analyze(&returns_input(), &config()).await;

    assert!(envelope.is_done(), "{:?}", envelope.error);
    assert!(envelope.explanation.is_none());
    let artifact = envelope.data.unwrap();
    assert_eq!(artifact.metadata.source, ArtifactSource::Ai);
    assert_eq!(artifact.overall_assessment.grade, LetterGrade::B);
    assert_eq!(artifact.risk_analysis.risk_level, RiskLevel::Moderate);
    assert_eq!(artifact.educational_insights[0].concept, "General");
    assert!(artifact.confidence >= 0.8 && artifact.confidence <= 1.0);
    assert_eq!(artifact.metadata.confidence_level, ConfidenceLevel::High);
    assert_eq!(client.calls(), 1);
    assert!(log.is_empty());
}

#[tokio::test(start_paused = true)]
async fn partial_response_is_backfilled() {
    let client = Arc::new(ScriptedClient::replying(
        r#"{"risk_analysis": {"riskLevel": "high", "maxDrawdown": 0.3, "valueAtRisk95": -0.05, "expectedShortfall": -0.07, "tailRisk": 0.01}}"#,
    ));
    let (analyzer, _log) = analyzer(client);

    let envelope = analyzer.analyze(&returns_input(), &config()).await;
    let artifact = envelope.data.unwrap();

    assert_eq!(artifact.metadata.source, ArtifactSource::Hybrid);
    assert_eq!(artifact.metadata.ai_sections, vec![SectionKind::RiskAnalysis]);
    assert_eq!(artifact.risk_analysis.risk_level, RiskLevel::High);
    assert!(!artifact.recommendations.is_empty());
    assert!(envelope.explanation.is_some());
}

#[tokio::test(start_paused = true)]
async fn unstructured_response_falls_back_to_heuristics() {
    let client = Arc::new(ScriptedClient::replying("I think this strategy looks fine overall."));
    let (analyzer, log) = analyzer(client.clone());

    let envelope = analyzer.analyze(&returns_input(), &config()).await;

    assert!(envelope.is_done());
    assert_eq!(envelope.explanation.as_deref(), Some(UNSTRUCTURED_EXPLANATION));
    let artifact = envelope.data.unwrap();
    assert_eq!(artifact.metadata.source, ArtifactSource::Heuristic);
    assert!(!artifact.metadata.degraded);
    assert_eq!(client.calls(), 1);
    assert!(log.is_empty());
}

#[tokio::test(start_paused = true)]
async fn quota_exhaustion_recovers_with_a_degraded_artifact() {
    let client = Arc::new(ScriptedClient::new(vec![Err(InferenceError::QuotaExceeded(
        "insufficient_quota".into(),
    ))]));
    let (analyzer, log) = analyzer(client.clone());

    let envelope = analyzer.analyze(&returns_input(), &config()).await;

    assert!(envelope.is_done());
    assert!(envelope.error.is_none());
    assert_eq!(envelope.explanation.as_deref(), Some(QUOTA_EXPLANATION));
    let artifact = envelope.data.unwrap();
    assert!(artifact.metadata.degraded);
    assert_eq!(artifact.metadata.source, ArtifactSource::Heuristic);
    assert_eq!(
        artifact.metadata.confidence_level,
        ConfidenceLevel::from_score(artifact.confidence)
    );
    assert_eq!(client.calls(), 1);
    assert_eq!(log.recent(1)[0].code, ErrorCode::AiQuotaExceeded);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried() {
    let client = Arc::new(ScriptedClient::new(vec![
        Err(InferenceError::Network("connection reset".into())),
        Err(InferenceError::Service(503, "overloaded".into())),
        Ok(GenerateResponse {
            content: FULL_RESPONSE.to_string(),
        }),
    ]));
    let (analyzer, log) = analyzer(client.clone());

    let envelope = analyzer.analyze(&returns_input(), &config()).await;

    assert!(envelope.is_done());
    assert_eq!(client.calls(), 3);
    assert_eq!(log.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn persistent_failures_surface_the_last_error() {
    let client = Arc::new(ScriptedClient::new(vec![]));
    let (analyzer, _log) = analyzer(client.clone());

    let envelope = analyzer.analyze(&returns_input(), &config()).await;

    assert!(envelope.is_error());
    assert_eq!(client.calls(), 3);
    let error = envelope.error.unwrap();
    assert_eq!(error.code, ErrorCode::NetworkError);
    assert_eq!(error.agent_id.as_deref(), Some("backtest-analyzer"));
    assert!(error.suggested_fix.is_some());
}

#[tokio::test(start_paused = true)]
async fn rejected_requests_are_not_retried() {
    let client = Arc::new(ScriptedClient::new(vec![
        Err(InferenceError::Rejected(401, "invalid api key".into())),
        Ok(GenerateResponse {
            content: FULL_RESPONSE.to_string(),
        }),
    ]));
    let (analyzer, log) = analyzer(client.clone());

    let envelope = analyzer.analyze(&returns_input(), &config()).await;

    assert!(envelope.is_error());
    assert_eq!(client.calls(), 1);
    assert_eq!(log.len(), 1);
    let error = envelope.error.unwrap();
    assert_eq!(error.code, ErrorCode::ValidationError);
    assert_eq!(error.details.unwrap()["httpStatus"], 401);
}

#[tokio::test(start_paused = true)]
async fn invalid_input_is_rejected_without_calling_the_model() {
    let client = Arc::new(ScriptedClient::replying(FULL_RESPONSE));
    let (analyzer, _log) = analyzer(client.clone());
    let input = RawMetricsInput::from_trades(vec![TradeRecord {
        symbol: String::new(),
        side: TradeSide::Buy,
        quantity: dec!(1),
        price: dec!(100),
        timestamp: Utc::now(),
        pnl: Some(dec!(5)),
        fees: None,
    }]);

    let envelope = analyzer.analyze(&input, &config()).await;

    assert!(envelope.is_error());
    assert_eq!(envelope.error.unwrap().code, ErrorCode::ValidationError);
    assert_eq!(client.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn offline_analysis_never_calls_the_model() {
    let client = Arc::new(ScriptedClient::replying(FULL_RESPONSE));
    let (analyzer, _log) = analyzer(client.clone());

    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = updates.clone();
    let config = config().with_progress(move |update| sink.lock().unwrap().push(update));

    let envelope = analyzer.analyze_offline(&RawMetricsInput::default(), &config).await;

    assert!(envelope.is_done());
    let updates = updates.lock().unwrap();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].attempt, 1);
    assert_eq!(updates[1].status, TaskStatus::Done);
    assert_eq!(updates[1].progress, 100);
    assert_eq!(envelope.explanation.as_deref(), Some(OFFLINE_EXPLANATION));
    let artifact = envelope.data.unwrap();
    assert_eq!(artifact.overall_assessment.grade, LetterGrade::F);
    assert!((0.0..=1.0).contains(&artifact.confidence));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn health_reports_the_service_status() {
    let (analyzer, _log) = analyzer(Arc::new(ScriptedClient::default()));
    assert_eq!(analyzer.health().await.unwrap().status, "ok");
}
