use crate::enums::LetterGrade;
use serde::{Deserialize, Serialize};

/// The top-level sections of an [`AnalysisArtifact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    OverallAssessment,
    PerformanceAnalysis,
    RiskAnalysis,
    TradeAnalysis,
    Recommendations,
    EducationalInsights,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::OverallAssessment,
        SectionKind::PerformanceAnalysis,
        SectionKind::RiskAnalysis,
        SectionKind::TradeAnalysis,
        SectionKind::Recommendations,
        SectionKind::EducationalInsights,
    ];

    /// The JSON key the section is serialized under.
    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::OverallAssessment => "overallAssessment",
            SectionKind::PerformanceAnalysis => "performanceAnalysis",
            SectionKind::RiskAnalysis => "riskAnalysis",
            SectionKind::TradeAnalysis => "tradeAnalysis",
            SectionKind::Recommendations => "recommendations",
            SectionKind::EducationalInsights => "educationalInsights",
        }
    }

    /// The snake_case spelling models frequently emit instead.
    pub fn snake_key(&self) -> &'static str {
        match self {
            SectionKind::OverallAssessment => "overall_assessment",
            SectionKind::PerformanceAnalysis => "performance_analysis",
            SectionKind::RiskAnalysis => "risk_analysis",
            SectionKind::TradeAnalysis => "trade_analysis",
            SectionKind::Recommendations => "recommendations",
            SectionKind::EducationalInsights => "educational_insights",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallAssessment {
    pub grade: LetterGrade,
    pub score: f64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAnalysis {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub volatility: f64,
    #[serde(default)]
    pub commentary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    pub risk_level: RiskLevel,
    pub max_drawdown: f64,
    #[serde(alias = "var95")]
    pub value_at_risk_95: f64,
    pub expected_shortfall: f64,
    pub tail_risk: f64,
    #[serde(default)]
    pub commentary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeAnalysis {
    pub total_trades: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub expectancy: f64,
    #[serde(default)]
    pub max_consecutive_losses: usize,
    #[serde(default)]
    pub behavioral_flags: Vec<String>,
    #[serde(default)]
    pub commentary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: RecommendationPriority,
}

fn default_priority() -> RecommendationPriority {
    RecommendationPriority::Medium
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationalInsight {
    pub concept: String,
    #[serde(default)]
    pub explanation: String,
}

/// Where the sections of an artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactSource {
    /// Every section was supplied by the model.
    Ai,
    /// Some sections were supplied by the model, the rest were synthesized.
    Hybrid,
    /// Nothing usable came back from the model.
    Heuristic,
}

/// Coarse banding of the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.6 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetadata {
    /// Milliseconds since the Unix epoch.
    pub generated_at: i64,
    pub source: ArtifactSource,
    pub ai_sections: Vec<SectionKind>,
    pub sample_size: usize,
    /// Band of the top-level `confidence` score.
    pub confidence_level: ConfidenceLevel,
    /// Set when the artifact was produced in place of a failed AI call.
    #[serde(default)]
    pub degraded: bool,
}

/// The final, fully populated result of one analysis task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisArtifact {
    pub overall_assessment: OverallAssessment,
    pub performance_analysis: PerformanceAnalysis,
    pub risk_analysis: RiskAnalysis,
    pub trade_analysis: TradeAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub educational_insights: Vec<EducationalInsight>,
    pub confidence: f64,
    pub metadata: ArtifactMetadata,
}

impl AnalysisArtifact {
    pub fn is_ai_derived(&self) -> bool {
        !self.metadata.ai_sections.is_empty()
    }
}
