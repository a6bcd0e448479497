//! # Core Types
//!
//! Layer 0 of the workspace. Every other crate speaks in these types: the trade
//! records and return series a caller hands in, the closed error taxonomy a
//! caller gets back, and the analysis artifact the pipeline produces.

pub mod agent_error;
pub mod artifact;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use agent_error::AgentError;
pub use artifact::{
    AnalysisArtifact, ArtifactMetadata, ArtifactSource, ConfidenceLevel, EducationalInsight,
    OverallAssessment, PerformanceAnalysis, Recommendation, RecommendationPriority, RiskAnalysis,
    RiskLevel, SectionKind, TradeAnalysis,
};
pub use enums::{ErrorCode, LetterGrade, Severity, TradeSide};
pub use error::CoreError;
pub use structs::{RawMetricsInput, SummaryMetrics, TradeRecord};
