use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    #[serde(alias = "BUY", alias = "Buy", alias = "long")]
    Buy,
    #[serde(alias = "SELL", alias = "Sell", alias = "short")]
    Sell,
}

impl TradeSide {
    /// Returns the opposite side of the trade
    pub fn opposite(&self) -> Self {
        match self {
            TradeSide::Buy => TradeSide::Sell,
            TradeSide::Sell => TradeSide::Buy,
        }
    }
}

/// The closed set of failure categories a caller can ever observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    TimeoutError,
    RateLimitError,
    AiServiceError,
    AiQuotaExceeded,
    AiInvalidResponse,
    DataFetchError,
    StrategyExecutionError,
    NetworkError,
    UnknownError,
}

impl ErrorCode {
    /// Malformed input and exhausted quota never get better by trying again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ErrorCode::ValidationError | ErrorCode::AiQuotaExceeded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::TimeoutError => "TIMEOUT_ERROR",
            ErrorCode::RateLimitError => "RATE_LIMIT_ERROR",
            ErrorCode::AiServiceError => "AI_SERVICE_ERROR",
            ErrorCode::AiQuotaExceeded => "AI_QUOTA_EXCEEDED",
            ErrorCode::AiInvalidResponse => "AI_INVALID_RESPONSE",
            ErrorCode::DataFetchError => "DATA_FETCH_ERROR",
            ErrorCode::StrategyExecutionError => "STRATEGY_EXECUTION_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Letter grade for a strategy run, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    /// The lowest band, given to runs with no evidence to grade.
    pub const LOWEST: LetterGrade = LetterGrade::F;

    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
