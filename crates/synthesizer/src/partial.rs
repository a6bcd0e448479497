use core_types::{
    EducationalInsight, OverallAssessment, PerformanceAnalysis, Recommendation,
    RecommendationPriority, RiskAnalysis, SectionKind, TradeAnalysis,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// The sections a model managed to supply, each decoded on its own.
///
/// A section that is missing or does not decode is simply `None`; one bad
/// section never poisons the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialArtifact {
    pub overall_assessment: Option<OverallAssessment>,
    pub performance_analysis: Option<PerformanceAnalysis>,
    pub risk_analysis: Option<RiskAnalysis>,
    pub trade_analysis: Option<TradeAnalysis>,
    pub recommendations: Option<Vec<Recommendation>>,
    pub educational_insights: Option<Vec<EducationalInsight>>,
}

/// Models often emit plain strings where an object list was asked for.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecommendationEntry {
    Full(Recommendation),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InsightEntry {
    Full(EducationalInsight),
    Text(String),
}

impl PartialArtifact {
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        let section = move |kind: SectionKind| {
            object
                .get(kind.key())
                .or_else(|| object.get(kind.snake_key()))
                .filter(|v| !v.is_null())
        };

        Self {
            overall_assessment: section(SectionKind::OverallAssessment).and_then(decode),
            performance_analysis: section(SectionKind::PerformanceAnalysis).and_then(decode),
            risk_analysis: section(SectionKind::RiskAnalysis).and_then(decode),
            trade_analysis: section(SectionKind::TradeAnalysis).and_then(decode),
            recommendations: section(SectionKind::Recommendations)
                .and_then(decode::<Vec<RecommendationEntry>>)
                .map(|entries| entries.into_iter().map(Recommendation::from).collect()),
            educational_insights: section(SectionKind::EducationalInsights)
                .and_then(decode::<Vec<InsightEntry>>)
                .map(|entries| entries.into_iter().map(EducationalInsight::from).collect()),
        }
    }

    /// The sections present, in artifact order.
    pub fn supplied_sections(&self) -> Vec<SectionKind> {
        SectionKind::ALL
            .into_iter()
            .filter(|kind| self.has(*kind))
            .collect()
    }

    pub fn has(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::OverallAssessment => self.overall_assessment.is_some(),
            SectionKind::PerformanceAnalysis => self.performance_analysis.is_some(),
            SectionKind::RiskAnalysis => self.risk_analysis.is_some(),
            SectionKind::TradeAnalysis => self.trade_analysis.is_some(),
            SectionKind::Recommendations => self.recommendations.is_some(),
            SectionKind::EducationalInsights => self.educational_insights.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.supplied_sections().is_empty()
    }
}

fn decode<T: DeserializeOwned>(value: &Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::debug!(error = %e, "Discarding undecodable AI section.");
            None
        }
    }
}

impl From<RecommendationEntry> for Recommendation {
    fn from(entry: RecommendationEntry) -> Self {
        match entry {
            RecommendationEntry::Full(rec) => rec,
            RecommendationEntry::Text(title) => Recommendation {
                title,
                description: String::new(),
                priority: RecommendationPriority::Medium,
            },
        }
    }
}

impl From<InsightEntry> for EducationalInsight {
    fn from(entry: InsightEntry) -> Self {
        match entry {
            InsightEntry::Full(insight) => insight,
            InsightEntry::Text(explanation) => EducationalInsight {
                concept: "General".to_string(),
                explanation,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::LetterGrade;
    use serde_json::json;

    #[test]
    fn decodes_sections_independently() {
        let value = json!({
            "overallAssessment": {"grade": "B+", "score": 0.61, "summary": "solid"},
            "riskAnalysis": {"riskLevel": "catastrophic"},
            "recommendations": ["Cut position size", {"title": "Add a stop", "priority": "high"}]
        });
        let partial = PartialArtifact::from_value(&value);

        assert_eq!(partial.overall_assessment.as_ref().unwrap().grade, LetterGrade::BPlus);
        assert!(partial.risk_analysis.is_none());
        let recs = partial.recommendations.unwrap();
        assert_eq!(recs[0].title, "Cut position size");
        assert_eq!(recs[0].priority, RecommendationPriority::Medium);
        assert_eq!(recs[1].priority, RecommendationPriority::High);
    }

    #[test]
    fn accepts_snake_case_keys() {
        let value = json!({
            "educational_insights": ["Sharpe measures return per unit of risk."],
            "performance_analysis": null
        });
        let partial = PartialArtifact::from_value(&value);
        assert_eq!(partial.supplied_sections(), vec![SectionKind::EducationalInsights]);
        assert_eq!(partial.educational_insights.unwrap()[0].concept, "General");
    }

    #[test]
    fn non_objects_supply_nothing() {
        assert!(PartialArtifact::from_value(&json!([1, 2, 3])).is_empty());
        assert!(PartialArtifact::from_value(&json!("text")).is_empty());
    }
}
