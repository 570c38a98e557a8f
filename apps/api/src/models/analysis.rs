//! Structured compatibility report returned by the provider and by the API.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Confidence that a CV fact satisfies a job requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum MatchStrength {
    Low,
    Medium,
    High,
}

impl TryFrom<String> for MatchStrength {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown match_strength '{other}'")),
        }
    }
}

/// How much a missing requirement matters for the role.
/// Variants are ordered most important first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Importance {
    #[serde(rename = "critical")]
    Critical,
    #[serde(rename = "important")]
    Important,
    #[serde(rename = "nice-to-have")]
    NiceToHave,
}

impl TryFrom<String> for Importance {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "critical" => Ok(Self::Critical),
            "important" => Ok(Self::Important),
            "nice-to-have" => Ok(Self::NiceToHave),
            _ => Err(format!("unknown importance '{value}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRequirement {
    pub requirement: String,
    #[serde(default)]
    pub cv_evidence: String,
    pub match_strength: MatchStrength,
    /// 0..=10
    pub relevance_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingRequirement {
    pub requirement: String,
    pub importance: Importance,
    /// Adjacent skills found in the CV, if the model reported any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallAnalysis {
    /// 0..=100
    pub compatibility_score: u8,
    #[serde(default, deserialize_with = "super::nullable")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub gaps: Vec<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub recommendations: Vec<String>,
}

/// Per-category scores, each 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedBreakdown {
    pub education_match: u8,
    pub skills_match: u8,
    pub experience_match: u8,
    pub tools_frameworks_match: u8,
}

/// The JSON object the provider is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    #[serde(default, deserialize_with = "super::nullable")]
    pub matched_requirements: Vec<MatchedRequirement>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub missing_requirements: Vec<MissingRequirement>,
    pub overall_analysis: OverallAnalysis,
    pub detailed_breakdown: DetailedBreakdown,
}

/// A score outside its documented range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} = {value} exceeds maximum {max}")]
pub struct ScoreOutOfRange {
    pub field: String,
    pub value: u8,
    pub max: u8,
}

impl MatchAnalysis {
    /// Checks every score against its range. Negative values and values above
    /// 255 are already rejected by deserialization into `u8`.
    pub fn check_score_ranges(&self) -> Result<(), ScoreOutOfRange> {
        let check = |field: String, value: u8, max: u8| {
            if value > max {
                Err(ScoreOutOfRange { field, value, max })
            } else {
                Ok(())
            }
        };

        check(
            "overall_analysis.compatibility_score".to_string(),
            self.overall_analysis.compatibility_score,
            100,
        )?;

        let breakdown = &self.detailed_breakdown;
        for (name, value) in [
            ("education_match", breakdown.education_match),
            ("skills_match", breakdown.skills_match),
            ("experience_match", breakdown.experience_match),
            ("tools_frameworks_match", breakdown.tools_frameworks_match),
        ] {
            check(format!("detailed_breakdown.{name}"), value, 100)?;
        }

        for (i, matched) in self.matched_requirements.iter().enumerate() {
            check(
                format!("matched_requirements[{i}].relevance_score"),
                matched.relevance_score,
                10,
            )?;
        }

        Ok(())
    }
}

/// Full report returned by `POST /match`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub analysis: MatchAnalysis,
    /// Wall-clock seconds spent on the whole match cycle.
    pub processing_time: f64,
    pub model_used: String,
}

/// Condensed report returned by `POST /match/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub overall_analysis: OverallAnalysis,
    pub top_matched: Vec<MatchedRequirement>,
    pub top_missing: Vec<MissingRequirement>,
    pub detailed_breakdown: DetailedBreakdown,
    pub total_matched: usize,
    pub total_missing: usize,
    pub critical_missing: usize,
    pub high_strength_matches: usize,
    pub processing_time: f64,
    pub model_used: String,
}

impl MatchSummary {
    /// Condenses a full result to its `top_n` most relevant matches (highest
    /// relevance first) and most important gaps (critical first). Ties keep the
    /// provider's order.
    pub fn from_result(result: MatchResult, top_n: usize) -> Self {
        let MatchResult {
            analysis,
            processing_time,
            model_used,
        } = result;

        let total_matched = analysis.matched_requirements.len();
        let total_missing = analysis.missing_requirements.len();
        let critical_missing = analysis
            .missing_requirements
            .iter()
            .filter(|m| m.importance == Importance::Critical)
            .count();
        let high_strength_matches = analysis
            .matched_requirements
            .iter()
            .filter(|m| m.match_strength == MatchStrength::High)
            .count();

        let mut top_matched = analysis.matched_requirements;
        top_matched.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
        top_matched.truncate(top_n);

        let mut top_missing = analysis.missing_requirements;
        top_missing.sort_by_key(|m| m.importance);
        top_missing.truncate(top_n);

        Self {
            overall_analysis: analysis.overall_analysis,
            top_matched,
            top_missing,
            detailed_breakdown: analysis.detailed_breakdown,
            total_matched,
            total_missing,
            critical_missing,
            high_strength_matches,
            processing_time,
            model_used,
        }
    }
}
