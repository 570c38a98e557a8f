//! Response parser: turns provider text into a `MatchAnalysis`.
//!
//! The model may wrap its JSON in prose or markdown code fences. The first
//! balanced `{...}` object in the text is taken; anything else is malformed.
//! Missing keys are never repaired.

use thiserror::Error;

use crate::models::MatchAnalysis;

/// Longest slice of provider text kept for diagnostics.
const FRAGMENT_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed provider response: {reason}")]
pub struct MalformedResponseError {
    pub reason: String,
    /// The offending text, truncated to `FRAGMENT_LIMIT` characters.
    pub fragment: String,
}

impl MalformedResponseError {
    fn new(reason: impl Into<String>, text: &str) -> Self {
        Self {
            reason: reason.into(),
            fragment: truncate_chars(text, FRAGMENT_LIMIT),
        }
    }
}

/// Parses raw provider output into the structured analysis.
pub fn parse_analysis(raw: &str) -> Result<MatchAnalysis, MalformedResponseError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| MalformedResponseError::new("no JSON object found in response", raw))?;

    let analysis: MatchAnalysis = serde_json::from_str(json)
        .map_err(|e| MalformedResponseError::new(format!("schema mismatch: {e}"), json))?;

    analysis
        .check_score_ranges()
        .map_err(|e| MalformedResponseError::new(format!("score out of range: {e}"), json))?;

    Ok(analysis)
}

/// Returns the first balanced `{...}` object in `text`, honouring JSON string
/// literals and escapes so braces inside strings are not counted.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{
        DetailedBreakdown, Importance, MatchStrength, MatchedRequirement, MissingRequirement,
        OverallAnalysis,
    };

    const VALID: &str = r#"{
        "matched_requirements": [
            {"requirement": "Python programming", "cv_evidence": "Skills: Python",
             "match_strength": "high", "relevance_score": 9}
        ],
        "missing_requirements": [
            {"requirement": "Chemistry background", "importance": "critical"}
        ],
        "overall_analysis": {
            "compatibility_score": 60,
            "strengths": ["Python skills"],
            "gaps": ["Chemistry background"]
        },
        "detailed_breakdown": {
            "education_match": 0, "skills_match": 80,
            "experience_match": 0, "tools_frameworks_match": 0
        }
    }"#;

    #[test]
    fn test_parses_bare_json() {
        let analysis = parse_analysis(VALID).unwrap();
        assert_eq!(analysis.overall_analysis.compatibility_score, 60);
        assert_eq!(
            analysis.matched_requirements[0].match_strength,
            MatchStrength::High
        );
        assert_eq!(
            analysis.missing_requirements[0].importance,
            Importance::Critical
        );
        assert!(analysis.missing_requirements[0].alternative_skills.is_none());
        assert!(analysis.overall_analysis.recommendations.is_empty());
    }

    #[test]
    fn test_extracts_object_from_prose_and_code_fence() {
        let raw = format!("Sure! ```json\n{VALID}\n```\nLet me know if you need more.");
        let analysis = parse_analysis(&raw).unwrap();
        assert_eq!(analysis, parse_analysis(VALID).unwrap());
    }

    #[test]
    fn test_serialized_analysis_parses_back_equal() {
        let analysis = MatchAnalysis {
            matched_requirements: vec![MatchedRequirement {
                requirement: "Rust".to_string(),
                cv_evidence: "Built a {custom} \"allocator\"".to_string(),
                match_strength: MatchStrength::Medium,
                relevance_score: 6,
            }],
            missing_requirements: vec![MissingRequirement {
                requirement: "Kubernetes".to_string(),
                importance: Importance::NiceToHave,
                alternative_skills: Some(vec!["Docker".to_string()]),
            }],
            overall_analysis: OverallAnalysis {
                compatibility_score: 71,
                strengths: vec!["Systems work".to_string()],
                gaps: vec![],
                recommendations: vec!["Mention Docker".to_string()],
            },
            detailed_breakdown: DetailedBreakdown {
                education_match: 50,
                skills_match: 75,
                experience_match: 70,
                tools_frameworks_match: 40,
            },
        };

        let text = serde_json::to_string_pretty(&analysis).unwrap();
        assert_eq!(parse_analysis(&text).unwrap(), analysis);
    }

    #[test]
    fn test_missing_overall_analysis_is_malformed() {
        let raw = r#"{"matched_requirements": [], "detailed_breakdown": {
            "education_match": 0, "skills_match": 0,
            "experience_match": 0, "tools_frameworks_match": 0}}"#;
        let err = parse_analysis(raw).unwrap_err();
        assert!(err.reason.contains("overall_analysis"), "{}", err.reason);
        assert!(err.fragment.contains("matched_requirements"));
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let raw = r#"{"overall_analysis": {"compatibility_score": 10},
            "detailed_breakdown": {"education_match": 0, "skills_match": 0,
            "experience_match": 0, "tools_frameworks_match": 0}}"#;
        let analysis = parse_analysis(raw).unwrap();
        assert!(analysis.matched_requirements.is_empty());
        assert!(analysis.missing_requirements.is_empty());
        assert!(analysis.overall_analysis.strengths.is_empty());
    }

    #[test]
    fn test_no_object_is_malformed_with_fragment() {
        let err = parse_analysis("I'm sorry, I can't help with that.").unwrap_err();
        assert_eq!(err.reason, "no JSON object found in response");
        assert_eq!(err.fragment, "I'm sorry, I can't help with that.");
    }

    #[test]
    fn test_unbalanced_object_is_malformed() {
        assert!(parse_analysis(r#"{"overall_analysis": {"compatibility_score": 5}"#).is_err());
    }

    #[test]
    fn test_out_of_range_score_is_malformed() {
        let raw = VALID.replace("\"compatibility_score\": 60", "\"compatibility_score\": 140");
        let err = parse_analysis(&raw).unwrap_err();
        assert!(err.reason.contains("compatibility_score"));
    }

    #[test]
    fn test_negative_score_is_malformed() {
        let raw = VALID.replace("\"relevance_score\": 9", "\"relevance_score\": -1");
        assert!(parse_analysis(&raw).is_err());
    }

    #[test]
    fn test_extract_ignores_braces_inside_strings() {
        let text = r#"Result: {"a": "} not the end {", "b": {"c": "\"}"}} trailing }"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"a": "} not the end {", "b": {"c": "\"}"}}"#)
        );
    }

    #[test]
    fn test_extract_takes_first_object_only() {
        assert_eq!(extract_json_object(r#"{"a": 1} {"b": 2}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn test_fragment_is_truncated_on_char_boundary() {
        let long = "é".repeat(FRAGMENT_LIMIT + 10);
        let err = parse_analysis(&long).unwrap_err();
        assert_eq!(err.fragment.chars().count(), FRAGMENT_LIMIT + 3);
        assert!(err.fragment.ends_with("..."));
    }
}
