//! Request and response data model for CV matching.
//!
//! Every entity is created per request and discarded once the response has been
//! written. Nothing here is persisted.

pub mod analysis;
pub mod cv;
pub mod job;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub use analysis::{MatchAnalysis, MatchResult, MatchSummary};
pub use cv::CvData;
pub use job::JobDescription;

/// Request body shared by `/match` and `/match/summary`.
///
/// Either side may be omitted or `null`; the validator reports which side is empty.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, Deserialize)]
pub struct MatchRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub cv_data: CvData,
    #[serde(default, deserialize_with = "nullable")]
    pub job_description: JobDescription,
}

/// Deserializes `null` as `T::default()`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a JSON string, number or bool as an optional string (`"year": 2020`).
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

/// A string counts as populated when it is present and non-blank.
pub(crate) fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}
