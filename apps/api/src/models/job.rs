use serde::{Deserialize, Serialize};

use super::{lenient_string, nullable};

/// Job description data. Every field is optional; see `matching::validation`
/// for the minimum-content rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDescription {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub requirements: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub preferred_qualifications: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub employment_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub salary_range: Option<String>,
}
