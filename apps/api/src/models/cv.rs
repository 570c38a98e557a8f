use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{has_text, lenient_string, nullable};

/// Structured CV data. Every section is optional; see `matching::validation`
/// for the minimum-content rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default, deserialize_with = "nullable")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "nullable")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "nullable")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "nullable")]
    pub certifications: Vec<Certification>,
    #[serde(default, deserialize_with = "nullable")]
    pub languages: Vec<LanguageProficiency>,
    /// Free-form extras, kept sorted so prompts are deterministic.
    #[serde(default, deserialize_with = "nullable")]
    pub additional_info: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub linkedin: Option<String>,
    /// Any other keys the client sent (website, github, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PersonalInfo {
    /// Populated `(label, value)` pairs in rendering order: known keys first,
    /// then extras alphabetically.
    pub fn fields(&self) -> Vec<(String, String)> {
        let known = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("location", &self.location),
            ("linkedin", &self.linkedin),
        ];

        let mut fields: Vec<(String, String)> = known
            .into_iter()
            .filter(|(_, v)| has_text(v))
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.to_string(), v.trim().to_string())))
            .collect();

        fields.extend(
            self.extra
                .iter()
                .filter_map(|(k, v)| scalar_text(v).map(|v| (k.clone(), v))),
        );
        fields
    }

    pub fn is_populated(&self) -> bool {
        !self.fields().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub field: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub institution: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gpa: Option<String>,
}

impl Education {
    pub fn is_populated(&self) -> bool {
        [&self.degree, &self.field, &self.institution, &self.year, &self.gpa]
            .into_iter()
            .any(has_text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

impl Experience {
    pub fn is_populated(&self) -> bool {
        [&self.title, &self.company, &self.duration, &self.description]
            .into_iter()
            .any(has_text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub technologies: Vec<String>,
}

impl Project {
    pub fn is_populated(&self) -> bool {
        has_text(&self.name)
            || has_text(&self.description)
            || self.technologies.iter().any(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issuer: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: Option<String>,
}

impl Certification {
    pub fn is_populated(&self) -> bool {
        [&self.name, &self.issuer, &self.year].into_iter().any(has_text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageProficiency {
    #[serde(default, deserialize_with = "lenient_string")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub proficiency: Option<String>,
}

/// Renders a JSON value as prompt text. Blank strings, nulls and empty
/// containers yield `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}
