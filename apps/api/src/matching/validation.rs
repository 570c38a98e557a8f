//! Minimum-content checks applied once at the request boundary.
//!
//! A field is present when it is non-null; a list additionally needs at least
//! one populated element; a string must be non-blank after trimming.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::{has_text, CvData, JobDescription};

/// Which half of a match request lacked content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Cv,
    Job,
}

impl Side {
    pub fn request_field(self) -> &'static str {
        match self {
            Side::Cv => "cv_data",
            Side::Job => "job_description",
        }
    }

    /// Fields that satisfy the minimum-content rule for this side.
    pub fn recognized_fields(self) -> &'static [&'static str] {
        match self {
            Side::Cv => &["skills", "experience", "education", "projects", "personal_info"],
            Side::Job => &["title", "description", "requirements", "preferred_qualifications"],
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Cv => f.write_str("cv"),
            Side::Job => f.write_str("job"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{} must contain at least one populated field ({})",
    .side.request_field(),
    .side.recognized_fields().join(", ")
)]
pub struct ValidationError {
    pub side: Side,
}

/// Accepts the pair when both sides carry some recognized content.
/// The CV side is checked first.
pub fn validate_match_input(cv: &CvData, job: &JobDescription) -> Result<(), ValidationError> {
    if !cv_has_content(cv) {
        return Err(ValidationError { side: Side::Cv });
    }
    if !job_has_content(job) {
        return Err(ValidationError { side: Side::Job });
    }
    Ok(())
}

pub fn cv_has_content(cv: &CvData) -> bool {
    cv.skills.iter().any(|s| !s.trim().is_empty())
        || cv.experience.iter().any(|e| e.is_populated())
        || cv.education.iter().any(|e| e.is_populated())
        || cv.projects.iter().any(|p| p.is_populated())
        || cv.personal_info.as_ref().is_some_and(|p| p.is_populated())
}

pub fn job_has_content(job: &JobDescription) -> bool {
    has_text(&job.title)
        || has_text(&job.description)
        || job.requirements.iter().any(|r| !r.trim().is_empty())
        || job.preferred_qualifications.iter().any(|q| !q.trim().is_empty())
}
