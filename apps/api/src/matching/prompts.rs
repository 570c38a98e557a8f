//! Prompt builder for CV/job compatibility analysis.
//!
//! Only populated fields are rendered. Absent sections are left out entirely
//! so the model is not nudged into penalizing data the client never sent.

use std::fmt::Write;

use crate::models::cv::scalar_text;
use crate::models::{has_text, CvData, JobDescription};

pub const CV_HEADER: &str = "CANDIDATE CV:";
pub const JOB_HEADER: &str = "JOB DESCRIPTION:";

/// Instructions and the response schema, appended after both data sections.
pub const MATCH_INSTRUCTIONS: &str = r#"Compare the candidate CV above against the job description above.

Consider every dimension for which data is provided: education, experience, skills, projects and tools/frameworks.
Judge only the information that is present. Do not penalize the candidate for sections that were not provided.

Return a JSON object with this EXACT schema (no extra fields):
{
  "matched_requirements": [
    {
      "requirement": "Python programming",
      "cv_evidence": "Lists Python; built ML pipelines in Python at DataFlow",
      "match_strength": "high",
      "relevance_score": 9
    }
  ],
  "missing_requirements": [
    {
      "requirement": "Kubernetes experience",
      "importance": "important",
      "alternative_skills": ["Docker"]
    }
  ],
  "overall_analysis": {
    "compatibility_score": 78,
    "strengths": ["Strong Python background"],
    "gaps": ["No container orchestration experience"],
    "recommendations": ["Highlight Docker work as a bridge to Kubernetes"]
  },
  "detailed_breakdown": {
    "education_match": 80,
    "skills_match": 85,
    "experience_match": 70,
    "tools_frameworks_match": 60
  }
}

Rules:
- "match_strength" is one of "low", "medium", "high".
- "relevance_score" is an integer from 0 to 10.
- "importance" is one of "critical", "important", "nice-to-have".
- "alternative_skills" lists related skills found in the CV; leave the key out when there are none.
- "compatibility_score" and every "detailed_breakdown" score are integers from 0 to 100.
- Every job requirement must appear in either "matched_requirements" or "missing_requirements".
- "cv_evidence" must quote or paraphrase the CV; never invent facts."#;

/// Builds the user prompt for one match. Deterministic for identical input.
pub fn build_match_prompt(cv: &CvData, job: &JobDescription) -> String {
    format!(
        "{CV_HEADER}\n{}\n\n{JOB_HEADER}\n{}\n\n{MATCH_INSTRUCTIONS}",
        render_cv(cv),
        render_job(job)
    )
}

fn render_cv(cv: &CvData) -> String {
    let mut out = String::new();

    if let Some(info) = &cv.personal_info {
        let fields = info.fields();
        if !fields.is_empty() {
            out.push_str("Personal information:\n");
            for (key, value) in fields {
                let _ = writeln!(out, "- {key}: {value}");
            }
        }
    }

    let education: Vec<String> = cv
        .education
        .iter()
        .filter(|e| e.is_populated())
        .map(|e| {
            let mut line = join_present(&[&e.degree, &e.field], " in ").unwrap_or_default();
            if let Some(institution) = text(&e.institution) {
                append_with_sep(&mut line, ", ", institution);
            }
            if let Some(year) = text(&e.year) {
                let _ = write!(line, " ({year})");
            }
            if let Some(gpa) = text(&e.gpa) {
                append_with_sep(&mut line, ", ", &format!("GPA {gpa}"));
            }
            line.trim().to_string()
        })
        .collect();
    push_list(&mut out, "Education", &education);

    let experience: Vec<String> = cv
        .experience
        .iter()
        .filter(|e| e.is_populated())
        .map(|e| {
            let mut line = join_present(&[&e.title, &e.company], " at ").unwrap_or_default();
            if let Some(duration) = text(&e.duration) {
                let _ = write!(line, " ({duration})");
            }
            if let Some(description) = text(&e.description) {
                if line.is_empty() {
                    line.push_str(description);
                } else {
                    let _ = write!(line, ": {description}");
                }
            }
            line.trim().to_string()
        })
        .collect();
    push_list(&mut out, "Experience", &experience);

    let skills = non_blank(&cv.skills);
    if !skills.is_empty() {
        let _ = writeln!(out, "Skills: {}", skills.join(", "));
    }

    let projects: Vec<String> = cv
        .projects
        .iter()
        .filter(|p| p.is_populated())
        .map(|p| {
            let mut line = join_present(&[&p.name, &p.description], ": ").unwrap_or_default();
            let technologies = non_blank(&p.technologies);
            if !technologies.is_empty() {
                if !line.is_empty() {
                    line.push(' ');
                }
                let _ = write!(line, "[technologies: {}]", technologies.join(", "));
            }
            line
        })
        .collect();
    push_list(&mut out, "Projects", &projects);

    let certifications: Vec<String> = cv
        .certifications
        .iter()
        .filter(|c| c.is_populated())
        .map(|c| {
            let mut line = join_present(&[&c.name, &c.issuer], " from ").unwrap_or_default();
            if let Some(year) = text(&c.year) {
                let _ = write!(line, " ({year})");
            }
            line.trim().to_string()
        })
        .collect();
    push_list(&mut out, "Certifications", &certifications);

    let languages: Vec<String> = cv
        .languages
        .iter()
        .filter_map(|l| {
            let language = text(&l.language)?;
            Some(match text(&l.proficiency) {
                Some(level) => format!("{language} ({level})"),
                None => language.to_string(),
            })
        })
        .collect();
    push_list(&mut out, "Languages", &languages);

    let additional: Vec<String> = cv
        .additional_info
        .iter()
        .filter_map(|(k, v)| scalar_text(v).map(|v| format!("{k}: {v}")))
        .collect();
    push_list(&mut out, "Additional information", &additional);

    out.trim_end().to_string()
}

fn render_job(job: &JobDescription) -> String {
    let mut out = String::new();

    for (label, value) in [
        ("Title", &job.title),
        ("Company", &job.company),
        ("Location", &job.location),
        ("Employment type", &job.employment_type),
        ("Salary range", &job.salary_range),
    ] {
        if let Some(value) = text(value) {
            let _ = writeln!(out, "{label}: {value}");
        }
    }

    if let Some(description) = text(&job.description) {
        let _ = writeln!(out, "Description: {description}");
    }

    push_list(&mut out, "Requirements", &non_blank(&job.requirements));
    push_list(
        &mut out,
        "Preferred qualifications",
        &non_blank(&job.preferred_qualifications),
    );

    out.trim_end().to_string()
}

fn text(value: &Option<String>) -> Option<&str> {
    if has_text(value) {
        value.as_deref().map(str::trim)
    } else {
        None
    }
}

fn non_blank(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins the populated values with `sep`; `None` when none are populated.
fn join_present(values: &[&Option<String>], sep: &str) -> Option<String> {
    let parts: Vec<&str> = values.iter().filter_map(|v| text(v)).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(sep))
    }
}

/// Appends `value`, preceded by `sep` unless `line` is still empty.
fn append_with_sep(line: &mut String, sep: &str, value: &str) {
    if !line.is_empty() {
        line.push_str(sep);
    }
    line.push_str(value);
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}:");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}
