//! Matching orchestrator: validate, build prompt, call provider, parse, stamp.
//!
//! Every failure propagates unchanged; there is no fallback result.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::errors::AppError;
use crate::llm_client::{LlmConfig, LlmProvider};
use crate::matching::parser::parse_analysis;
use crate::matching::prompts::build_match_prompt;
use crate::matching::validation::validate_match_input;
use crate::models::{CvData, JobDescription, MatchResult, MatchSummary};

pub const DEFAULT_SUMMARY_TOP_N: usize = 3;
pub const MAX_SUMMARY_TOP_N: usize = 20;

/// Holds the provider and its read-only settings. Cheap to share across
/// concurrent requests; all per-request state is local to `match_cv_to_job`.
pub struct Matcher {
    llm: Arc<dyn LlmProvider>,
    config: LlmConfig,
}

impl Matcher {
    pub fn new(llm: Arc<dyn LlmProvider>, config: LlmConfig) -> Self {
        Self { llm, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Runs one full match cycle and returns the stamped report.
    pub async fn match_cv_to_job(
        &self,
        cv: &CvData,
        job: &JobDescription,
    ) -> Result<MatchResult, AppError> {
        let started = Instant::now();

        validate_match_input(cv, job)?;
        debug!("validated input in {:?}", started.elapsed());

        let stage = Instant::now();
        let prompt = build_match_prompt(cv, job);
        debug!(
            "built prompt ({} chars) in {:?}",
            prompt.len(),
            stage.elapsed()
        );

        let stage = Instant::now();
        let raw = self.llm.generate(&prompt, &self.config).await?;
        debug!(
            "provider responded ({} chars) in {:?}",
            raw.len(),
            stage.elapsed()
        );

        let stage = Instant::now();
        let analysis = parse_analysis(&raw)?;
        debug!("parsed response in {:?}", stage.elapsed());

        let processing_time = started.elapsed().as_secs_f64();
        info!(
            "match completed: score={} matched={} missing={} in {:.2}s",
            analysis.overall_analysis.compatibility_score,
            analysis.matched_requirements.len(),
            analysis.missing_requirements.len(),
            processing_time
        );

        Ok(MatchResult {
            analysis,
            processing_time,
            model_used: self.config.model.clone(),
        })
    }

    /// Same cycle as `match_cv_to_job`, condensed to the top `top_n` entries.
    pub async fn summarize(
        &self,
        cv: &CvData,
        job: &JobDescription,
        top_n: usize,
    ) -> Result<MatchSummary, AppError> {
        let result = self.match_cv_to_job(cv, job).await?;
        Ok(MatchSummary::from_result(
            result,
            top_n.clamp(1, MAX_SUMMARY_TOP_N),
        ))
    }
}
