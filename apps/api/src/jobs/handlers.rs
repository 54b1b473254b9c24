//! Task handlers — one per task type.
//!
//! Handlers are pure with respect to the record store: they may read (resume
//! resolution) but never write. Persistence happens in the reconciler after
//! a handler returns.

use crate::errors::AppError;
use crate::jobs::prompts::{
    ANALYZE_PROMPT_TEMPLATE, ANALYZE_SYSTEM, COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM,
};
use crate::jobs::types::{AnalyzeResumePayload, GenerateCoverLetterPayload};
use crate::llm_client::{strip_json_fences, GenerationOptions, TextGenerator};
use crate::models::application::AnalysisResult;
use crate::store::ResumeStore;

const ANALYZE_OPTS: GenerationOptions = GenerationOptions {
    temperature: 0.4,
    max_tokens: 1500,
};

const COVER_LETTER_OPTS: GenerationOptions = GenerationOptions {
    temperature: 0.6,
    max_tokens: 800,
};

/// Analyzes resume text against a job description.
///
/// Text resolution: direct `resume_text` takes precedence; otherwise the
/// referenced resume is loaded and must be owned by the requesting user.
pub async fn analyze_resume(
    resumes: &dyn ResumeStore,
    llm: &dyn TextGenerator,
    payload: &AnalyzeResumePayload,
) -> Result<AnalysisResult, AppError> {
    let direct = payload
        .resume_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let resolved = match direct {
        Some(text) => text.to_string(),
        None => match payload.resume_id {
            Some(resume_id) => {
                let resume = resumes
                    .find_owned(resume_id, payload.user_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Ownership("Resume not found or not owned by user".to_string())
                    })?;
                resume.extracted_text.unwrap_or_default()
            }
            None => String::new(),
        },
    };

    if resolved.trim().is_empty() {
        return Err(AppError::Validation(
            "No resume text available for analysis".to_string(),
        ));
    }

    let prompt = ANALYZE_PROMPT_TEMPLATE
        .replace("{resume_text}", &resolved)
        .replace("{job_description}", &payload.job_description);

    let raw = llm.generate(ANALYZE_SYSTEM, &prompt, ANALYZE_OPTS).await?;
    let text = strip_json_fences(&raw);

    let analysis: AnalysisResult = serde_json::from_str(text).map_err(|e| {
        AppError::MalformedResponse(format!("analysis was not valid JSON: {e}"))
    })?;

    if !(0..=100).contains(&analysis.match_score) {
        return Err(AppError::MalformedResponse(format!(
            "matchScore {} is outside 0-100",
            analysis.match_score
        )));
    }

    Ok(analysis)
}

/// Generates a cover letter as free text.
pub async fn generate_cover_letter(
    llm: &dyn TextGenerator,
    payload: &GenerateCoverLetterPayload,
) -> Result<String, AppError> {
    // Payloads are validated at enqueue time, but redelivered tasks may
    // predate that check.
    payload.validate()?;

    let prompt = COVER_LETTER_PROMPT_TEMPLATE
        .replace("{position}", &payload.position)
        .replace("{company}", &payload.company)
        .replace("{resume_summary}", &payload.resume_summary)
        .replace("{job_description}", &payload.job_description);

    let raw = llm
        .generate(COVER_LETTER_SYSTEM, &prompt, COVER_LETTER_OPTS)
        .await?;

    let letter = raw.trim();
    if letter.is_empty() {
        return Err(AppError::EmptyResponse);
    }
    Ok(letter.to_string())
}
