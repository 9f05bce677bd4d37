//! Posting Generator: turns collected job details into a markdown posting.
//!
//! Flow: company description → generation prompt → one LLM call → section check.
//! Anything short of a complete, titled document is replaced by the local
//! template, so callers always receive a posting that passes `is_complete()`.

use tracing::{info, warn};

use crate::conversation::state::Turn;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, WRITER_SYSTEM};
use crate::llm_client::TextGenerator;
use crate::posting::prompts::{COMPANY_DESCRIPTION_PROMPT, GENERATION_PROMPT_TEMPLATE};
use crate::posting::template::{fallback_company_description, render_fallback, PostingDetails};
use crate::posting::validation::{JobPosting, GENERATED_SECTIONS};

/// How many trailing conversation turns are shown to the model.
pub const CONTEXT_TURNS: usize = 3;

/// Short company blurb. Never fails: a generic sentence stands in on error.
pub async fn fetch_company_description(llm: &dyn TextGenerator, company: &str) -> String {
    let prompt = fill_template(COMPANY_DESCRIPTION_PROMPT, &[("company", company)]);
    match llm.generate(&prompt, WRITER_SYSTEM).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => fallback_company_description(company),
        Err(e) => {
            warn!("Company description lookup failed for {company}: {e}");
            fallback_company_description(company)
        }
    }
}

/// Generates a posting for `details`, using the last few `history` turns as context.
pub async fn generate_posting(
    llm: &dyn TextGenerator,
    details: &PostingDetails,
    history: &[Turn],
) -> Result<JobPosting, AppError> {
    info!("Generating job posting for {} at {}", details.role, details.company);

    let company_description = fetch_company_description(llm, &details.company).await;
    let template = render_fallback(details, &company_description);
    let prompt = build_generation_prompt(details, history, &template)?;

    match llm.generate(&prompt, WRITER_SYSTEM).await {
        Ok(text) => {
            let generated = JobPosting::from_model_output(&text);
            let missing = generated.missing_sections(GENERATED_SECTIONS);
            if missing.is_empty() && generated.has_title_line() {
                return Ok(generated);
            }
            warn!(
                "Generated posting rejected (missing sections: {:?}, title line: {}); using template",
                missing,
                generated.has_title_line()
            );
        }
        Err(e) => warn!("Posting generation call failed: {e}; using template"),
    }

    Ok(template)
}

fn build_generation_prompt(
    details: &PostingDetails,
    history: &[Turn],
    template: &JobPosting,
) -> Result<String, AppError> {
    let requirements: Vec<&str> = details.requirements().collect();
    let requirements_json = serde_json::to_string(&requirements)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize requirements: {e}")))?;
    let context = conversation_context(history);

    Ok(fill_template(
        GENERATION_PROMPT_TEMPLATE,
        &[
            ("role", details.role.as_str()),
            ("company", details.company.as_str()),
            ("location", details.location().unwrap_or("Location Flexible")),
            ("experience", details.experience().unwrap_or("Not specified")),
            ("requirements_json", requirements_json.as_str()),
            ("conversation_context", context.as_str()),
            ("template", template.as_str()),
        ],
    ))
}

fn conversation_context(history: &[Turn]) -> String {
    if history.is_empty() {
        return String::new();
    }
    let start = history.len().saturating_sub(CONTEXT_TURNS);
    let turns = history[start..]
        .iter()
        .map(|t| format!("User: {}\nAssistant: {}", t.user, t.assistant))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Previous conversation context:\n{turns}")
}
