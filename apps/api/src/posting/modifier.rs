//! Posting Modifier: applies a free-text edit to an existing posting.
//!
//! Budget per request: at most two generation calls and one verification call.
//! Attempt 1 generates and asks the model whether the edit landed. If the
//! verifier says no, attempt 2 regenerates with the verifier's complaint and
//! its output is returned without a second check.

use serde::Deserialize;
use tracing::{info, warn};

use crate::llm_client::prompts::{
    fill_template, JSON_ONLY_SYSTEM, POSTING_FORMAT_RULES, WRITER_SYSTEM,
};
use crate::llm_client::retry::{Attempt, AttemptContext, RetryPolicy};
use crate::llm_client::{generate_json, LlmError, TextGenerator, Validate};
use crate::posting::prompts::{
    MODIFICATION_PROMPT_TEMPLATE, MODIFICATION_RETRY_PROMPT_TEMPLATE,
    VERIFICATION_PROMPT_TEMPLATE,
};
use crate::posting::validation::JobPosting;

/// Verifier's judgement on a modification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Verification {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl Validate for Verification {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Applies `request` to `posting`. Returns `None` if any model call fails.
pub async fn modify_posting(
    llm: &dyn TextGenerator,
    posting: &JobPosting,
    request: &str,
) -> Option<JobPosting> {
    let result = RetryPolicy::default()
        .run("posting modification", |ctx| attempt(llm, posting, request, ctx))
        .await;

    match result {
        Ok(modified) => Some(modified),
        Err(e) => {
            warn!("Posting modification failed: {e}");
            None
        }
    }
}

async fn attempt(
    llm: &dyn TextGenerator,
    posting: &JobPosting,
    request: &str,
    ctx: AttemptContext,
) -> Result<Attempt<JobPosting>, LlmError> {
    let prompt = match &ctx.feedback {
        Some(error) => fill_template(
            MODIFICATION_RETRY_PROMPT_TEMPLATE,
            &[
                ("format_rules", POSTING_FORMAT_RULES),
                ("error", error.as_str()),
                ("request", request),
                ("posting", posting.as_str()),
            ],
        ),
        None => fill_template(
            MODIFICATION_PROMPT_TEMPLATE,
            &[
                ("format_rules", POSTING_FORMAT_RULES),
                ("request", request),
                ("posting", posting.as_str()),
            ],
        ),
    };

    let modified = JobPosting::from_model_output(&llm.generate(&prompt, WRITER_SYSTEM).await?);

    if ctx.is_last {
        return Ok(Attempt::Done(modified));
    }

    let verification_prompt = fill_template(
        VERIFICATION_PROMPT_TEMPLATE,
        &[
            ("request", request),
            ("original", posting.as_str()),
            ("modified", modified.as_str()),
        ],
    );
    let verification: Verification =
        generate_json(llm, &verification_prompt, JSON_ONLY_SYSTEM).await?;

    if verification.success {
        info!("Modification verified on attempt {}", ctx.number);
        Ok(Attempt::Done(modified))
    } else {
        Ok(Attempt::Retry {
            value: modified,
            feedback: verification
                .error
                .unwrap_or_else(|| "the requested change was not applied".to_string()),
        })
    }
}
