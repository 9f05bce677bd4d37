//! Chat Router: one user turn against one session's state.
//!
//! Flow while gathering: extract → promote accepted fields → missing-info
//! policy → (ask once) or (resolve defaults → generate → format).
//! Once a posting is shown, turns go to the Intent Router instead.

use serde::Serialize;
use tracing::info;

use crate::conversation::extractor::{extract_job_info, JobInfo};
use crate::conversation::intent::handle_posting_response;
use crate::conversation::policy::clarification_question;
use crate::conversation::state::{AccumulatedFields, ConversationState, LastAction};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::posting::generator::generate_posting;
use crate::posting::template::PostingDetails;
use crate::render::format_posting;

pub const DEFAULT_ROLE: &str = "Software Engineer";
pub const DEFAULT_COMPANY: &str = "the Company";
pub const DEFAULT_LOCATION: &str = "Remote";

pub const EMPTY_MESSAGE: &str = "Please enter a message.";
pub const POSTING_CREATED: &str = "I've created a job posting based on your input. Here it is:";
pub const CREATED_FOLLOW_UP: &str = "Would you like to modify any part of this job posting, or \
    would you like to proceed with posting it?";
pub const TURN_FAILED: &str = "I encountered an error. Please try again with your request.";

/// What the assistant says back for one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_posting: Option<String>,
    #[serde(rename = "isJobPosting")]
    pub is_job_posting: bool,
    #[serde(rename = "followUp", skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
}

impl ChatReply {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            response: text.into(),
            job_posting: None,
            is_job_posting: false,
            follow_up: None,
        }
    }

    pub fn posting(text: impl Into<String>, html: String, follow_up: impl Into<String>) -> Self {
        Self {
            response: text.into(),
            job_posting: Some(html),
            is_job_posting: true,
            follow_up: Some(follow_up.into()),
        }
    }
}

/// Runs one chat turn. The caller holds the session lock for the whole call.
pub async fn handle_turn(
    llm: &dyn TextGenerator,
    state: &mut ConversationState,
    message: &str,
) -> Result<ChatReply, AppError> {
    let message = message.trim();
    if message.is_empty() {
        return Ok(ChatReply::message(EMPTY_MESSAGE));
    }

    let reply = if state.last_action == LastAction::ShowingPosting {
        handle_posting_response(llm, state, message).await
    } else {
        gather_and_generate(llm, state, message).await?
    };

    state.record_turn(message, &reply.response);
    if reply.is_job_posting {
        state.pending_result = Some(reply.clone());
    }
    Ok(reply)
}

async fn gather_and_generate(
    llm: &dyn TextGenerator,
    state: &mut ConversationState,
    message: &str,
) -> Result<ChatReply, AppError> {
    let latest = extract_job_info(llm, message).await;
    state.accumulated.absorb(&latest);

    let known = state.accumulated.overlay(&latest);
    if let Some(question) = clarification_question(&known) {
        if !state.awaiting_clarification {
            state.awaiting_clarification = true;
            return Ok(ChatReply::message(question));
        }
        info!("Clarification already asked; proceeding with defaults");
    }

    let details = resolve_details(&state.accumulated, &latest);
    state.reset_gathering();

    let posting = generate_posting(llm, &details, &state.history).await?;

    let html = format_posting(posting.as_str());
    state.final_posting = Some(posting);
    state.last_action = LastAction::ShowingPosting;
    Ok(ChatReply::posting(POSTING_CREATED, html, CREATED_FOLLOW_UP))
}

/// Accumulated values win, then whatever the latest message said (even at
/// low confidence), then the literal defaults.
fn resolve_details(accumulated: &AccumulatedFields, latest: &JobInfo) -> PostingDetails {
    let pick = |known: &Option<String>, fresh: &Option<String>, default: &str| {
        known
            .clone()
            .or_else(|| fresh.clone())
            .unwrap_or_else(|| default.to_string())
    };

    PostingDetails {
        role: pick(&accumulated.role, &latest.role.value, DEFAULT_ROLE),
        company: pick(&accumulated.company, &latest.company.value, DEFAULT_COMPANY),
        location: Some(pick(
            &accumulated.location,
            &latest.location.value,
            DEFAULT_LOCATION,
        )),
        experience: accumulated
            .experience
            .clone()
            .or_else(|| latest.experience.value.clone()),
        requirements: if accumulated.skills.is_empty() {
            latest.requirements().to_vec()
        } else {
            accumulated.skills.clone()
        },
    }
}
