//! Intent Router: handles the message that follows a shown posting.
//!
//! The message is classified as "modify" or "post". Modifications go through
//! the Posting Modifier and must still pass the completeness check before
//! they replace the stored posting.

use serde::Deserialize;
use tracing::{info, warn};

use crate::conversation::policy::ACCEPTANCE_THRESHOLD;
use crate::conversation::prompts::INTENT_PROMPT_TEMPLATE;
use crate::conversation::router::ChatReply;
use crate::conversation::state::{ConversationState, LastAction};
use crate::llm_client::prompts::{fill_template, JSON_ONLY_SYSTEM};
use crate::llm_client::{generate_json, LlmError, TextGenerator, Validate};
use crate::posting::modifier::modify_posting;
use crate::posting::validation::REQUIRED_SECTIONS;
use crate::render::format_posting;

pub const INTENT_UNCLEAR: &str = "I'm not quite sure if you want to modify the posting or proceed \
    with posting it. Could you please clarify?";
pub const POST_ACKNOWLEDGED: &str = "Great! I recommend posting this job on platforms like \
    LinkedIn, Indeed, and your company's career page. Would you like to create another \
    job posting?";
pub const POSTING_UPDATED: &str =
    "I've updated the job posting based on your request. Here's the modified version:";
pub const UPDATE_FOLLOW_UP: &str =
    "Would you like to make any other changes, or should we proceed with posting?";
pub const MODIFICATION_INCOMPLETE: &str = "I couldn't properly modify the job posting while \
    maintaining all required sections. Could you please rephrase your modification request?";
pub const MODIFICATION_FAILED: &str =
    "I had trouble modifying the job posting. Could you please rephrase your request?";
pub const POSTING_UNAVAILABLE: &str =
    "I'm having trouble accessing the job posting. Could you please try again?";
pub const CLASSIFICATION_FAILED: &str = "I'm having trouble understanding your request. Would you \
    like to modify the job posting or proceed with posting it?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Modify,
    Post,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IntentClassification {
    pub intent: Intent,
    pub confidence: f64,
}

impl Validate for IntentClassification {
    fn validate(&self) -> Result<(), String> {
        if self.confidence.is_finite() && (0.0..=1.0).contains(&self.confidence) {
            Ok(())
        } else {
            Err(format!("confidence {} outside [0, 1]", self.confidence))
        }
    }
}

pub async fn classify_intent(
    llm: &dyn TextGenerator,
    message: &str,
) -> Result<IntentClassification, LlmError> {
    let prompt = fill_template(INTENT_PROMPT_TEMPLATE, &[("message", message)]);
    generate_json(llm, &prompt, JSON_ONLY_SYSTEM).await
}

/// Routes a reply to a shown posting. Never fails; problems become clarification requests.
pub async fn handle_posting_response(
    llm: &dyn TextGenerator,
    state: &mut ConversationState,
    message: &str,
) -> ChatReply {
    let classification = match classify_intent(llm, message).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Intent classification failed: {e}");
            return ChatReply::message(CLASSIFICATION_FAILED);
        }
    };

    if classification.confidence < ACCEPTANCE_THRESHOLD {
        return ChatReply::message(INTENT_UNCLEAR);
    }

    match classification.intent {
        Intent::Post => {
            info!("User chose to post the job");
            state.last_action = LastAction::HandlingResponse;
            state.reset_gathering();
            ChatReply::message(POST_ACKNOWLEDGED)
        }
        Intent::Modify => apply_modification(llm, state, message).await,
    }
}

async fn apply_modification(
    llm: &dyn TextGenerator,
    state: &mut ConversationState,
    request: &str,
) -> ChatReply {
    let Some(current) = state.final_posting.as_ref() else {
        state.last_action = LastAction::None;
        return ChatReply::message(POSTING_UNAVAILABLE);
    };

    let Some(modified) = modify_posting(llm, current, request).await else {
        return ChatReply::message(MODIFICATION_FAILED);
    };

    let missing = modified.missing_sections(REQUIRED_SECTIONS);
    if !missing.is_empty() {
        warn!("Modified posting dropped required sections: {:?}", missing);
        return ChatReply::message(MODIFICATION_INCOMPLETE);
    }
    if !modified.has_title_line() {
        warn!("Modified posting does not start with a title line");
        return ChatReply::message(MODIFICATION_INCOMPLETE);
    }

    let html = format_posting(modified.as_str());
    state.final_posting = Some(modified);
    state.last_action = LastAction::ShowingPosting;
    ChatReply::posting(POSTING_UPDATED, html, UPDATE_FOLLOW_UP)
}
