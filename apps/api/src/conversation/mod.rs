// Conversation layer: per-session state, field extraction, the missing-info
// policy and routing of each chat turn.
// All LLM calls go through llm_client::TextGenerator.

pub mod extractor;
pub mod handlers;
pub mod intent;
pub mod policy;
pub mod prompts;
pub mod router;
pub mod state;
