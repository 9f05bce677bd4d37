// Rendering of generated postings for the chat UI.
// Pure string transformation; no LLM calls and no shared state.

pub mod html;

pub use html::format_posting;
