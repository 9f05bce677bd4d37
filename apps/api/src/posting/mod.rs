// Job posting documents: generation, modification and the completeness check.
// The local template is the fallback whenever the model output is unusable.

pub mod generator;
pub mod modifier;
pub mod prompts;
pub mod template;
pub mod validation;
