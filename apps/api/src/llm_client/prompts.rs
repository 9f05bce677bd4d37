// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for free-form prose (descriptions, postings).
pub const WRITER_SYSTEM: &str = "You are an expert technical recruiter and copywriter. \
    You write clear, inclusive, professional job postings in markdown. \
    Return only the requested content, without preamble or commentary.";

/// Formatting rules shared by every prompt that returns a full posting.
pub const POSTING_FORMAT_RULES: &str = "\
    1. Use # for the main title and ## for section headers\n\
    2. Use * bullet points for lists\n\
    3. Keep the section order: About, Role Overview, Key Responsibilities, \
    Required Qualifications, Preferred Qualifications, Benefits & Perks\n\
    4. Return the complete posting in markdown and nothing else";

/// Fills `{name}` placeholders in one left-to-right pass.
///
/// Substituted values are never rescanned, so text a user typed that happens
/// to look like a placeholder reaches the model literally. Braces that do not
/// enclose a known name (JSON examples in prompts) are copied as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let known = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match known {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
