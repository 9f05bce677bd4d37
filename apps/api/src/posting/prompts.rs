// All LLM prompt constants for the Posting module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Company description prompt. Replace `{company}` before sending.
pub const COMPANY_DESCRIPTION_PROMPT: &str = "Describe {company} in 2-3 sentences focusing on \
    main business, industry, and notable achievements. Return only the description.";

/// Posting generation prompt.
/// Replace: {role}, {company}, {location}, {experience}, {requirements_json},
///          {conversation_context}, {template}
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"Create a detailed job posting using ALL the following information:

Role: {role}
Company: {company}
Location: {location}
Experience Required: {experience}
Additional Requirements (JSON list): {requirements_json}

{conversation_context}

Use this EXACT format and include ALL provided information:

{template}

Replace the bullet points above with specific details relevant to a {role} position at {company}.
Keep every section header exactly as written. Return only the markdown posting."#;

/// Posting modification prompt.
/// Replace: {posting}, {request}, {format_rules}
pub const MODIFICATION_PROMPT_TEMPLATE: &str = r#"You are an expert at modifying job postings. Given a job posting and a modification request, generate an updated version.

Current job posting:
{posting}

Modification request: {request}

Handle the following types of modifications:
1. Remove entire section (e.g., "remove benefits section")
2. Add new section (e.g., "add a section about work culture")
3. Remove specific point (e.g., "remove the point about travel requirements from responsibilities")
4. Modify specific point/sentence (e.g., "change '5 years experience' to '3 years experience'")
5. Add point to section (e.g., "add health insurance to benefits")
6. Update section content (e.g., "make responsibilities more technical")

Rules:
{format_rules}
5. Preserve all unaffected sections exactly as they are
6. Make only the requested change
7. Match the style and tone of the existing content when adding content

Return the complete modified job posting."#;

/// Verification prompt: asks whether a modification was applied.
/// Replace: {original}, {request}, {modified}
pub const VERIFICATION_PROMPT_TEMPLATE: &str = r#"Verify if the following modification was correctly applied.

Original posting:
{original}

Requested change:
{request}

Modified posting:
{modified}

Return ONLY a JSON object:
{
  "success": true,
  "error": null
}
Set "success" to false and "error" to a short explanation if the change was not applied correctly."#;

/// Retry prompt after a failed verification.
/// Replace: {posting}, {request}, {error}, {format_rules}
pub const MODIFICATION_RETRY_PROMPT_TEMPLATE: &str = r#"The previous modification attempt failed. Please try again with this specific focus.

Original posting:
{posting}

Modification request: {request}
Error feedback: {error}

Rules:
{format_rules}

Focus on making ONLY the requested change while preserving everything else exactly as is."#;

