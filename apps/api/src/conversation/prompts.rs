// All LLM prompt constants for the Conversation module.

/// Field extraction prompt. Replace `{message}` before sending.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract ALL job-related information from this message: "{message}"

Rules:
1. For role:
   - Normalize common terms (e.g., "dev" -> "Developer", "BE" -> "Backend")
   - Look for role-related words (engineer, developer, manager, etc.)
2. For company:
   - Clean up company names (e.g., "fb" -> "Facebook", "goog" -> "Google")
   - Look for company indicators (at, for, with, @)
3. For experience:
   - Look for years of experience mentioned (e.g., "15+ years", "minimum 5 years")
   - Consider variations like "experienced", "senior", "veteran"
4. For location:
   - Look for city, state, or country names
   - Consider remote/hybrid/onsite mentions
   - Use null if not mentioned
5. For requirements:
   - Extract technical skills, soft skills and qualifications

Confidence is a number between 0.0 and 1.0. Use null values with confidence 0.0 for anything not mentioned.

Return JSON with this EXACT schema:
{
  "role": {"value": "extracted role", "confidence": 0.9},
  "company": {"value": "extracted company", "confidence": 0.9},
  "experience": {"value": "extracted experience", "confidence": 0.9},
  "location": {"value": "extracted location", "confidence": 0.9},
  "requirements": {"value": ["requirement1", "requirement2"], "confidence": 0.9}
}"#;

/// Intent classification prompt. Replace `{message}` before sending.
pub const INTENT_PROMPT_TEMPLATE: &str = r#"A job posting has just been shown to the user. Analyze if the user wants to modify or post the job posting.

User message: "{message}"

Return JSON:
{
  "intent": "modify",
  "confidence": 0.9
}
"intent" is either "modify" or "post". "confidence" is a number between 0.0 and 1.0."#;
