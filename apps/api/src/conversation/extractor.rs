//! Field Extractor: one user utterance → confidence-scored job attributes.
//!
//! Extraction is fail-soft: a failed call, unparsable text or a payload that
//! does not match the schema all yield `JobInfo::default()` (every value
//! null, every confidence 0.0).

use serde::Deserialize;
use tracing::{debug, warn};

use crate::conversation::policy::ACCEPTANCE_THRESHOLD;
use crate::conversation::prompts::EXTRACTION_PROMPT_TEMPLATE;
use crate::llm_client::prompts::{fill_template, JSON_ONLY_SYSTEM};
use crate::llm_client::{generate_json, TextGenerator, Validate};

/// A single extracted attribute and how sure the extractor is about it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractedField<T> {
    #[serde(default)]
    pub value: Option<T>,
    pub confidence: f64,
}

impl<T> Default for ExtractedField<T> {
    fn default() -> Self {
        Self {
            value: None,
            confidence: 0.0,
        }
    }
}

impl<T> ExtractedField<T> {
    pub fn new(value: T, confidence: f64) -> Self {
        Self {
            value: Some(value),
            confidence,
        }
    }

    /// The value, if confidence clears the acceptance threshold.
    pub fn accepted(&self) -> Option<&T> {
        if self.confidence >= ACCEPTANCE_THRESHOLD {
            self.value.as_ref()
        } else {
            None
        }
    }

    fn confidence_in_range(&self) -> bool {
        self.confidence.is_finite() && (0.0..=1.0).contains(&self.confidence)
    }
}

/// Everything extracted from one utterance.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobInfo {
    pub role: ExtractedField<String>,
    pub company: ExtractedField<String>,
    pub experience: ExtractedField<String>,
    pub location: ExtractedField<String>,
    pub requirements: ExtractedField<Vec<String>>,
}

impl Validate for JobInfo {
    fn validate(&self) -> Result<(), String> {
        let fields = [
            ("role", self.role.confidence_in_range()),
            ("company", self.company.confidence_in_range()),
            ("experience", self.experience.confidence_in_range()),
            ("location", self.location.confidence_in_range()),
            ("requirements", self.requirements.confidence_in_range()),
        ];
        match fields.iter().find(|(_, ok)| !ok) {
            Some((name, _)) => Err(format!("{name} confidence outside [0, 1]")),
            None => Ok(()),
        }
    }
}

impl JobInfo {
    /// Blank strings and `"null"`-like placeholders become real nulls.
    fn normalized(mut self) -> Self {
        for field in [
            &mut self.role,
            &mut self.company,
            &mut self.experience,
            &mut self.location,
        ] {
            field.value = field
                .value
                .take()
                .map(|v| v.trim().to_string())
                .filter(|v| !is_placeholder(v));
        }
        self.requirements.value = self.requirements.value.take().map(|items| {
            items
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !is_placeholder(r))
                .collect()
        });
        self
    }

    pub fn requirements(&self) -> &[String] {
        self.requirements.value.as_deref().unwrap_or_default()
    }
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty()
        || value.eq_ignore_ascii_case("null")
        || value.eq_ignore_ascii_case("none")
        || value.eq_ignore_ascii_case("n/a")
}

/// Turns literal `\n` escapes and CR/CRLF line endings into plain newlines.
pub fn normalize_line_endings(message: &str) -> String {
    message
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace("\\n", "\n")
}

/// Extracts job attributes from a user message. Never fails.
pub async fn extract_job_info(llm: &dyn TextGenerator, message: &str) -> JobInfo {
    let message = normalize_line_endings(message);
    let prompt = fill_template(EXTRACTION_PROMPT_TEMPLATE, &[("message", message.as_str())]);

    match generate_json::<JobInfo>(llm, &prompt, JSON_ONLY_SYSTEM).await {
        Ok(info) => {
            let info = info.normalized();
            debug!("Extracted job info: {:?}", info);
            info
        }
        Err(e) => {
            warn!("Job info extraction failed, treating message as empty: {e}");
            JobInfo::default()
        }
    }
}
