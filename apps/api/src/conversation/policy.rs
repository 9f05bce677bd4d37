//! Missing-Info Policy: decides whether to ask a clarifying question.
//!
//! Pure: reads an extraction, never touches conversation state.

use crate::conversation::extractor::JobInfo;

/// Minimum confidence for an extracted value to count.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.6;

/// Fields a posting cannot be generated without asking about first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Role,
    Company,
    Location,
}

impl RequiredField {
    pub const ALL: [RequiredField; 3] = [
        RequiredField::Role,
        RequiredField::Company,
        RequiredField::Location,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RequiredField::Role => "job role",
            RequiredField::Company => "company name",
            RequiredField::Location => "location",
        }
    }
}

/// Required fields that are absent or below the acceptance threshold, in fixed order.
pub fn missing_fields(info: &JobInfo) -> Vec<RequiredField> {
    RequiredField::ALL
        .into_iter()
        .filter(|field| {
            let extracted = match field {
                RequiredField::Role => &info.role,
                RequiredField::Company => &info.company,
                RequiredField::Location => &info.location,
            };
            extracted.accepted().is_none()
        })
        .collect()
}

/// Question asking for `missing`, or `None` when nothing is missing.
pub fn question_for(missing: &[RequiredField]) -> Option<String> {
    match missing {
        [] => None,
        [only] => Some(format!(
            "Could you also provide the {}? This will help me create a more targeted job post.",
            only.label()
        )),
        [first, second] => Some(format!(
            "Could you also provide the {} and {}? This will help me create a more complete job post.",
            first.label(),
            second.label()
        )),
        [init @ .., last] => Some(format!(
            "Could you please provide the {}, and {}? This will help me create a comprehensive job post.",
            init.iter().map(|f| f.label()).collect::<Vec<_>>().join(", "),
            last.label()
        )),
    }
}

/// Clarifying question for an extraction, or `None` if generation can proceed.
pub fn clarification_question(info: &JobInfo) -> Option<String> {
    question_for(&missing_fields(info))
}
