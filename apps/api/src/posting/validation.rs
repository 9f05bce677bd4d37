/// Sections every stored posting must carry.
pub const REQUIRED_SECTIONS: &[&str] = &[
    "About",
    "Role Overview",
    "Key Responsibilities",
    "Required Qualifications",
    "Benefits",
];

/// Sections a freshly generated posting must carry before it is accepted
/// over the local template.
pub const GENERATED_SECTIONS: &[&str] = &[
    "About",
    "Role Overview",
    "Key Responsibilities",
    "Required Qualifications",
    "Preferred Qualifications",
    "Benefits",
];

/// An immutable markdown job posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPosting(String);

impl JobPosting {
    pub fn new(markdown: impl Into<String>) -> Self {
        let markdown = markdown.into();
        Self(markdown.trim().to_string())
    }

    /// Posting from raw model text, with any surrounding code fence removed.
    pub fn from_model_output(text: &str) -> Self {
        Self::new(strip_markdown_fence(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the document opens with a `# ` title line.
    pub fn has_title_line(&self) -> bool {
        self.0.starts_with("# ")
    }

    /// Text of every section heading (`##` and deeper), in document order.
    pub fn section_headings(&self) -> Vec<&str> {
        self.0
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("##"))
            .map(|line| line.trim_start_matches('#').trim())
            .collect()
    }

    /// Names from `sections` with no section heading containing them.
    /// Matching is case-sensitive and anchored to heading lines, so a name
    /// mentioned in prose does not count.
    pub fn missing_sections<'a>(&self, sections: &[&'a str]) -> Vec<&'a str> {
        let headings = self.section_headings();
        sections
            .iter()
            .copied()
            .filter(|name| !headings.iter().any(|h| h.contains(name)))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_sections(REQUIRED_SECTIONS).is_empty()
    }
}

/// Models sometimes wrap the whole document in a ```markdown fence.
fn strip_markdown_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.trim().strip_suffix("```").unwrap_or(rest).trim()
}
