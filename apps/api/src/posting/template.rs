//! Deterministic posting template. Used whenever model output is missing or
//! malformed, so it must always satisfy the completeness check.

use crate::posting::validation::JobPosting;

/// Everything known about the job when a posting is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingDetails {
    pub role: String,
    pub company: String,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub requirements: Vec<String>,
}

impl PostingDetails {
    /// Location with blanks treated as absent.
    pub fn location(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    pub fn experience(&self) -> Option<&str> {
        non_blank(self.experience.as_deref())
    }

    pub fn requirements(&self) -> impl Iterator<Item = &str> {
        self.requirements
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
    }

    /// `# Role at Company[ - Location]`
    pub fn title_line(&self) -> String {
        match self.location() {
            Some(location) => format!("# {} at {} - {}", self.role, self.company, location),
            None => format!("# {} at {}", self.role, self.company),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Generic company blurb used when the description lookup fails.
pub fn fallback_company_description(company: &str) -> String {
    format!("{company} is a company operating in its respective industry.")
}

/// Builds the full posting without any model involvement.
pub fn render_fallback(details: &PostingDetails, company_description: &str) -> JobPosting {
    let location = details.location();
    let experience = details.experience();
    let mut out = Vec::new();

    out.push(details.title_line());
    out.push(String::new());

    out.push(format!("## About {}", details.company));
    out.push(company_description.trim().to_string());
    out.push(String::new());

    let mut overview = format!("We are seeking an experienced {} to join our team", details.role);
    if let Some(location) = location {
        overview.push_str(&format!(" in {location}"));
    }
    if let Some(experience) = experience {
        overview.push_str(&format!(". Candidates should have {experience}"));
    }
    overview.push_str(
        ". This position offers an exciting opportunity to make a significant impact while \
         working with cutting-edge technologies. You will work closely with cross-functional \
         teams to deliver innovative solutions.",
    );
    out.push("## Role Overview".to_string());
    out.push(overview);
    out.push(String::new());

    out.push("## Key Responsibilities".to_string());
    out.extend(
        [
            "Design and implement scalable solutions for complex technical challenges",
            "Collaborate with product managers, designers, and other engineers",
            "Lead technical initiatives and architectural decisions",
            "Mentor team members and promote best practices",
            "Participate in code reviews and technical discussions",
            "Drive quality through testing and documentation",
        ]
        .iter()
        .map(|item| format!("* {item}")),
    );
    out.push(String::new());

    out.push("## Required Qualifications".to_string());
    out.push(format!(
        "* {}",
        experience.unwrap_or("Bachelor's degree in Computer Science or related field")
    ));
    out.extend(
        [
            "Strong technical expertise in relevant technologies",
            "Excellent problem-solving and analytical skills",
            "Strong communication and collaboration abilities",
        ]
        .iter()
        .map(|item| format!("* {item}")),
    );
    out.push(match location {
        Some(location) => format!("* Ability to work from {location}"),
        None => "* Flexible work location".to_string(),
    });
    out.extend(details.requirements().map(|r| format!("* {r}")));
    out.push(String::new());

    out.push("## Preferred Qualifications".to_string());
    out.extend(
        [
            "Master's degree in relevant field",
            "Experience with cloud platforms and distributed systems",
            "Technical leadership experience",
            "Industry certifications or specialized training",
        ]
        .iter()
        .map(|item| format!("* {item}")),
    );
    out.push(String::new());

    out.push("## Benefits & Perks".to_string());
    out.extend(
        [
            "Competitive compensation package",
            "Comprehensive health and dental coverage",
            "Professional development opportunities",
        ]
        .iter()
        .map(|item| format!("* {item}")),
    );
    match location {
        Some(location) => {
            out.push(format!("* Modern office in {location}"));
            out.push("* Collaborative work environment".to_string());
        }
        None => {
            out.push("* Flexible work arrangements".to_string());
            out.push("* Remote work options".to_string());
        }
    }

    JobPosting::new(out.join("\n"))
}
