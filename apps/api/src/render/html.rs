//! Markdown → HTML for generated job postings.
//!
//! Handles only the subset the posting generator emits: `#`/`##` headings,
//! `*` bullets, `**bold**` spans and prose paragraphs.
//!
//! Lines are classified first, then grouped by a small state machine:
//! `Outside` (before the first heading), `InParagraphSection` and
//! `InBulletSection`. A section switches to bullet mode as soon as one bullet
//! line is seen; in bullet mode only the bullet lines are rendered.

use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is valid"));

const EMPTY_POSTING_HTML: &str = r#"<div class="error">Failed to generate job posting</div>"#;

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Heading(String),
    Bullet(String),
    Text(String),
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Outside,
    InParagraphSection,
    InBulletSection,
}

#[derive(Debug, Default)]
struct Section {
    heading: Option<String>,
    lines: Vec<Line>,
    bulleted: bool,
}

/// Formats a markdown posting as an HTML fragment.
/// Same input always yields byte-identical output.
pub fn format_posting(markdown: &str) -> String {
    let normalized = markdown.replace("\r\n", "\n").replace('\r', "\n");
    if normalized.trim().is_empty() {
        return EMPTY_POSTING_HTML.to_string();
    }

    let sections = group_sections(normalized.lines().map(classify_line));
    let body = sections
        .iter()
        .map(render_section)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<div class=\"job-posting-container\">\n\
         <div class=\"job-posting\">\n\
         <div class=\"job-content\">\n\
         {body}\n\
         </div>\n\
         </div>\n\
         </div>"
    )
}

fn classify_line(raw: &str) -> Line {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }

    if line.starts_with('#') {
        let level = line.chars().take_while(|c| *c == '#').count();
        let text = render_inline(line.trim_start_matches('#').trim());
        return Line::Heading(if level == 1 {
            format!("<h1 class=\"job-title\">{text}</h1>")
        } else {
            format!("<h2 class=\"job-section-header\">{text}</h2>")
        });
    }

    // Bold is rendered first so that a line opening with `**` is prose, not a bullet.
    let inline = render_inline(line);
    if inline.starts_with('*') {
        let item = inline.trim_start_matches(|c: char| c == '*' || c.is_whitespace());
        Line::Bullet(item.trim_end().to_string())
    } else {
        Line::Text(inline)
    }
}

fn group_sections(lines: impl Iterator<Item = Line>) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section::default();
    let mut state = State::Outside;

    for line in lines {
        state = match (state, line) {
            (_, Line::Heading(heading)) => {
                if current.heading.is_some() || !current.lines.is_empty() {
                    sections.push(std::mem::take(&mut current));
                }
                current.heading = Some(heading);
                State::InParagraphSection
            }
            (State::Outside, Line::Blank) if current.lines.is_empty() => State::Outside,
            (_, Line::Bullet(item)) => {
                current.bulleted = true;
                current.lines.push(Line::Bullet(item));
                State::InBulletSection
            }
            (State::InBulletSection, other) => {
                current.lines.push(other);
                State::InBulletSection
            }
            (State::Outside, other) => {
                current.lines.push(other);
                State::Outside
            }
            (State::InParagraphSection, other) => {
                current.lines.push(other);
                State::InParagraphSection
            }
        };
    }

    if current.heading.is_some() || !current.lines.is_empty() {
        sections.push(current);
    }
    sections
}

fn render_section(section: &Section) -> String {
    let mut parts: Vec<String> = section.heading.iter().cloned().collect();

    if section.bulleted {
        let items: Vec<String> = section
            .lines
            .iter()
            .filter_map(|line| match line {
                Line::Bullet(item) if !item.is_empty() => Some(format!("<li>{item}</li>")),
                _ => None,
            })
            .collect();
        if !items.is_empty() {
            parts.push(format!(
                "<ul class=\"job-list\">\n{}\n</ul>",
                items.join("\n")
            ));
        }
    } else {
        let mut paragraph: Vec<&str> = Vec::new();
        for line in &section.lines {
            match line {
                Line::Text(text) => paragraph.push(text),
                _ => flush_paragraph(&mut paragraph, &mut parts),
            }
        }
        flush_paragraph(&mut paragraph, &mut parts);
    }

    parts.join("\n")
}

fn flush_paragraph(paragraph: &mut Vec<&str>, parts: &mut Vec<String>) {
    if !paragraph.is_empty() {
        parts.push(format!(
            "<p class=\"job-paragraph\">{}</p>",
            paragraph.join(" ")
        ));
        paragraph.clear();
    }
}

fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);
    BOLD.replace_all(&escaped, "<strong>$1</strong>").into_owned()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Backend Engineer at Acme - Berlin\n\
        \n\
        ## About Acme\n\
        Acme builds rockets.\n\
        It is **very** fast.\n\
        \n\
        ## Key Responsibilities\n\
        * Design systems\n\
        *   Review code\n\
        \n\
        ## Benefits & Perks\n\
        * Health coverage\n";

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_headings_get_fixed_classes() {
        let html = format_posting(SAMPLE);
        assert!(html.contains(r#"<h1 class="job-title">Backend Engineer at Acme - Berlin</h1>"#));
        assert!(html.contains(r#"<h2 class="job-section-header">About Acme</h2>"#));
        assert_eq!(count(&html, "<h1"), 1);
        assert_eq!(count(&html, "<h2"), 3);
    }

    #[test]
    fn test_bullet_runs_become_lists() {
        let html = format_posting(SAMPLE);
        assert!(html.contains(
            "<h2 class=\"job-section-header\">Key Responsibilities</h2>\n\
             <ul class=\"job-list\">\n<li>Design systems</li>\n<li>Review code</li>\n</ul>"
        ));
        assert_eq!(count(&html, "<ul class=\"job-list\">"), 2);
    }

    #[test]
    fn test_prose_lines_join_into_one_paragraph() {
        let html = format_posting(SAMPLE);
        assert!(html.contains(
            "<p class=\"job-paragraph\">Acme builds rockets. It is <strong>very</strong> fast.</p>"
        ));
    }

    #[test]
    fn test_blank_line_terminates_paragraph() {
        let html = format_posting("## Role Overview\nFirst part.\n\nSecond part.\n");
        assert!(html.contains("<p class=\"job-paragraph\">First part.</p>"));
        assert!(html.contains("<p class=\"job-paragraph\">Second part.</p>"));
    }

    #[test]
    fn test_line_opening_with_bold_is_not_a_bullet() {
        let html = format_posting("## Role Overview\n**Impact:** you own the platform\n");
        assert!(!html.contains("<ul"));
        assert!(html.contains("<strong>Impact:</strong> you own the platform"));
    }

    #[test]
    fn test_non_bullet_lines_in_bullet_section_are_dropped() {
        let html = format_posting("## Benefits & Perks\nWe offer:\n* Equity\n");
        assert!(!html.contains("We offer"));
        assert!(html.contains("<li>Equity</li>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = format_posting("## Benefits & Perks\n* <script>alert(1)</script>\n");
        assert!(html.contains("Benefits &amp; Perks"));
        assert!(html.contains("<li>&lt;script&gt;alert(1)&lt;/script&gt;</li>"));
    }

    #[test]
    fn test_crlf_input_matches_lf_input() {
        assert_eq!(format_posting(&SAMPLE.replace('\n', "\r\n")), format_posting(SAMPLE));
    }

    #[test]
    fn test_output_is_deterministic() {
        assert_eq!(format_posting(SAMPLE), format_posting(SAMPLE));
    }

    #[test]
    fn test_heading_without_trailing_newline() {
        let html = format_posting("# Title");
        assert!(html.contains(r#"<h1 class="job-title">Title</h1>"#));
    }

    #[test]
    fn test_text_before_first_heading_is_kept() {
        let html = format_posting("Here is your posting:\n# Title\n");
        assert!(html.contains("<p class=\"job-paragraph\">Here is your posting:</p>\n<h1"));
    }

    #[test]
    fn test_deeper_headings_render_as_sections() {
        let html = format_posting("### Culture\nKind people.\n");
        assert!(html.contains(r#"<h2 class="job-section-header">Culture</h2>"#));
    }

    #[test]
    fn test_output_is_wrapped_in_container() {
        let html = format_posting(SAMPLE);
        let opening = concat!(
            "<div class=\"job-posting-container\">\n",
            "<div class=\"job-posting\">\n",
            "<div class=\"job-content\">\n",
        );
        assert!(html.starts_with(opening));
        assert!(html.ends_with("\n</div>\n</div>\n</div>"));
    }

    #[test]
    fn test_empty_input_yields_error_block() {
        assert_eq!(format_posting("  \n\n"), EMPTY_POSTING_HTML);
    }
}
