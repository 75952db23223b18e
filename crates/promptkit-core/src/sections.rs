//! Labeled prompt sections: `## Objective` headings and `Requirements:`
//! style prefixes, in the canonical order objective → requirements →
//! technical → constraints → output → success.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Objective,
    Requirements,
    Technical,
    Constraints,
    Output,
    Success,
}

impl SectionKind {
    pub fn rank(self) -> usize {
        self as usize
    }

    pub const fn title(self) -> &'static str {
        match self {
            SectionKind::Objective => "Objective",
            SectionKind::Requirements => "Requirements",
            SectionKind::Technical => "Technical Context",
            SectionKind::Constraints => "Constraints",
            SectionKind::Output => "Output Format",
            SectionKind::Success => "Success Criteria",
        }
    }

    fn from_label(label: &str) -> Option<SectionKind> {
        let label = label.trim().to_lowercase();
        let kind = match label.as_str() {
            "objective" | "objectives" | "goal" | "goals" | "purpose" | "task" => {
                SectionKind::Objective
            }
            "requirements" | "requirement" | "functional requirements" | "must haves"
            | "must-haves" | "features" => SectionKind::Requirements,
            "technical" | "technical context" | "technical details" | "technical requirements"
            | "tech stack" | "stack" | "technology" | "technologies" => SectionKind::Technical,
            "constraints" | "constraint" | "limitations" | "restrictions" => {
                SectionKind::Constraints
            }
            "output" | "output format" | "expected output" | "deliverable" | "deliverables"
            | "format" | "response format" => SectionKind::Output,
            "success" | "success criteria" | "acceptance criteria" | "definition of done"
            | "done when" => SectionKind::Success,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// Label parsing
// ---------------------------------------------------------------------------

static HEADING_LABEL_RE: OnceLock<Regex> = OnceLock::new();
static INLINE_LABEL_RE: OnceLock<Regex> = OnceLock::new();

fn heading_label_re() -> &'static Regex {
    HEADING_LABEL_RE.get_or_init(|| {
        Regex::new(r"(?i)^\s{0,3}#{1,6}\s+(?:\*\*)?([a-z][a-z &/-]*?)(?:\*\*)?\s*:?\s*$").unwrap()
    })
}

fn inline_label_re() -> &'static Regex {
    INLINE_LABEL_RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:[-*]\s+)?(?:\*\*)?([a-z][a-z &/-]*?)(?:\*\*)?\s*:(?:\*\*)?\s*(.*)$")
            .unwrap()
    })
}

/// A single line recognized as a section label. `rest` is the text that
/// followed an inline `Label:` prefix (empty for headings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub kind: SectionKind,
    pub rest: String,
}

pub fn parse_label(line: &str) -> Option<Label> {
    if let Some(caps) = heading_label_re().captures(line) {
        let kind = SectionKind::from_label(&caps[1])?;
        return Some(Label {
            kind,
            rest: String::new(),
        });
    }
    let caps = inline_label_re().captures(line)?;
    let kind = SectionKind::from_label(&caps[1])?;
    let rest = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some(Label { kind, rest })
}

// ---------------------------------------------------------------------------
// Whole-prompt parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub body: Vec<String>,
}

/// A prompt split at its labels. Lines before the first label are the
/// preamble; fenced code blocks are never searched for labels.
#[derive(Debug, Clone, Default)]
pub struct ParsedSections {
    pub preamble: Vec<String>,
    pub sections: Vec<Section>,
}

impl ParsedSections {
    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    /// Strictly increasing rank: no section out of place, none repeated.
    pub fn is_canonical(&self) -> bool {
        is_canonical(&self.kinds())
    }
}

pub fn parse_sections(text: &str) -> ParsedSections {
    let mut parsed = ParsedSections::default();
    let mut in_fence = false;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        let label = if in_fence { None } else { parse_label(line) };
        match label {
            Some(label) => {
                let mut body = Vec::new();
                if !label.rest.is_empty() {
                    body.push(label.rest);
                }
                parsed.sections.push(Section {
                    kind: label.kind,
                    body,
                });
            }
            None => match parsed.sections.last_mut() {
                Some(section) => section.body.push(line.to_string()),
                None => parsed.preamble.push(line.to_string()),
            },
        }
    }
    parsed
}

pub fn section_kinds(text: &str) -> Vec<SectionKind> {
    parse_sections(text).kinds()
}

pub fn is_canonical(kinds: &[SectionKind]) -> bool {
    kinds.windows(2).all(|w| w[0].rank() < w[1].rank())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_and_inline_labels() {
        assert_eq!(parse_label("## Objective").unwrap().kind, SectionKind::Objective);
        assert_eq!(
            parse_label("### Success Criteria").unwrap().kind,
            SectionKind::Success
        );
        let l = parse_label("Requirements: must support SSO").unwrap();
        assert_eq!(l.kind, SectionKind::Requirements);
        assert_eq!(l.rest, "must support SSO");
        let l = parse_label("**Tech Stack:** Rust").unwrap();
        assert_eq!(l.kind, SectionKind::Technical);
        assert_eq!(l.rest, "Rust");
    }

    #[test]
    fn prose_is_not_a_label() {
        assert!(parse_label("Output should be JSON").is_none());
        assert!(parse_label("## Implementation Steps").is_none());
        assert!(parse_label("Note: this is important").is_none());
    }

    #[test]
    fn parse_splits_preamble_and_sections() {
        let parsed = parse_sections("Intro line\n## Objective\nBuild X\n## Requirements\nY");
        assert_eq!(parsed.preamble, vec!["Intro line"]);
        assert_eq!(
            parsed.kinds(),
            vec![SectionKind::Objective, SectionKind::Requirements]
        );
        assert_eq!(parsed.sections[0].body, vec!["Build X"]);
        assert!(parsed.is_canonical());
    }

    #[test]
    fn out_of_order_is_not_canonical() {
        let parsed = parse_sections("Constraints: no deps\nObjective: build it");
        assert!(!parsed.is_canonical());
    }

    #[test]
    fn labels_inside_fences_are_ignored() {
        let parsed = parse_sections("```\nOutput: x\n```\nGoal: y");
        assert_eq!(parsed.kinds(), vec![SectionKind::Objective]);
    }
}
