use super::{append_block, has_section, user_content, GeneratedBlock};
use crate::error::Result;
use crate::pattern::{Pattern, PatternContext, PatternResult};
use crate::text;
use crate::types::{Dimension, Impact, Intent, PatternMode, Phase};
use serde::Serialize;

pub(super) fn prd_structure_enforcer() -> Pattern {
    crate::pattern! {
        id: "prd-structure-enforcer",
        name: "PRD Structure Enforcer",
        description: "Checks a product requirements document against the eight canonical PRD sections",
        intents: &[Intent::PrdGeneration, Intent::Planning],
        mode: PatternMode::Both,
        priority: 3,
        phases: &[Phase::Optimize, Phase::OutputGeneration],
        apply: apply_prd_structure,
    }
}

const PRD_COMPLETENESS: &str = "PRD Completeness";
const MISSING_HEADER: &str = "Missing sections";
const WEAK_HEADER: &str = "Sections to strengthen";
const PRACTICES_HEADER: &str = "Best practices";

pub(super) const GENERATED: &[GeneratedBlock] = &[GeneratedBlock {
    title: PRD_COMPLETENESS,
    emits: is_completeness_line,
}];

fn is_completeness_line(line: &str, _rest: &str) -> bool {
    let percent = line
        .strip_prefix("Completeness ")
        .and_then(|p| p.strip_suffix('%'))
        .map_or(false, |p| p.parse::<f64>().is_ok());
    percent
        || [MISSING_HEADER, WEAK_HEADER, PRACTICES_HEADER].contains(&line)
        || BEST_PRACTICES.contains(&line)
        || PRD_SECTIONS
            .iter()
            .any(|s| line.strip_prefix("- ") == Some(s.name))
}

/// A canonical PRD section and the words that show it is covered.
pub struct PrdSection {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

pub const PRD_SECTIONS: &[PrdSection] = &[
    PrdSection {
        name: "Problem Statement",
        keywords: &["problem", "pain point", "pain points", "challenge", "issue", "currently"],
    },
    PrdSection {
        name: "Goals & Objectives",
        keywords: &["goal", "goals", "objective", "objectives", "outcome", "outcomes", "aim"],
    },
    PrdSection {
        name: "Target Users",
        keywords: &["user", "users", "persona", "personas", "customer", "customers", "audience"],
    },
    PrdSection {
        name: "User Stories / Requirements",
        keywords: &[
            "user story", "user stories", "as a", "requirement", "requirements", "feature",
            "features", "must",
        ],
    },
    PrdSection {
        name: "Success Metrics",
        keywords: &["metric", "metrics", "kpi", "kpis", "measure", "success", "conversion", "retention"],
    },
    PrdSection {
        name: "Technical Considerations",
        keywords: &[
            "technical", "architecture", "api", "integration", "performance", "infrastructure",
            "stack",
        ],
    },
    PrdSection {
        name: "Scope & Non-Goals",
        keywords: &["scope", "non-goal", "non-goals", "out of scope", "in scope", "exclude", "excluded"],
    },
    PrdSection {
        name: "Timeline & Milestones",
        keywords: &[
            "timeline", "milestone", "milestones", "deadline", "release", "roadmap", "week",
            "weeks", "q1", "q2", "q3", "q4",
        ],
    },
];

/// Distinct keyword hits at which a section counts as present.
const PRESENT_HITS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrdSectionStatus {
    Present,
    Weak,
    Missing,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrdSectionReport {
    pub name: &'static str,
    pub status: PrdSectionStatus,
    pub hits: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrdCompleteness {
    pub sections: Vec<PrdSectionReport>,
    /// (present + 0.5 × weak) / 8 × 100.
    pub percent: f64,
}

impl PrdCompleteness {
    fn names(&self, status: PrdSectionStatus) -> Vec<&'static str> {
        self.sections
            .iter()
            .filter(|s| s.status == status)
            .map(|s| s.name)
            .collect()
    }

    pub fn missing(&self) -> Vec<&'static str> {
        self.names(PrdSectionStatus::Missing)
    }

    pub fn weak(&self) -> Vec<&'static str> {
        self.names(PrdSectionStatus::Weak)
    }

    pub fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }
}

/// Scores the document's own text; a completeness block appended by an
/// earlier pass does not count toward its sections.
pub fn prd_completeness(document: &str) -> PrdCompleteness {
    let lower = user_content(document).to_lowercase();
    let sections: Vec<PrdSectionReport> = PRD_SECTIONS
        .iter()
        .map(|section| {
            let hits = text::matched_terms(&lower, section.keywords).len();
            let status = match hits {
                0 => PrdSectionStatus::Missing,
                h if h < PRESENT_HITS => PrdSectionStatus::Weak,
                _ => PrdSectionStatus::Present,
            };
            PrdSectionReport {
                name: section.name,
                status,
                hits,
            }
        })
        .collect();

    let score: f64 = sections
        .iter()
        .map(|s| match s.status {
            PrdSectionStatus::Present => 1.0,
            PrdSectionStatus::Weak => 0.5,
            PrdSectionStatus::Missing => 0.0,
        })
        .sum();
    let percent = score / PRD_SECTIONS.len() as f64 * 100.0;

    PrdCompleteness { sections, percent }
}

const BEST_PRACTICES: &[&str] = &[
    "- Write user stories as \"As a [user], I want [goal] so that [benefit]\"",
    "- Make every success metric measurable with a target value",
    "- State non-goals explicitly to bound the scope",
    "- Tie each milestone to a date and an owner",
];

/// Impact: high below 50% complete, medium below 80%, low otherwise.
fn apply_prd_structure(prompt: &str, _ctx: &PatternContext) -> Result<PatternResult> {
    if has_section(prompt, PRD_COMPLETENESS) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Completeness,
            "PRD completeness already reviewed",
        ));
    }

    let report = prd_completeness(prompt);
    if report.is_complete() {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Completeness,
            "All PRD sections present",
        ));
    }

    let mut lines = vec![format!("Completeness {:.1}%", report.percent)];
    let missing = report.missing();
    if !missing.is_empty() {
        lines.push(format!("\n{MISSING_HEADER}"));
        lines.extend(missing.iter().map(|m| format!("- {m}")));
    }
    let weak = report.weak();
    if !weak.is_empty() {
        lines.push(format!("\n{WEAK_HEADER}"));
        lines.extend(weak.iter().map(|w| format!("- {w}")));
    }
    lines.push(format!("\n{PRACTICES_HEADER}"));
    lines.extend(BEST_PRACTICES.iter().map(|b| b.to_string()));

    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let impact = if report.percent < 50.0 {
        Impact::High
    } else if report.percent < 80.0 {
        Impact::Medium
    } else {
        Impact::Low
    };
    Ok(PatternResult::applied(
        append_block(prompt, PRD_COMPLETENESS, &refs),
        Dimension::Completeness,
        impact,
        format!(
            "PRD is {:.1}% complete: {} missing, {} weak",
            report.percent,
            missing.len(),
            weak.len()
        ),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentDetector;
    use crate::types::Mode;

    fn run(prompt: &str) -> PatternResult {
        let intent = IntentDetector::new().analyze(prompt);
        let ctx = PatternContext {
            mode: Mode::Fast,
            original_prompt: prompt,
            intent: &intent,
            phase: Phase::OutputGeneration,
        };
        prd_structure_enforcer().apply(prompt, &ctx).unwrap()
    }

    #[test]
    fn completeness_counts_present_and_weak() {
        // problem: 2 hits, goals: 1 hit, everything else missing.
        let report = prd_completeness("The problem today is a pain point for support. Our goal is speed.");
        assert_eq!(report.sections[0].status, PrdSectionStatus::Present);
        assert_eq!(report.sections[1].status, PrdSectionStatus::Weak);
        assert!((report.percent - 18.75).abs() < 1e-9);
        assert_eq!(report.missing().len(), 6);
        assert_eq!(report.weak(), vec!["Goals & Objectives"]);
    }

    #[test]
    fn empty_document_is_zero_percent() {
        let report = prd_completeness("");
        assert_eq!(report.percent, 0.0);
        assert_eq!(report.missing().len(), 8);
    }

    #[test]
    fn thin_prd_gets_completeness_block() {
        let r = run("Write a PRD for a habit tracking app");
        assert!(r.applied);
        assert!(r.enhanced_prompt.contains("## PRD Completeness"));
        assert!(r.enhanced_prompt.contains("- Timeline & Milestones"));
        assert_eq!(r.improvement.impact, Impact::High);

        let again = run(&r.enhanced_prompt);
        assert!(!again.applied);
        assert_eq!(again.enhanced_prompt, r.enhanced_prompt);
    }

    #[test]
    fn appended_scope_block_does_not_count() {
        let prompt = "Write a PRD for a habit tracking app\n\n## Scope\n- What is included in this iteration\n- What is explicitly excluded (non-goals)\n- Assumptions the work depends on";
        assert_eq!(prd_completeness(prompt).percent, 0.0);

        let r = run(prompt);
        assert!(r.applied);
        assert!(r.enhanced_prompt.contains("Completeness 0.0%"));
        assert!(r.enhanced_prompt.contains("Missing sections\n- Problem Statement"));
        assert!(r.enhanced_prompt.contains("- Scope & Non-Goals"));

        let written = "Write a PRD for a habit tracking app\n\n## Scope\nOut of scope: social features";
        assert_eq!(
            prd_completeness(written).sections[6].status,
            PrdSectionStatus::Present
        );
    }

    #[test]
    fn complete_prd_is_left_alone() {
        let doc = "\
## Problem Statement
The problem: a pain point for teams.
## Goals
Goals and objectives are clear.
## Users
Target users and personas.
## User Stories
As a user, requirements must be met.
## Success Metrics
Metrics and KPIs measure retention.
## Technical Considerations
Architecture and API integration.
## Scope
Out of scope items are excluded; non-goals listed.
## Timeline
Milestones over six weeks with a release roadmap.";
        let report = prd_completeness(doc);
        assert!(report.is_complete(), "{:?}", report.sections);
        assert!(!run(doc).applied);
    }
}
