use crate::sections::{self, SectionKind};
use crate::text;
use crate::types::{Dimension, Intent};
use serde::{Deserialize, Serialize};

/// Nouns naming something that can be handed over when the work is done.
const DELIVERABLE_NOUNS: &[&str] = &[
    "page", "component", "components", "endpoint", "endpoints", "function", "api", "test",
    "tests", "script", "report", "document", "schema", "module", "class", "service", "cli",
    "migration", "form", "table", "dashboard", "readme", "route", "routes", "query", "plan",
    "checklist", "diagram", "prd", "summary", "example", "examples",
];

/// Goal words that promise an outcome without saying what to produce.
const ABSTRACT_GOALS: &[&str] = &[
    "improve", "better", "enhance", "optimize", "modernize", "streamline", "make it good",
];

// ---------------------------------------------------------------------------
// QualityMetrics
// ---------------------------------------------------------------------------

/// Five independent 0–100 dimensions and their intent-weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub clarity: f64,
    pub efficiency: f64,
    pub structure: f64,
    pub completeness: f64,
    pub actionability: f64,
    pub overall: f64,
}

impl QualityMetrics {
    pub fn dimension(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Clarity => self.clarity,
            Dimension::Efficiency => self.efficiency,
            Dimension::Structure => self.structure,
            Dimension::Completeness => self.completeness,
            Dimension::Actionability => self.actionability,
        }
    }
}

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityWeights {
    pub clarity: f64,
    pub efficiency: f64,
    pub structure: f64,
    pub completeness: f64,
    pub actionability: f64,
}

const fn weights(
    clarity: f64,
    efficiency: f64,
    structure: f64,
    completeness: f64,
    actionability: f64,
) -> QualityWeights {
    QualityWeights {
        clarity,
        efficiency,
        structure,
        completeness,
        actionability,
    }
}

impl QualityWeights {
    pub const fn for_intent(intent: Intent) -> QualityWeights {
        match intent {
            Intent::CodeGeneration => weights(0.25, 0.10, 0.10, 0.30, 0.25),
            Intent::Planning => weights(0.20, 0.10, 0.30, 0.25, 0.15),
            Intent::Refinement => weights(0.25, 0.20, 0.10, 0.20, 0.25),
            Intent::Debugging => weights(0.30, 0.10, 0.10, 0.25, 0.25),
            Intent::Documentation => weights(0.30, 0.10, 0.25, 0.25, 0.10),
            Intent::Testing => weights(0.20, 0.10, 0.15, 0.30, 0.25),
            Intent::Migration => weights(0.20, 0.10, 0.20, 0.30, 0.20),
            Intent::PrdGeneration => weights(0.20, 0.05, 0.30, 0.35, 0.10),
            Intent::Summarization => weights(0.30, 0.30, 0.15, 0.15, 0.10),
            Intent::Learning => weights(0.35, 0.15, 0.15, 0.20, 0.15),
            Intent::SecurityReview => weights(0.20, 0.10, 0.15, 0.30, 0.25),
        }
    }

    pub fn sum(&self) -> f64 {
        self.clarity + self.efficiency + self.structure + self.completeness + self.actionability
    }

    pub fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Clarity => self.clarity,
            Dimension::Efficiency => self.efficiency,
            Dimension::Structure => self.structure,
            Dimension::Completeness => self.completeness,
            Dimension::Actionability => self.actionability,
        }
    }
}

// ---------------------------------------------------------------------------
// QualityAssessor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct QualityAssessor;

/// Facts about a prompt computed once and shared by every dimension.
struct Features {
    lower: String,
    word_count: usize,
    tech_tokens: usize,
    token_count: usize,
    section_kinds: Vec<SectionKind>,
    has_imperative: bool,
}

impl Features {
    fn extract(prompt: &str) -> Self {
        let tokens = text::words(prompt);
        let tech_tokens = tokens
            .iter()
            .filter(|t| text::TECH_TERMS.contains(&t.as_str()) || text::TECH_STACK.contains(&t.as_str()))
            .count();
        Features {
            lower: prompt.to_lowercase(),
            word_count: text::word_count(prompt),
            tech_tokens,
            token_count: tokens.len(),
            section_kinds: sections::section_kinds(prompt),
            has_imperative: text::sentences(prompt)
                .iter()
                .any(|s| text::starts_with_imperative(s)),
        }
    }

    fn has_section(&self, kind: SectionKind) -> bool {
        self.section_kinds.contains(&kind)
    }

    fn density(&self) -> f64 {
        if self.token_count == 0 {
            0.0
        } else {
            self.tech_tokens as f64 / self.token_count as f64
        }
    }
}

impl QualityAssessor {
    pub fn new() -> Self {
        Self
    }

    /// Score `prompt` for `intent`. Pure; every field lands in 0–100.
    pub fn assess_quality(&self, prompt: &str, intent: Intent) -> QualityMetrics {
        let f = Features::extract(prompt);
        let clarity = clarity(prompt, &f);
        let efficiency = efficiency(&f);
        let structure = structure(prompt, &f);
        let completeness = completeness(&f);
        let actionability = actionability(&f);

        let w = QualityWeights::for_intent(intent);
        let overall = clarity * w.clarity
            + efficiency * w.efficiency
            + structure * w.structure
            + completeness * w.completeness
            + actionability * w.actionability;

        QualityMetrics {
            clarity,
            efficiency,
            structure,
            completeness,
            actionability,
            overall: overall.clamp(0.0, 100.0),
        }
    }
}

fn score(raw: f64) -> f64 {
    raw.round().clamp(0.0, 100.0)
}

fn clarity(prompt: &str, f: &Features) -> f64 {
    let mut s = 50.0;
    let first_is_imperative = text::sentences(prompt)
        .first()
        .map(|s| text::starts_with_imperative(s))
        .unwrap_or(false);
    if first_is_imperative
        || f.has_section(SectionKind::Objective)
        || text::contains_any(&f.lower, text::OBJECTIVE_MARKERS)
    {
        s += 15.0;
    }
    let nouns = text::matched_terms(&f.lower, text::TECH_TERMS).len();
    s += (nouns as f64 * 4.0).min(20.0);
    let vague = text::count_hits(&f.lower, text::VAGUE_TERMS);
    s -= (vague as f64 * 6.0).min(30.0);
    if f.word_count < 5 {
        s -= 20.0;
    }
    score(s)
}

fn efficiency(f: &Features) -> f64 {
    let mut s = 70.0;
    let filler = text::count_hits(&f.lower, text::FILLER_PHRASES);
    s -= (filler as f64 * 8.0).min(40.0);
    let density = f.density();
    s += (density * 100.0).min(20.0);
    if f.word_count > 300 && density < 0.05 {
        s -= 15.0;
    }
    if f.word_count > 600 {
        s -= 10.0;
    }
    score(s)
}

fn structure(prompt: &str, f: &Features) -> f64 {
    let mut s = 40.0;
    let has_heading = text::has_heading(prompt);
    let list_items = text::list_item_count(prompt);
    if has_heading {
        s += 20.0;
    }
    if list_items >= 2 {
        s += 15.0;
    }
    if !f.section_kinds.is_empty() {
        s += 10.0;
    }
    if f.section_kinds.len() >= 2 && sections::is_canonical(&f.section_kinds) {
        s += 15.0;
    }
    // Short prompts read fine without scaffolding.
    if f.word_count < 25 && !has_heading && list_items == 0 {
        s += 10.0;
    }
    score(s)
}

fn completeness(f: &Features) -> f64 {
    let mut s = 30.0;
    if text::contains_any(&f.lower, text::TECH_STACK) || f.has_section(SectionKind::Technical) {
        s += 20.0;
    }
    if text::contains_any(&f.lower, text::SUCCESS_INDICATORS) || f.has_section(SectionKind::Success)
    {
        s += 20.0;
    }
    if text::contains_any(&f.lower, text::CONSTRAINT_MARKERS)
        || f.has_section(SectionKind::Constraints)
    {
        s += 15.0;
    }
    if text::contains_any(&f.lower, text::OUTPUT_MARKERS) || f.has_section(SectionKind::Output) {
        s += 15.0;
    }
    if f.word_count < 10 {
        s -= 20.0;
    }
    score(s)
}

fn actionability(f: &Features) -> f64 {
    let mut s = 40.0;
    if f.has_imperative {
        s += 20.0;
    }
    let deliverables = text::matched_terms(&f.lower, DELIVERABLE_NOUNS).len();
    s += (deliverables as f64 * 5.0).min(20.0);
    if deliverables == 0 && (!f.has_imperative || text::contains_any(&f.lower, ABSTRACT_GOALS)) {
        s -= 15.0;
    }
    score(s)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn assess(p: &str, intent: Intent) -> QualityMetrics {
        QualityAssessor::new().assess_quality(p, intent)
    }

    fn weighted(m: &QualityMetrics, intent: Intent) -> f64 {
        let w = QualityWeights::for_intent(intent);
        Dimension::all()
            .iter()
            .map(|&d| m.dimension(d) * w.weight(d))
            .sum()
    }

    #[test]
    fn weight_rows_sum_to_one() {
        for &intent in Intent::all() {
            let sum = QualityWeights::for_intent(intent).sum();
            assert!((sum - 1.0).abs() < 1e-9, "{intent} weights sum to {sum}");
        }
    }

    #[test]
    fn code_generation_weights() {
        let w = QualityWeights::for_intent(Intent::CodeGeneration);
        assert_eq!(w.clarity, 0.25);
        assert_eq!(w.completeness, 0.30);
        assert_eq!(w.actionability, 0.25);
        assert_eq!(w.efficiency, 0.10);
        assert_eq!(w.structure, 0.10);
    }

    #[test]
    fn empty_prompt_scores_low() {
        let m = assess("", Intent::CodeGeneration);
        assert!(m.overall < 60.0, "overall was {}", m.overall);
    }

    #[test]
    fn all_dimensions_bounded_and_overall_is_weighted_sum() {
        let long = "word ".repeat(800);
        let samples = [
            "",
            "Build a login page",
            "please please please could you maybe do something with the stuff, thanks",
            "## Objective\nBuild a REST API in Rust\n## Requirements\n- JWT auth\n- Postgres\n\
             ## Constraints\nDo not add new dependencies\n## Output Format\nReturn a diff\n\
             ## Success Criteria\n- [ ] all tests should pass",
            long.as_str(),
        ];
        for p in samples {
            for &intent in Intent::all() {
                let m = assess(p, intent);
                for &d in Dimension::all() {
                    let v = m.dimension(d);
                    assert!((0.0..=100.0).contains(&v), "{d} = {v} for {p:?}");
                }
                assert!((0.0..=100.0).contains(&m.overall));
                assert!((m.overall - weighted(&m, intent)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn structured_prompt_beats_vague_prompt() {
        let vague = assess(
            "maybe do something with the stuff, kind of better",
            Intent::CodeGeneration,
        );
        let structured = assess(
            "## Objective\nBuild a REST API in Rust\n## Requirements\n- JWT auth\n- Postgres\n\
             ## Success Criteria\n- all tests should pass",
            Intent::CodeGeneration,
        );
        assert!(structured.overall > vague.overall);
        assert!(structured.structure > vague.structure);
        assert!(structured.clarity > vague.clarity);
    }

    #[test]
    fn filler_lowers_efficiency() {
        let lean = assess("Add pagination to the users endpoint", Intent::CodeGeneration);
        let chatty = assess(
            "Hi! Could you please just add pagination to the users endpoint? Thanks, really appreciate it",
            Intent::CodeGeneration,
        );
        assert!(lean.efficiency > chatty.efficiency);
    }

    #[test]
    fn success_criteria_raise_completeness() {
        let without = assess("Add a CSV export button to the reports page", Intent::CodeGeneration);
        let with = assess(
            "Add a CSV export button to the reports page. Done when the file downloads.",
            Intent::CodeGeneration,
        );
        assert!(with.completeness > without.completeness);
    }

    #[test]
    fn abstract_goal_scores_below_concrete_deliverable() {
        let abstract_goal = assess("improve things overall", Intent::Refinement);
        let concrete = assess("Refactor the payment service module", Intent::Refinement);
        assert!(concrete.actionability > abstract_goal.actionability);
    }
}
