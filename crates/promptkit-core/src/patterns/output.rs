use super::{append_block, emitted_for_any_intent, has_section, user_content, GeneratedBlock};
use crate::error::Result;
use crate::pattern::{Pattern, PatternContext, PatternResult};
use crate::sections::{self, SectionKind};
use crate::text;
use crate::types::{Dimension, Impact, Intent, PatternMode, Phase};

pub(super) const GENERATED: &[GeneratedBlock] = &[
    GeneratedBlock {
        title: SectionKind::Output.title(),
        emits: |line, _| emitted_for_any_intent(format_lines, line),
    },
    GeneratedBlock {
        title: VALIDATION_CHECKLIST,
        emits: |line, _| emitted_for_any_intent(checklist_lines, line),
    },
    GeneratedBlock {
        title: SectionKind::Success.title(),
        emits: |line, _| emitted_for_any_intent(criteria_for, line),
    },
];

// ---------------------------------------------------------------------------
// output-format-enforcer
// ---------------------------------------------------------------------------

pub(super) fn output_format_enforcer() -> Pattern {
    crate::pattern! {
        id: "output-format-enforcer",
        name: "Output Format Enforcer",
        description: "Specifies the shape of the response when the prompt leaves it open",
        intents: &[
            Intent::CodeGeneration,
            Intent::Planning,
            Intent::Refinement,
            Intent::Documentation,
            Intent::Testing,
            Intent::Migration,
            Intent::PrdGeneration,
            Intent::Summarization,
            Intent::Learning,
            Intent::SecurityReview,
        ],
        mode: PatternMode::Both,
        priority: 5,
        phases: &[Phase::Optimize, Phase::OutputGeneration],
        apply: apply_output_format,
    }
}

fn format_lines(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Planning => &["- A numbered list of milestones with tasks, owners and estimates"],
        Intent::Refinement => &["- The revised code with a summary of each change and its reason"],
        Intent::Documentation => &["- Markdown with headings, short paragraphs and code examples"],
        Intent::Testing => &["- Test code grouped by behavior, one focus per test"],
        Intent::Migration => &["- An ordered migration plan followed by the scripts or code changes"],
        Intent::PrdGeneration => &["- A markdown PRD with one heading per section"],
        Intent::Summarization => &["- A short overview paragraph followed by key points as bullets"],
        Intent::Learning => &["- An explanation that builds from fundamentals to details, with examples"],
        Intent::SecurityReview => &["- A findings table with severity, location, description and remediation"],
        _ => &[
            "- Complete, runnable code in fenced blocks with the file path above each block",
            "- A short note on how to run or integrate the code",
        ],
    }
}

/// Impact: always medium.
fn apply_output_format(prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
    let labeled = sections::section_kinds(prompt).contains(&SectionKind::Output);
    let user = user_content(prompt).to_lowercase();
    if labeled || text::contains_any(&user, text::OUTPUT_MARKERS) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Actionability,
            "Output format already specified",
        ));
    }
    Ok(PatternResult::applied(
        append_block(
            prompt,
            SectionKind::Output.title(),
            format_lines(ctx.primary_intent()),
        ),
        Dimension::Actionability,
        Impact::Medium,
        "Specified the expected output format",
    ))
}

// ---------------------------------------------------------------------------
// validation-checklist-creator
// ---------------------------------------------------------------------------

pub(super) fn validation_checklist_creator() -> Pattern {
    crate::pattern! {
        id: "validation-checklist-creator",
        name: "Validation Checklist Creator",
        description: "Adds a checklist the result can be verified against",
        intents: &[
            Intent::CodeGeneration,
            Intent::Refinement,
            Intent::Migration,
            Intent::Testing,
            Intent::SecurityReview,
        ],
        mode: PatternMode::Deep,
        priority: 4,
        phases: &[Phase::Optimize, Phase::OutputGeneration],
        apply: apply_validation_checklist,
    }
}

const VALIDATION_CHECKLIST: &str = "Validation Checklist";

fn checklist_lines(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Refinement => &[
            "- [ ] Existing tests pass unchanged",
            "- [ ] Improvement measured before and after",
            "- [ ] No public API changed",
        ],
        Intent::Migration => &[
            "- [ ] Rollback rehearsed on a copy of production data",
            "- [ ] Row counts and checksums match after the move",
            "- [ ] Old path removed only once the new one is verified",
        ],
        Intent::Testing => &[
            "- [ ] Tests fail without the code under test",
            "- [ ] Tests are deterministic and isolated",
            "- [ ] Failure paths are covered",
        ],
        Intent::SecurityReview => &[
            "- [ ] Every finding has a severity and a reproduction",
            "- [ ] Fixes include regression tests",
            "- [ ] No secrets appear in code or logs",
        ],
        _ => &[
            "- [ ] Code compiles and lints cleanly",
            "- [ ] New behavior is covered by tests",
            "- [ ] Error paths return clear messages",
            "- [ ] No debug output or secrets left behind",
        ],
    }
}

/// Impact: always medium.
fn apply_validation_checklist(prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
    let has_checklist = user_content(prompt).contains("- [ ]");
    if has_section(prompt, VALIDATION_CHECKLIST) || has_checklist {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Completeness,
            "Checklist already present",
        ));
    }
    Ok(PatternResult::applied(
        append_block(prompt, VALIDATION_CHECKLIST, checklist_lines(ctx.primary_intent())),
        Dimension::Completeness,
        Impact::Medium,
        "Added a validation checklist",
    ))
}

// ---------------------------------------------------------------------------
// success-criteria-enforcer
// ---------------------------------------------------------------------------

pub(super) fn success_criteria_enforcer() -> Pattern {
    crate::pattern! {
        id: "success-criteria-enforcer",
        name: "Success Criteria Enforcer",
        description: "Appends a checklist that defines when the task is done",
        intents: Intent::all(),
        mode: PatternMode::Both,
        priority: 2,
        phases: &[Phase::Optimize, Phase::OutputGeneration],
        apply: apply_success_criteria,
    }
}

type CriteriaTable = &'static [(Intent, &'static [&'static str])];

const CODE_GENERATION_CRITERIA: &[&str] = &[
    "- [ ] The feature works end to end for the main use case",
    "- [ ] Invalid input is rejected with a clear error",
    "- [ ] Tests cover the new behavior",
    "- [ ] Code follows the project's conventions",
];

const SUCCESS_CRITERIA: CriteriaTable = &[
    (Intent::CodeGeneration, CODE_GENERATION_CRITERIA),
    (
        Intent::Debugging,
        &[
            "- [ ] The root cause is identified and explained",
            "- [ ] The failure no longer reproduces",
            "- [ ] A regression test covers the original failure",
        ],
    ),
    (
        Intent::Refinement,
        &[
            "- [ ] Behavior is unchanged for existing callers",
            "- [ ] The targeted metric improves measurably",
            "- [ ] Code is simpler to read than before",
        ],
    ),
    (
        Intent::Testing,
        &[
            "- [ ] Main paths and failure paths are covered",
            "- [ ] The suite runs green locally and in CI",
            "- [ ] Each test name states the behavior it checks",
        ],
    ),
    (
        Intent::Planning,
        &[
            "- [ ] Every milestone has an owner and an estimate",
            "- [ ] Dependencies and risks are listed",
            "- [ ] The plan fits the stated timeline",
        ],
    ),
    (
        Intent::Documentation,
        &[
            "- [ ] A new reader can follow it without outside help",
            "- [ ] Every example runs as written",
            "- [ ] Public APIs and options are covered",
        ],
    ),
    (
        Intent::Migration,
        &[
            "- [ ] All data arrives intact in the target",
            "- [ ] The rollback path is tested",
            "- [ ] Consumers work against the new system",
        ],
    ),
    (
        Intent::SecurityReview,
        &[
            "- [ ] Each finding is rated by severity",
            "- [ ] Each finding has a concrete remediation",
            "- [ ] High-severity issues are fixed or tracked",
        ],
    ),
    (
        Intent::Summarization,
        &[
            "- [ ] Key points are captured without distortion",
            "- [ ] The summary stays within the requested length",
        ],
    ),
    (
        Intent::Learning,
        &[
            "- [ ] The explanation starts from concepts the reader knows",
            "- [ ] Each concept has a worked example",
        ],
    ),
];

/// Checklist for `intent`, falling back to the code-generation table.
fn criteria_for(intent: Intent) -> &'static [&'static str] {
    SUCCESS_CRITERIA
        .iter()
        .find(|(i, _)| *i == intent)
        .map(|(_, lines)| *lines)
        .unwrap_or(CODE_GENERATION_CRITERIA)
}

/// Impact: high when the prompt states no requirements either, medium
/// otherwise.
fn apply_success_criteria(prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
    let lower = prompt.to_lowercase();
    if text::contains_any(&lower, text::SUCCESS_INDICATORS) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Completeness,
            "Success criteria already defined",
        ));
    }

    let impact = if text::contains_any(&lower, text::REQUIREMENT_MARKERS) {
        Impact::Medium
    } else {
        Impact::High
    };
    Ok(PatternResult::applied(
        append_block(
            prompt,
            SectionKind::Success.title(),
            criteria_for(ctx.primary_intent()),
        ),
        Dimension::Completeness,
        impact,
        format!("Added {} success criteria", ctx.primary_intent()),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{Characteristics, IntentDetector, IntentResult};
    use crate::types::Mode;

    fn run_as(pattern: Pattern, prompt: &str, intent: Intent) -> PatternResult {
        let intent = IntentResult {
            primary_intent: intent,
            confidence: 80,
            characteristics: Characteristics::default(),
            suggested_mode: Mode::Fast,
        };
        let ctx = PatternContext {
            mode: Mode::Deep,
            original_prompt: prompt,
            intent: &intent,
            phase: Phase::Optimize,
        };
        pattern.apply(prompt, &ctx).unwrap()
    }

    fn run(pattern: Pattern, prompt: &str) -> PatternResult {
        let intent = IntentDetector::new().analyze(prompt).primary_intent;
        run_as(pattern, prompt, intent)
    }

    #[test]
    fn success_criteria_appended_for_login_page() {
        let r = run(success_criteria_enforcer(), "Build a login page");
        assert!(r.applied);
        assert!(r.enhanced_prompt.starts_with("Build a login page\n\n## Success Criteria\n"));
        assert!(r.enhanced_prompt.contains("The feature works end to end"));
        assert_eq!(r.improvement.impact, Impact::High);
    }

    #[test]
    fn success_criteria_skip_on_indicator_phrase() {
        let prompt = "Add pagination. Done when the API returns 20 items per page.";
        let r = run(success_criteria_enforcer(), prompt);
        assert!(!r.applied);
        assert_eq!(r.enhanced_prompt, prompt);

        let first = run(success_criteria_enforcer(), "Fix the flaky upload test");
        let second = run(success_criteria_enforcer(), &first.enhanced_prompt);
        assert!(!second.applied);
        assert_eq!(second.enhanced_prompt, first.enhanced_prompt);
    }

    #[test]
    fn success_criteria_fall_back_to_code_generation() {
        let r = run_as(success_criteria_enforcer(), "Draft the PRD", Intent::PrdGeneration);
        assert!(r.enhanced_prompt.contains(CODE_GENERATION_CRITERIA[0]));
        let r = run_as(success_criteria_enforcer(), "Why is it slow", Intent::Debugging);
        assert!(r.enhanced_prompt.contains("root cause is identified"));
    }

    #[test]
    fn output_format_by_intent() {
        let r = run_as(output_format_enforcer(), "Summarize the incident", Intent::Summarization);
        assert!(r.applied);
        assert!(r.enhanced_prompt.contains("## Output Format\n- A short overview paragraph"));

        let again = run_as(output_format_enforcer(), &r.enhanced_prompt, Intent::Summarization);
        assert!(!again.applied);
    }

    #[test]
    fn output_format_skipped_when_stated() {
        let r = run(output_format_enforcer(), "List the endpoints and return them as JSON");
        assert!(!r.applied);
    }

    #[test]
    fn validation_checklist_once() {
        let coding = Intent::CodeGeneration;
        let r = run_as(validation_checklist_creator(), "Add retries to the client", coding);
        assert!(r.applied);
        assert!(r.enhanced_prompt.contains("## Validation Checklist\n- [ ] Code compiles"));
        let again = run_as(validation_checklist_creator(), &r.enhanced_prompt, coding);
        assert!(!again.applied);

        let own = "Ship it\n- [ ] lint\n- [ ] tests";
        assert!(!run_as(validation_checklist_creator(), own, coding).applied);
    }
}
