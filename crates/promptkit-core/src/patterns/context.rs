//! Patterns that append a block of missing context: technical details,
//! error evidence, security focus areas, constraints, edge cases and so on.
//! Each one skips when its heading or equivalent wording is already there.

use super::{append_block, emitted_for_any_intent, has_section, GeneratedBlock};
use crate::error::Result;
use crate::pattern::{Pattern, PatternContext, PatternResult};
use crate::sections::{self, SectionKind};
use crate::text;
use crate::types::{Dimension, Impact, Intent, PatternMode, Phase};

pub(super) const GENERATED: &[GeneratedBlock] = &[
    GeneratedBlock {
        title: SectionKind::Technical.title(),
        emits: is_technical_line,
    },
    GeneratedBlock {
        title: ERROR_CONTEXT,
        emits: |line, _| ERROR_LINES.contains(&line),
    },
    GeneratedBlock {
        title: SECURITY_FOCUS,
        emits: is_security_line,
    },
    GeneratedBlock {
        title: MIGRATION_SAFETY,
        emits: |line, _| MIGRATION_LINES.contains(&line),
    },
    GeneratedBlock {
        title: AUDIENCE,
        emits: |line, _| emitted_for_any_intent(audience_lines, line),
    },
    GeneratedBlock {
        title: SectionKind::Constraints.title(),
        emits: |line, _| emitted_for_any_intent(constraint_lines, line),
    },
    GeneratedBlock {
        title: EDGE_CASES,
        emits: |line, _| emitted_for_any_intent(edge_case_lines, line),
    },
    GeneratedBlock {
        title: SCOPE,
        emits: |line, _| SCOPE_LINES.contains(&line),
    },
    GeneratedBlock {
        title: ALTERNATIVES,
        emits: |line, _| ALTERNATIVE_LINES.contains(&line),
    },
];

/// Shared guard: skip when the heading exists or any of `terms` appears.
fn already_covered(prompt: &str, title: &str, terms: &[&str]) -> bool {
    has_section(prompt, title) || text::contains_any(&prompt.to_lowercase(), terms)
}

// ---------------------------------------------------------------------------
// technical-context-enricher
// ---------------------------------------------------------------------------

pub(super) fn technical_context_enricher() -> Pattern {
    crate::pattern! {
        id: "technical-context-enricher",
        name: "Technical Context Enricher",
        description: "Asks for the language, framework and codebase details a change depends on",
        intents: &[
            Intent::CodeGeneration,
            Intent::Refinement,
            Intent::Migration,
            Intent::Testing,
        ],
        mode: PatternMode::Both,
        priority: 6,
        apply: apply_technical_context,
    }
}

const TECHNICAL_LINES: &[&str] = &[
    "- Language, framework and versions in use",
    "- Existing files or modules this change touches",
    "- Libraries already available in the project",
];

fn technical_extra(intent: Intent) -> Option<&'static str> {
    match intent {
        Intent::Testing => Some("- Test framework and how tests are run"),
        Intent::Migration => Some("- Source and target versions or platforms"),
        Intent::Refinement => Some("- Current measurements or profiling results"),
        _ => None,
    }
}

fn is_technical_line(line: &str, _rest: &str) -> bool {
    TECHNICAL_LINES.contains(&line)
        || Intent::all().iter().any(|i| technical_extra(*i) == Some(line))
}

/// Impact: high when the prompt has no technical vocabulary, medium otherwise.
fn apply_technical_context(prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
    let lower = prompt.to_lowercase();
    let labeled = sections::section_kinds(prompt).contains(&SectionKind::Technical);
    if labeled || text::contains_any(&lower, text::TECH_STACK) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Completeness,
            "Technical stack already specified",
        ));
    }

    let mut lines = TECHNICAL_LINES.to_vec();
    lines.extend(technical_extra(ctx.primary_intent()));

    let impact = if ctx.intent.characteristics.has_technical_terms {
        Impact::Medium
    } else {
        Impact::High
    };
    Ok(PatternResult::applied(
        append_block(prompt, SectionKind::Technical.title(), &lines),
        Dimension::Completeness,
        impact,
        "Requested technical context",
    ))
}

// ---------------------------------------------------------------------------
// error-context-enricher
// ---------------------------------------------------------------------------

pub(super) fn error_context_enricher() -> Pattern {
    crate::pattern! {
        id: "error-context-enricher",
        name: "Error Context Enricher",
        description: "Asks for the error output, reproduction steps and environment of a failure",
        intents: &[Intent::Debugging],
        mode: PatternMode::Both,
        priority: 6,
        apply: apply_error_context,
    }
}

const ERROR_CONTEXT: &str = "Error Context";

const ERROR_EVIDENCE: &[&str] = &[
    "stack trace", "stacktrace", "traceback", "panicked at", "error message", "error:",
    "exception:", "exit code", "logs", "log output",
];

const ERROR_LINES: &[&str] = &[
    "- The exact error message or stack trace",
    "- Steps to reproduce the failure",
    "- What you expected to happen and what happened instead",
    "- Recent changes made before the failure appeared",
    "- Environment details such as OS, runtime and dependency versions",
];

/// Impact: high when no code or error output is included, medium otherwise.
fn apply_error_context(prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
    if prompt.contains("```") || already_covered(prompt, ERROR_CONTEXT, ERROR_EVIDENCE) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Completeness,
            "Error output already included",
        ));
    }

    let impact = if ctx.intent.characteristics.has_code_context {
        Impact::Medium
    } else {
        Impact::High
    };
    Ok(PatternResult::applied(
        append_block(prompt, ERROR_CONTEXT, ERROR_LINES),
        Dimension::Completeness,
        impact,
        "Requested error details for diagnosis",
    ))
}

// ---------------------------------------------------------------------------
// security-focus-enhancer
// ---------------------------------------------------------------------------

pub(super) fn security_focus_enhancer() -> Pattern {
    crate::pattern! {
        id: "security-focus-enhancer",
        name: "Security Focus Enhancer",
        description: "Lists the vulnerability classes a security review should cover",
        intents: &[Intent::SecurityReview],
        mode: PatternMode::Both,
        priority: 6,
        apply: apply_security_focus,
    }
}

const SECURITY_FOCUS: &str = "Security Focus";

struct SecurityArea {
    line: &'static str,
    keywords: &'static [&'static str],
}

const SECURITY_AREAS: &[SecurityArea] = &[
    SecurityArea {
        line: "- Injection flaws (SQL, shell command, template)",
        keywords: &["injection", "sqli"],
    },
    SecurityArea {
        line: "- Cross-site scripting and output encoding",
        keywords: &["xss", "cross-site scripting", "escaping", "encoding"],
    },
    SecurityArea {
        line: "- Authentication and session handling",
        keywords: &["authentication", "session", "sessions", "login", "password", "mfa"],
    },
    SecurityArea {
        line: "- Authorization and access control",
        keywords: &["authorization", "access control", "permission", "permissions", "rbac", "privilege"],
    },
    SecurityArea {
        line: "- Secrets and sensitive data exposure",
        keywords: &["secret", "secrets", "credential", "credentials", "api key", "encryption", "pii"],
    },
    SecurityArea {
        line: "- Input validation",
        keywords: &["validation", "input", "inputs"],
    },
    SecurityArea {
        line: "- Vulnerable or outdated dependencies",
        keywords: &["dependency", "dependencies", "cve", "outdated"],
    },
];

const SECURITY_REPORT_LINE: &str =
    "- Report each finding with severity, location and a suggested fix";

fn is_security_line(line: &str, _rest: &str) -> bool {
    line == SECURITY_REPORT_LINE || SECURITY_AREAS.iter().any(|a| a.line == line)
}

/// Areas named by the prompt before it counts as already focused.
const FOCUSED_AREAS: usize = 3;

/// Impact: high when no area is named, medium otherwise.
fn apply_security_focus(prompt: &str, _ctx: &PatternContext) -> Result<PatternResult> {
    let lower = prompt.to_lowercase();
    let (covered, missing): (Vec<&SecurityArea>, Vec<&SecurityArea>) = SECURITY_AREAS
        .iter()
        .partition(|a| text::contains_any(&lower, a.keywords));

    if has_section(prompt, SECURITY_FOCUS) || covered.len() >= FOCUSED_AREAS {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Completeness,
            "Review areas already specified",
        ));
    }

    let mut lines: Vec<&str> = missing.iter().map(|a| a.line).collect();
    lines.push(SECURITY_REPORT_LINE);

    let impact = if covered.is_empty() {
        Impact::High
    } else {
        Impact::Medium
    };
    Ok(PatternResult::applied(
        append_block(prompt, SECURITY_FOCUS, &lines),
        Dimension::Completeness,
        impact,
        format!("Added {} security review area(s)", missing.len()),
    ))
}

// ---------------------------------------------------------------------------
// migration-safety-enhancer
// ---------------------------------------------------------------------------

pub(super) fn migration_safety_enhancer() -> Pattern {
    crate::pattern! {
        id: "migration-safety-enhancer",
        name: "Migration Safety Enhancer",
        description: "Adds backup, rollback and verification safeguards to migrations",
        intents: &[Intent::Migration],
        mode: PatternMode::Both,
        priority: 6,
        apply: apply_migration_safety,
    }
}

const MIGRATION_SAFETY: &str = "Migration Safety";
const SAFETY_TERMS: &[&str] = &["rollback", "roll back", "backup", "back up", "downtime", "data loss"];

const MIGRATION_LINES: &[&str] = &[
    "- Back up all affected data before starting",
    "- Keep a tested rollback path for every stage",
    "- Move in small increments that can be checked independently",
    "- Keep old and new versions working side by side during the transition",
    "- Check data integrity after each stage",
];

/// Impact: high when no safety term appears, medium when some do.
fn apply_migration_safety(prompt: &str, _ctx: &PatternContext) -> Result<PatternResult> {
    let lower = prompt.to_lowercase();
    let has_rollback = text::contains_any(&lower, &["rollback", "roll back"]);
    let has_backup = text::contains_any(&lower, &["backup", "back up"]);
    if has_section(prompt, MIGRATION_SAFETY) || (has_rollback && has_backup) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Completeness,
            "Backup and rollback already planned",
        ));
    }

    let impact = if text::contains_any(&lower, SAFETY_TERMS) {
        Impact::Medium
    } else {
        Impact::High
    };
    Ok(PatternResult::applied(
        append_block(prompt, MIGRATION_SAFETY, MIGRATION_LINES),
        Dimension::Completeness,
        impact,
        "Added migration safeguards",
    ))
}

// ---------------------------------------------------------------------------
// audience-definer
// ---------------------------------------------------------------------------

pub(super) fn audience_definer() -> Pattern {
    crate::pattern! {
        id: "audience-definer",
        name: "Audience Definer",
        description: "Asks who the explanation, document or summary is for",
        intents: &[Intent::Documentation, Intent::Learning, Intent::Summarization],
        mode: PatternMode::Both,
        priority: 6,
        phases: &[Phase::Optimize, Phase::QuestionValidation],
        apply: apply_audience,
    }
}

const AUDIENCE: &str = "Audience";

const AUDIENCE_TERMS: &[&str] = &[
    "audience", "beginner", "beginners", "expert", "experts", "non-technical", "for developers",
    "for engineers", "for executives", "for managers", "stakeholders", "readers", "new hires",
    "junior", "senior",
];

fn audience_lines(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Learning => &[
            "- Your current experience with the topic",
            "- How deep the explanation should go",
        ],
        Intent::Summarization => &[
            "- Who reads the summary and what decision it supports",
            "- How long the summary can be",
        ],
        _ => &[
            "- Who reads this documentation and what they already know",
            "- Whether readers need a quick reference or a full walkthrough",
        ],
    }
}

/// Impact: always medium.
fn apply_audience(prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
    if already_covered(prompt, AUDIENCE, AUDIENCE_TERMS) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Clarity,
            "Audience already defined",
        ));
    }
    Ok(PatternResult::applied(
        append_block(prompt, AUDIENCE, audience_lines(ctx.primary_intent())),
        Dimension::Clarity,
        Impact::Medium,
        "Asked for the intended audience",
    ))
}

// ---------------------------------------------------------------------------
// constraint-identifier
// ---------------------------------------------------------------------------

pub(super) fn constraint_identifier() -> Pattern {
    crate::pattern! {
        id: "constraint-identifier",
        name: "Constraint Identifier",
        description: "Adds the implicit limits a change must respect",
        intents: &[
            Intent::CodeGeneration,
            Intent::Refinement,
            Intent::Migration,
            Intent::Planning,
            Intent::SecurityReview,
        ],
        mode: PatternMode::Deep,
        priority: 6,
        apply: apply_constraints,
    }
}

fn constraint_lines(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Refinement => &[
            "- Preserve existing behavior and public APIs",
            "- Keep all current tests passing",
            "- Limit changes to the code in scope",
        ],
        Intent::Migration => &[
            "- Keep downtime to a minimum",
            "- Lose no data during the move",
            "- Let old and new versions coexist during rollout",
        ],
        Intent::Planning => &[
            "- Work within the available team and timeline",
            "- Respect existing architecture decisions",
        ],
        Intent::SecurityReview => &[
            "- Leave behavior unchanged while auditing",
            "- Test exploits only outside production",
        ],
        _ => &[
            "- Follow the existing code style and project conventions",
            "- Add no new dependencies without a clear reason",
            "- Keep public interfaces backward compatible",
        ],
    }
}

/// Impact: always medium.
fn apply_constraints(prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
    let labeled = sections::section_kinds(prompt).contains(&SectionKind::Constraints);
    if labeled || text::contains_any(&prompt.to_lowercase(), text::CONSTRAINT_MARKERS) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Completeness,
            "Constraints already stated",
        ));
    }
    Ok(PatternResult::applied(
        append_block(
            prompt,
            SectionKind::Constraints.title(),
            constraint_lines(ctx.primary_intent()),
        ),
        Dimension::Completeness,
        Impact::Medium,
        "Added implicit constraints",
    ))
}

// ---------------------------------------------------------------------------
// edge-case-identifier
// ---------------------------------------------------------------------------

pub(super) fn edge_case_identifier() -> Pattern {
    crate::pattern! {
        id: "edge-case-identifier",
        name: "Edge Case Identifier",
        description: "Lists boundary conditions and failure modes to handle",
        intents: &[
            Intent::CodeGeneration,
            Intent::Testing,
            Intent::Refinement,
            Intent::Debugging,
            Intent::Migration,
        ],
        mode: PatternMode::Deep,
        priority: 5,
        apply: apply_edge_cases,
    }
}

const EDGE_CASES: &str = "Edge Cases";
const EDGE_CASE_TERMS: &[&str] = &[
    "edge case", "edge cases", "corner case", "corner cases", "boundary", "boundaries",
];

fn edge_case_lines(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Debugging => &[
            "- Inputs or timing that trigger the failure only sometimes",
            "- Differences between environments where it works and where it fails",
        ],
        Intent::Migration => &[
            "- Records with null, legacy or unexpected formats",
            "- Interruption partway through the migration",
        ],
        _ => &[
            "- Empty, missing or malformed input",
            "- Very large input and boundary values",
            "- Concurrent or repeated calls",
            "- Failures of external services, network or disk",
        ],
    }
}

/// Impact: always medium.
fn apply_edge_cases(prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
    if already_covered(prompt, EDGE_CASES, EDGE_CASE_TERMS) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Completeness,
            "Edge cases already considered",
        ));
    }
    Ok(PatternResult::applied(
        append_block(prompt, EDGE_CASES, edge_case_lines(ctx.primary_intent())),
        Dimension::Completeness,
        Impact::Medium,
        "Listed edge cases to handle",
    ))
}

// ---------------------------------------------------------------------------
// scope-definer
// ---------------------------------------------------------------------------

pub(super) fn scope_definer() -> Pattern {
    crate::pattern! {
        id: "scope-definer",
        name: "Scope Definer",
        description: "Asks what is in and out of scope for the work",
        intents: &[Intent::Planning, Intent::PrdGeneration, Intent::CodeGeneration],
        mode: PatternMode::Deep,
        priority: 4,
        phases: &[Phase::Optimize, Phase::QuestionValidation],
        apply: apply_scope,
    }
}

const SCOPE: &str = "Scope";
const SCOPE_TERMS: &[&str] = &["scope", "out of scope", "in scope", "non-goal", "non-goals", "mvp"];

const SCOPE_LINES: &[&str] = &[
    "- What is included in this iteration",
    "- What is explicitly excluded (non-goals)",
    "- Assumptions the work depends on",
];

/// Impact: high for planning and PRD prompts, medium otherwise.
fn apply_scope(prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
    if already_covered(prompt, SCOPE, SCOPE_TERMS) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Completeness,
            "Scope already defined",
        ));
    }

    let impact = if ctx.primary_intent().is_planning_like() {
        Impact::High
    } else {
        Impact::Medium
    };
    Ok(PatternResult::applied(
        append_block(prompt, SCOPE, SCOPE_LINES),
        Dimension::Completeness,
        impact,
        "Asked for scope boundaries",
    ))
}

// ---------------------------------------------------------------------------
// alternative-approaches
// ---------------------------------------------------------------------------

pub(super) fn alternative_approaches() -> Pattern {
    crate::pattern! {
        id: "alternative-approaches",
        name: "Alternative Approaches",
        description: "Asks for competing approaches and their trade-offs before committing",
        intents: &[Intent::Planning, Intent::CodeGeneration, Intent::Refinement],
        mode: PatternMode::Deep,
        priority: 3,
        apply: apply_alternatives,
    }
}

const ALTERNATIVES: &str = "Alternative Approaches";
const ALTERNATIVE_TERMS: &[&str] = &[
    "alternative", "alternatives", "trade-off", "trade-offs", "tradeoff", "tradeoffs",
    "options", "compare", "versus", "vs",
];

const ALTERNATIVE_LINES: &[&str] = &[
    "- Describe at least two viable approaches",
    "- Compare them on complexity, cost and maintainability",
    "- Explain why the chosen approach fits this case",
];

/// Impact: always low.
fn apply_alternatives(prompt: &str, _ctx: &PatternContext) -> Result<PatternResult> {
    if already_covered(prompt, ALTERNATIVES, ALTERNATIVE_TERMS) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Completeness,
            "Alternatives already requested",
        ));
    }

    Ok(PatternResult::applied(
        append_block(prompt, ALTERNATIVES, ALTERNATIVE_LINES),
        Dimension::Completeness,
        Impact::Low,
        "Asked for alternative approaches",
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
