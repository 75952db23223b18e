use super::{append_block, generated_mask, has_section, user_content, GeneratedBlock};
use crate::error::Result;
use crate::pattern::{Pattern, PatternContext, PatternResult};
use crate::sections::{self, SectionKind};
use crate::text;
use crate::types::{Dimension, Impact, Intent, PatternMode, Phase};
use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// conciseness-filter
// ---------------------------------------------------------------------------

pub(super) fn conciseness_filter() -> Pattern {
    crate::pattern! {
        id: "conciseness-filter",
        name: "Conciseness Filter",
        description: "Strips pleasantries and filler words that carry no instruction",
        intents: Intent::all(),
        mode: PatternMode::Both,
        priority: 10,
        apply: apply_conciseness,
    }
}

static FILLER_RE: OnceLock<Regex> = OnceLock::new();
static SPACES_RE: OnceLock<Regex> = OnceLock::new();
static SPACE_PUNCT_RE: OnceLock<Regex> = OnceLock::new();

fn filler_re() -> &'static Regex {
    FILLER_RE.get_or_init(|| {
        let mut phrases = text::FILLER_PHRASES.to_vec();
        phrases.sort_by_key(|p| std::cmp::Reverse(p.len()));
        let alternation = phrases
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b(?:{alternation})\b[,!]?[ \t]*")).unwrap()
    })
}

fn spaces_re() -> &'static Regex {
    SPACES_RE.get_or_init(|| Regex::new(r"[ \t]{2,}").unwrap())
}

fn space_punct_re() -> &'static Regex {
    SPACE_PUNCT_RE.get_or_init(|| Regex::new(r"[ \t]+([,.?!;:])").unwrap())
}

const CODE_SPAN_MARK: char = '\u{1}';

/// Swap inline code spans for numbered placeholders the filler pattern
/// cannot match.
fn mask_code_spans(line: &str) -> (String, Vec<&str>) {
    let mut masked = String::with_capacity(line.len());
    let mut spans = Vec::new();
    let mut last = 0;
    for m in text::inline_code_re().find_iter(line) {
        masked.push_str(&line[last..m.start()]);
        masked.push_str(&format!("{CODE_SPAN_MARK}{}{CODE_SPAN_MARK}", spans.len()));
        spans.push(m.as_str());
        last = m.end();
    }
    masked.push_str(&line[last..]);
    (masked, spans)
}

fn restore_code_spans(line: &str, spans: &[&str]) -> String {
    spans.iter().enumerate().fold(line.to_string(), |acc, (i, span)| {
        acc.replace(&format!("{CODE_SPAN_MARK}{i}{CODE_SPAN_MARK}"), span)
    })
}

/// Remove filler from one line, leaving inline code untouched. Returns the
/// cleaned line and how many phrases were dropped; `None` when nothing but
/// punctuation remains.
fn strip_filler(line: &str) -> (Option<String>, usize) {
    let re = filler_re();
    let (masked, spans) = mask_code_spans(line);
    let removed = re.find_iter(&masked).count();
    if removed == 0 {
        return (Some(line.to_string()), 0);
    }

    let body = masked.trim_start();
    let indent = &masked[..masked.len() - body.len()];
    let leading = re.find(body).map(|m| m.start() == 0).unwrap_or(false);

    let replaced = re.replace_all(body, "");
    let collapsed = spaces_re().replace_all(&replaced, " ");
    let tidy = space_punct_re().replace_all(&collapsed, "$1");
    let tidy = tidy.trim();

    if tidy.chars().all(|c| !c.is_alphanumeric()) {
        return (None, removed);
    }
    let tidy = if leading && tidy.starts_with(char::is_alphabetic) {
        text::capitalize_first(tidy)
    } else {
        tidy.to_string()
    };
    let cleaned = restore_code_spans(&format!("{indent}{tidy}"), &spans);
    (Some(cleaned), removed)
}

/// Impact: high at five or more phrases or a fifth of the words, medium at
/// two phrases or a tenth, low otherwise.
fn apply_conciseness(prompt: &str, _ctx: &PatternContext) -> Result<PatternResult> {
    let mask = generated_mask(prompt);
    let mut in_fence = false;
    let mut removed = 0;
    let mut lines = Vec::new();

    for (line, generated) in prompt.lines().zip(mask) {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        if in_fence || generated {
            lines.push(line.to_string());
            continue;
        }
        let (cleaned, n) = strip_filler(line);
        removed += n;
        if let Some(cleaned) = cleaned {
            lines.push(cleaned);
        }
    }

    if removed == 0 {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Efficiency,
            "No filler phrases found",
        ));
    }

    let enhanced = lines.join("\n");
    if enhanced.trim().is_empty() {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Efficiency,
            "Prompt is only filler; left unchanged",
        ));
    }

    let before = text::word_count(prompt).max(1);
    let dropped = before.saturating_sub(text::word_count(&enhanced));
    let share = dropped as f64 / before as f64;
    let impact = if removed >= 5 || share >= 0.20 {
        Impact::High
    } else if removed >= 2 || share >= 0.10 {
        Impact::Medium
    } else {
        Impact::Low
    };

    Ok(PatternResult::applied(
        enhanced,
        Dimension::Efficiency,
        impact,
        format!("Removed {removed} filler phrase(s)"),
    ))
}

// ---------------------------------------------------------------------------
// ambiguity-detector
// ---------------------------------------------------------------------------

pub(super) fn ambiguity_detector() -> Pattern {
    crate::pattern! {
        id: "ambiguity-detector",
        name: "Ambiguity Detector",
        description: "Flags vague qualifiers and unresolved references that need concrete values",
        intents: Intent::all(),
        mode: PatternMode::Both,
        priority: 9,
        phases: &[Phase::Optimize, Phase::QuestionValidation],
        apply: apply_ambiguity,
    }
}

const CLARIFICATIONS: &str = "Clarifications Needed";
const MAX_FLAGGED: usize = 6;
const DANGLING_REFERENCES: &[&str] = &["it", "this", "that", "these", "those", "they"];

pub(super) const GENERATED: &[GeneratedBlock] = &[GeneratedBlock {
    title: CLARIFICATIONS,
    emits: is_clarification,
}];

fn vague_term_finding(term: &str) -> String {
    format!("- Replace \"{term}\" with a concrete value or example")
}

fn reference_finding(word: &str) -> String {
    format!("- Name what \"{word}\" refers to")
}

fn is_clarification(line: &str, _rest: &str) -> bool {
    text::VAGUE_TERMS.iter().any(|t| line == vague_term_finding(t))
        || DANGLING_REFERENCES.iter().any(|w| line == reference_finding(w))
}

/// Impact: high at three or more findings, medium at two, low at one.
fn apply_ambiguity(prompt: &str, _ctx: &PatternContext) -> Result<PatternResult> {
    if has_section(prompt, CLARIFICATIONS) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Clarity,
            "Clarifications already requested",
        ));
    }

    let user = user_content(prompt);
    let lower = user.to_lowercase();
    let mut findings: Vec<String> = text::matched_terms(&lower, text::VAGUE_TERMS)
        .into_iter()
        .take(MAX_FLAGGED)
        .map(vague_term_finding)
        .collect();

    let first_word = text::sentences(&user)
        .first()
        .and_then(|s| text::words(s).into_iter().next());
    if let Some(word) = first_word {
        if DANGLING_REFERENCES.contains(&word.as_str()) && !text::has_code(&user) {
            findings.push(reference_finding(&word));
        }
    }

    if findings.is_empty() {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Clarity,
            "No vague qualifiers found",
        ));
    }

    let impact = match findings.len() {
        1 => Impact::Low,
        2 => Impact::Medium,
        _ => Impact::High,
    };
    let lines: Vec<&str> = findings.iter().map(String::as_str).collect();
    Ok(PatternResult::applied(
        append_block(prompt, CLARIFICATIONS, &lines),
        Dimension::Clarity,
        impact,
        format!("Flagged {} ambiguous term(s) for clarification", findings.len()),
    ))
}

// ---------------------------------------------------------------------------
// objective-clarifier
// ---------------------------------------------------------------------------

pub(super) fn objective_clarifier() -> Pattern {
    crate::pattern! {
        id: "objective-clarifier",
        name: "Objective Clarifier",
        description: "States the goal up front when the prompt does not open with one",
        intents: Intent::all(),
        mode: PatternMode::Both,
        priority: 9,
        apply: apply_objective,
    }
}

fn objective_for(intent: Intent) -> &'static str {
    match intent {
        Intent::CodeGeneration => "Implement the functionality described below.",
        Intent::Planning => "Create a plan for the work described below.",
        Intent::Refinement => "Improve the existing code described below while keeping its behavior.",
        Intent::Debugging => "Find the root cause of the problem described below and fix it.",
        Intent::Documentation => "Write documentation for the subject described below.",
        Intent::Testing => "Write tests that cover the behavior described below.",
        Intent::Migration => "Migrate the system described below to its new target.",
        Intent::PrdGeneration => "Write a product requirements document for the product described below.",
        Intent::Summarization => "Summarize the material below.",
        Intent::Learning => "Explain the topic below from the fundamentals up.",
        Intent::SecurityReview => "Review the system described below for security vulnerabilities.",
    }
}

/// Impact: high for open-ended questions, medium otherwise.
fn apply_objective(prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
    if prompt.trim().is_empty() {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Clarity,
            "Empty prompt has no objective to clarify",
        ));
    }

    let user = user_content(prompt);
    let lower = user.to_lowercase();
    let labeled = sections::section_kinds(prompt).contains(&SectionKind::Objective);
    let opens_with_action = text::sentences(&user)
        .first()
        .map(|s| text::starts_with_imperative(s))
        .unwrap_or(false);
    if labeled || opens_with_action || text::contains_any(&lower, text::OBJECTIVE_MARKERS) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Clarity,
            "Objective already stated",
        ));
    }

    let enhanced = format!(
        "## {}\n{}\n\n{}",
        SectionKind::Objective.title(),
        objective_for(ctx.primary_intent()),
        prompt.trim_start()
    );
    let impact = if ctx.intent.characteristics.is_open_ended {
        Impact::High
    } else {
        Impact::Medium
    };
    Ok(PatternResult::applied(
        enhanced,
        Dimension::Clarity,
        impact,
        "Added an explicit objective",
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
