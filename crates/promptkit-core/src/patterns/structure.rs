use super::{
    append_block, emitted_for_any_intent, generated_sections, has_section, heading, user_content,
    GeneratedBlock,
};
use crate::error::Result;
use crate::pattern::{Pattern, PatternContext, PatternResult};
use crate::sections::{self, SectionKind};
use crate::text;
use crate::types::{Dimension, Impact, Intent, PatternMode};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// structure-organizer
// ---------------------------------------------------------------------------

pub(super) fn structure_organizer() -> Pattern {
    crate::pattern! {
        id: "structure-organizer",
        name: "Structure Organizer",
        description: "Reorders labeled fragments into objective, requirements, technical, constraints, output, success",
        intents: Intent::all(),
        mode: PatternMode::Both,
        priority: 8,
        apply: apply_structure,
    }
}

/// Impact: high when three or more labeled sections are reordered, medium
/// otherwise. Already-ordered prompts report a low-impact skip.
///
/// Only the request is reordered. Blocks other patterns appended keep
/// their relative order after it, and a prompt already grouped by topic is
/// left as it is.
fn apply_structure(prompt: &str, _ctx: &PatternContext) -> Result<PatternResult> {
    if has_section(prompt, TOPICS_COVERED) && has_section(prompt, FULL_CONTEXT) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Structure,
            "Prompt already organized by topic",
        ));
    }

    let parsed = sections::parse_sections(&user_content(prompt));
    if parsed.sections.is_empty() {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Structure,
            "No labeled sections to organize",
        ));
    }
    if parsed.is_canonical() {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Structure,
            "Sections already in canonical order",
        ));
    }

    // Repeated labels merge into one section, in order of appearance.
    let mut merged: BTreeMap<SectionKind, Vec<String>> = BTreeMap::new();
    for section in &parsed.sections {
        merged
            .entry(section.kind)
            .or_default()
            .extend(section.body.iter().cloned());
    }

    let mut blocks: Vec<String> = merged
        .iter()
        .map(|(kind, body)| {
            let body = trim_blank_lines(body);
            if body.is_empty() {
                format!("## {}", kind.title())
            } else {
                format!("## {}\n{}", kind.title(), body.join("\n"))
            }
        })
        .collect();

    let preamble = trim_blank_lines(&parsed.preamble);
    if !preamble.is_empty() {
        blocks.push(preamble.join("\n"));
    }
    blocks.extend(generated_sections(prompt));

    let impact = if merged.len() >= 3 {
        Impact::High
    } else {
        Impact::Medium
    };
    Ok(PatternResult::applied(
        blocks.join("\n\n"),
        Dimension::Structure,
        impact,
        format!("Reordered {} labeled section(s) into canonical order", merged.len()),
    ))
}

fn trim_blank_lines(lines: &[String]) -> &[String] {
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map(|i| i + 1)
        .unwrap_or(start);
    &lines[start..end.max(start)]
}

// ---------------------------------------------------------------------------
// topic-coherence-analyzer
// ---------------------------------------------------------------------------

pub(super) fn topic_coherence_analyzer() -> Pattern {
    crate::pattern! {
        id: "topic-coherence-analyzer",
        name: "Topic Coherence Analyzer",
        description: "Groups prompts that mix several subjects into one section per topic",
        intents: Intent::all(),
        mode: PatternMode::Deep,
        priority: 8,
        apply: apply_topics,
    }
}

const TOPICS_COVERED: &str = "Topics Covered";
const FULL_CONTEXT: &str = "Full Context";
const IMPLEMENTATION_STEPS: &str = "Implementation Steps";

pub(super) const GENERATED: &[GeneratedBlock] = &[
    GeneratedBlock {
        title: TOPICS_COVERED,
        emits: is_topic_line,
    },
    GeneratedBlock {
        title: IMPLEMENTATION_STEPS,
        emits: is_step_line,
    },
];

/// A listed topic, a topic subheading, or a sentence quoted from the
/// request.
fn is_topic_line(line: &str, rest: &str) -> bool {
    if let Some((level, title)) = heading(line) {
        return level > 2 && TOPICS.iter().any(|t| t.name == title);
    }
    TOPICS.iter().any(|t| line.strip_prefix("- ") == Some(t.name))
        || rest.contains(&line.trim().to_lowercase())
}

/// `N. step`, where the step is boilerplate or a clause of the request.
fn is_step_line(line: &str, rest: &str) -> bool {
    let Some(caps) = step_line_re().captures(line) else {
        return false;
    };
    let step = caps.get(1).map_or("", |m| m.as_str());
    emitted_for_any_intent(boilerplate_steps, step) || rest.contains(&step.to_lowercase())
}

struct Topic {
    name: &'static str,
    keywords: &'static [&'static str],
}

const TOPICS: &[Topic] = &[
    Topic {
        name: "UI",
        keywords: &[
            "ui", "component", "components", "page", "pages", "button", "form", "frontend",
            "css", "layout", "react", "vue", "screen", "view",
        ],
    },
    Topic {
        name: "Backend/API",
        keywords: &[
            "api", "endpoint", "endpoints", "route", "routes", "server", "backend", "rest",
            "graphql", "controller", "handler", "service",
        ],
    },
    Topic {
        name: "Database",
        keywords: &[
            "database", "schema", "table", "tables", "sql", "query", "queries", "postgres",
            "mysql", "mongodb", "sqlite", "index",
        ],
    },
    Topic {
        name: "Authentication",
        keywords: &[
            "auth", "authentication", "login", "logout", "password", "session", "token",
            "jwt", "oauth", "sso", "signup",
        ],
    },
    Topic {
        name: "Performance",
        keywords: &[
            "performance", "latency", "cache", "caching", "slow", "faster", "throughput",
            "memory", "optimize",
        ],
    },
    Topic {
        name: "Testing",
        keywords: &["test", "tests", "testing", "unit test", "coverage", "e2e", "integration test"],
    },
    Topic {
        name: "Deployment",
        keywords: &[
            "deploy", "deployment", "docker", "kubernetes", "ci", "pipeline", "release",
            "hosting",
        ],
    },
];

/// Impact: high for three or more topics, medium for two.
fn apply_topics(prompt: &str, _ctx: &PatternContext) -> Result<PatternResult> {
    let already_grouped = has_section(prompt, TOPICS_COVERED)
        || TOPICS.iter().any(|t| has_section(prompt, t.name));
    if already_grouped {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Structure,
            "Prompt already organized by topic",
        ));
    }

    let user = user_content(prompt);
    let lower = user.to_lowercase();
    let found: Vec<&Topic> = TOPICS
        .iter()
        .filter(|t| text::contains_any(&lower, t.keywords))
        .collect();
    if found.len() < 2 {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Structure,
            "Prompt stays on a single topic",
        ));
    }

    let sentences = text::sentences(&user);
    let mut out = format!("## {TOPICS_COVERED}\n");
    for topic in &found {
        out.push_str(&format!("- {}\n", topic.name));
    }
    for topic in &found {
        let related: Vec<&str> = sentences
            .iter()
            .filter(|s| text::contains_any(&s.to_lowercase(), topic.keywords))
            .map(String::as_str)
            .collect();
        out.push_str(&format!("\n### {}\n{}\n", topic.name, related.join("\n")));
    }
    out.push_str(&format!("\n## {FULL_CONTEXT}\n{}", prompt.trim()));

    let impact = if found.len() >= 3 {
        Impact::High
    } else {
        Impact::Medium
    };
    Ok(PatternResult::applied(
        out,
        Dimension::Structure,
        impact,
        format!("Grouped the prompt into {} topics", found.len()),
    ))
}

// ---------------------------------------------------------------------------
// step-decomposer
// ---------------------------------------------------------------------------

pub(super) fn step_decomposer() -> Pattern {
    crate::pattern! {
        id: "step-decomposer",
        name: "Step Decomposer",
        description: "Breaks long or compound requests into a numbered list of steps",
        intents: &[
            Intent::CodeGeneration,
            Intent::Planning,
            Intent::Migration,
            Intent::Refinement,
            Intent::Debugging,
            Intent::Testing,
        ],
        mode: PatternMode::Both,
        priority: 7,
        apply: apply_steps,
    }
}

const LONG_PROMPT_WORDS: usize = 100;
const MAX_STEPS: usize = 10;

static SEQUENCE_RE: OnceLock<Regex> = OnceLock::new();
static FIRST_THEN_RE: OnceLock<Regex> = OnceLock::new();
static CONJUNCTION_RE: OnceLock<Regex> = OnceLock::new();
static STEP_LINE_RE: OnceLock<Regex> = OnceLock::new();

fn sequence_re() -> &'static Regex {
    SEQUENCE_RE.get_or_init(|| Regex::new(r"(?i)\b(?:step|phase)\s+\d+").unwrap())
}

fn first_then_re() -> &'static Regex {
    FIRST_THEN_RE
        .get_or_init(|| Regex::new(r"(?is)\bfirst\b.*\b(?:then|second|next|finally)\b").unwrap())
}

fn conjunction_re() -> &'static Regex {
    CONJUNCTION_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\s*;\s*|,?\s+and\s+then\s+|,?\s+then\s+|,?\s+and\s+|,?\s+also\s+|,\s+",
        )
        .unwrap()
    })
}

fn step_line_re() -> &'static Regex {
    STEP_LINE_RE.get_or_init(|| Regex::new(r"^\d+\. (\S.*)$").unwrap())
}

fn has_sequence(prompt: &str) -> bool {
    text::numbered_item_count(prompt) >= 2
        || sequence_re().is_match(prompt)
        || first_then_re().is_match(prompt)
}

fn boilerplate_steps(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Planning => &[
            "Clarify the goal and the constraints",
            "Break the work into milestones",
            "Identify dependencies and risks",
            "Estimate effort for each milestone",
            "Define how progress will be reviewed",
        ],
        Intent::Migration => &[
            "Inventory what needs to move",
            "Back up the current state",
            "Migrate in small increments",
            "Verify each increment",
            "Remove the old path once verified",
        ],
        Intent::Refinement => &[
            "Measure the current behavior",
            "Identify the code to change",
            "Make the change in small commits",
            "Confirm behavior is unchanged",
        ],
        Intent::Debugging => &[
            "Reproduce the failure",
            "Isolate the failing component",
            "Identify the root cause",
            "Fix the cause and add a regression test",
        ],
        Intent::Testing => &[
            "List the behaviors to cover",
            "Write tests for the main paths",
            "Add tests for failure paths",
            "Run the suite and check coverage",
        ],
        _ => &[
            "Review the existing code and conventions",
            "Implement the core functionality",
            "Handle errors and invalid input",
            "Write tests for the new behavior",
            "Document how to use the change",
        ],
    }
}

/// A sentence cut at conjunctions and commas. Each part carries the
/// separator that preceded it ("" for the first).
fn parts(sentence: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut sep = "";
    let mut last = 0;
    for m in conjunction_re().find_iter(sentence) {
        out.push((sep, &sentence[last..m.start()]));
        sep = m.as_str();
        last = m.end();
    }
    out.push((sep, &sentence[last..]));
    out
}

/// Action clauses in `user` and the number of splits between them.
///
/// A part that opens with an imperative verb starts a new clause; any other
/// part is glued back onto the clause before it with its separator. Each
/// list item counts as a split as well.
fn action_clauses(user: &str) -> (Vec<String>, usize) {
    let mut clauses: Vec<String> = Vec::new();
    let mut splits = text::list_item_count(user);

    for sentence in text::sentences(user) {
        let mut current: Option<String> = None;
        for (i, (sep, part)) in parts(&sentence).into_iter().enumerate() {
            let part = part.trim().trim_end_matches(['.', ';', ',', '!']);
            if part.is_empty() {
                continue;
            }
            if text::starts_with_imperative(part) {
                if i > 0 {
                    splits += 1;
                }
                if let Some(done) = current.take() {
                    clauses.push(done);
                }
                current = Some(text::capitalize_first(part));
            } else if let Some(c) = current.as_mut() {
                c.push_str(sep);
                c.push_str(part);
            }
        }
        if let Some(done) = current {
            clauses.push(done);
        }
    }

    let mut seen = std::collections::HashSet::new();
    clauses.retain(|c| seen.insert(c.to_lowercase()));
    clauses.truncate(MAX_STEPS);
    (clauses, splits)
}

/// Impact: high at five or more steps, medium otherwise.
fn apply_steps(prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
    if has_sequence(prompt) || has_section(prompt, IMPLEMENTATION_STEPS) {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Actionability,
            "Prompt already lists its steps in order",
        ));
    }

    let user = user_content(prompt);
    let (clauses, splits) = action_clauses(&user);
    let long = text::word_count(&user) > LONG_PROMPT_WORDS;
    if !long && splits < 2 {
        return Ok(PatternResult::skipped(
            prompt,
            Dimension::Actionability,
            "Prompt is a single step",
        ));
    }

    let steps: Vec<String> = if clauses.len() >= 2 {
        clauses
    } else {
        boilerplate_steps(ctx.primary_intent())
            .iter()
            .map(|s| s.to_string())
            .collect()
    };

    let lines: Vec<String> = steps
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {s}", i + 1))
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let impact = if steps.len() >= 5 {
        Impact::High
    } else {
        Impact::Medium
    };
    Ok(PatternResult::applied(
        append_block(prompt, IMPLEMENTATION_STEPS, &refs),
        Dimension::Actionability,
        impact,
        format!("Decomposed the request into {} steps", steps.len()),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
