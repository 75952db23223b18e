//! The built-in pattern registry.
//!
//! Patterns that append a block guard against re-application by looking
//! for their own heading. Patterns that analyze the request itself read
//! [`user_content`], which hides every block the library appended, so a
//! second pass over optimized output sees the same request as the first.
//! A block is recognized by its heading and by a body made only of lines
//! its pattern writes; a user section that shares the title is kept.

mod cleanup;
mod context;
mod output;
mod prd;
mod structure;

use crate::pattern::Pattern;
use crate::text;
use crate::types::Intent;
use regex::Regex;
use std::sync::OnceLock;

pub use prd::{
    prd_completeness, PrdCompleteness, PrdSection, PrdSectionReport, PrdSectionStatus, PRD_SECTIONS,
};

/// Every built-in pattern in registration order. Selection sorts by
/// priority; ties keep this order.
pub fn default_patterns() -> Vec<Pattern> {
    vec![
        cleanup::conciseness_filter(),
        cleanup::ambiguity_detector(),
        cleanup::objective_clarifier(),
        structure::structure_organizer(),
        structure::topic_coherence_analyzer(),
        structure::step_decomposer(),
        context::technical_context_enricher(),
        context::error_context_enricher(),
        context::security_focus_enhancer(),
        context::migration_safety_enhancer(),
        context::audience_definer(),
        context::constraint_identifier(),
        context::edge_case_identifier(),
        output::output_format_enforcer(),
        output::validation_checklist_creator(),
        context::scope_definer(),
        context::alternative_approaches(),
        prd::prd_structure_enforcer(),
        output::success_criteria_enforcer(),
    ]
}

// ---------------------------------------------------------------------------
// Generated blocks
// ---------------------------------------------------------------------------

/// A block some pattern appends: its heading and a test for each body line
/// the pattern can write under it. `rest` is the lowercased text outside
/// the block, for blocks that quote the request.
struct GeneratedBlock {
    title: &'static str,
    emits: fn(line: &str, rest: &str) -> bool,
}

fn generated_blocks() -> impl Iterator<Item = &'static GeneratedBlock> {
    cleanup::GENERATED
        .iter()
        .chain(structure::GENERATED)
        .chain(context::GENERATED)
        .chain(output::GENERATED)
        .chain(prd::GENERATED)
}

fn generated_block(title: &str) -> Option<&'static GeneratedBlock> {
    generated_blocks().find(|b| b.title.eq_ignore_ascii_case(title.trim()))
}

/// True when `line` is in one of `table`'s per-intent line sets.
fn emitted_for_any_intent(table: fn(Intent) -> &'static [&'static str], line: &str) -> bool {
    Intent::all().iter().any(|i| table(*i).contains(&line))
}

static HEADING_RE: OnceLock<Regex> = OnceLock::new();

fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| Regex::new(r"^\s{0,3}(#{1,6})\s+(.+?)\s*#*\s*$").unwrap())
}

/// `(level, title)` for a markdown heading line.
pub(crate) fn heading(line: &str) -> Option<(usize, &str)> {
    let caps = heading_re().captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let title = caps.get(2)?.as_str();
    Some((level, title))
}

/// One flag per line: true for fence markers and the lines between them.
fn fenced_lines(lines: &[&str]) -> Vec<bool> {
    let mut in_fence = false;
    lines
        .iter()
        .map(|line| {
            let marker = line.trim_start().starts_with("```");
            if marker {
                in_fence = !in_fence;
            }
            marker || in_fence
        })
        .collect()
}

/// True when every body line of `lines[start..end]` is one the block's
/// pattern writes. A heading with no body is not a generated block.
fn is_generated_body(block: &GeneratedBlock, lines: &[&str], start: usize, end: usize) -> bool {
    let body: Vec<&str> = lines[start + 1..end]
        .iter()
        .map(|l| l.trim_end())
        .filter(|l| !l.trim().is_empty())
        .collect();
    if body.is_empty() {
        return false;
    }
    let rest = lines[..start]
        .iter()
        .chain(&lines[end..])
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase();
    body.into_iter().all(|line| (block.emits)(line, &rest))
}

/// One flag per line: true when the line sits in a block the library
/// appended, including its deeper subheadings. A block counts only when
/// its heading is one a pattern appends and its body is exactly what that
/// pattern writes, so user sections that share a title stay visible.
pub(crate) fn generated_mask(text: &str) -> Vec<bool> {
    let lines: Vec<&str> = text.lines().collect();
    let fenced = fenced_lines(&lines);
    let mut mask = vec![false; lines.len()];

    let mut i = 0;
    while i < lines.len() {
        let candidate = match heading(lines[i]) {
            Some((level, title)) if !fenced[i] => generated_block(title).map(|b| (level, b)),
            _ => None,
        };
        let Some((level, block)) = candidate else {
            i += 1;
            continue;
        };

        let end = (i + 1..lines.len())
            .find(|&j| !fenced[j] && matches!(heading(lines[j]), Some((l, _)) if l <= level))
            .unwrap_or(lines.len());
        let inner_fence = fenced[i + 1..end].iter().any(|f| *f);
        if !inner_fence && is_generated_body(block, &lines, i, end) {
            mask[i..end].fill(true);
            i = end;
        } else {
            i += 1;
        }
    }
    mask
}

/// The generated blocks of `text` in document order, each trimmed of
/// trailing blank lines.
pub(crate) fn generated_sections(text: &str) -> Vec<String> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut previous = false;
    for (line, generated) in text.lines().zip(generated_mask(text)) {
        if generated {
            let opens = matches!(heading(line), Some((_, t)) if generated_block(t).is_some());
            if !previous || opens {
                blocks.push(Vec::new());
            }
            if let Some(block) = blocks.last_mut() {
                block.push(line);
            }
        }
        previous = generated;
    }
    blocks
        .into_iter()
        .map(|b| b.join("\n").trim_end().to_string())
        .collect()
}

/// The prompt with every appended block removed.
pub(crate) fn user_content(text: &str) -> String {
    text.lines()
        .zip(generated_mask(text))
        .filter(|(_, generated)| !generated)
        .map(|(line, _)| line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// True when a heading with exactly this title (any level, any case) exists
/// outside code fences.
pub(crate) fn has_section(text: &str, title: &str) -> bool {
    let mut in_fence = false;
    text.lines().any(|line| {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            return false;
        }
        !in_fence
            && heading(line)
                .map(|(_, t)| t.trim().eq_ignore_ascii_case(title))
                .unwrap_or(false)
    })
}

/// Append `## title` followed by `lines`.
pub(crate) fn append_block(prompt: &str, title: &str, lines: &[&str]) -> String {
    let mut block = format!("## {title}");
    for line in lines {
        block.push('\n');
        block.push_str(line);
    }
    text::append_section(prompt, &block)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
