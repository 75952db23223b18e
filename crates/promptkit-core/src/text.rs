//! Lexical helpers shared by the detector, the assessor and the patterns.
//!
//! The term helpers (`has_term`, `count_hits`, ...) expect text that the
//! caller has already lowercased, so a prompt is lowered once per pass.

use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Verbs that open an instruction ("Build …", "Fix …").
pub const IMPERATIVE_VERBS: &[&str] = &[
    "add", "analyze", "audit", "build", "change", "check", "clean", "configure", "convert",
    "create", "debug", "define", "delete", "deploy", "design", "document", "draft", "explain",
    "extract", "find", "fix", "generate", "handle", "implement", "improve", "integrate",
    "investigate", "list", "make", "migrate", "move", "optimize", "outline", "plan", "port",
    "refactor", "remove", "rename", "replace", "research", "resolve", "review", "rewrite",
    "scan", "set", "setup", "show", "speed", "split", "summarize", "teach", "test", "update",
    "upgrade", "validate", "verify", "write",
];

/// Concrete technical nouns. Used for density and clarity scoring.
pub const TECH_TERMS: &[&str] = &[
    "api", "endpoint", "route", "database", "schema", "table", "query", "index", "function",
    "method", "class", "module", "component", "service", "server", "client", "cache", "queue",
    "request", "response", "json", "yaml", "http", "rest", "graphql", "sql", "cli", "test",
    "tests", "unit", "integration", "migration", "deploy", "docker", "kubernetes", "auth",
    "authentication", "token", "jwt", "oauth", "session", "login", "form", "page", "ui",
    "frontend", "backend", "middleware", "config", "configuration", "library", "framework",
    "package", "dependency", "struct", "interface", "type", "variable", "async", "thread",
    "memory", "latency", "log", "logging", "error", "exception", "stack", "bug", "file",
    "directory", "repository", "commit", "branch", "pipeline", "webhook", "websocket",
];

/// Languages, frameworks and platforms. A hit counts as a tech-stack mention.
pub const TECH_STACK: &[&str] = &[
    "rust", "python", "javascript", "typescript", "java", "kotlin", "swift", "golang",
    "ruby", "php", "c#", "c++", "react", "vue", "angular", "svelte", "next.js", "nextjs",
    "node", "node.js", "express", "django", "flask", "fastapi", "rails", "spring", "laravel",
    "postgres", "postgresql", "mysql", "sqlite", "mongodb", "redis", "kafka", "graphql",
    "docker", "kubernetes", "aws", "gcp", "azure", "tailwind", "tokio", "axum", "prisma",
];

/// Qualifiers that make a request fuzzy.
pub const VAGUE_TERMS: &[&str] = &[
    "something", "somehow", "stuff", "things", "maybe", "perhaps", "kind of", "sort of",
    "some kind", "etc", "whatever", "a few", "a bit", "nice", "better", "good", "various",
    "probably", "and so on",
];

/// Pleasantries and filler that carry no instruction.
pub const FILLER_PHRASES: &[&str] = &[
    "please", "could you", "can you", "would you", "i would like you to", "i want you to",
    "thank you", "thanks", "kindly", "if possible", "if you don't mind", "basically",
    "actually", "just", "really", "i was wondering",
];

/// Phrases that state what the response should look like.
pub const OUTPUT_MARKERS: &[&str] = &[
    "output", "return", "respond with", "format", "as json", "as a table", "in markdown",
    "deliverable", "produce", "provide a",
];

/// Phrases that spell out requirements.
pub const REQUIREMENT_MARKERS: &[&str] = &[
    "requirement", "must", "should", "needs to", "need to", "has to", "required",
];

/// Phrases that express explicit constraints.
pub const CONSTRAINT_MARKERS: &[&str] = &[
    "constraint", "must not", "should not", "don't", "do not", "avoid", "without",
    "limit", "only use", "compatible with", "no more than", "at most", "within",
];

/// Phrases indicating that success criteria are already present.
pub const SUCCESS_INDICATORS: &[&str] = &[
    "done when",
    "acceptance criteria",
    "success criteria",
    "definition of done",
    "should pass",
    "must pass",
    "verify that",
    "expected result",
    "is complete when",
];

/// Phrases that mark an explicit objective.
pub const OBJECTIVE_MARKERS: &[&str] = &[
    "objective", "goal", "the aim", "purpose", "i want to", "i need to", "we need to",
];

// ---------------------------------------------------------------------------
// Regexes
// ---------------------------------------------------------------------------

static WORD_RE: OnceLock<Regex> = OnceLock::new();
static HEADING_RE: OnceLock<Regex> = OnceLock::new();
static LIST_RE: OnceLock<Regex> = OnceLock::new();
static NUMBERED_RE: OnceLock<Regex> = OnceLock::new();
static INLINE_CODE_RE: OnceLock<Regex> = OnceLock::new();
static SYNTAX_RE: OnceLock<Regex> = OnceLock::new();

fn word_re() -> &'static Regex {
    WORD_RE.get_or_init(|| Regex::new(r"[a-z0-9][a-z0-9+#_\-']*(?:\.[a-z0-9]+)*").unwrap())
}

fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| Regex::new(r"(?m)^\s{0,3}#{1,6}\s+\S").unwrap())
}

fn list_re() -> &'static Regex {
    LIST_RE.get_or_init(|| Regex::new(r"(?m)^\s*(?:[-*+]|\d+[.)])\s+\S").unwrap())
}

fn numbered_re() -> &'static Regex {
    NUMBERED_RE.get_or_init(|| Regex::new(r"(?m)^\s*\d+[.)]\s+\S").unwrap())
}

pub(crate) fn inline_code_re() -> &'static Regex {
    INLINE_CODE_RE.get_or_init(|| Regex::new(r"`[^`\n]+`").unwrap())
}

fn syntax_re() -> &'static Regex {
    SYNTAX_RE.get_or_init(|| {
        Regex::new(r"\w+\(\)|=>|::|->|\{\s*\}|;\s*$|</?[a-zA-Z]+>|\bfn\s+\w+|\bdef\s+\w+\(|\bconst\s+\w+\s*=").unwrap()
    })
}

// ---------------------------------------------------------------------------
// Tokens and terms
// ---------------------------------------------------------------------------

/// Lowercased word tokens. Keeps `node.js`, `c++` and `c#` intact.
pub fn words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    word_re()
        .find_iter(&lower)
        .map(|m| m.as_str().trim_end_matches('\'').to_string())
        .collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// True when `term` occurs in `lower` on word boundaries. Multi-word terms
/// and terms containing punctuation are matched the same way at both ends.
pub fn has_term(lower: &str, term: &str) -> bool {
    count_term(lower, term) > 0
}

/// Number of boundary-respecting occurrences of `term` in `lower`.
pub fn count_term(lower: &str, term: &str) -> usize {
    if term.is_empty() {
        return 0;
    }
    let bytes = lower.as_bytes();
    let mut count = 0;
    let mut from = 0;
    while let Some(offset) = lower[from..].find(term) {
        let start = from + offset;
        let end = start + term.len();
        let before_ok = start == 0 || !is_word_byte(bytes[start - 1]);
        let after_ok = end >= bytes.len() || !is_word_byte(bytes[end]);
        if before_ok && after_ok {
            count += 1;
        }
        from = end;
    }
    count
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

pub fn contains_any(lower: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| has_term(lower, t))
}

/// Distinct terms from `terms` that occur in `lower`.
pub fn matched_terms<'a>(lower: &str, terms: &[&'a str]) -> Vec<&'a str> {
    terms.iter().copied().filter(|t| has_term(lower, t)).collect()
}

/// Total occurrences of all `terms` in `lower`.
pub fn count_hits(lower: &str, terms: &[&str]) -> usize {
    terms.iter().map(|t| count_term(lower, t)).sum()
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

pub fn has_heading(text: &str) -> bool {
    heading_re().is_match(text)
}

pub fn heading_count(text: &str) -> usize {
    heading_re().find_iter(text).count()
}

pub fn list_item_count(text: &str) -> usize {
    list_re().find_iter(text).count()
}

pub fn numbered_item_count(text: &str) -> usize {
    numbered_re().find_iter(text).count()
}

/// Fenced or inline code, or tokens that only appear in source code.
pub fn has_code(text: &str) -> bool {
    text.contains("```")
        || inline_code_re().is_match(text)
        || text.lines().any(|l| syntax_re().is_match(l))
}

/// Split into sentences on `.`, `!`, `?` followed by whitespace, and on line
/// breaks. Markdown heading lines are dropped; list markers are stripped.
pub fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("```") {
            continue;
        }
        let line = strip_list_marker(line);
        let mut current = String::new();
        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            current.push(ch);
            if matches!(ch, '.' | '!' | '?')
                && chars.peek().map(|c| c.is_whitespace()).unwrap_or(true)
            {
                push_sentence(&mut out, &current);
                current.clear();
            }
        }
        push_sentence(&mut out, &current);
    }
    out
}

fn push_sentence(out: &mut Vec<String>, s: &str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s.to_string());
    }
}

/// Remove a leading `-`, `*`, `+` or `1.` list marker.
pub fn strip_list_marker(line: &str) -> &str {
    let trimmed = line.trim_start();
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim_start();
        }
    }
    trimmed
}

/// True when the first word of `sentence` is an imperative verb.
pub fn starts_with_imperative(sentence: &str) -> bool {
    words(sentence)
        .first()
        .map(|w| IMPERATIVE_VERBS.contains(&w.as_str()))
        .unwrap_or(false)
}

/// Uppercase the first alphabetic character.
pub fn capitalize_first(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut done = false;
    for ch in text.chars() {
        if !done && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
            done = true;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Append a markdown section, separated from the body by a blank line.
pub fn append_section(prompt: &str, section: &str) -> String {
    let body = prompt.trim_end();
    if body.is_empty() {
        return section.to_string();
    }
    format!("{body}\n\n{section}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_keep_dotted_and_symbol_names() {
        let w = words("Use Node.js and C++ to build it.");
        assert!(w.contains(&"node.js".to_string()));
        assert!(w.contains(&"c++".to_string()));
        assert!(w.contains(&"it".to_string()));
    }

    #[test]
    fn has_term_respects_word_boundaries() {
        assert!(has_term("build the ui layer", "ui"));
        assert!(!has_term("build a guide", "ui"));
        assert!(has_term("kind of slow", "kind of"));
        assert_eq!(count_term("test tests test", "test"), 2);
    }

    #[test]
    fn sentences_split_on_terminators_and_lines() {
        let s = sentences("Create UI components. Add database schema.\n- Write API routes");
        assert_eq!(
            s,
            vec![
                "Create UI components.",
                "Add database schema.",
                "Write API routes"
            ]
        );
    }

    #[test]
    fn sentences_skip_headings() {
        let s = sentences("## Objective\nBuild X");
        assert_eq!(s, vec!["Build X"]);
    }

    #[test]
    fn detects_code() {
        assert!(has_code("why does `foo()` panic"));
        assert!(has_code("```rust\nfn main() {}\n```"));
        assert!(has_code("let x = a::b();"));
        assert!(!has_code("Build a login page"));
    }

    #[test]
    fn imperative_detection() {
        assert!(starts_with_imperative("Build a login page"));
        assert!(!starts_with_imperative("The login page is broken"));
        assert!(!starts_with_imperative(""));
    }

    #[test]
    fn list_marker_stripping() {
        assert_eq!(strip_list_marker("- item"), "item");
        assert_eq!(strip_list_marker("12. item"), "item");
        assert_eq!(strip_list_marker("3) item"), "item");
        assert_eq!(strip_list_marker("plain"), "plain");
    }

    #[test]
    fn append_section_handles_empty_body() {
        assert_eq!(append_section("", "## X"), "## X");
        assert_eq!(append_section("Body\n\n", "## X"), "Body\n\n## X");
    }
}
