use crate::text;
use crate::types::{Intent, Mode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Below this confidence the detector suggests deep mode.
pub const DEEP_MODE_CONFIDENCE_THRESHOLD: u32 = 60;

/// Prompts longer than this with no headings, lists or labels need structure.
pub const NEEDS_STRUCTURE_WORD_THRESHOLD: usize = 50;

// ---------------------------------------------------------------------------
// IntentResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Characteristics {
    pub has_code_context: bool,
    pub has_technical_terms: bool,
    pub is_open_ended: bool,
    pub needs_structure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResult {
    pub primary_intent: Intent,
    /// 0–100.
    pub confidence: u32,
    pub characteristics: Characteristics,
    pub suggested_mode: Mode,
}

// ---------------------------------------------------------------------------
// Keyword and phrase tables
// ---------------------------------------------------------------------------

type Weighted = &'static [(&'static str, u32)];

struct IntentVocabulary {
    intent: Intent,
    keywords: Weighted,
    phrases: Weighted,
}

const VOCABULARY: &[IntentVocabulary] = &[
    IntentVocabulary {
        intent: Intent::CodeGeneration,
        keywords: &[
            ("build", 2), ("create", 2), ("implement", 2), ("develop", 2), ("scaffold", 2),
            ("generate", 1), ("write", 1), ("add", 1), ("make", 1), ("component", 1),
            ("components", 1), ("function", 1), ("feature", 1), ("page", 1), ("endpoint", 1),
            ("app", 1), ("application", 1), ("class", 1), ("module", 1), ("api", 1),
        ],
        phrases: &[
            ("create a new", 3), ("write a function", 3), ("implement a", 3),
            ("build an app", 3), ("add a feature", 3), ("new feature", 3), ("set up", 3),
        ],
    },
    IntentVocabulary {
        intent: Intent::Planning,
        keywords: &[
            ("plan", 3), ("planning", 3), ("roadmap", 3), ("strategy", 3), ("architecture", 2),
            ("approach", 2), ("milestone", 2), ("milestones", 2), ("prioritize", 2),
            ("design", 1), ("steps", 1), ("organize", 1), ("structure", 1),
        ],
        phrases: &[
            ("how should i", 4), ("how should we", 4), ("what's the best way", 4),
            ("what is the best way", 4), ("best approach", 4), ("plan out", 4),
            ("break down", 4), ("high-level design", 4), ("system design", 4),
            ("should we", 4),
        ],
    },
    IntentVocabulary {
        intent: Intent::Refinement,
        keywords: &[
            ("refactor", 3), ("optimize", 3), ("simplify", 2), ("improve", 2), ("performance", 2),
            ("faster", 2), ("efficient", 2), ("readability", 2), ("polish", 2), ("clean", 1),
            ("speed", 1), ("rewrite", 1),
        ],
        phrases: &[
            ("clean up", 4), ("make it faster", 4), ("reduce memory", 4),
            ("improve performance", 4), ("speed up", 4), ("more readable", 4),
            ("code quality", 4),
        ],
    },
    IntentVocabulary {
        intent: Intent::Debugging,
        keywords: &[
            ("bug", 3), ("broken", 3), ("crash", 3), ("crashes", 3), ("exception", 3),
            ("debug", 3), ("traceback", 3), ("stacktrace", 3), ("fix", 2), ("error", 2),
            ("failing", 2), ("fails", 2), ("undefined", 2), ("panic", 2), ("panics", 2),
            ("issue", 1), ("wrong", 1), ("null", 1),
        ],
        phrases: &[
            ("not working", 4), ("doesn't work", 4), ("does not work", 4), ("stack trace", 4),
            ("throws an error", 4), ("returns undefined", 4), ("why does", 4), ("why is", 4),
        ],
    },
    IntentVocabulary {
        intent: Intent::Documentation,
        keywords: &[
            ("document", 3), ("documentation", 3), ("docs", 3), ("readme", 3), ("docstring", 3),
            ("docstrings", 3), ("jsdoc", 3), ("comment", 1), ("comments", 1), ("guide", 1),
        ],
        phrases: &[
            ("write documentation", 4), ("add comments", 4), ("api docs", 4),
            ("update the readme", 4), ("document the", 4),
        ],
    },
    IntentVocabulary {
        intent: Intent::Testing,
        keywords: &[
            ("testing", 3), ("coverage", 3), ("jest", 3), ("pytest", 3), ("e2e", 3), ("tdd", 3),
            ("test", 2), ("tests", 2), ("unit", 2), ("mock", 2), ("assert", 2),
            ("integration", 1), ("spec", 1),
        ],
        phrases: &[
            ("write tests", 4), ("unit tests", 4), ("test cases", 4), ("test coverage", 4),
            ("integration tests", 4), ("end-to-end", 4),
        ],
    },
    IntentVocabulary {
        intent: Intent::Migration,
        keywords: &[
            ("migrate", 3), ("migration", 3), ("upgrade", 3), ("port", 2), ("convert", 2),
            ("legacy", 2), ("deprecated", 2), ("transition", 1), ("move", 1),
        ],
        phrases: &[
            ("migrate from", 4), ("upgrade to", 4), ("convert from", 4), ("port to", 4),
            ("move from", 4), ("switch from", 4),
        ],
    },
    IntentVocabulary {
        intent: Intent::PrdGeneration,
        keywords: &[
            ("prd", 4), ("specification", 2), ("requirements", 2), ("stakeholder", 2),
            ("stakeholders", 2), ("persona", 2), ("personas", 2), ("mvp", 2), ("product", 1),
        ],
        phrases: &[
            ("product requirements", 5), ("requirements document", 5), ("user stories", 5),
            ("product spec", 5), ("feature spec", 5),
        ],
    },
    IntentVocabulary {
        intent: Intent::Summarization,
        keywords: &[
            ("summarize", 4), ("tldr", 4), ("summary", 3), ("recap", 3), ("condense", 3),
            ("shorten", 2), ("overview", 1), ("brief", 1),
        ],
        phrases: &[
            ("sum up", 4), ("key points", 4), ("main points", 4), ("in short", 4),
            ("give me a summary", 4),
        ],
    },
    IntentVocabulary {
        intent: Intent::Learning,
        keywords: &[
            ("learn", 3), ("teach", 3), ("tutorial", 3), ("understand", 2), ("explain", 2),
            ("concept", 2), ("concepts", 2), ("beginner", 2), ("difference", 1), ("why", 1),
        ],
        phrases: &[
            ("how does", 4), ("what is", 4), ("what are", 4), ("explain how", 4),
            ("help me understand", 4), ("difference between", 4), ("teach me", 4),
        ],
    },
    IntentVocabulary {
        intent: Intent::SecurityReview,
        keywords: &[
            ("vulnerability", 4), ("vulnerabilities", 4), ("xss", 4), ("csrf", 4), ("owasp", 4),
            ("security", 3), ("injection", 3), ("exploit", 3), ("cve", 3), ("pentest", 3),
            ("secure", 2), ("audit", 2), ("sanitize", 2), ("secrets", 2),
        ],
        phrases: &[
            ("security review", 5), ("security audit", 5), ("sql injection", 5),
            ("threat model", 5), ("is this secure", 5), ("auth bypass", 5),
        ],
    },
];

const PERFORMANCE_TERMS: &[&str] = &[
    "faster", "optimize", "reduce memory", "performance", "latency", "speed up", "slow",
];

const QUESTION_WORDS: &[&str] = &["how", "what", "should"];

static KEYWORD_INDEX: OnceLock<HashMap<&'static str, Vec<(Intent, u32)>>> = OnceLock::new();

/// keyword → every (intent, weight) it contributes to. Built once so a scan
/// is a single pass over the prompt's tokens.
fn keyword_index() -> &'static HashMap<&'static str, Vec<(Intent, u32)>> {
    KEYWORD_INDEX.get_or_init(|| {
        let mut index: HashMap<&'static str, Vec<(Intent, u32)>> = HashMap::new();
        for vocab in VOCABULARY {
            for &(keyword, weight) in vocab.keywords {
                index.entry(keyword).or_default().push((vocab.intent, weight));
            }
        }
        index
    })
}

// ---------------------------------------------------------------------------
// IntentDetector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct IntentDetector;

impl IntentDetector {
    pub fn new() -> Self {
        Self
    }

    /// Classify `prompt`. Total: defined for every input, including "".
    pub fn analyze(&self, prompt: &str) -> IntentResult {
        let lower = prompt.to_lowercase();
        let tokens = text::words(prompt);
        let scores = score_intents(&lower, &tokens);

        let (primary_intent, top, runner_up) = pick_winner(&scores);
        let confidence = confidence(top, runner_up);
        let characteristics = characteristics(prompt, &lower);

        let suggested_mode =
            if confidence < DEEP_MODE_CONFIDENCE_THRESHOLD || primary_intent.is_planning_like() {
                Mode::Deep
            } else {
                Mode::Fast
            };

        IntentResult {
            primary_intent,
            confidence,
            characteristics,
            suggested_mode,
        }
    }
}

fn score_intents(lower: &str, tokens: &[String]) -> [u32; 11] {
    let mut scores = [0u32; 11];
    let index = keyword_index();

    for token in tokens {
        if let Some(hits) = index.get(token.as_str()) {
            for &(intent, weight) in hits {
                scores[intent.index()] += weight;
            }
        }
    }

    for vocab in VOCABULARY {
        for &(phrase, weight) in vocab.phrases {
            if text::has_term(lower, phrase) {
                scores[vocab.intent.index()] += weight;
            }
        }
    }

    if text::has_code(lower) {
        scores[Intent::Debugging.index()] += 2;
        scores[Intent::CodeGeneration.index()] += 1;
    }
    if lower.contains('?') && tokens.iter().any(|t| QUESTION_WORDS.contains(&t.as_str())) {
        scores[Intent::Planning.index()] += 2;
    }
    if text::contains_any(lower, PERFORMANCE_TERMS) {
        scores[Intent::Refinement.index()] += 3;
    }

    scores
}

/// Highest score wins; any tie for first place goes to code generation.
fn pick_winner(scores: &[u32; 11]) -> (Intent, u32, u32) {
    let top = scores.iter().copied().max().unwrap_or(0);
    let leaders: Vec<Intent> = Intent::all()
        .iter()
        .copied()
        .filter(|i| scores[i.index()] == top)
        .collect();

    if leaders.len() != 1 {
        return (Intent::CodeGeneration, top, top);
    }
    let winner = leaders[0];
    let runner_up = Intent::all()
        .iter()
        .filter(|i| **i != winner)
        .map(|i| scores[i.index()])
        .max()
        .unwrap_or(0);
    (winner, top, runner_up)
}

fn confidence(top: u32, runner_up: u32) -> u32 {
    if top == 0 {
        return 25;
    }
    let margin = top - runner_up;
    (30 + 12 * margin + 3 * top).min(100)
}

/// Phrases that pin down what a question expects back. "should" and
/// "return" are left out: "How should I ..." and "Why does it return ..."
/// are still open questions.
const ANSWER_SHAPE_MARKERS: &[&str] = &[
    "must", "needs to", "has to", "required", "requirement", "output", "respond with",
    "format", "as json", "as a table", "in markdown", "deliverable", "produce", "provide a",
];

fn characteristics(prompt: &str, lower: &str) -> Characteristics {
    let has_markers = text::contains_any(lower, ANSWER_SHAPE_MARKERS);
    let structured = text::has_heading(prompt)
        || text::list_item_count(prompt) > 0
        || !crate::sections::section_kinds(prompt).is_empty();

    Characteristics {
        has_code_context: text::has_code(prompt),
        has_technical_terms: text::contains_any(lower, text::TECH_TERMS)
            || text::contains_any(lower, text::TECH_STACK),
        is_open_ended: prompt.contains('?') && !has_markers,
        needs_structure: text::word_count(prompt) > NEEDS_STRUCTURE_WORD_THRESHOLD && !structured,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(p: &str) -> IntentResult {
        IntentDetector::new().analyze(p)
    }

    #[test]
    fn login_page_is_code_generation() {
        let r = analyze("Build a login page");
        assert_eq!(r.primary_intent, Intent::CodeGeneration);
        assert!(r.confidence >= DEEP_MODE_CONFIDENCE_THRESHOLD);
        assert_eq!(r.suggested_mode, Mode::Fast);
    }

    #[test]
    fn empty_prompt_defaults_to_code_generation() {
        let r = analyze("");
        assert_eq!(r.primary_intent, Intent::CodeGeneration);
        assert_eq!(r.confidence, 25);
        assert_eq!(r.suggested_mode, Mode::Deep);
        assert_eq!(r.characteristics, Characteristics::default());
    }

    #[test]
    fn crash_report_is_debugging() {
        let r = analyze("The app crashes with a null pointer exception when I click save");
        assert_eq!(r.primary_intent, Intent::Debugging);
    }

    #[test]
    fn phrases_outweigh_keywords() {
        // "build" alone leans code generation; the phrase tips it to planning.
        let r = analyze("What is the best way to build this? I want a plan before any code.");
        assert_eq!(r.primary_intent, Intent::Planning);
        assert_eq!(r.suggested_mode, Mode::Deep);
    }

    #[test]
    fn performance_vocabulary_pushes_refinement() {
        let r = analyze("This query is slow, reduce memory use and make it faster");
        assert_eq!(r.primary_intent, Intent::Refinement);
    }

    #[test]
    fn security_review_detected() {
        let r = analyze("Check this handler for SQL injection and XSS vulnerabilities");
        assert_eq!(r.primary_intent, Intent::SecurityReview);
    }

    #[test]
    fn summarization_detected() {
        let r = analyze("Summarize the key points of this design doc");
        assert_eq!(r.primary_intent, Intent::Summarization);
    }

    #[test]
    fn prd_detected() {
        let r = analyze("Draft a PRD with user stories for the billing MVP");
        assert_eq!(r.primary_intent, Intent::PrdGeneration);
        assert_eq!(r.suggested_mode, Mode::Deep);
    }

    #[test]
    fn tie_goes_to_code_generation() {
        // "docs" (documentation 3) vs "migrate" (migration 3).
        let r = analyze("docs migrate");
        assert_eq!(r.primary_intent, Intent::CodeGeneration);
    }

    #[test]
    fn confidence_is_bounded() {
        let long = "fix bug crash exception error broken debug traceback ".repeat(40);
        for p in ["", "?", "Build a login page", long.as_str(), "🚀🚀🚀"] {
            let r = analyze(p);
            assert!(r.confidence <= 100, "confidence {} for {p:?}", r.confidence);
            assert!(Intent::all().contains(&r.primary_intent));
        }
    }

    #[test]
    fn code_context_characteristic() {
        let r = analyze("Why does `parse()` panic here?");
        assert!(r.characteristics.has_code_context);
        assert!(r.characteristics.is_open_ended);
    }

    #[test]
    fn interrogative_should_and_return_stay_open_ended() {
        for p in [
            "How should I structure this service?",
            "What should we do about flaky tests?",
            "Why does it return null?",
        ] {
            assert!(analyze(p).characteristics.is_open_ended, "{p:?}");
        }
    }

    #[test]
    fn output_markers_close_an_open_question() {
        let r = analyze("What should the API return? Output as JSON.");
        assert!(!r.characteristics.is_open_ended);
    }

    #[test]
    fn long_unstructured_prompt_needs_structure() {
        let p = "we have a service that takes orders and it talks to the warehouse and sometimes \
                 the warehouse is down and then orders get lost and nobody notices until the \
                 customer calls support which is bad because support then has to look things up \
                 by hand in three different systems before they can answer anything at all";
        assert!(analyze(p).characteristics.needs_structure);

        let structured = format!("## Context\n{p}");
        assert!(!analyze(&structured).characteristics.needs_structure);
    }
}
