use crate::config::Config;
use crate::error::{PromptkitError, Result};
use crate::pattern::{Pattern, PatternContext};
use crate::patterns::default_patterns;
use std::collections::HashSet;

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 10;

// ---------------------------------------------------------------------------
// PatternLibrary
// ---------------------------------------------------------------------------

/// The immutable pattern registry. Built once, then only queried.
#[derive(Debug)]
pub struct PatternLibrary {
    patterns: Vec<Pattern>,
}

impl PatternLibrary {
    /// Validate and take ownership of `patterns`. Ids must be unique and
    /// priorities within 1–10.
    pub fn new(patterns: Vec<Pattern>) -> Result<Self> {
        let mut seen = HashSet::new();
        for p in &patterns {
            if !seen.insert(p.id()) {
                return Err(PromptkitError::DuplicatePattern(p.id().to_string()));
            }
            if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&p.priority()) {
                return Err(PromptkitError::InvalidPriority {
                    id: p.id().to_string(),
                    priority: p.priority(),
                });
            }
        }
        Ok(Self { patterns })
    }

    /// The built-in registry. Its validity is covered by tests.
    pub fn with_default_patterns() -> Self {
        Self {
            patterns: default_patterns(),
        }
    }

    /// Built-in registry minus the ids disabled in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::with_default_patterns().without(&config.patterns.disabled)
    }

    /// Drop the patterns whose ids appear in `ids`. Unknown ids are ignored;
    /// `Config::validate` reports them.
    pub fn without(mut self, ids: &[String]) -> Self {
        self.patterns.retain(|p| !ids.iter().any(|id| id == p.id()));
        self
    }

    /// Applicable patterns for `ctx`, highest priority first. The sort is
    /// stable, so equal priorities keep registration order.
    pub fn select_patterns(&self, ctx: &PatternContext) -> Vec<&Pattern> {
        let mut selected: Vec<&Pattern> = self
            .patterns
            .iter()
            .filter(|p| p.is_applicable(ctx))
            .collect();
        selected.sort_by(|a, b| b.priority().cmp(&a.priority()));

        tracing::debug!(
            intent = %ctx.primary_intent(),
            mode = %ctx.mode,
            phase = %ctx.phase,
            selected = selected.len(),
            registered = self.patterns.len(),
            "selected patterns"
        );
        selected
    }

    pub fn get(&self, id: &str) -> Result<&Pattern> {
        self.patterns
            .iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| PromptkitError::PatternNotFound(id.to_string()))
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::with_default_patterns()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{Characteristics, IntentResult};
    use crate::pattern::PatternResult;
    use crate::types::{Dimension, Intent, Mode, PatternMode, Phase};

    fn noop(prompt: &str, _ctx: &PatternContext) -> Result<PatternResult> {
        Ok(PatternResult::skipped(prompt, Dimension::Clarity, "noop"))
    }

    fn intent(i: Intent) -> IntentResult {
        IntentResult {
            primary_intent: i,
            confidence: 90,
            characteristics: Characteristics::default(),
            suggested_mode: Mode::Fast,
        }
    }

    fn ctx<'a>(mode: Mode, phase: Phase, intent: &'a IntentResult) -> PatternContext<'a> {
        PatternContext {
            mode,
            original_prompt: "",
            intent,
            phase,
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let a = crate::pattern! {
            id: "dup", name: "A", description: "", intents: Intent::all(),
            mode: PatternMode::Both, priority: 5, apply: noop,
        };
        let b = crate::pattern! {
            id: "dup", name: "B", description: "", intents: Intent::all(),
            mode: PatternMode::Both, priority: 4, apply: noop,
        };
        let err = PatternLibrary::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, PromptkitError::DuplicatePattern(id) if id == "dup"));
    }

    #[test]
    fn out_of_range_priority_is_rejected() {
        for priority in [0, 11] {
            let p = crate::pattern! {
                id: "bad", name: "Bad", description: "", intents: Intent::all(),
                mode: PatternMode::Both, priority: priority, apply: noop,
            };
            let err = PatternLibrary::new(vec![p]).unwrap_err();
            assert!(matches!(err, PromptkitError::InvalidPriority { .. }));
        }
    }

    #[test]
    fn selection_orders_by_priority_then_registration() {
        let lib = PatternLibrary::with_default_patterns();
        let coding = intent(Intent::CodeGeneration);
        let selected = lib.select_patterns(&ctx(Mode::Deep, Phase::Optimize, &coding));

        let priorities: Vec<u8> = selected.iter().map(|p| p.priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted);

        let ids: Vec<&str> = selected.iter().map(|p| p.id()).collect();
        let pos = |id: &str| ids.iter().position(|i| *i == id).unwrap();
        assert!(pos("ambiguity-detector") < pos("objective-clarifier"));
        assert!(pos("structure-organizer") < pos("topic-coherence-analyzer"));
        assert!(pos("technical-context-enricher") < pos("constraint-identifier"));
        assert_eq!(ids.last(), Some(&"success-criteria-enforcer"));
    }

    #[test]
    fn selection_is_deterministic() {
        let lib = PatternLibrary::with_default_patterns();
        let planning = intent(Intent::Planning);
        let c = ctx(Mode::Deep, Phase::Optimize, &planning);
        let first: Vec<&str> = lib.select_patterns(&c).iter().map(|p| p.id()).collect();
        for _ in 0..5 {
            let again: Vec<&str> = lib.select_patterns(&c).iter().map(|p| p.id()).collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn fast_mode_never_selects_deep_patterns() {
        let lib = PatternLibrary::with_default_patterns();
        for i in Intent::all() {
            let ir = intent(*i);
            for p in lib.select_patterns(&ctx(Mode::Fast, Phase::Optimize, &ir)) {
                assert_ne!(p.descriptor.mode, PatternMode::Deep, "{} in fast mode", p.id());
            }
        }
    }

    #[test]
    fn phase_gates_selection() {
        let lib = PatternLibrary::with_default_patterns();
        let prd = intent(Intent::PrdGeneration);
        let ids: Vec<&str> = lib
            .select_patterns(&ctx(Mode::Deep, Phase::OutputGeneration, &prd))
            .iter()
            .map(|p| p.id())
            .collect();
        assert_eq!(
            ids,
            vec![
                "output-format-enforcer",
                "prd-structure-enforcer",
                "success-criteria-enforcer"
            ]
        );

        let docs = intent(Intent::Documentation);
        let ids: Vec<&str> = lib
            .select_patterns(&ctx(Mode::Deep, Phase::QuestionValidation, &docs))
            .iter()
            .map(|p| p.id())
            .collect();
        assert_eq!(ids, vec!["ambiguity-detector", "audience-definer"]);
    }

    #[test]
    fn without_removes_disabled_ids() {
        let lib = PatternLibrary::with_default_patterns()
            .without(&["alternative-approaches".to_string(), "nope".to_string()]);
        assert_eq!(lib.len(), 18);
        assert!(lib.get("alternative-approaches").is_err());
        assert!(lib.get("scope-definer").is_ok());
    }
}
