use crate::error::{PromptkitError, Result};
use crate::intent::{IntentDetector, IntentResult};
use crate::library::PatternLibrary;
use crate::pattern::{Improvement, Pattern, PatternContext, PatternResult};
use crate::patterns::user_content;
use crate::quality::{QualityAssessor, QualityMetrics};
use crate::types::{Intent, Mode, Phase};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Below this overall score deep mode is worth recommending.
pub const DEEP_MODE_QUALITY_THRESHOLD: f64 = 65.0;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedImprovement {
    pub pattern_id: String,
    pub pattern_name: String,
    #[serde(flatten)]
    pub improvement: Improvement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub original: String,
    pub enhanced: String,
    pub mode: Mode,
    pub intent: IntentResult,
    /// Scored on `enhanced`.
    pub quality: QualityMetrics,
    pub improvements: Vec<AppliedImprovement>,
    pub processing_time_ms: f64,
}

impl OptimizationResult {
    pub fn applied_pattern_ids(&self) -> Vec<&str> {
        self.improvements
            .iter()
            .map(|i| i.pattern_id.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase: Phase,
    pub intent: Intent,
    pub enhanced: String,
    pub improvements: Vec<AppliedImprovement>,
}

// ---------------------------------------------------------------------------
// UniversalOptimizer
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct UniversalOptimizer {
    detector: IntentDetector,
    assessor: QualityAssessor,
    library: PatternLibrary,
}

impl UniversalOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_library(library: PatternLibrary) -> Self {
        Self {
            detector: IntentDetector::new(),
            assessor: QualityAssessor::new(),
            library,
        }
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Detect intent, fold the selected patterns over the prompt and score
    /// the result. Never fails: a broken pattern is logged and skipped.
    ///
    /// Intent is read from the request alone, so blocks appended by an
    /// earlier run do not change which patterns are selected.
    pub fn optimize(&self, prompt: &str, mode: Mode) -> OptimizationResult {
        let started = Instant::now();
        let intent = self.detector.analyze(&user_content(prompt));
        let ctx = PatternContext {
            mode,
            original_prompt: prompt,
            intent: &intent,
            phase: Phase::Optimize,
        };

        let (enhanced, improvements) = self.run(prompt, &ctx);
        let quality = self
            .assessor
            .assess_quality(&enhanced, intent.primary_intent);

        tracing::debug!(
            intent = %intent.primary_intent,
            mode = %mode,
            applied = improvements.len(),
            overall = quality.overall,
            "optimized prompt"
        );

        OptimizationResult {
            original: prompt.to_string(),
            enhanced,
            mode,
            intent,
            quality,
            improvements,
            processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        }
    }

    /// Run only the patterns registered for `phase`, in deep mode. `intent`
    /// overrides the detected primary intent when given.
    pub fn apply_phase(&self, text: &str, phase: Phase, intent: Option<Intent>) -> PhaseResult {
        let mut detected = self.detector.analyze(&user_content(text));
        if let Some(intent) = intent {
            detected.primary_intent = intent;
        }
        let ctx = PatternContext {
            mode: Mode::Deep,
            original_prompt: text,
            intent: &detected,
            phase,
        };

        let (enhanced, improvements) = self.run(text, &ctx);
        PhaseResult {
            phase,
            intent: detected.primary_intent,
            enhanced,
            improvements,
        }
    }

    fn run(&self, prompt: &str, ctx: &PatternContext) -> (String, Vec<AppliedImprovement>) {
        self.library.select_patterns(ctx).into_iter().fold(
            (prompt.to_string(), Vec::new()),
            |(current, mut improvements), pattern| match apply_isolated(pattern, &current, ctx) {
                Ok(result) if result.applied => {
                    tracing::debug!(
                        pattern = pattern.id(),
                        impact = %result.improvement.impact,
                        "pattern applied"
                    );
                    improvements.push(AppliedImprovement {
                        pattern_id: pattern.id().to_string(),
                        pattern_name: pattern.descriptor.name.to_string(),
                        improvement: result.improvement,
                    });
                    (result.enhanced_prompt, improvements)
                }
                Ok(_) => (current, improvements),
                Err(e) => {
                    tracing::warn!(pattern = pattern.id(), error = %e, "pattern failed, skipping");
                    (current, improvements)
                }
            },
        )
    }
}

fn apply_isolated(pattern: &Pattern, prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
    match panic::catch_unwind(AssertUnwindSafe(|| pattern.apply(prompt, ctx))) {
        Ok(result) => result,
        Err(payload) => Err(PromptkitError::PatternApplication {
            id: pattern.id().to_string(),
            reason: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// True for planning-like intents, low overall quality, or open-ended
/// prompts that also lack structure.
pub fn should_recommend_deep_mode(result: &OptimizationResult) -> bool {
    let c = &result.intent.characteristics;
    result.intent.primary_intent.is_planning_like()
        || result.quality.overall < DEEP_MODE_QUALITY_THRESHOLD
        || (c.is_open_ended && c.needs_structure)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
