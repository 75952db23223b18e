use crate::error::Result;
use crate::intent::IntentResult;
use crate::types::{Dimension, Impact, Intent, Mode, PatternMode, Phase};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PatternContext
// ---------------------------------------------------------------------------

pub struct PatternContext<'a> {
    pub mode: Mode,
    pub original_prompt: &'a str,
    pub intent: &'a IntentResult,
    pub phase: Phase,
}

impl PatternContext<'_> {
    pub fn primary_intent(&self) -> Intent {
        self.intent.primary_intent
    }
}

// ---------------------------------------------------------------------------
// PatternResult (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Improvement {
    pub dimension: Dimension,
    pub description: String,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternResult {
    pub enhanced_prompt: String,
    pub improvement: Improvement,
    pub applied: bool,
}

impl PatternResult {
    pub fn applied(
        enhanced_prompt: String,
        dimension: Dimension,
        impact: Impact,
        description: impl Into<String>,
    ) -> Self {
        Self {
            enhanced_prompt,
            improvement: Improvement {
                dimension,
                description: description.into(),
                impact,
            },
            applied: true,
        }
    }

    /// Precondition not met: echo the input untouched.
    pub fn skipped(prompt: &str, dimension: Dimension, description: impl Into<String>) -> Self {
        Self {
            enhanced_prompt: prompt.to_string(),
            improvement: Improvement {
                dimension,
                description: description.into(),
                impact: Impact::Low,
            },
            applied: false,
        }
    }
}

// ---------------------------------------------------------------------------
// PatternDescriptor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub applicable_intents: &'static [Intent],
    pub mode: PatternMode,
    /// 1–10, higher runs first.
    pub priority: u8,
    pub phases: &'static [Phase],
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

pub type ApplyFn = fn(&str, &PatternContext) -> Result<PatternResult>;

/// A fn-pointer pattern: static metadata plus a pure rewrite function.
pub struct Pattern {
    pub descriptor: PatternDescriptor,
    apply: ApplyFn,
}

impl Pattern {
    pub const fn new(descriptor: PatternDescriptor, apply: ApplyFn) -> Self {
        Self { descriptor, apply }
    }

    pub fn id(&self) -> &'static str {
        self.descriptor.id
    }

    pub fn priority(&self) -> u8 {
        self.descriptor.priority
    }

    pub fn is_applicable(&self, ctx: &PatternContext) -> bool {
        let d = &self.descriptor;
        d.mode.allows(ctx.mode)
            && d.phases.contains(&ctx.phase)
            && d.applicable_intents.contains(&ctx.primary_intent())
    }

    pub fn apply(&self, prompt: &str, ctx: &PatternContext) -> Result<PatternResult> {
        (self.apply)(prompt, ctx)
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Registration macro
// ---------------------------------------------------------------------------

/// Build a [`Pattern`]. `phases` defaults to the optimize flow only.
#[macro_export]
macro_rules! pattern {
    (
        id: $id:expr,
        name: $name:expr,
        description: $desc:expr,
        intents: $intents:expr,
        mode: $mode:expr,
        priority: $prio:expr,
        $(phases: $phases:expr,)?
        apply: $apply:expr $(,)?
    ) => {
        $crate::pattern::Pattern::new(
            $crate::pattern::PatternDescriptor {
                id: $id,
                name: $name,
                description: $desc,
                applicable_intents: $intents,
                mode: $mode,
                priority: $prio,
                phases: {
                    #[allow(unused_assignments, unused_mut)]
                    let mut v: &'static [$crate::types::Phase] =
                        &[$crate::types::Phase::Optimize];
                    $(v = $phases;)?
                    v
                },
            },
            $apply,
        )
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
