use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    CodeGeneration,
    Planning,
    Refinement,
    Debugging,
    Documentation,
    Testing,
    Migration,
    PrdGeneration,
    Summarization,
    Learning,
    SecurityReview,
}

impl Intent {
    pub fn all() -> &'static [Intent] {
        &[
            Intent::CodeGeneration,
            Intent::Planning,
            Intent::Refinement,
            Intent::Debugging,
            Intent::Documentation,
            Intent::Testing,
            Intent::Migration,
            Intent::PrdGeneration,
            Intent::Summarization,
            Intent::Learning,
            Intent::SecurityReview,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::CodeGeneration => "code-generation",
            Intent::Planning => "planning",
            Intent::Refinement => "refinement",
            Intent::Debugging => "debugging",
            Intent::Documentation => "documentation",
            Intent::Testing => "testing",
            Intent::Migration => "migration",
            Intent::PrdGeneration => "prd-generation",
            Intent::Summarization => "summarization",
            Intent::Learning => "learning",
            Intent::SecurityReview => "security-review",
        }
    }

    /// Intents whose prompts benefit from the deep pattern set regardless of
    /// how confident the detector is.
    pub fn is_planning_like(self) -> bool {
        matches!(self, Intent::Planning | Intent::PrdGeneration)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = crate::error::PromptkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code-generation" | "code_generation" => Ok(Intent::CodeGeneration),
            "planning" => Ok(Intent::Planning),
            "refinement" => Ok(Intent::Refinement),
            "debugging" => Ok(Intent::Debugging),
            "documentation" => Ok(Intent::Documentation),
            "testing" => Ok(Intent::Testing),
            "migration" => Ok(Intent::Migration),
            "prd-generation" | "prd_generation" => Ok(Intent::PrdGeneration),
            "summarization" => Ok(Intent::Summarization),
            "learning" => Ok(Intent::Learning),
            "security-review" | "security_review" => Ok(Intent::SecurityReview),
            _ => Err(crate::error::PromptkitError::InvalidIntent(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Fast,
    Deep,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Fast => "fast",
            Mode::Deep => "deep",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = crate::error::PromptkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(Mode::Fast),
            "deep" => Ok(Mode::Deep),
            _ => Err(crate::error::PromptkitError::InvalidMode(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// PatternMode
// ---------------------------------------------------------------------------

/// Which optimization modes a pattern participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternMode {
    Fast,
    Deep,
    Both,
}

impl PatternMode {
    pub fn allows(self, mode: Mode) -> bool {
        match self {
            PatternMode::Both => true,
            PatternMode::Fast => mode == Mode::Fast,
            PatternMode::Deep => mode == Mode::Deep,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PatternMode::Fast => "fast",
            PatternMode::Deep => "deep",
            PatternMode::Both => "both",
        }
    }
}

impl fmt::Display for PatternMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PatternMode {
    type Err = crate::error::PromptkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(PatternMode::Fast),
            "deep" => Ok(PatternMode::Deep),
            "both" => Ok(PatternMode::Both),
            _ => Err(crate::error::PromptkitError::InvalidPatternMode(
                s.to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Pipeline stage a pattern may run in. The fast/deep flow always runs in
/// `Optimize`; document assembly drives the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Optimize,
    QuestionValidation,
    OutputGeneration,
}

impl Phase {
    pub fn all() -> &'static [Phase] {
        &[
            Phase::Optimize,
            Phase::QuestionValidation,
            Phase::OutputGeneration,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Optimize => "optimize",
            Phase::QuestionValidation => "question-validation",
            Phase::OutputGeneration => "output-generation",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = crate::error::PromptkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "optimize" => Ok(Phase::Optimize),
            "question-validation" | "question_validation" => Ok(Phase::QuestionValidation),
            "output-generation" | "output_generation" => Ok(Phase::OutputGeneration),
            _ => Err(crate::error::PromptkitError::InvalidPhase(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Dimension / Impact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Clarity,
    Efficiency,
    Structure,
    Completeness,
    Actionability,
}

impl Dimension {
    pub fn all() -> &'static [Dimension] {
        &[
            Dimension::Clarity,
            Dimension::Efficiency,
            Dimension::Structure,
            Dimension::Completeness,
            Dimension::Actionability,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Clarity => "clarity",
            Dimension::Efficiency => "efficiency",
            Dimension::Structure => "structure",
            Dimension::Completeness => "completeness",
            Dimension::Actionability => "actionability",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    pub fn as_str(self) -> &'static str {
        match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_str_roundtrip() {
        for &intent in Intent::all() {
            let parsed: Intent = intent.as_str().parse().unwrap();
            assert_eq!(parsed, intent);
        }
    }

    #[test]
    fn intent_serializes_kebab_case() {
        let json = serde_json::to_string(&Intent::PrdGeneration).unwrap();
        assert_eq!(json, "\"prd-generation\"");
        let json = serde_json::to_string(&Intent::SecurityReview).unwrap();
        assert_eq!(json, "\"security-review\"");
    }

    #[test]
    fn unknown_intent_is_an_error() {
        assert!("poetry".parse::<Intent>().is_err());
    }

    #[test]
    fn pattern_mode_gating() {
        assert!(PatternMode::Both.allows(Mode::Fast));
        assert!(PatternMode::Both.allows(Mode::Deep));
        assert!(!PatternMode::Deep.allows(Mode::Fast));
        assert!(!PatternMode::Fast.allows(Mode::Deep));
    }

    #[test]
    fn phase_parses_both_spellings() {
        assert_eq!(
            "output-generation".parse::<Phase>().unwrap(),
            Phase::OutputGeneration
        );
        assert_eq!(
            "question_validation".parse::<Phase>().unwrap(),
            Phase::QuestionValidation
        );
        assert!("review".parse::<Phase>().is_err());
    }

    #[test]
    fn mode_defaults_to_fast() {
        assert_eq!(Mode::default(), Mode::Fast);
        assert!("turbo".parse::<Mode>().is_err());
    }
}
