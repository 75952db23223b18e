pub mod config;
pub mod error;
pub mod intent;
pub mod io;
pub mod library;
pub mod optimizer;
pub mod pattern;
pub mod patterns;
pub mod paths;
pub mod quality;
pub mod sections;
pub mod text;
pub mod types;

pub use error::{PromptkitError, Result};
pub use intent::{IntentDetector, IntentResult};
pub use library::PatternLibrary;
pub use optimizer::{
    should_recommend_deep_mode, AppliedImprovement, OptimizationResult, PhaseResult,
    UniversalOptimizer,
};
pub use quality::{QualityAssessor, QualityMetrics};
pub use types::{Dimension, Impact, Intent, Mode, PatternMode, Phase};
