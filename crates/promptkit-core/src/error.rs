use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptkitError {
    #[error("pattern '{id}' failed: {reason}")]
    PatternApplication { id: String, reason: String },

    #[error("pattern not found: {0}")]
    PatternNotFound(String),

    #[error("duplicate pattern id: {0}")]
    DuplicatePattern(String),

    #[error("pattern '{id}' has priority {priority}: must be between 1 and 10")]
    InvalidPriority { id: String, priority: u8 },

    #[error("invalid intent: {0}")]
    InvalidIntent(String),

    #[error("invalid mode '{0}': expected fast or deep")]
    InvalidMode(String),

    #[error("invalid pattern mode '{0}': expected fast, deep or both")]
    InvalidPatternMode(String),

    #[error("invalid phase: {0}")]
    InvalidPhase(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, PromptkitError>;
