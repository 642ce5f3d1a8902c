use thiserror::Error;

/// Errors the runner itself can raise. Failures inside a unit's action are
/// never reported through this type; they become `Failed` outcomes.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid test unit at position {index}: {reason}")]
    Configuration { index: usize, reason: String },
}

/// Errors raised while building the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid command line: {0}")]
    Args(#[from] getopts::Fail),

    #[error("invalid value '{value}' for option '{option}'")]
    InvalidValue { option: String, value: String },

    #[error("unknown suite '{0}', expected one of: all, positive, negative")]
    UnknownSuite(String),

    #[error("invalid filter pattern: {0}")]
    Filter(#[from] regex::Error),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
