use std::fmt;
use std::path::PathBuf;

/// Errors surfaced by the demo binary.
#[derive(Debug)]
pub enum DemoError {
    Io { path: PathBuf, source: std::io::Error },
    Dashkit(dashkit::Error),
    /// The config file parsed but failed validation.
    InvalidConfig(Vec<String>),
    Logging(String),
}

impl DemoError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io { .. } => 2,
            Self::InvalidConfig(_) => 3,
            Self::Dashkit(_) => 4,
            Self::Logging(_) => 5,
        }
    }
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Dashkit(err) => write!(f, "{err}"),
            Self::InvalidConfig(problems) => write!(f, "invalid config: {}", problems.join("; ")),
            Self::Logging(msg) => write!(f, "logging setup failed: {msg}"),
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Dashkit(err) => Some(err),
            Self::InvalidConfig(_) | Self::Logging(_) => None,
        }
    }
}

impl From<dashkit::Error> for DemoError {
    fn from(err: dashkit::Error) -> Self {
        Self::Dashkit(err)
    }
}

impl From<dashkit::TreeError> for DemoError {
    fn from(err: dashkit::TreeError) -> Self {
        Self::Dashkit(err.into())
    }
}

impl From<dashkit::ConfigError> for DemoError {
    fn from(err: dashkit::ConfigError) -> Self {
        Self::Dashkit(err.into())
    }
}

pub type Result<T> = std::result::Result<T, DemoError>;
