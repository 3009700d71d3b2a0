use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Malformed mesh, material or database input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    pub message: String,
    pub line: Option<usize>,
    pub source_name: Option<String>,
}

impl FormatError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            source_name: None,
        }
    }

    pub fn at_line(message: impl Into<String>, line: usize) -> Self {
        Self {
            line: Some(line),
            ..Self::new(message)
        }
    }

    pub fn in_source(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source_name, self.line) {
            (Some(name), Some(line)) => write!(f, "{name}:{line}: {}", self.message),
            (Some(name), None) => write!(f, "{name}: {}", self.message),
            (None, Some(line)) => write!(f, "line {line}: {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for FormatError {}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Format(#[from] FormatError),

    #[error("read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("group {group:?} uses unknown material {material:?}")]
    UnresolvedMaterial { group: String, material: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Source line of a format error, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Format(err) => err.line,
            _ => None,
        }
    }
}
