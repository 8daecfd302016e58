use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum CompressError {
    /// No `a11y.txt` for the requested sample
    SampleNotFound { domain: String, id: String, path: PathBuf },

    /// Reading a sample or writing an output failed
    Io { path: PathBuf, source: std::io::Error },

    /// Invalid command-line value
    Config(String),
}

impl fmt::Display for CompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressError::SampleNotFound { domain, id, path } => {
                write!(f, "Sample {}/{} not found at {}", domain, id, path.display())
            }
            CompressError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            CompressError::Config(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for CompressError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompressError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
