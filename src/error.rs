use std::error::Error;
use std::fmt;

/// Error type for sprinkler engine operations
#[derive(Debug)]
pub enum SprinklerError {
    /// Missing, zero, negative or otherwise unusable configuration value
    Config(String),
    /// Obstacle mesh that cannot be used at all (empty, non-finite vertices)
    Mesh(String),
    /// Malformed JSON input
    Parse(String),
    /// Reading a configuration or mesh file failed
    Io(String),
    /// Trajectory request that cannot be evaluated (e.g. NaN angles)
    Trajectory(String),
}

impl SprinklerError {
    pub fn config(msg: impl Into<String>) -> Self {
        SprinklerError::Config(msg.into())
    }

    pub fn mesh(msg: impl Into<String>) -> Self {
        SprinklerError::Mesh(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SprinklerError::Config(_) => "configuration",
            SprinklerError::Mesh(_) => "mesh",
            SprinklerError::Parse(_) => "parse",
            SprinklerError::Io(_) => "io",
            SprinklerError::Trajectory(_) => "trajectory",
        }
    }
}

impl fmt::Display for SprinklerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SprinklerError::Config(msg) => write!(f, "configuration error: {}", msg),
            SprinklerError::Mesh(msg) => write!(f, "mesh error: {}", msg),
            SprinklerError::Parse(msg) => write!(f, "parse error: {}", msg),
            SprinklerError::Io(msg) => write!(f, "io error: {}", msg),
            SprinklerError::Trajectory(msg) => write!(f, "trajectory error: {}", msg),
        }
    }
}

impl Error for SprinklerError {}

impl From<String> for SprinklerError {
    fn from(msg: String) -> Self {
        SprinklerError::Config(msg)
    }
}

impl From<&str> for SprinklerError {
    fn from(msg: &str) -> Self {
        SprinklerError::Config(msg.to_string())
    }
}

impl From<serde_json::Error> for SprinklerError {
    fn from(err: serde_json::Error) -> Self {
        SprinklerError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for SprinklerError {
    fn from(err: std::io::Error) -> Self {
        SprinklerError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SprinklerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_kind() {
        let err = SprinklerError::config("lawn.width must be positive");
        assert_eq!(err.to_string(), "configuration error: lawn.width must be positive");
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_from_str_is_config_error() {
        let err: SprinklerError = "bad".into();
        assert!(matches!(err, SprinklerError::Config(_)));
    }

    #[test]
    fn test_from_serde_error_is_parse_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: SprinklerError = err.into();
        assert_eq!(err.kind(), "parse");
    }
}
