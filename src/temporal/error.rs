use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of an engine error, mirroring the script-visible error
/// constructors a conformance test asserts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "RangeError")]
    Range,
    #[serde(rename = "TypeError")]
    Type,
    #[serde(rename = "ReferenceError")]
    Reference,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Range => "RangeError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Reference => "ReferenceError",
        }
    }

    /// Looks up a kind by its constructor name, e.g. `RangeError`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "RangeError" => Some(ErrorKind::Range),
            "TypeError" => Some(ErrorKind::Type),
            "ReferenceError" => Some(ErrorKind::Reference),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error thrown by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct EngineError {
    pub kind: ErrorKind,
    pub message: String,
}

impl EngineError {
    pub fn range(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Range,
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Type,
            message: message.into(),
        }
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Reference,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in [ErrorKind::Range, ErrorKind::Type, ErrorKind::Reference] {
            assert_eq!(ErrorKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(ErrorKind::from_name("SyntaxError"), None);
    }

    #[test]
    fn display_includes_kind() {
        let err = EngineError::range("offset out of range");
        assert_eq!(err.to_string(), "RangeError: offset out of range");
    }
}
