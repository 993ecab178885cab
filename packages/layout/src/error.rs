use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Malformed layout JSON at {line}:{column}: {message}")]
    Malformed {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unsupported layout document: expected a section array or an object with `sections`, found {found}")]
    UnsupportedShape { found: String },

    #[error("Invalid {node} at index {index}: {message}")]
    InvalidNode {
        node: &'static str,
        index: usize,
        message: String,
    },

    #[error("Failed to encode layout: {0}")]
    Encode(String),
}

impl ParseError {
    pub fn unsupported_shape(found: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            found: found.into(),
        }
    }

    pub fn invalid_node(node: &'static str, index: usize, message: impl Into<String>) -> Self {
        Self::InvalidNode {
            node,
            index,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            return ParseError::Encode(e.to_string());
        }
        ParseError::Malformed {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        }
    }
}

/// Errors raised while normalizing a style description
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    #[error("Style description must be an object, found {0}")]
    NotAnObject(String),

    #[error("Invalid value for style field `{field}`: {message}")]
    InvalidField { field: String, message: String },
}
