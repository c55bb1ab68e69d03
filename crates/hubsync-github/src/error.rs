//! Error types for GitHub API operations.

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Errors raised while talking to the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The API answered 404 for the requested resource.
    #[error("not found: {method} {url}")]
    NotFound {
        /// Request method.
        method: Method,
        /// Request URL.
        url: String,
    },

    /// The API answered with a non-success status other than 404.
    #[error("{method} {url} failed with status {status}: {body}")]
    Status {
        /// Request method.
        method: Method,
        /// Request URL.
        url: String,
        /// Response status.
        status: StatusCode,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("network error for {method} {url}: {source}")]
    Network {
        /// Request method.
        method: Method,
        /// Request URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not match the expected JSON shape.
    #[error("invalid response for {method} {url}: {message}")]
    InvalidResponse {
        /// Request method.
        method: Method,
        /// Request URL.
        url: String,
        /// Deserialization failure.
        message: String,
    },

    /// An entity that should carry an API URL did not.
    #[error("{0} has no url")]
    MissingUrl(&'static str),

    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Blob content could not be decoded.
    #[error(transparent)]
    Blob(#[from] BlobError),
}

impl GitHubError {
    /// Returns true if the API reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while decoding blob content.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlobError {
    /// The blob declares an encoding other than `utf-8` or `base64`.
    #[error("'encoding' type '{0}' is not supported")]
    UnsupportedEncoding(String),

    /// The blob is declared base64 but its content is not.
    #[error("invalid base64 content: {0}")]
    InvalidBase64(String),

    /// The decoded bytes are not UTF-8 text.
    #[error("blob content is not valid UTF-8")]
    InvalidUtf8,
}

/// Result type for GitHub API operations.
pub type Result<T> = std::result::Result<T, GitHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_detectable() {
        let err = GitHubError::NotFound {
            method: Method::GET,
            url: "https://api.github.com/repos/o/r/git/refs/heads/main".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "not found: GET https://api.github.com/repos/o/r/git/refs/heads/main"
        );
    }

    #[test]
    fn unsupported_encoding_message_names_encoding() {
        let err = GitHubError::from(BlobError::UnsupportedEncoding("utf-16".to_string()));
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "'encoding' type 'utf-16' is not supported");
    }
}
