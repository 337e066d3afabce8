//! Error types for identity provider calls

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// A single structured error returned by the identity provider.
///
/// Codes are provider-defined strings (e.g. `form_code_incorrect`). Callers
/// display them verbatim and never branch on them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// The provider's error envelope. Every failed call carries a list of
/// errors ordered by relevance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorList {
    pub errors: Vec<ProviderError>,
}

impl ErrorList {
    /// The error to surface to users. The provider puts the most relevant
    /// error first; an empty list degrades to a generic placeholder.
    pub fn primary(&self) -> ProviderError {
        self.errors.first().cloned().unwrap_or_else(|| ProviderError {
            code: "unknown_error".to_string(),
            message: "The provider returned an error without details".to_string(),
        })
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primary())
    }
}

/// Error type for identity provider operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider rejected the request: {0}")]
    Provider(ErrorList),

    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response from provider (status {0})")]
    Unexpected(reqwest::StatusCode),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_list_decodes_provider_envelope() {
        let body = r#"{"errors":[{"code":"form_code_incorrect","message":"Incorrect code","meta":{}}]}"#;
        let list: ErrorList = serde_json::from_str(body).unwrap();
        assert_eq!(list.errors.len(), 1);
        assert_eq!(list.primary().code, "form_code_incorrect");
        assert_eq!(list.primary().message, "Incorrect code");
    }

    #[test]
    fn empty_error_list_degrades_to_placeholder() {
        let list = ErrorList::default();
        assert_eq!(list.primary().code, "unknown_error");
    }

    #[test]
    fn primary_is_the_first_error() {
        let body = r#"{"errors":[
            {"code":"form_param_invalid","message":"Invalid phone number"},
            {"code":"form_param_missing","message":"Missing parameter"}
        ]}"#;
        let list: ErrorList = serde_json::from_str(body).unwrap();
        assert_eq!(list.primary().code, "form_param_invalid");
    }
}
