// src/core/errors.rs

use thiserror::Error;

use crate::core::models::Tool;

/// Every failure a scan can report back to the caller.
///
/// The `Display` output of each variant is exactly the string placed in the
/// `error` field of the JSON response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A required request field is absent or malformed.
    #[error("{0}")]
    Validation(String),

    /// The external tool did not finish within its budget and was killed.
    #[error("{tool} scan timed out")]
    ToolTimeout { tool: Tool },

    /// The external tool exited abnormally without producing any usable output.
    #[error("{message}")]
    ToolFailure { tool: Tool, message: String },

    #[error("Wordlist not found: {0}")]
    WordlistNotFound(String),

    /// A DNS or HTTP exchange could not complete.
    #[error("{0}")]
    Network(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ScanError {
    /// Builds the validation error for an absent request field.
    pub fn missing(field: &str) -> Self {
        ScanError::Validation(format!("Missing {field}"))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ScanError::Validation(_))
    }

    /// The external tool involved, if the failure came from one.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            ScanError::ToolTimeout { tool } | ScanError::ToolFailure { tool, .. } => Some(*tool),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_response_bodies() {
        assert_eq!(ScanError::missing("domain").to_string(), "Missing domain");
        assert_eq!(
            ScanError::ToolTimeout { tool: Tool::Nmap }.to_string(),
            "Nmap scan timed out"
        );
        assert_eq!(
            ScanError::ToolTimeout { tool: Tool::Ffuf }.to_string(),
            "FFUF scan timed out"
        );
        assert_eq!(
            ScanError::WordlistNotFound("/nope.txt".to_string()).to_string(),
            "Wordlist not found: /nope.txt"
        );
        assert_eq!(
            ScanError::Unexpected("No such file or directory".to_string()).to_string(),
            "Unexpected error: No such file or directory"
        );
    }

    #[test]
    fn only_validation_errors_are_flagged() {
        assert!(ScanError::missing("wordlist").is_validation());
        assert!(!ScanError::Network("refused".to_string()).is_validation());
    }

    #[test]
    fn tool_is_known_for_tool_errors_only() {
        assert_eq!(ScanError::ToolTimeout { tool: Tool::Hakrawler }.tool(), Some(Tool::Hakrawler));
        assert_eq!(ScanError::WordlistNotFound("x".to_string()).tool(), None);
    }
}
