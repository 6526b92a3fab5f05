//! Utility functions and helpers

use crate::error::ValidationError;
use url::Url;

/// URL validation and parsing utilities
pub struct UrlUtils;

impl UrlUtils {
    /// Validate and normalize URL
    pub fn validate_url(input: &str) -> Result<Url, ValidationError> {
        // Add http:// if no scheme is provided
        let url_str = if input.contains("://") {
            input.to_string()
        } else {
            format!("http://{}", input)
        };

        Url::parse(&url_str).map_err(|e| ValidationError::InvalidUrl {
            url: input.to_string(),
            reason: e.to_string(),
        })
    }
}

/// String utilities
pub struct StringUtils;

impl StringUtils {
    /// Split a `name: value` header line on its first colon
    pub fn parse_header(input: &str) -> Result<(String, String), ValidationError> {
        let input = input.trim_end_matches(['\r', '\n']);
        match input.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(ValidationError::InvalidHeader(input.to_string())),
        }
    }

    /// Name part of a `name: value` header line, if any
    pub fn header_name(input: &str) -> Option<&str> {
        input.split_once(':').map(|(name, _)| name.trim())
    }
}
