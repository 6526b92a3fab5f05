//! HTTP authentication utilities

use base64::Engine;

/// Authentication helper
pub struct Auth;

impl Auth {
    /// Create basic auth header value
    pub fn basic_auth(username: &str, password: &str) -> String {
        let credentials = format!("{}:{}", username, password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {}", encoded)
    }

    /// Parse user:password format. A missing password is empty.
    pub fn parse_user_pass(input: &str) -> (String, String) {
        match input.split_once(':') {
            Some((user, pass)) => (user.to_string(), pass.to_string()),
            None => (input.to_string(), String::new()),
        }
    }

    /// `Authorization` header value for a `user:password` string
    pub fn from_user_pass(input: &str) -> String {
        let (user, pass) = Self::parse_user_pass(input);
        Self::basic_auth(&user, &pass)
    }
}

#[cfg(test)]
mod tests {
    use super::Auth;

    #[test]
    fn basic_auth_encodes_credentials() {
        assert_eq!(Auth::basic_auth("user", "pass"), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn parse_user_pass_splits_on_first_colon() {
        assert_eq!(
            Auth::parse_user_pass("user:pa:ss"),
            ("user".to_string(), "pa:ss".to_string())
        );
        assert_eq!(
            Auth::parse_user_pass("user"),
            ("user".to_string(), String::new())
        );
        assert_eq!(Auth::from_user_pass("user:pass"), "Basic dXNlcjpwYXNz");
    }
}
