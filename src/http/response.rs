//! HTTP response assembly

use std::collections::HashMap;

use crate::cookies::CookieJar;

/// Result of a completed request
#[derive(Debug, Clone)]
pub struct Response {
    pub status_code: u16,
    pub body: String,
    /// Response headers by name as received; the last duplicate wins
    pub headers: HashMap<String, String>,
    /// The client's jar, shared rather than copied
    pub cookies: CookieJar,
}

impl Response {
    /// Fold raw header lines into `jar` and build the response around it
    pub fn assemble(
        status_code: u16,
        header_lines: &[String],
        body: String,
        jar: &CookieJar,
    ) -> Self {
        jar.ingest_response_headers(header_lines);
        Response {
            status_code,
            body,
            headers: parse_header_lines(header_lines),
            cookies: jar.clone(),
        }
    }

    /// Look up a header by name, ignoring ASCII case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }
}

/// Parse raw header lines into a flat map. Lines without a name and a value
/// around the first colon are skipped.
pub fn parse_header_lines<S: AsRef<str>>(lines: &[S]) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for line in lines {
        let line = strip_line_break(line.as_ref());
        if line.is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some((name, value)) => {
                headers.insert(name.trim().to_string(), value.trim().to_string());
            }
            None => log::trace!("Skipping header line without a value: {}", line),
        }
    }
    headers
}

/// Remove the first run of one or two CR/LF characters
fn strip_line_break(line: &str) -> String {
    match line.find(['\r', '\n']) {
        Some(start) => {
            let run = line[start..]
                .chars()
                .take(2)
                .take_while(|c| *c == '\r' || *c == '\n')
                .count();
            format!("{}{}", &line[..start], &line[start + run..])
        }
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_header_lines, Response};
    use crate::cookies::CookieJar;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn parses_name_value_pairs() {
        let headers = parse_header_lines(&lines(&[
            "HTTP/1.1 200 Success\r\n",
            "X-Test-Success: true\r\n",
            "Location: http://localhost:3000/next\r\n",
            "\r\n",
        ]));
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-Test-Success").map(String::as_str), Some("true"));
        assert_eq!(
            headers.get("Location").map(String::as_str),
            Some("http://localhost:3000/next")
        );
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = Response::assemble(
            200,
            &lines(&["HTTP/1.1 200 OK", "x-test-success: true"]),
            String::new(),
            &CookieJar::new(),
        );
        assert_eq!(response.header("X-Test-Success"), Some("true"));
        assert_eq!(response.header("X-Missing"), None);
    }

    #[test]
    fn last_duplicate_wins() {
        let headers = parse_header_lines(&lines(&["Set-Cookie: a=1", "Set-Cookie: b=2"]));
        assert_eq!(headers.get("Set-Cookie").map(String::as_str), Some("b=2"));
    }

    #[test]
    fn skips_lines_without_colon() {
        let headers = parse_header_lines(&lines(&["garbage", "", "\r\n", " folded continuation"]));
        assert!(headers.is_empty());
    }

    #[test]
    fn assemble_feeds_jar_and_shares_it() {
        let jar = CookieJar::new();
        let response = Response::assemble(
            200,
            &lines(&[
                "HTTP/1.1 200 OK\r\n",
                "Set-Cookie: test=2; Domain=localhost\r\n",
                "X-Promise-Test: true\r\n",
            ]),
            "success".to_string(),
            &jar,
        );

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "success");
        assert_eq!(response.header("X-Promise-Test"), Some("true"));
        assert_eq!(response.header("x-promise-test"), Some("true"));
        assert!(response.cookies.ptr_eq(&jar));
        assert_eq!(jar.get("test").expect("cookie").value, "2");
    }
}
