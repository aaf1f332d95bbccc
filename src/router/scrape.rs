//! Token scraping for the router's admin pages
//!
//! The firmware hands out two one-shot values that every apply request must echo back:
//! the page token (`pi`) lives in a `<meta>` tag of the status page and the parameter
//! token (`cgi`) sits between commas in a small generated script. Both formats are
//! brittle; all knowledge of them is kept here.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Which token failed to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Page,
    Parameter,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Page => write!(f, "page token (pi)"),
            TokenKind::Parameter => write!(f, "parameter token (cgi)"),
        }
    }
}

fn page_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<meta name="pi" content="([^"]*)">"#).expect("valid page token regex")
    })
}

fn parameter_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Greedy: first comma to last comma on the line
    PATTERN.get_or_init(|| Regex::new(r",(.*),").expect("valid parameter token regex"))
}

fn capture(pattern: &Regex, body: &str, kind: TokenKind) -> Result<String, TokenKind> {
    pattern
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(kind)
}

/// Extract the `pi` value from a status page
pub fn extract_page_token(body: &str) -> Result<String, TokenKind> {
    capture(page_token_pattern(), body, TokenKind::Page)
}

/// Extract the `cgi` parameter name from a `cgi_*.js` script
pub fn extract_parameter_token(body: &str) -> Result<String, TokenKind> {
    capture(parameter_token_pattern(), body, TokenKind::Parameter)
}
