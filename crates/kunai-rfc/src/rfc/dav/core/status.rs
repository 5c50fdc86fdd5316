//! Status line parsing.

use std::sync::LazyLock;

use http::StatusCode;
use regex_lite::Regex;

static STATUS_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^HTTP/\S+ (\d+) ").ok());

/// Extracts the status code from an embedded status line such as
/// `HTTP/1.1 200 OK`.
///
/// Returns `None` for anything that does not match `HTTP/<version> <code> <reason>`,
/// including codes outside the valid HTTP range.
#[must_use]
pub fn parse_status_line(status: &str) -> Option<StatusCode> {
    let captures = STATUS_LINE.as_ref()?.captures(status.trim_start())?;
    let code = captures.get(1)?.as_str().parse::<u16>().ok()?;
    StatusCode::from_u16(code).ok()
}
