use chrono::NaiveDate;

use crate::composer::extract_payload;

/// How many of an issue's most recent comments are checked for duplicates.
pub const LOOKBACK: usize = 10;

/// Length of a leading `YYYY-MM-DD:` token.
const DATE_TOKEN_LEN: usize = 11;

/// Duplicate-check policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// A comment's payload must equal the candidate exactly, case-sensitive.
    Exact,
    /// Any comment mentioning the candidate's leading date token counts,
    /// whatever times it carries.
    SameDate,
}

/// Is `candidate` already present in `comments`?
///
/// `comments` is the window of recent comment bodies, footers included, in
/// whatever order the tracker returned them.
pub fn is_duplicate<S: AsRef<str>>(candidate: &str, comments: &[S], mode: MatchMode) -> bool {
    match mode {
        MatchMode::Exact => comments
            .iter()
            .any(|body| extract_payload(body.as_ref()) == candidate),
        MatchMode::SameDate => match date_token(candidate) {
            Some(token) => comments.iter().any(|body| body.as_ref().contains(token)),
            None => false,
        },
    }
}

/// The leading `YYYY-MM-DD:` of a payload, if it starts with a valid date.
pub fn date_token(payload: &str) -> Option<&str> {
    let token = payload.get(..DATE_TOKEN_LEN)?;
    let bytes = token.as_bytes();
    let shaped = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        10 => *b == b':',
        _ => b.is_ascii_digit(),
    });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(&token[..10], "%Y-%m-%d")
        .ok()
        .map(|_| token)
}
