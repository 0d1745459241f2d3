use chrono::{DateTime, SecondsFormat, Utc};

/// Opening marker of the hidden metadata footer.
pub const FOOTER_OPEN: &str = "<!--";
const FOOTER_CLOSE: &str = "-->";

/// How the footer is separated from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterLayout {
    /// Footer on the next line.
    Inline,
    /// Footer after a blank line.
    Spaced,
}

impl FooterLayout {
    fn separator(self) -> &'static str {
        match self {
            Self::Inline => "\n",
            Self::Spaced => "\n\n",
        }
    }
}

/// Where a comment's payload came from.
///
/// Each source owns its timestamp key and footer layout, so comments posted
/// by either pipeline keep the shape they have always had.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    QuickNote,
    Garmin,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuickNote => "quick-note",
            Self::Garmin => "garmin",
        }
    }

    pub fn timestamp_key(&self) -> &'static str {
        match self {
            Self::QuickNote => "posted-at",
            Self::Garmin => "fetched-at",
        }
    }

    pub fn layout(&self) -> FooterLayout {
        match self {
            Self::QuickNote => FooterLayout::Spaced,
            Self::Garmin => FooterLayout::Inline,
        }
    }
}

/// Ordered footer entries.
///
/// `data-source` always comes first, followed by the source's timestamp key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new(source: DataSource, at: DateTime<Utc>) -> Self {
        Self {
            entries: vec![
                ("data-source".to_string(), source.as_str().to_string()),
                (source.timestamp_key().to_string(), format_timestamp(at)),
            ],
        }
    }

    /// Set `key`, replacing an existing value in place or appending a new entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The footer as it appears in a comment: `<!-- k: v, k: v -->`.
    pub fn render(&self) -> String {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        format!("{} {} {}", FOOTER_OPEN, parts.join(", "), FOOTER_CLOSE)
    }
}

/// ISO-8601 UTC with second precision and a literal `Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Attach a footer to a payload.
pub fn compose(payload: &str, metadata: &Metadata, layout: FooterLayout) -> String {
    format!("{}{}{}", payload, layout.separator(), metadata.render())
}

/// Compose with the default metadata and layout of `source`.
pub fn compose_for(payload: &str, source: DataSource, at: DateTime<Utc>) -> String {
    compose(payload, &Metadata::new(source, at), source.layout())
}

/// Strip the footer from a comment body.
///
/// Returns the text before the first `<!--` with trailing whitespace removed.
/// A body without the marker is returned unchanged.
pub fn extract_payload(body: &str) -> &str {
    match body.find(FOOTER_OPEN) {
        Some(idx) => body[..idx].trim_end(),
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn metadata_override_keeps_position() {
        let at = Utc.with_ymd_and_hms(2026, 1, 8, 12, 34, 56).unwrap();
        let meta = Metadata::new(DataSource::Garmin, at)
            .with("data-source", "manual")
            .with("issue", "7");
        assert_eq!(
            meta.render(),
            "<!-- data-source: manual, fetched-at: 2026-01-08T12:34:56Z, issue: 7 -->"
        );
    }

    #[test]
    fn extract_without_marker_is_identity() {
        assert_eq!(extract_payload("plain text  \n"), "plain text  \n");
    }
}
