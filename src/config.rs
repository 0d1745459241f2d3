//! Configuration loaded from environment variables.
//!
//! Everything is read once in `main` and handed to client constructors; no
//! other module touches the environment.
//!
//! - `GITHUB_TOKEN` - GitHub token (required)
//! - `GITHUB_API_URL` - API base URL (default: `https://api.github.com`)
//! - `GARMIN_ACCESS_TOKEN` - Garmin Connect OAuth2 access token (required for `sync`)
//! - `GARMIN_DOMAIN` - `garmin.cn` (default) or `garmin.com`
//! - `GARMIN_API_URL` - overrides the URL derived from `GARMIN_DOMAIN`
//! - `GARMIN_SSL_VERIFY` - set to `false` to skip certificate checks
//! - `CHILD_BIRTHDAY` - ISO date used by `note --child` (default: `2025-05-10`)

use chrono::NaiveDate;

use crate::error::Error;

/// Default URL for the public GitHub API.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Garmin Connect domain used when `GARMIN_DOMAIN` is unset.
pub const DEFAULT_GARMIN_DOMAIN: &str = "garmin.cn";

/// Birthday used when `CHILD_BIRTHDAY` is unset or malformed.
pub const DEFAULT_CHILD_BIRTHDAY: &str = "2025-05-10";

/// Credentials and endpoint for the GitHub client.
#[derive(Clone, Debug)]
pub struct GitHubConfig {
    pub token: String,
    pub api_url: String,
}

impl GitHubConfig {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(env_var)
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let token =
            non_empty(get("GITHUB_TOKEN")).ok_or(Error::MissingCredential("GITHUB_TOKEN"))?;
        let api_url = non_empty(get("GITHUB_API_URL"))
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());

        Ok(Self {
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Credentials and endpoint for the Garmin Connect client.
#[derive(Clone, Debug)]
pub struct GarminConfig {
    pub access_token: String,
    pub domain: String,
    pub api_url: String,
    pub ssl_verify: bool,
}

impl GarminConfig {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(env_var)
    }

    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let access_token = non_empty(get("GARMIN_ACCESS_TOKEN"))
            .ok_or(Error::MissingCredential("GARMIN_ACCESS_TOKEN"))?;

        let domain =
            non_empty(get("GARMIN_DOMAIN")).unwrap_or_else(|| DEFAULT_GARMIN_DOMAIN.to_string());
        if domain != "garmin.cn" && domain != "garmin.com" {
            return Err(Error::invalid(
                "GARMIN_DOMAIN",
                format!("expected garmin.cn or garmin.com, got {}", domain),
            ));
        }

        let api_url = non_empty(get("GARMIN_API_URL"))
            .unwrap_or_else(|| format!("https://connectapi.{}", domain));

        let ssl_verify = get("GARMIN_SSL_VERIFY")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Ok(Self {
            access_token,
            domain,
            api_url: api_url.trim_end_matches('/').to_string(),
            ssl_verify,
        })
    }
}

/// The birthday behind `note --child`.
///
/// Malformed values fall back to [`DEFAULT_CHILD_BIRTHDAY`] with a warning
/// rather than failing the note.
pub fn child_birthday(get: impl Fn(&str) -> Option<String>) -> NaiveDate {
    let fallback = || {
        NaiveDate::parse_from_str(DEFAULT_CHILD_BIRTHDAY, "%Y-%m-%d").unwrap_or_default()
    };

    match non_empty(get("CHILD_BIRTHDAY")) {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid CHILD_BIRTHDAY format: {}, using default {}",
                raw,
                DEFAULT_CHILD_BIRTHDAY
            );
            fallback()
        }),
        None => fallback(),
    }
}

/// Process environment lookup, for use with the `from_vars` constructors.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
