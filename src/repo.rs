//! Which GitHub repository to post to.
//!
//! Resolution order: `--repo`, then `GITHUB_REPOSITORY`, then the `origin`
//! remote of the git repository in the working directory.

use std::fmt;
use std::process::Command;
use std::str::FromStr;

use crate::error::Error;

/// An `owner/name` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl FromStr for Repository {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::invalid("--repo", format!("expected owner/name, got {:?}", s));
        let (owner, name) = s.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Pick the repository from the flag, the environment or the git remote.
pub fn resolve(flag: Option<&str>, env: Option<String>) -> Result<Repository, Error> {
    if let Some(repo) = flag {
        return repo.parse();
    }
    if let Some(repo) = env.filter(|r| !r.trim().is_empty()) {
        return repo.parse();
    }
    origin_remote()
        .as_deref()
        .and_then(parse_remote_url)
        .ok_or_else(|| {
            Error::invalid(
                "--repo",
                "could not determine repository; pass --repo, set GITHUB_REPOSITORY, \
                 or run from a git repository with a GitHub remote",
            )
        })
}

/// Parse a GitHub remote URL in SSH or HTTPS form.
pub fn parse_remote_url(url: &str) -> Option<Repository> {
    let url = url.trim();
    let path = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))?;
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    path.parse().ok()
}

fn origin_remote() -> Option<String> {
    let output = Command::new("git")
        .args(["config", "--get", "remote.origin.url"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let url = String::from_utf8(output.stdout).ok()?;
    tracing::debug!("Found git remote: {}", url.trim());
    Some(url)
}
