use anyhow::{Result, anyhow};
use serde::Deserialize;

/// Account reference as embedded in issue, comment and block-list payloads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub body: Option<String>,
    /// Comment count as declared by the issue listing.
    #[serde(default)]
    pub comments: u64,
    /// `null` for accounts that no longer exist.
    pub user: Option<User>,
    /// Present when the entry is a pull request rather than an issue.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn author(&self) -> Result<&str> {
        self.user
            .as_ref()
            .map(|user| user.login.as_str())
            .ok_or_else(|| anyhow!("Issue #{} has no author", self.number))
    }

    /// The body, if it has anything for the operator to review.
    pub fn reviewable_body(&self) -> Option<&str> {
        self.body.as_deref().filter(|body| !body.trim().is_empty())
    }

    pub fn is_pull_request(&self) -> bool {
        self.pull_request.as_ref().is_some_and(|pr| !pr.is_null())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    pub body: Option<String>,
    pub user: Option<User>,
}

impl Comment {
    pub fn author(&self) -> Result<&str> {
        self.user
            .as_ref()
            .map(|user| user.login.as_str())
            .ok_or_else(|| anyhow!("Comment has no author"))
    }
}
