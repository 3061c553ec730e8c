//! In-memory `DirectoryClient` for tests.
//!
//! Issues are served in pages of `page_size`, comments per issue number, and
//! every call is appended to a call log so tests can assert on remote traffic.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::github::client::{DirectoryClient, PER_PAGE};
use crate::github::issues::{Comment, Issue, User};
use crate::github::repo::RepoRef;

/// One recorded remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListBlocked,
    IsBlocked(String),
    BlockUser(String),
    ListIssues {
        page: u32,
        since: Option<DateTime<Utc>>,
    },
    ListComments(u64),
}

#[derive(Debug)]
pub struct MockDirectoryClient {
    page_size: usize,
    issues: Vec<Issue>,
    comments: HashMap<u64, Vec<Comment>>,
    failing_pages: HashSet<u32>,
    failing_comments: HashSet<u64>,
    failing_blocks: HashSet<String>,
    blocked: Mutex<Vec<String>>,
    call_log: Mutex<Vec<Call>>,
}

impl Default for MockDirectoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDirectoryClient {
    pub fn new() -> Self {
        MockDirectoryClient {
            page_size: PER_PAGE as usize,
            issues: Vec::new(),
            comments: HashMap::new(),
            failing_pages: HashSet::new(),
            failing_comments: HashSet::new(),
            failing_blocks: HashSet::new(),
            blocked: Mutex::new(Vec::new()),
            call_log: Mutex::new(Vec::new()),
        }
    }

    pub fn set_page_size(&mut self, page_size: usize) -> &mut Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn add_issue(&mut self, issue: Issue) -> &mut Self {
        self.issues.push(issue);
        self
    }

    /// Sets the comments of issue `number` and updates its declared comment count.
    pub fn set_comments(&mut self, number: u64, comments: Vec<Comment>) -> &mut Self {
        if let Some(issue) = self.issues.iter_mut().find(|issue| issue.number == number) {
            issue.comments = comments.len() as u64;
        }
        self.comments.insert(number, comments);
        self
    }

    /// Marks `login` as already blocked.
    pub fn block(&mut self, login: &str) -> &mut Self {
        if let Ok(blocked) = self.blocked.get_mut() {
            blocked.push(login.to_string());
        }
        self
    }

    pub fn fail_page(&mut self, page: u32) -> &mut Self {
        self.failing_pages.insert(page);
        self
    }

    /// Makes the comment listing of issue `number` fail. The issue keeps
    /// declaring at least one comment so the listing is requested.
    pub fn fail_comments(&mut self, number: u64) -> &mut Self {
        if let Some(issue) = self.issues.iter_mut().find(|issue| issue.number == number) {
            issue.comments = issue.comments.max(1);
        }
        self.failing_comments.insert(number);
        self
    }

    pub fn fail_block(&mut self, login: &str) -> &mut Self {
        self.failing_blocks.insert(login.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.call_log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Number of block-status checks and block requests made for `login`.
    pub fn calls_for(&self, login: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| match call {
                Call::IsBlocked(l) | Call::BlockUser(l) => l == login,
                _ => false,
            })
            .count()
    }

    pub fn blocked_logins(&self) -> Vec<String> {
        self.blocked.lock().map(|b| b.clone()).unwrap_or_default()
    }

    fn record(&self, call: Call) {
        if let Ok(mut log) = self.call_log.lock() {
            log.push(call);
        }
    }
}

#[async_trait]
impl DirectoryClient for MockDirectoryClient {
    async fn list_blocked(&self) -> Option<Vec<User>> {
        self.record(Call::ListBlocked);
        Some(
            self.blocked_logins()
                .into_iter()
                .map(|login| User { login })
                .collect(),
        )
    }

    async fn is_blocked(&self, login: &str) -> bool {
        self.record(Call::IsBlocked(login.to_string()));
        self.blocked_logins().iter().any(|l| l == login)
    }

    async fn block_user(&self, login: &str) -> bool {
        self.record(Call::BlockUser(login.to_string()));
        if self.failing_blocks.contains(login) {
            return false;
        }
        match self.blocked.lock() {
            Ok(mut blocked) => {
                blocked.push(login.to_string());
                true
            }
            Err(_) => false,
        }
    }

    async fn list_issues(
        &self,
        _repo: &RepoRef,
        since: Option<DateTime<Utc>>,
        page: u32,
    ) -> Option<Vec<Issue>> {
        self.record(Call::ListIssues { page, since });
        if self.failing_pages.contains(&page) {
            return None;
        }
        let start = (page.saturating_sub(1) as usize).saturating_mul(self.page_size);
        Some(
            self.issues
                .iter()
                .skip(start)
                .take(self.page_size)
                .cloned()
                .collect(),
        )
    }

    async fn list_comments(&self, _repo: &RepoRef, issue_number: u64) -> Option<Vec<Comment>> {
        self.record(Call::ListComments(issue_number));
        if self.failing_comments.contains(&issue_number) {
            return None;
        }
        Some(self.comments.get(&issue_number).cloned().unwrap_or_default())
    }
}

/// Builds an issue authored by `author` with no comments.
pub fn issue(number: u64, author: &str, body: Option<&str>) -> Issue {
    Issue {
        number,
        title: format!("Issue {number}"),
        body: body.map(str::to_string),
        comments: 0,
        user: Some(User {
            login: author.to_string(),
        }),
        pull_request: None,
    }
}

pub fn comment(author: &str, body: &str) -> Comment {
    Comment {
        body: Some(body.to_string()),
        user: Some(User {
            login: author.to_string(),
        }),
    }
}
