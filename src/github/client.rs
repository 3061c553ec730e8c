use crate::github::issues::{Comment, Issue, User};
use crate::github::repo::RepoRef;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// GitHub API endpoints
mod endpoints {
    pub const API_BASE: &str = "https://api.github.com";
    pub const BLOCKS: &str = "/user/blocks";
}

/// Fixed page size for every paginated listing.
pub const PER_PAGE: u32 = 100;

/// Remote operations needed to triage a repository.
///
/// None of these return errors: an ordinary failure (non-success status,
/// transport error, undecodable body) becomes `None` or `false`.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// The authenticated user's block list.
    async fn list_blocked(&self) -> Option<Vec<User>>;

    /// `true` only when the API confirms `login` is blocked. Fails open.
    async fn is_blocked(&self, login: &str) -> bool;

    /// `true` only when the API confirms the block.
    async fn block_user(&self, login: &str) -> bool;

    /// One page of the repository's issues, `PER_PAGE` per page, starting at page 1.
    async fn list_issues(
        &self,
        repo: &RepoRef,
        since: Option<DateTime<Utc>>,
        page: u32,
    ) -> Option<Vec<Issue>>;

    /// All comments of one issue.
    async fn list_comments(&self, repo: &RepoRef, issue_number: u64) -> Option<Vec<Comment>>;
}

/// `DirectoryClient` backed by the GitHub REST API.
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    token: String,
}

impl GitHubClient {
    pub fn new(username: &str, token: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("quickblock-cli")
            .build()
            .context("Failed to create HTTP client")?;
        Ok(GitHubClient {
            http,
            base_url: endpoints::API_BASE.to_string(),
            username: username.to_string(),
            token: token.to_string(),
        })
    }

    /// Points the client at another API root, e.g. a GitHub Enterprise host.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.username, Some(&self.token))
            .header("Accept", "application/vnd.github.v3+json")
    }

    /// Sends `request` and returns the status, or `None` on a transport error.
    async fn send_for_status(&self, request: RequestBuilder, what: &str) -> Option<StatusCode> {
        match request.send().await {
            Ok(response) => Some(response.status()),
            Err(err) => {
                tracing::warn!(error = %err, "{what}: request failed");
                None
            }
        }
    }

    /// Sends `request` and decodes a 200 response body.
    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Option<T> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "{what}: request failed");
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(%status, "{what}: unexpected response");
            return None;
        }

        match response.json::<T>().await {
            Ok(body) => Some(body),
            Err(err) => {
                tracing::warn!(error = %err, "{what}: failed to decode response");
                None
            }
        }
    }

    /// Follows page numbers until a short page; any failed page fails the whole listing.
    async fn fetch_all_pages<T: DeserializeOwned>(&self, path: &str, what: &str) -> Option<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            let request = self
                .request(Method::GET, path)
                .query(&[("page", page), ("per_page", PER_PAGE)]);
            let batch: Vec<T> = self.fetch_json(request, what).await?;
            let last_page = batch.len() < PER_PAGE as usize;
            items.extend(batch);
            if last_page {
                return Some(items);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl DirectoryClient for GitHubClient {
    async fn list_blocked(&self) -> Option<Vec<User>> {
        self.fetch_all_pages(endpoints::BLOCKS, "list blocked users").await
    }

    async fn is_blocked(&self, login: &str) -> bool {
        let request = self.request(Method::GET, &format!("{}/{login}", endpoints::BLOCKS));
        let status = self.send_for_status(request, "check block status").await;
        tracing::debug!(login, ?status, "block status checked");
        status == Some(StatusCode::NO_CONTENT)
    }

    async fn block_user(&self, login: &str) -> bool {
        let request = self.request(Method::PUT, &format!("{}/{login}", endpoints::BLOCKS));
        let status = self.send_for_status(request, "block user").await;
        tracing::debug!(login, ?status, "block requested");
        status == Some(StatusCode::NO_CONTENT)
    }

    async fn list_issues(
        &self,
        repo: &RepoRef,
        since: Option<DateTime<Utc>>,
        page: u32,
    ) -> Option<Vec<Issue>> {
        let path = format!("/repos/{}/{}/issues", repo.owner, repo.name);
        let mut request = self
            .request(Method::GET, &path)
            .query(&[("page", page), ("per_page", PER_PAGE)]);
        if let Some(since) = since {
            request = request.query(&[("since", since.to_rfc3339_opts(SecondsFormat::Secs, true))]);
        }
        tracing::debug!(%repo, page, "listing issues");
        self.fetch_json(request, "list issues").await
    }

    async fn list_comments(&self, repo: &RepoRef, issue_number: u64) -> Option<Vec<Comment>> {
        let path = format!(
            "/repos/{}/{}/issues/{issue_number}/comments",
            repo.owner, repo.name
        );
        tracing::debug!(%repo, issue_number, "listing comments");
        self.fetch_all_pages(&path, "list comments").await
    }
}
