use crate::decision::{DecisionEngine, Outcome};
use crate::github::{DirectoryClient, Issue, RepoRef};
use crate::output;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::Write;

/// Whether the walk goes on after one issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Abort,
}

/// What a walk did, for the end-of-run report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub pages: u32,
    pub issues: usize,
    /// Issues whose processing stopped early, in walk order.
    pub failed_issues: Vec<u64>,
    pub already_whitelisted: usize,
    pub already_blocked: usize,
    pub blocked: usize,
    pub block_failures: usize,
    pub skipped: usize,
    pub whitelisted: usize,
    pub aborted: bool,
}

impl WalkSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::AlreadyWhitelisted => self.already_whitelisted += 1,
            Outcome::AlreadyBlocked => self.already_blocked += 1,
            Outcome::Blocked { confirmed: true } => self.blocked += 1,
            Outcome::Blocked { confirmed: false } => self.block_failures += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::WhitelistedNow => self.whitelisted += 1,
            Outcome::Aborted => self.aborted = true,
        }
    }

    /// Number of users that went through the decision engine.
    pub fn users(&self) -> usize {
        self.already_whitelisted
            + self.already_blocked
            + self.blocked
            + self.block_failures
            + self.skipped
            + self.whitelisted
            + usize::from(self.aborted)
    }

    pub fn report(&self) -> String {
        let mut report = format!(
            "Reviewed {} issues on {} pages: {} blocked, {} skipped, {} whitelisted, {} already blocked, {} already whitelisted",
            self.issues,
            self.pages,
            self.blocked,
            self.skipped,
            self.whitelisted,
            self.already_blocked,
            self.already_whitelisted,
        );
        if self.block_failures > 0 {
            report.push_str(&format!(", {} failed blocks", self.block_failures));
        }
        if !self.failed_issues.is_empty() {
            let numbers: Vec<String> = self
                .failed_issues
                .iter()
                .map(|number| format!("#{number}"))
                .collect();
            report.push_str(&format!("; could not process {}", numbers.join(", ")));
        }
        if self.aborted {
            report.push_str(" (aborted)");
        }
        report
    }
}

/// Walks a repository's issues page by page and runs every author through
/// the decision engine.
///
/// A failure inside one issue is logged and the walk moves on; only an
/// operator abort stops it early.
pub struct IssueWalker<'a> {
    client: &'a dyn DirectoryClient,
    repo: &'a RepoRef,
    since: Option<DateTime<Utc>>,
}

impl<'a> IssueWalker<'a> {
    pub fn new(client: &'a dyn DirectoryClient, repo: &'a RepoRef) -> Self {
        IssueWalker {
            client,
            repo,
            since: None,
        }
    }

    /// Only walk issues updated at or after `since`.
    pub fn since(mut self, since: Option<DateTime<Utc>>) -> Self {
        self.since = since;
        self
    }

    pub async fn walk(
        &self,
        engine: &mut DecisionEngine<'_>,
        out: &mut Option<&mut dyn Write>,
    ) -> Result<WalkSummary> {
        let mut summary = WalkSummary::default();
        let mut page = 1u32;

        loop {
            let Some(issues) = self.client.list_issues(self.repo, self.since, page).await else {
                if page == 1 {
                    output::println("Could not get issues", out)?;
                }
                tracing::info!(page, "issue listing unavailable, ending walk");
                break;
            };
            if issues.is_empty() {
                tracing::debug!(page, "empty page, ending walk");
                break;
            }
            summary.pages = page;

            for issue in &issues {
                summary.issues += 1;
                match self.process_issue(issue, engine, &mut summary, out).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Abort) => {
                        tracing::info!(issue = issue.number, "walk aborted by operator");
                        return Ok(summary);
                    }
                    Err(err) => {
                        tracing::error!(issue = issue.number, error = ?err, "failed to process issue");
                        summary.failed_issues.push(issue.number);
                        output::println(&format!("{err:#}"), out)?;
                        output::println(
                            &format!("Could not process issue #{}", issue.number),
                            out,
                        )?;
                    }
                }
            }
            page += 1;
        }

        Ok(summary)
    }

    async fn process_issue(
        &self,
        issue: &Issue,
        engine: &mut DecisionEngine<'_>,
        summary: &mut WalkSummary,
        out: &mut Option<&mut dyn Write>,
    ) -> Result<Flow> {
        let kind = if issue.is_pull_request() {
            "Pull request"
        } else {
            "Issue"
        };
        output::println(&format!("{kind} #{}: {}", issue.number, issue.title), out)?;
        let author = issue.author()?;
        output::println(&format!("User: {author}"), out)?;

        match issue.reviewable_body() {
            Some(body) => {
                output::println(&format!("Content: \n{body}"), out)?;
                output::separator(out)?;
                let outcome = engine
                    .decide(author, out)
                    .await
                    .with_context(|| format!("Failed to decide on {author}"))?;
                summary.record(outcome);
                if outcome.is_abort() {
                    return Ok(Flow::Abort);
                }
            }
            None => output::println("No content, nothing to review", out)?,
        }

        if issue.comments > 0 {
            output::println("\nComments:", out)?;
            let Some(comments) = self.client.list_comments(self.repo, issue.number).await else {
                tracing::warn!(issue = issue.number, "comment listing failed");
                summary.failed_issues.push(issue.number);
                output::println(
                    &format!("Could not get comments for issue #{}", issue.number),
                    out,
                )?;
                output::separator(out)?;
                return Ok(Flow::Continue);
            };

            for comment in &comments {
                let commenter = comment
                    .author()
                    .with_context(|| format!("In a comment on issue #{}", issue.number))?;
                output::println(&format!("\nComment by {commenter}:"), out)?;
                output::println(comment.body.as_deref().unwrap_or_default(), out)?;
                let outcome = engine
                    .decide(commenter, out)
                    .await
                    .with_context(|| format!("Failed to decide on {commenter}"))?;
                summary.record(outcome);
                if outcome.is_abort() {
                    return Ok(Flow::Abort);
                }
                output::separator(out)?;
            }
        }

        output::separator(out)?;
        Ok(Flow::Continue)
    }
}
