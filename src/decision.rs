use crate::github::DirectoryClient;
use crate::output;
use crate::prompt::{Operator, PROMPT_CHOICES};
use crate::whitelist::Whitelist;
use anyhow::Result;
use std::io::Write;

/// The operator's answer at the decision prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Block,
    Skip,
    Whitelist,
    Abort,
}

impl Decision {
    /// Parses one prompt answer. Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "y" => Some(Decision::Block),
            "n" => Some(Decision::Skip),
            "w" => Some(Decision::Whitelist),
            "q" => Some(Decision::Abort),
            _ => None,
        }
    }
}

/// Result of processing one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    AlreadyWhitelisted,
    AlreadyBlocked,
    /// A block was attempted; `confirmed` is whether the API accepted it.
    Blocked { confirmed: bool },
    Skipped,
    WhitelistedNow,
    /// The operator asked to stop the whole walk.
    Aborted,
}

impl Outcome {
    pub fn is_abort(&self) -> bool {
        matches!(self, Outcome::Aborted)
    }
}

/// Classifies users and asks the operator about the undecided ones.
///
/// The whitelist is consulted before the remote block status, so a
/// whitelisted user costs no remote call and no prompt.
pub struct DecisionEngine<'a> {
    client: &'a dyn DirectoryClient,
    operator: &'a mut dyn Operator,
    whitelist: Whitelist,
}

impl<'a> DecisionEngine<'a> {
    pub fn new(
        client: &'a dyn DirectoryClient,
        operator: &'a mut dyn Operator,
        whitelist: Whitelist,
    ) -> Self {
        DecisionEngine {
            client,
            operator,
            whitelist,
        }
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub async fn decide(
        &mut self,
        login: &str,
        out: &mut Option<&mut dyn Write>,
    ) -> Result<Outcome> {
        if self.whitelist.contains(login) {
            output::println(&format!("User {login} is in the whitelist"), out)?;
            return Ok(Outcome::AlreadyWhitelisted);
        }

        if self.client.is_blocked(login).await {
            output::println(&format!("User {login} is already blocked"), out)?;
            return Ok(Outcome::AlreadyBlocked);
        }

        output::println(&format!("Block user `{login}'?"), out)?;
        let decision = loop {
            let Some(answer) = self.operator.answer(login).await? else {
                tracing::info!(login, "operator input closed, aborting");
                break Decision::Abort;
            };
            match Decision::parse(&answer) {
                Some(decision) => break decision,
                None => output::println(&format!("Please answer {PROMPT_CHOICES}"), out)?,
            }
        };
        tracing::debug!(login, ?decision, "operator decided");

        let outcome = match decision {
            Decision::Block => {
                let confirmed = self.client.block_user(login).await;
                if confirmed {
                    output::println(&format!("Blocked user {login}"), out)?;
                } else {
                    output::println(&format!("Could not block user {login}"), out)?;
                }
                Outcome::Blocked { confirmed }
            }
            Decision::Skip => {
                output::println(&format!("Not blocking user {login}"), out)?;
                Outcome::Skipped
            }
            Decision::Whitelist => {
                self.whitelist.add(login)?;
                output::println(&format!("Added {login} to whitelist"), out)?;
                Outcome::WhitelistedNow
            }
            Decision::Abort => {
                output::println("Quitting", out)?;
                Outcome::Aborted
            }
        };
        Ok(outcome)
    }
}
