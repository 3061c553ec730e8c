use crate::cli;
use crate::config;
use crate::decision::DecisionEngine;
use crate::github::{DirectoryClient, GitHubClient};
use crate::output;
use crate::prompt::{Operator, StdinOperator};
use crate::storage::FileWhitelistStorage;
use crate::walker::{IssueWalker, WalkSummary};
use crate::whitelist::Whitelist;
use anyhow::Context;

pub async fn run(
    args: Vec<String>,
    mut stdout_additional: Option<&mut dyn std::io::Write>,
) -> anyhow::Result<()> {
    match cli::parser::parse_args(&args) {
        cli::parser::Command::Help => {
            output::println(cli::parser::USAGE, &mut stdout_additional)?;
        }
        cli::parser::Command::Walk(walk_args) => {
            let current_dir =
                std::env::current_dir().context("Failed to determine working directory")?;
            let file_config = config::load_project_config(&current_dir)?;
            let settings = config::resolve_settings(
                &file_config,
                &walk_args,
                std::env::var(config::TOKEN_ENV_VAR).ok(),
            )?;
            tracing::debug!(?settings, "settings resolved");

            let whitelist = Whitelist::load(Box::new(FileWhitelistStorage::new(
                &settings.whitelist_path,
            )))?;
            let client = GitHubClient::new(&settings.username, &settings.token)?;
            let mut operator = StdinOperator::new();

            review(
                &client,
                &mut operator,
                whitelist,
                &settings,
                &mut stdout_additional,
            )
            .await?;
        }
        cli::parser::Command::Unknown(message) => {
            return Err(anyhow::anyhow!("{message}. Use --help for usage."));
        }
    }
    Ok(())
}

/// Prints the session banner, walks the repository and reports the summary.
pub async fn review(
    client: &dyn DirectoryClient,
    operator: &mut dyn Operator,
    whitelist: Whitelist,
    settings: &config::Settings,
    out: &mut Option<&mut dyn std::io::Write>,
) -> anyhow::Result<WalkSummary> {
    output::println("GitHub Quick Blocker", out)?;
    output::println(&format!("Repository: {}", settings.repo), out)?;
    output::println(&format!("Logged in as: {}", settings.username), out)?;
    output::println(
        &format!(
            "Whitelist: {} ({} entries)",
            settings.whitelist_path.display(),
            whitelist.len()
        ),
        out,
    )?;
    output::separator(out)?;

    let mut engine = DecisionEngine::new(client, operator, whitelist);
    let summary = IssueWalker::new(client, &settings.repo)
        .since(settings.since)
        .walk(&mut engine, out)
        .await?;

    output::println(&summary.report(), out)?;
    Ok(summary)
}
