use crate::QuickblockWorld;
use cucumber::{given, then, when};
use quickblock::config::Settings;
use quickblock::github::RepoRef;
use quickblock::github::mock::{Call, comment, issue};
use quickblock::prompt::ScriptedOperator;
use quickblock::run::review;
use quickblock::storage::FileWhitelistStorage;
use quickblock::whitelist::Whitelist;
use std::io::Write;
use std::path::PathBuf;

impl QuickblockWorld {
    fn whitelist_path(&mut self) -> PathBuf {
        let dir = self
            .whitelist_dir
            .get_or_insert_with(|| tempfile::tempdir().expect("Failed to create temp dir"));
        dir.path().join("whitelist.txt")
    }

    fn transcript(&self) -> String {
        String::from_utf8(self.captured_output.clone()).expect("Invalid UTF-8")
    }

    fn whitelist_lines(&mut self) -> Vec<String> {
        let path = self.whitelist_path();
        std::fs::read_to_string(&path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[given(expr = "the whitelist contains {string}")]
async fn given_whitelist_contains(world: &mut QuickblockWorld, login: String) {
    let path = world.whitelist_path();
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .unwrap_or_else(|e| panic!("Failed to open whitelist {:?}: {}", path, e));
    writeln!(file, "{login}").expect("Failed to write whitelist entry");
}

#[given("an empty whitelist")]
async fn given_empty_whitelist(world: &mut QuickblockWorld) {
    let path = world.whitelist_path();
    let _ = std::fs::remove_file(&path);
}

#[given(expr = "issues are served {int} per page")]
async fn given_page_size(world: &mut QuickblockWorld, page_size: usize) {
    world.client.set_page_size(page_size);
}

#[given(expr = "issue {int} by {string} says {string}")]
async fn given_issue_with_body(world: &mut QuickblockWorld, number: u64, author: String, body: String) {
    world.client.add_issue(issue(number, &author, Some(&body)));
}

#[given(expr = "issue {int} by {string} has no body")]
async fn given_issue_without_body(world: &mut QuickblockWorld, number: u64, author: String) {
    world.client.add_issue(issue(number, &author, None));
}

#[given(expr = "issue {int} has a comment by {string} saying {string}")]
async fn given_comment(world: &mut QuickblockWorld, number: u64, author: String, body: String) {
    let comments = world.pending_comments.entry(number).or_default();
    comments.push(comment(&author, &body));
    let comments = comments.clone();
    world.client.set_comments(number, comments);
}

#[given(expr = "the comments of issue {int} cannot be fetched")]
async fn given_comments_fail(world: &mut QuickblockWorld, number: u64) {
    world.client.fail_comments(number);
}

#[given(expr = "the issue listing fails for page {int}")]
async fn given_page_fails(world: &mut QuickblockWorld, page: u32) {
    world.client.fail_page(page);
}

#[given(expr = "{string} is already blocked on GitHub")]
async fn given_already_blocked(world: &mut QuickblockWorld, login: String) {
    world.client.block(&login);
}

#[given(expr = "the operator answers {string}")]
async fn given_operator_answers(world: &mut QuickblockWorld, answers: String) {
    world
        .answers
        .extend(answers.split(',').map(|answer| answer.trim().to_string()));
}

#[when("the repository is walked")]
async fn when_repository_walked(world: &mut QuickblockWorld) {
    let whitelist_path = world.whitelist_path();
    let whitelist = Whitelist::load(Box::new(FileWhitelistStorage::new(&whitelist_path)))
        .expect("Whitelist should load");
    let settings = Settings {
        username: "operator".to_string(),
        token: "token".to_string(),
        repo: RepoRef::new("owner", "repo"),
        whitelist_path,
        since: None,
    };
    let mut operator = ScriptedOperator::new(world.answers.clone());
    let mut buffer: Vec<u8> = Vec::new();

    let summary = {
        let mut out: Option<&mut dyn Write> = Some(&mut buffer);
        review(&world.client, &mut operator, whitelist, &settings, &mut out)
            .await
            .expect("Walk should not fail")
    };

    world.prompted = operator.prompted().to_vec();
    world.captured_output = buffer;
    world.summary = Some(summary);
}

#[when(expr = "I run quickblock with {string}")]
async fn when_run_quickblock(world: &mut QuickblockWorld, arguments: String) {
    let mut buffer: Vec<u8> = Vec::new();
    let writer_option: Option<&mut dyn Write> = Some(&mut buffer);

    let args = std::iter::once("quickblock")
        .chain(arguments.split_whitespace())
        .map(str::to_string)
        .collect();
    let result = quickblock::run::run(args, writer_option).await;

    world.captured_output = buffer;
    world.command_result = Some(result);
}

#[then(expr = "the operator is asked about {string}")]
async fn then_operator_asked_in_order(world: &mut QuickblockWorld, logins: String) {
    let expected: Vec<String> = logins.split(',').map(|l| l.trim().to_string()).collect();
    assert_eq!(world.prompted, expected, "Unexpected prompt order");
}

#[then("the operator is not asked about anyone")]
async fn then_operator_not_asked(world: &mut QuickblockWorld) {
    assert!(
        world.prompted.is_empty(),
        "Expected no prompts, but operator was asked about {:?}",
        world.prompted
    );
}

#[then(expr = "no remote call is made for {string}")]
async fn then_no_remote_call(world: &mut QuickblockWorld, login: String) {
    assert_eq!(
        world.client.calls_for(&login),
        0,
        "Unexpected remote calls: {:?}",
        world.client.calls()
    );
}

#[then(expr = "{string} is blocked on GitHub")]
async fn then_blocked(world: &mut QuickblockWorld, login: String) {
    assert!(
        world.client.blocked_logins().contains(&login),
        "{} is not blocked; blocked: {:?}",
        login,
        world.client.blocked_logins()
    );
}

#[then(expr = "{string} is not blocked on GitHub")]
async fn then_not_blocked(world: &mut QuickblockWorld, login: String) {
    assert!(!world.client.blocked_logins().contains(&login));
}

#[then(expr = "the whitelist file lists {string} exactly once")]
async fn then_whitelist_lists_once(world: &mut QuickblockWorld, login: String) {
    let lines = world.whitelist_lines();
    assert_eq!(
        lines.iter().filter(|line| **line == login).count(),
        1,
        "Whitelist file content: {:?}",
        lines
    );
}

#[then(expr = "the whitelist file is {string}")]
async fn then_whitelist_file_is(world: &mut QuickblockWorld, logins: String) {
    let expected: Vec<String> = logins.split(',').map(|l| l.trim().to_string()).collect();
    assert_eq!(world.whitelist_lines(), expected);
}

#[then(expr = "a fresh load of the whitelist contains {string}")]
async fn then_fresh_load_contains(world: &mut QuickblockWorld, login: String) {
    let path = world.whitelist_path();
    let whitelist = Whitelist::load(Box::new(FileWhitelistStorage::new(&path)))
        .expect("Whitelist should reload");
    assert!(whitelist.contains(&login), "Reloaded: {:?}", whitelist.logins());
}

#[then(expr = "{int} issues are processed")]
async fn then_issues_processed(world: &mut QuickblockWorld, count: usize) {
    let summary = world.summary.as_ref().expect("No walk ran");
    assert_eq!(summary.issues, count);
}

#[then(expr = "issue {int} is reported as failed")]
async fn then_issue_failed(world: &mut QuickblockWorld, number: u64) {
    let summary = world.summary.as_ref().expect("No walk ran");
    assert_eq!(summary.failed_issues, vec![number]);
    let transcript = world.transcript();
    assert!(
        transcript.contains(&format!("#{number}")),
        "Transcript does not mention #{}:\n{}",
        number,
        transcript
    );
}

#[then("the walk completes")]
async fn then_walk_completes(world: &mut QuickblockWorld) {
    let summary = world.summary.as_ref().expect("No walk ran");
    assert!(!summary.aborted);
}

#[then("the walk is aborted")]
async fn then_walk_aborted(world: &mut QuickblockWorld) {
    let summary = world.summary.as_ref().expect("No walk ran");
    assert!(summary.aborted);
}

#[then(expr = "issue pages {string} were requested")]
async fn then_pages_requested(world: &mut QuickblockWorld, pages: String) {
    let expected: Vec<u32> = pages
        .split(',')
        .map(|p| p.trim().parse().expect("page number"))
        .collect();
    let requested: Vec<u32> = world
        .client
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::ListIssues { page, .. } => Some(page),
            _ => None,
        })
        .collect();
    assert_eq!(requested, expected);
}

#[then(expr = "the last remote call checks {string}")]
async fn then_last_call(world: &mut QuickblockWorld, login: String) {
    assert_eq!(world.client.calls().last(), Some(&Call::IsBlocked(login)));
}

#[then("no comments were requested")]
async fn then_no_comments_requested(world: &mut QuickblockWorld) {
    assert!(
        !world
            .client
            .calls()
            .iter()
            .any(|call| matches!(call, Call::ListComments(_)))
    );
}

#[then(expr = "the output contains {string}")]
async fn then_output_contains(world: &mut QuickblockWorld, expected: String) {
    let output = world.transcript();
    assert!(
        output.contains(&expected),
        "Expected output to contain '{}', but got:\n---\n{}\n---",
        expected,
        output
    );
}

#[then(expr = "the command fails with {string}")]
async fn then_command_fails(world: &mut QuickblockWorld, expected: String) {
    match world.command_result.as_ref() {
        Some(Err(err)) => assert_eq!(err.to_string(), expected),
        other => panic!("Command should have failed but got {:?}", other),
    }
}

#[then("the command succeeds")]
async fn then_command_succeeds(world: &mut QuickblockWorld) {
    assert!(
        matches!(world.command_result, Some(Ok(()))),
        "Command failed: {:?}",
        world.command_result
    );
}
