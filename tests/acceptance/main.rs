use cucumber::World;
use quickblock::github::Comment;
use quickblock::github::mock::MockDirectoryClient;
use quickblock::walker::WalkSummary;
use std::collections::HashMap;

#[derive(Debug, Default, World)]
pub struct QuickblockWorld {
    pub client: MockDirectoryClient,
    pub pending_comments: HashMap<u64, Vec<Comment>>,
    pub answers: Vec<String>,
    pub whitelist_dir: Option<tempfile::TempDir>,
    pub prompted: Vec<String>,
    pub summary: Option<WalkSummary>,
    pub captured_output: Vec<u8>,
    pub command_result: Option<Result<(), anyhow::Error>>,
}

#[tokio::main]
async fn main() {
    QuickblockWorld::run("features").await;
}

mod steps;
