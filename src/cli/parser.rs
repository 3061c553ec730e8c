/// Enum representing CLI commands
#[derive(Debug, PartialEq)]
pub enum Command {
    Walk(WalkArgs),
    Help,
    Unknown(String),
}

/// Values given on the command line for a walk. Anything left `None` may
/// still come from the project config or the environment.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WalkArgs {
    pub username: Option<String>,
    pub token: Option<String>,
    pub repo: Option<String>,
    pub since: Option<String>,
    pub whitelist: Option<String>,
}

pub const USAGE: &str = "\
Usage: quickblock [OPTIONS]

Walks a repository's issues and comments and asks, for every author,
whether to block them.

Options:
  -u, --username <NAME>   GitHub username
  -t, --token <TOKEN>     GitHub OAuth token (default: $GITHUB_TOKEN)
  -r, --repo <REPO>       Repository, e.g. owner/repo or https://github.com/owner/repo
  -s, --since <TIME>      Only issues updated at or after TIME (RFC 3339)
  -w, --whitelist <FILE>  Whitelist file (default: whitelist.txt)
  -h, --help              Print this help

Answers at the prompt: y = block, n = skip, w = whitelist, q = quit";

/// Parse command line arguments and return a Command
///
/// # Arguments
/// * `args` - Command line arguments (including program name)
///
/// # Returns
/// * `Command` - The parsed command
pub fn parse_args(args: &[String]) -> Command {
    let mut walk = WalkArgs::default();
    let mut rest = args.iter().skip(1);

    while let Some(arg) = rest.next() {
        let slot = match arg.as_str() {
            "help" | "-h" | "--help" => return Command::Help,
            "-u" | "--username" => &mut walk.username,
            "-t" | "--token" => &mut walk.token,
            "-r" | "--repo" => &mut walk.repo,
            "-s" | "--since" => &mut walk.since,
            "-w" | "--whitelist" => &mut walk.whitelist,
            other => return Command::Unknown(format!("Unknown argument: {other}")),
        };
        match rest.next() {
            Some(value) => *slot = Some(value.clone()),
            None => return Command::Unknown(format!("Missing value for {arg}")),
        }
    }

    Command::Walk(walk)
}
