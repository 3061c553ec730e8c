use std::fmt;

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: &str, name: &str) -> Self {
        RepoRef {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// Parses `owner/repo` or a repository URL such as
    /// `https://github.com/owner/repo` (trailing `/` and `.git` accepted).
    ///
    /// The last two path segments are taken as owner and name.
    pub fn parse(input: &str) -> Result<Self, String> {
        let trimmed = input.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
        let path = match trimmed.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map(|(_, path)| path).unwrap_or(""),
            None => trimmed,
        };

        let parts: Vec<&str> = path.split('/').collect();
        match parts.as_slice() {
            [.., owner, name] if !owner.is_empty() && !name.is_empty() => {
                Ok(RepoRef::new(owner, name))
            }
            _ => Err(format!(
                "Invalid repository '{input}'. Please use <owner>/<repo> or a GitHub URL."
            )),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_slash_repo() {
        assert_eq!(
            RepoRef::parse("facebook/react"),
            Ok(RepoRef::new("facebook", "react"))
        );
    }

    #[test]
    fn parses_https_url() {
        assert_eq!(
            RepoRef::parse("https://github.com/facebook/react"),
            Ok(RepoRef::new("facebook", "react"))
        );
    }

    #[test]
    fn parses_url_with_trailing_slash_and_git_suffix() {
        assert_eq!(
            RepoRef::parse("https://github.com/facebook/react.git/"),
            Ok(RepoRef::new("facebook", "react"))
        );
    }

    #[test]
    fn rejects_single_segment() {
        assert!(RepoRef::parse("react").is_err());
    }

    #[test]
    fn rejects_empty_owner() {
        assert!(RepoRef::parse("/react").is_err());
    }

    #[test]
    fn rejects_url_without_repo_path() {
        assert!(RepoRef::parse("https://github.com").is_err());
    }

    #[test]
    fn displays_as_owner_slash_name() {
        assert_eq!(RepoRef::new("o", "r").to_string(), "o/r");
    }
}
