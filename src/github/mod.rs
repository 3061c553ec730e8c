pub mod client;
pub mod issues;
pub mod mock;
pub mod repo;

pub use client::{DirectoryClient, GitHubClient, PER_PAGE};
pub use issues::{Comment, Issue, User};
pub use repo::RepoRef;
