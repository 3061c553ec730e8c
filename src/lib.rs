pub mod cli;
pub mod config;
pub mod decision;
pub mod github;
pub mod output;
pub mod prompt;
pub mod run;
pub mod storage;
pub mod walker;
pub mod whitelist;
