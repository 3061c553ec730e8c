use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{ErrorKind, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Characters accepted at the decision prompt.
pub const PROMPT_CHOICES: &str = "y/n/w/q";

/// Source of the operator's answers at the decision prompt.
#[async_trait]
pub trait Operator: Send {
    /// Reads one answer for `login`. `Ok(None)` means no more input will come.
    async fn answer(&mut self, login: &str) -> Result<Option<String>>;
}

/// Reads answers line by line from a buffered reader, standard input by default.
pub struct LineOperator<R> {
    lines: Lines<R>,
}

pub type StdinOperator = LineOperator<BufReader<Stdin>>;

impl LineOperator<BufReader<Stdin>> {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for LineOperator<BufReader<Stdin>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AsyncBufRead + Unpin + Send> LineOperator<R> {
    pub fn from_reader(reader: R) -> Self {
        LineOperator {
            lines: reader.lines(),
        }
    }

    /// Next input line. A line that is not valid UTF-8 comes back empty so
    /// the prompt loop asks again instead of failing the issue.
    async fn read_line(&mut self) -> Result<Option<String>> {
        match self.lines.next_line().await {
            Ok(line) => Ok(line),
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                tracing::warn!(error = %err, "ignoring undecodable operator input");
                Ok(Some(String::new()))
            }
            Err(err) => Err(err).context("Failed to read operator input"),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Operator for LineOperator<R> {
    async fn answer(&mut self, _login: &str) -> Result<Option<String>> {
        {
            let mut stdout = std::io::stdout();
            write!(stdout, "{PROMPT_CHOICES}: ").context("Failed to write prompt")?;
            stdout.flush().context("Failed to flush prompt")?;
        }
        self.read_line().await
    }
}

/// Replays a fixed list of answers, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    prompted: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedOperator {
            answers: answers.into_iter().map(Into::into).collect(),
            prompted: Vec::new(),
        }
    }

    /// Logins this operator was asked about, once per answer read.
    pub fn prompted(&self) -> &[String] {
        &self.prompted
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn answer(&mut self, login: &str) -> Result<Option<String>> {
        self.prompted.push(login.to_string());
        Ok(self.answers.pop_front())
    }
}
