use crate::storage::WhitelistStorage;
use anyhow::{Context, Result};
use std::collections::HashSet;

/// Logins exempted from block prompts, kept in insertion order.
///
/// Every addition is written through to the backing storage before `add`
/// returns, so a decision survives the process ending right after it.
pub struct Whitelist {
    storage: Box<dyn WhitelistStorage>,
    logins: Vec<String>,
    index: HashSet<String>,
}

impl Whitelist {
    /// Loads the whitelist from `storage`. An absent store yields an empty list.
    pub fn load(storage: Box<dyn WhitelistStorage>) -> Result<Self> {
        let stored = storage.load().context("Failed to load whitelist")?;
        let mut whitelist = Whitelist {
            storage,
            logins: Vec::with_capacity(stored.len()),
            index: HashSet::with_capacity(stored.len()),
        };
        for login in stored {
            whitelist.insert(login);
        }
        Ok(whitelist)
    }

    pub fn contains(&self, login: &str) -> bool {
        self.index.contains(login)
    }

    /// Adds `login` and rewrites the backing storage.
    ///
    /// Returns `Ok(false)` without writing when the login is already present.
    /// If the save fails the in-memory list is left unchanged.
    pub fn add(&mut self, login: &str) -> Result<bool> {
        if self.contains(login) {
            return Ok(false);
        }
        let mut updated = Vec::with_capacity(self.logins.len() + 1);
        updated.extend_from_slice(&self.logins);
        updated.push(login.to_string());
        self.storage
            .save(&updated)
            .with_context(|| format!("Failed to save whitelist after adding {login}"))?;
        self.insert(login.to_string());
        tracing::debug!(login, entries = self.logins.len(), "whitelist saved");
        Ok(true)
    }

    pub fn logins(&self) -> &[String] {
        &self.logins
    }

    pub fn len(&self) -> usize {
        self.logins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }

    fn insert(&mut self, login: String) {
        if self.index.insert(login.clone()) {
            self.logins.push(login);
        }
    }
}

impl std::fmt::Debug for Whitelist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Whitelist")
            .field("logins", &self.logins)
            .finish_non_exhaustive()
    }
}
