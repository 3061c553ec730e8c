use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Default whitelist filename, resolved against the working directory.
pub const DEFAULT_WHITELIST_FILENAME: &str = "whitelist.txt";

/// Abstract whitelist persistence interface
pub trait WhitelistStorage: Send + Sync {
    /// Return the stored logins in file order. If nothing is stored, returns Ok(empty)
    fn load(&self) -> Result<Vec<String>>;
    /// Replace the stored logins with `logins`
    fn save(&self, logins: &[String]) -> Result<()>;
}

/// Parses whitelist file content: one login per line, blank lines ignored.
///
/// Lines are trimmed and returned in file order, repeats included.
/// No other validation is applied; any non-blank line is taken as a login.
pub fn parse_whitelist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Renders logins in the whitelist file format.
pub fn render_whitelist(logins: &[String]) -> String {
    logins.iter().map(|login| format!("{login}\n")).collect()
}

/// File-based whitelist persistence implementation
#[derive(Debug, Clone)]
pub struct FileWhitelistStorage {
    path: PathBuf,
}

impl FileWhitelistStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileWhitelistStorage { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| DEFAULT_WHITELIST_FILENAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl WhitelistStorage for FileWhitelistStorage {
    fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read whitelist file {}", self.path.display()))?;
        Ok(parse_whitelist(&content))
    }

    fn save(&self, logins: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create whitelist directory")?;
        }
        // Written beside the target and renamed over it, so a crash mid-write
        // leaves the previous file intact.
        let temp_path = self.temp_path();
        let result = write_synced(&temp_path, &render_whitelist(logins)).and_then(|()| {
            fs::rename(&temp_path, &self.path).with_context(|| {
                format!("Failed to replace whitelist file {}", self.path.display())
            })
        });
        if result.is_err() && temp_path.exists() {
            if let Err(err) = fs::remove_file(&temp_path) {
                tracing::warn!(
                    path = %temp_path.display(),
                    error = %err,
                    "failed to remove temporary whitelist file"
                );
            }
        }
        result
    }
}

fn write_synced(path: &Path, content: &str) -> Result<()> {
    let mut file = File::create(path).context("Failed to open whitelist file for writing")?;
    file.write_all(content.as_bytes())
        .context("Failed to write whitelist to file")?;
    file.sync_all().context("Failed to flush whitelist file")?;
    Ok(())
}

/// In-memory whitelist persistence. Clones share the same backing list.
#[derive(Debug, Clone, Default)]
pub struct MemoryWhitelistStorage {
    logins: Arc<Mutex<Vec<String>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryWhitelistStorage {
    pub fn with_logins(logins: &[&str]) -> Self {
        let storage = Self::default();
        if let Ok(mut stored) = storage.logins.lock() {
            *stored = logins.iter().map(|login| login.to_string()).collect();
        }
        storage
    }

    /// Current persisted contents.
    pub fn logins(&self) -> Vec<String> {
        self.logins.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Number of `save` calls seen so far.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }
}

impl WhitelistStorage for MemoryWhitelistStorage {
    fn load(&self) -> Result<Vec<String>> {
        let logins = self
            .logins
            .lock()
            .map_err(|_| anyhow::anyhow!("Whitelist storage lock poisoned"))?;
        Ok(logins.clone())
    }

    fn save(&self, logins: &[String]) -> Result<()> {
        let mut stored = self
            .logins
            .lock()
            .map_err(|_| anyhow::anyhow!("Whitelist storage lock poisoned"))?;
        *stored = logins.to_vec();
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
