use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Last date recorded by a previous run, plus any trouble hit reading it.
#[derive(Debug, Default)]
pub struct StoredDate {
    pub value: Option<String>,
    pub warnings: Vec<String>,
}

pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absence is the normal first-run case. Unreadable content is downgraded
    /// to a warning so a stale or mangled state file never kills a check.
    pub fn load(&self) -> StoredDate {
        if !self.path.exists() {
            return StoredDate::default();
        }

        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                StoredDate {
                    value: (!trimmed.is_empty()).then(|| trimmed.to_string()),
                    warnings: Vec::new(),
                }
            }
            Err(err) => StoredDate {
                value: None,
                warnings: vec![format!(
                    "failed to read state file {}: {}",
                    self.path.display(),
                    err
                )],
            },
        }
    }

    /// Overwrites the file with exactly the raw date string.
    pub fn record(&self, raw_date: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create state directory {}", parent.display())
                })?;
            }
        }
        fs::write(&self.path, raw_date)
            .with_context(|| format!("failed to write state file {}", self.path.display()))
    }
}
