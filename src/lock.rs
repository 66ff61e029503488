use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::AssetsResult;
use crate::tree::ResolvedTree;

/// Key of the root project's npm install in [`AssetsLock::npm`].
pub const SELF_KEY: &str = "self";

/// Contents of `extra-assets.lock`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AssetsLock {
    /// The root project's merged bower install.
    #[serde(rename = "bower-dependencies", default)]
    pub bower: ResolvedTree,
    /// npm installs keyed by isolated package name, or [`SELF_KEY`] for the root project.
    #[serde(rename = "npm-dependencies", default)]
    pub npm: BTreeMap<String, ResolvedTree>,
}

impl AssetsLock {
    pub fn is_empty(&self) -> bool {
        self.bower.is_empty() && self.npm.is_empty()
    }
}

/// Reads and writes the lock file.
#[derive(Debug, Clone)]
pub struct LockStore {
    path: PathBuf,
}

impl LockStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when no lock has been written yet.
    pub fn read(&self) -> AssetsResult<Option<AssetsLock>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn write(&self, lock: &AssetsLock) -> AssetsResult<()> {
        let mut content = serde_json::to_string_pretty(lock)?;
        content.push('\n');
        fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), "lock file written");
        Ok(())
    }
}
