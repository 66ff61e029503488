use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use crate::error::{AssetsError, AssetsResult};
use crate::graph::ComposerConfig;

/// Project-level configuration file, looked up next to `composer.json`.
pub const CONFIG_FILE: &str = "extra-assets.toml";
pub const DEFAULT_LOCK_FILE: &str = "extra-assets.lock";

/// Contents of an `extra-assets.toml` file. Every key is optional.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct AssetsConfig {
    /// Overrides Composer's `vendor-dir`.
    pub vendor_dir: Option<String>,
    /// Overrides Composer's `bin-dir`; shims for npm binaries go here.
    pub bin_dir: Option<String>,
    /// npm command to run.
    pub npm: Option<String>,
    /// bower command to run. Without one, bower is looked up on `PATH` or installed locally.
    pub bower: Option<String>,
    /// Lock file name, relative to the project root.
    pub lock_file: Option<String>,
}

impl AssetsConfig {
    /// Loads a config file; a missing file is an empty config.
    pub fn load<P: AsRef<Path>>(path: P) -> AssetsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Keys set in `other` win.
    pub fn overlay(self, other: AssetsConfig) -> AssetsConfig {
        AssetsConfig {
            vendor_dir: other.vendor_dir.or(self.vendor_dir),
            bin_dir: other.bin_dir.or(self.bin_dir),
            npm: other.npm.or(self.npm),
            bower: other.bower.or(self.bower),
            lock_file: other.lock_file.or(self.lock_file),
        }
    }

    /// `config.toml` in the per-user config directory.
    pub fn global_path() -> AssetsResult<PathBuf> {
        let dirs = ProjectDirs::from("org", "extra-assets", "extra-assets")
            .ok_or_else(|| AssetsError::Config("Could not get project directories".to_string()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Global config overlaid with the project's `extra-assets.toml`.
    pub fn load_layered<P: AsRef<Path>>(project_root: P) -> AssetsResult<Self> {
        let global = match Self::global_path() {
            Ok(path) => Self::load(path)?,
            Err(e) => {
                tracing::debug!(error = %e, "no global config directory");
                Self::default()
            }
        };
        let local = Self::load(project_root.as_ref().join(CONFIG_FILE))?;
        Ok(global.overlay(local))
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub project_root: PathBuf,
    pub vendor_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub npm: Option<String>,
    pub bower: Option<String>,
    pub lock_file: PathBuf,
}

impl Settings {
    /// Resolves paths from Composer's config, overridden by `config`.
    ///
    /// Relative directories are taken relative to `project_root`. `{$vendor-dir}` in the bin
    /// dir is expanded the way Composer does it.
    pub fn resolve(project_root: &Path, composer: &ComposerConfig, config: &AssetsConfig) -> Settings {
        let vendor = config
            .vendor_dir
            .clone()
            .or_else(|| composer.vendor_dir.clone())
            .unwrap_or_else(|| "vendor".to_string());
        let bin = config
            .bin_dir
            .clone()
            .or_else(|| composer.bin_dir.clone())
            .unwrap_or_else(|| "{$vendor-dir}/bin".to_string())
            .replace("{$vendor-dir}", &vendor);
        let lock_file = config
            .lock_file
            .clone()
            .unwrap_or_else(|| DEFAULT_LOCK_FILE.to_string());
        Settings {
            project_root: project_root.to_path_buf(),
            vendor_dir: project_root.join(vendor),
            bin_dir: project_root.join(bin),
            npm: config.npm.clone(),
            bower: config.bower.clone(),
            lock_file: project_root.join(lock_file),
        }
    }

    /// The configured npm, else `<bin-dir>/npm` when a Composer package put one there, else `npm`.
    pub fn npm_program(&self) -> String {
        if let Some(npm) = &self.npm {
            return npm.clone();
        }
        let local = self.bin_dir.join("npm");
        if local.exists() {
            return local.to_string_lossy().to_string();
        }
        "npm".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let root = PathBuf::from("/project");
        let settings = Settings::resolve(&root, &ComposerConfig::default(), &AssetsConfig::default());
        assert_eq!(settings.vendor_dir, root.join("vendor"));
        assert_eq!(settings.bin_dir, root.join("vendor/bin"));
        assert_eq!(settings.lock_file, root.join("extra-assets.lock"));
        assert_eq!(settings.npm_program(), "npm");
    }

    #[test]
    fn test_composer_config_and_overrides() {
        let root = PathBuf::from("/project");
        let composer = ComposerConfig {
            vendor_dir: Some("lib".to_string()),
            bin_dir: Some("{$vendor-dir}/tools".to_string()),
        };
        let settings = Settings::resolve(&root, &composer, &AssetsConfig::default());
        assert_eq!(settings.bin_dir, root.join("lib/tools"));

        let config = AssetsConfig {
            bin_dir: Some("bin".to_string()),
            npm: Some("/usr/local/bin/npm".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&root, &composer, &config);
        assert_eq!(settings.vendor_dir, root.join("lib"));
        assert_eq!(settings.bin_dir, root.join("bin"));
        assert_eq!(settings.npm_program(), "/usr/local/bin/npm");
    }

    #[test]
    fn test_load_and_overlay() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "bower = \"/opt/bower\"\nlock-file = \"assets.lock\"\n").unwrap();
        let local = AssetsConfig::load(dir.path().join(CONFIG_FILE)).unwrap();
        let global = AssetsConfig {
            bower: Some("bower".to_string()),
            npm: Some("pnpm".to_string()),
            ..Default::default()
        };
        let merged = global.overlay(local);
        assert_eq!(merged.bower.as_deref(), Some("/opt/bower"));
        assert_eq!(merged.npm.as_deref(), Some("pnpm"));
        assert_eq!(merged.lock_file.as_deref(), Some("assets.lock"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        assert_eq!(AssetsConfig::load(dir.path().join(CONFIG_FILE)).unwrap(), AssetsConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "npm = [").unwrap();
        assert!(matches!(AssetsConfig::load(dir.path().join(CONFIG_FILE)), Err(AssetsError::Toml(_))));
    }
}
