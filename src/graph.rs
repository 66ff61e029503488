use std::path::{Path, PathBuf};
use serde::Deserialize;
use crate::error::{AssetsError, AssetsResult};
use crate::package::Package;

/// Read-only access to the host's dependency graph.
pub trait PackageGraph {
    /// The project being installed.
    fn root(&self) -> &Package;
    /// Installed packages in canonical order.
    fn packages(&self) -> &[Package];
}

/// A package graph held in memory.
#[derive(Debug, Clone)]
pub struct StaticGraph {
    pub root: Package,
    pub packages: Vec<Package>,
}

impl PackageGraph for StaticGraph {
    fn root(&self) -> &Package {
        &self.root
    }

    fn packages(&self) -> &[Package] {
        &self.packages
    }
}

#[derive(Deserialize, Debug)]
struct RawPackage {
    name: Option<String>,
    extra: Option<serde_json::Value>,
    #[serde(default)]
    config: ComposerConfig,
}

/// The subset of the `config` section of `composer.json` we care about.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ComposerConfig {
    pub vendor_dir: Option<String>,
    pub bin_dir: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InstalledFile {
    Composer1(Vec<RawPackage>),
    Composer2 { packages: Vec<RawPackage> },
}

/// The graph of a Composer project: `composer.json` plus `vendor/composer/installed.json`.
#[derive(Debug)]
pub struct ComposerGraph {
    root: Package,
    packages: Vec<Package>,
    config: ComposerConfig,
}

impl ComposerGraph {
    /// Reads the root manifest only; use [`ComposerGraph::with_installed`] to add the installed packages.
    pub fn load_root<P: AsRef<Path>>(project_root: P) -> AssetsResult<Self> {
        let manifest = project_root.as_ref().join("composer.json");
        if !manifest.exists() {
            return Err(AssetsError::Graph(format!(
                "composer.json not found in '{}'",
                project_root.as_ref().display()
            )));
        }
        let raw: RawPackage = serde_json::from_str(&std::fs::read_to_string(&manifest)?)?;
        let name = raw.name.unwrap_or_else(|| "__root__".to_string());
        Ok(Self {
            root: Package::from_extra(&name, raw.extra),
            packages: Vec::new(),
            config: raw.config,
        })
    }

    /// Loads the installed packages from `<vendor_dir>/composer/installed.json`.
    ///
    /// A missing file means nothing is installed yet.
    pub fn with_installed<P: AsRef<Path>>(mut self, vendor_dir: P) -> AssetsResult<Self> {
        let installed = vendor_dir.as_ref().join("composer").join("installed.json");
        if !installed.exists() {
            tracing::debug!(path = %installed.display(), "no installed.json, graph has no packages");
            return Ok(self);
        }
        let file: InstalledFile = serde_json::from_str(&std::fs::read_to_string(&installed)?)?;
        let raw = match file {
            InstalledFile::Composer2 { packages } => packages,
            InstalledFile::Composer1(packages) => packages,
        };
        self.packages = raw
            .into_iter()
            .filter_map(|p| {
                let name = p.name?;
                Some(Package::from_extra(&name, p.extra))
            })
            .collect();
        Ok(self)
    }

    pub fn load<P: AsRef<Path>, V: AsRef<Path>>(project_root: P, vendor_dir: V) -> AssetsResult<Self> {
        Self::load_root(project_root)?.with_installed(vendor_dir)
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Where an isolated package's assets get installed.
    pub fn install_path(vendor_dir: &Path, package: &str) -> PathBuf {
        vendor_dir.join(package)
    }
}

impl PackageGraph for ComposerGraph {
    fn root(&self) -> &Package {
        &self.root
    }

    fn packages(&self) -> &[Package] {
        &self.packages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_composer2_layout() {
        let dir = tempdir().unwrap();
        write(
            &dir.path().join("composer.json"),
            r#"{"name": "acme/app", "config": {"vendor-dir": "lib"}, "extra": {"require-bower": {"jquery": "~2.1"}}}"#,
        );
        write(
            &dir.path().join("lib/composer/installed.json"),
            r#"{"packages": [{"name": "acme/a", "extra": {"require-npm": {"left-pad": "^1.0.0"}}}, {"name": "acme/b"}], "dev": true}"#,
        );
        let graph = ComposerGraph::load(dir.path(), &dir.path().join("lib")).unwrap();
        assert_eq!(graph.root().name, "acme/app");
        assert_eq!(graph.config().vendor_dir.as_deref(), Some("lib"));
        assert_eq!(graph.packages().len(), 2);
        assert!(graph.packages()[0].extras.is_some());
        assert!(graph.packages()[1].extras.is_none());
    }

    #[test]
    fn test_load_composer1_layout() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("composer.json"), "{}");
        write(
            &dir.path().join("vendor/composer/installed.json"),
            r#"[{"name": "acme/a"}, {"name": "acme/b"}]"#,
        );
        let graph = ComposerGraph::load(dir.path(), &dir.path().join("vendor")).unwrap();
        let names: Vec<_> = graph.packages().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["acme/a", "acme/b"]);
    }

    #[test]
    fn test_missing_installed_json_is_empty() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("composer.json"), r#"{"name": "acme/app"}"#);
        let graph = ComposerGraph::load(dir.path(), &dir.path().join("vendor")).unwrap();
        assert!(graph.packages().is_empty());
    }

    #[test]
    fn test_missing_composer_json_fails() {
        let dir = tempdir().unwrap();
        let err = ComposerGraph::load_root(dir.path()).unwrap_err();
        assert!(matches!(err, AssetsError::Graph(_)));
    }
}
