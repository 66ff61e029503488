use std::path::{Path, PathBuf};
use colored::Colorize;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use walkdir::WalkDir;
use crate::error::{AssetsError, AssetsResult};
use crate::manifest::Manifest;
use crate::merge::RequirementSet;
use crate::runner::{run_checked, ToolRunner};
use crate::tree::{describe_drift, LockedDependency, ResolvedTree};

const NPM_SHRINKWRAP: &str = "npm-shrinkwrap.json";
const BOWERRC: &str = ".bowerrc";
const DEFAULT_BOWER_DIRECTORY: &str = "bower_components";

/// The asset package managers we drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ecosystem {
    Npm,
    Bower,
}

impl Ecosystem {
    pub fn name(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Bower => "bower",
        }
    }

    pub fn manifest_file(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "package.json",
            Ecosystem::Bower => "bower.json",
        }
    }

    /// The `name` written into manifests we own.
    pub fn sentinel(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "extra-assets",
            Ecosystem::Bower => "temp-extra-assets",
        }
    }

    /// Loads our manifest in `dir`, or starts a new one.
    ///
    /// # Errors
    /// [`AssetsError::ManifestCollision`] if `dir` holds a manifest we don't own.
    pub fn manifest(&self, dir: &Path) -> AssetsResult<Manifest> {
        Manifest::load_or_create(dir.join(self.manifest_file()), self.sentinel(), self.manifest_defaults())
    }

    fn manifest_defaults(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        if *self == Ecosystem::Npm {
            // keeps npm from warning about missing metadata
            defaults.insert("private".to_string(), Value::Bool(true));
            defaults.insert("readme".to_string(), Value::from(" "));
            defaults.insert("repository".to_string(), json!({ "type": "git" }));
        }
        defaults
    }

    fn install_args(&self) -> &'static [&'static str] {
        match self {
            Ecosystem::Npm => &["install"],
            Ecosystem::Bower => &["--allow-root", "install"],
        }
    }

    fn update_args(&self) -> &'static [&'static str] {
        match self {
            Ecosystem::Npm => &["update", "--depth=9999"],
            Ecosystem::Bower => &["--allow-root", "update"],
        }
    }

    fn prune_args(&self) -> &'static [&'static str] {
        match self {
            Ecosystem::Npm => &["prune"],
            Ecosystem::Bower => &["--allow-root", "prune"],
        }
    }
}

#[derive(Deserialize, Default)]
struct Shrinkwrap {
    #[serde(default)]
    dependencies: ResolvedTree,
}

#[derive(Deserialize)]
struct BowerRc {
    directory: Option<String>,
}

/// Metadata bower leaves in every installed component.
#[derive(Deserialize)]
struct InstalledComponent {
    name: Option<String>,
    version: Option<String>,
    #[serde(rename = "_release")]
    release: Option<String>,
    #[serde(rename = "_source")]
    source: Option<String>,
}

/// Drives one package manager through manifest, install, update, prune and snapshot.
pub struct AssetInstaller<'a> {
    ecosystem: Ecosystem,
    program: String,
    runner: &'a dyn ToolRunner,
    project_root: PathBuf,
    bower_directory: String,
}

impl<'a> AssetInstaller<'a> {
    pub fn npm(program: &str, runner: &'a dyn ToolRunner, project_root: &Path) -> Self {
        Self {
            ecosystem: Ecosystem::Npm,
            program: program.to_string(),
            runner,
            project_root: project_root.to_path_buf(),
            bower_directory: DEFAULT_BOWER_DIRECTORY.to_string(),
        }
    }

    /// `components_dir` is written to `.bowerrc` when the project has none yet.
    pub fn bower(program: &str, runner: &'a dyn ToolRunner, project_root: &Path, components_dir: &str) -> Self {
        Self {
            ecosystem: Ecosystem::Bower,
            program: program.to_string(),
            runner,
            project_root: project_root.to_path_buf(),
            bower_directory: components_dir.to_string(),
        }
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    /// Installs `requirements` at `path` and returns the tree that actually got installed.
    ///
    /// With a `pinned` tree the install must reproduce it exactly; any drift is an
    /// [`AssetsError::Reproducibility`]. Returns `Ok(None)` without running anything when there
    /// is nothing to install.
    pub fn install(
        &self,
        path: &Path,
        requirements: &RequirementSet,
        pinned: Option<&ResolvedTree>,
    ) -> AssetsResult<Option<ResolvedTree>> {
        let dependencies = match (self.ecosystem, pinned) {
            (Ecosystem::Bower, Some(tree)) => pinned_bower_requirements(tree),
            _ => requirements.clone(),
        };
        if dependencies.is_empty() {
            tracing::debug!(ecosystem = self.ecosystem.name(), path = %path.display(), "nothing to install");
            return Ok(None);
        }

        let mut manifest = self.ecosystem.manifest(path)?;
        manifest.set_dependencies(&dependencies);
        manifest.save()?;
        self.prepare(path, pinned)?;

        println!();
        println!(
            "{}",
            format!("installing {} dependencies in '{}'...", self.ecosystem.name(), path.display()).bold()
        );
        self.step(self.ecosystem.install_args(), path)?;
        if pinned.is_none() {
            self.step(self.ecosystem.update_args(), path)?;
        }
        self.step(self.ecosystem.prune_args(), path)?;
        let resolved = self.snapshot(path)?;

        if let Some(expected) = pinned {
            if let Some(drift) = describe_drift(expected, &resolved) {
                return Err(AssetsError::Reproducibility {
                    path: path.to_path_buf(),
                    drift,
                    cache_dir: self.cache_dir(path)?,
                });
            }
            tracing::info!(ecosystem = self.ecosystem.name(), path = %path.display(), "install matches lock file");
        }

        self.cleanup(path)?;
        Ok(Some(resolved))
    }

    fn step(&self, args: &[&str], path: &Path) -> AssetsResult<()> {
        run_checked(self.runner, &self.program, args, path)
    }

    /// Writes the ecosystem's side files next to the manifest.
    fn prepare(&self, path: &Path, pinned: Option<&ResolvedTree>) -> AssetsResult<()> {
        match self.ecosystem {
            Ecosystem::Npm => {
                let shrinkwrap = path.join(NPM_SHRINKWRAP);
                match pinned {
                    Some(tree) => {
                        let content = json!({
                            "name": self.ecosystem.sentinel(),
                            "dependencies": tree,
                        });
                        std::fs::write(&shrinkwrap, serde_json::to_string_pretty(&content)?)?;
                    }
                    None => {
                        if shrinkwrap.exists() {
                            std::fs::remove_file(&shrinkwrap)?;
                        }
                    }
                }
            }
            Ecosystem::Bower => {
                let bowerrc = path.join(BOWERRC);
                if !bowerrc.exists() {
                    let content = json!({ "directory": self.bower_directory });
                    std::fs::write(&bowerrc, serde_json::to_string_pretty(&content)?)?;
                }
            }
        }
        Ok(())
    }

    fn snapshot(&self, path: &Path) -> AssetsResult<ResolvedTree> {
        match self.ecosystem {
            Ecosystem::Npm => {
                self.step(&["shrinkwrap"], path)?;
                let content = std::fs::read_to_string(path.join(NPM_SHRINKWRAP))?;
                let shrinkwrap: Shrinkwrap = serde_json::from_str(&content)?;
                Ok(shrinkwrap.dependencies)
            }
            Ecosystem::Bower => read_bower_components(&path.join(self.bower_components_dir(path)?)),
        }
    }

    fn bower_components_dir(&self, path: &Path) -> AssetsResult<String> {
        let bowerrc = path.join(BOWERRC);
        if !bowerrc.exists() {
            return Ok(DEFAULT_BOWER_DIRECTORY.to_string());
        }
        let rc: BowerRc = serde_json::from_str(&std::fs::read_to_string(bowerrc)?)?;
        Ok(rc.directory.unwrap_or_else(|| DEFAULT_BOWER_DIRECTORY.to_string()))
    }

    /// The directory to delete when an install can't reproduce the lock file.
    fn cache_dir(&self, path: &Path) -> AssetsResult<PathBuf> {
        Ok(match self.ecosystem {
            Ecosystem::Npm => path.join("node_modules"),
            Ecosystem::Bower => path.join(self.bower_components_dir(path)?),
        })
    }

    /// The project root keeps its manifest so users can see what got installed.
    fn cleanup(&self, path: &Path) -> AssetsResult<()> {
        if path != self.project_root {
            std::fs::remove_file(path.join(self.ecosystem.manifest_file()))?;
        }
        let shrinkwrap = path.join(NPM_SHRINKWRAP);
        if self.ecosystem == Ecosystem::Npm && shrinkwrap.exists() {
            std::fs::remove_file(shrinkwrap)?;
        }
        Ok(())
    }
}

/// bower has no lock file of its own, so a pinned install asks for the exact releases.
fn pinned_bower_requirements(tree: &ResolvedTree) -> RequirementSet {
    tree.iter()
        .map(|(name, dep)| {
            let spec = match &dep.resolved {
                Some(source) => format!("{}#{}", source, dep.version),
                None => dep.version.clone(),
            };
            (name.clone(), spec)
        })
        .collect()
}

fn read_bower_components(directory: &Path) -> AssetsResult<ResolvedTree> {
    let mut tree = ResolvedTree::new();
    if !directory.exists() {
        return Ok(tree);
    }
    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = entry?;
        let meta_path = entry.path().join(".bower.json");
        if !entry.file_type().is_dir() || !meta_path.exists() {
            continue;
        }
        let meta: InstalledComponent = serde_json::from_str(&std::fs::read_to_string(&meta_path)?)?;
        let Some(version) = meta.release.or(meta.version) else {
            tracing::warn!(path = %meta_path.display(), "installed component has no release, skipping");
            continue;
        };
        let name = meta
            .name
            .unwrap_or_else(|| entry.file_name().to_string_lossy().to_string());
        let mut dep = LockedDependency::new(&version);
        dep.resolved = meta.source;
        tree.insert(name, dep);
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_pinned_bower_requirements_use_source() {
        let mut tree = ResolvedTree::new();
        let mut jquery = LockedDependency::new("2.1.4");
        jquery.resolved = Some("https://github.com/jquery/jquery-dist.git".to_string());
        tree.insert("jquery".to_string(), jquery);
        tree.insert("local".to_string(), LockedDependency::new("1.0.0"));

        let reqs = pinned_bower_requirements(&tree);
        assert_eq!(reqs["jquery"], "https://github.com/jquery/jquery-dist.git#2.1.4");
        assert_eq!(reqs["local"], "1.0.0");
    }

    #[test]
    fn test_read_bower_components() {
        let dir = tempdir().unwrap();
        let jquery = dir.path().join("jquery");
        std::fs::create_dir_all(&jquery).unwrap();
        std::fs::write(
            jquery.join(".bower.json"),
            r#"{"name": "jquery", "_release": "2.1.4", "_source": "https://github.com/jquery/jquery-dist.git"}"#,
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("not-a-component")).unwrap();

        let tree = read_bower_components(dir.path()).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree["jquery"].version, "2.1.4");
        assert_eq!(tree["jquery"].resolved.as_deref(), Some("https://github.com/jquery/jquery-dist.git"));
    }

    #[test]
    fn test_missing_components_dir_is_empty() {
        let dir = tempdir().unwrap();
        assert!(read_bower_components(&dir.path().join("bower_components")).unwrap().is_empty());
    }
}
