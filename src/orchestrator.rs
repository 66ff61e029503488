use std::path::PathBuf;
use crate::collector::{collect, CollectedRequirements};
use crate::config::Settings;
use crate::error::AssetsResult;
use crate::graph::{ComposerGraph, PackageGraph};
use crate::installer::{AssetInstaller, Ecosystem};
use crate::lock::{AssetsLock, LockStore, SELF_KEY};
use crate::matcher::VersionMatcher;
use crate::merge::RequirementSet;
use crate::runner::ToolRunner;
use crate::shims::publish_binaries;
use crate::tree::ResolvedTree;
use crate::util::{relative_to, to_slash};

/// Where a run currently is. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Idle,
    Collecting,
    /// Installing npm dependencies for a package, or [`SELF_KEY`] for the root project.
    InstallingNpm(String),
    Linking,
    InstallingBower,
    Locking,
    Done,
    Failed,
}

/// Runs the `update` and `install` flows over a package graph.
pub struct Orchestrator<'a> {
    settings: Settings,
    graph: &'a dyn PackageGraph,
    runner: &'a dyn ToolRunner,
    matcher: &'a dyn VersionMatcher,
    state: State,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        settings: Settings,
        graph: &'a dyn PackageGraph,
        runner: &'a dyn ToolRunner,
        matcher: &'a dyn VersionMatcher,
    ) -> Self {
        Self {
            settings,
            graph,
            runner,
            matcher,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Replays the lock file and checks every install reproduces it.
    ///
    /// Without a lock file this is the same as [`Orchestrator::on_post_update`].
    pub fn on_post_install(&mut self, dev_mode: bool) -> AssetsResult<()> {
        let lock = match LockStore::new(&self.settings.lock_file).read() {
            Ok(Some(lock)) => lock,
            Ok(None) => {
                tracing::info!("no lock file, resolving assets from scratch");
                return self.on_post_update(dev_mode).map(|_| ());
            }
            Err(e) => return self.settle(Err(e)),
        };
        let result = self.install_locked(dev_mode, &lock);
        self.settle(result)
    }

    /// Resolves everything afresh and writes a new lock file once every install succeeded.
    pub fn on_post_update(&mut self, dev_mode: bool) -> AssetsResult<AssetsLock> {
        let result = self.update(dev_mode);
        self.settle(result)
    }

    fn transition(&mut self, state: State) {
        tracing::debug!(from = ?self.state, to = ?state, "state");
        self.state = state;
    }

    fn settle<T>(&mut self, result: AssetsResult<T>) -> AssetsResult<T> {
        if let Err(e) = &result {
            tracing::debug!(state = ?self.state, error = %e, "run aborted");
            self.transition(State::Failed);
        }
        result
    }

    fn collect(&mut self, dev_mode: bool) -> AssetsResult<CollectedRequirements> {
        self.transition(State::Collecting);
        collect(self.graph, dev_mode, self.matcher)
    }

    fn update(&mut self, dev_mode: bool) -> AssetsResult<AssetsLock> {
        let collected = self.collect(dev_mode)?;
        let root = self.settings.project_root.clone();
        let npm_program = self.settings.npm_program();
        let npm = AssetInstaller::npm(&npm_program, self.runner, &root);
        let mut lock = AssetsLock::default();

        for isolated in &collected.npm_isolated {
            self.transition(State::InstallingNpm(isolated.package.clone()));
            let path = ComposerGraph::install_path(&self.settings.vendor_dir, &isolated.package);
            if let Some(tree) = npm.install(&path, &isolated.requirements, None)?.filter(|t| !t.is_empty()) {
                lock.npm.insert(isolated.package.clone(), tree);
            }
        }
        self.transition(State::InstallingNpm(SELF_KEY.to_string()));
        if let Some(tree) = npm.install(&root, &collected.npm_exposed, None)?.filter(|t| !t.is_empty()) {
            lock.npm.insert(SELF_KEY.to_string(), tree);
        }

        self.transition(State::Linking);
        let published = publish_binaries(root.join("node_modules").join(".bin"), &self.settings.bin_dir)?;
        if !published.is_empty() {
            tracing::info!(count = published.len(), bin_dir = %self.settings.bin_dir.display(), "linked npm binaries");
        }

        self.transition(State::InstallingBower);
        if let Some(tree) = self.install_bower(&collected.bower, None)? {
            lock.bower = tree;
        }

        self.transition(State::Locking);
        LockStore::new(&self.settings.lock_file).write(&lock)?;
        self.transition(State::Done);
        Ok(lock)
    }

    fn install_locked(&mut self, dev_mode: bool, lock: &AssetsLock) -> AssetsResult<()> {
        let collected = self.collect(dev_mode)?;
        let root = self.settings.project_root.clone();
        let npm_program = self.settings.npm_program();
        let npm = AssetInstaller::npm(&npm_program, self.runner, &root);

        for stale in lock.npm.keys().filter(|key| key.as_str() != SELF_KEY && collected.isolated(key).is_none()) {
            tracing::warn!(package = %stale, "locked npm dependencies are no longer required, skipping");
        }

        // isolated packages first in graph order, the root project last
        for isolated in &collected.npm_isolated {
            let Some(tree) = lock.npm.get(&isolated.package) else {
                tracing::warn!(package = %isolated.package, "no locked npm dependencies, skipping");
                continue;
            };
            self.transition(State::InstallingNpm(isolated.package.clone()));
            let path = ComposerGraph::install_path(&self.settings.vendor_dir, &isolated.package);
            npm.install(&path, &isolated.requirements, Some(tree))?;
        }
        if let Some(tree) = lock.npm.get(SELF_KEY) {
            if collected.npm_exposed.is_empty() {
                tracing::warn!(package = SELF_KEY, "locked npm dependencies are no longer required, skipping");
            } else {
                self.transition(State::InstallingNpm(SELF_KEY.to_string()));
                npm.install(&root, &collected.npm_exposed, Some(tree))?;
            }
        }

        if !lock.bower.is_empty() {
            self.transition(State::InstallingBower);
            self.install_bower(&collected.bower, Some(&lock.bower))?;
        }
        self.transition(State::Done);
        Ok(())
    }

    fn install_bower(
        &self,
        requirements: &RequirementSet,
        pinned: Option<&ResolvedTree>,
    ) -> AssetsResult<Option<ResolvedTree>> {
        if requirements.is_empty() && pinned.is_none() {
            return Ok(None);
        }
        // ownership is checked before anything runs, bootstrapping bower included
        Ecosystem::Bower.manifest(&self.settings.project_root)?;
        let program = self.bower_program()?;
        let components = format!(
            "{}/bower_components",
            to_slash(relative_to(&self.settings.vendor_dir, &self.settings.project_root))
        );
        let bower = AssetInstaller::bower(&program, self.runner, &self.settings.project_root, &components);
        bower.install(&self.settings.project_root, requirements, pinned)
    }

    /// The configured bower, else bower from `PATH`, else a copy installed with npm under the vendor dir.
    fn bower_program(&self) -> AssetsResult<String> {
        if let Some(bower) = &self.settings.bower {
            return Ok(bower.clone());
        }
        if self.runner.probe("bower", &["--version"]) {
            return Ok("bower".to_string());
        }
        let dir = self.bower_bootstrap_dir();
        tracing::info!(path = %dir.display(), "bower not found, installing it locally");
        std::fs::create_dir_all(&dir)?;
        let npm_program = self.settings.npm_program();
        let npm = AssetInstaller::npm(&npm_program, self.runner, &self.settings.project_root);
        let mut requirements = RequirementSet::new();
        requirements.insert("bower".to_string(), "*".to_string());
        npm.install(&dir, &requirements, None)?;
        let bin = if cfg!(windows) { "bower.cmd" } else { "bower" };
        Ok(dir.join("node_modules").join(".bin").join(bin).to_string_lossy().to_string())
    }

    fn bower_bootstrap_dir(&self) -> PathBuf {
        self.settings.vendor_dir.join(".extra-assets").join("bower")
    }
}
