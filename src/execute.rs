use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use colored::Colorize;
use extra_assets::config::{AssetsConfig, Settings};
use extra_assets::graph::ComposerGraph;
use extra_assets::matcher::SemverMatcher;
use extra_assets::orchestrator::Orchestrator;
use extra_assets::runner::ProcessRunner;
use crate::cli::{AssetsCommand, CLI};

pub fn execute(cli: CLI) -> Result<()> {
    let root = match cli.working_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("Working directory {} does not exist", root.display()))?;
    match cli.command {
        AssetsCommand::Install { no_dev } => {
            execute_install(root, !no_dev)
        }
        AssetsCommand::Update { no_dev } => {
            execute_update(root, !no_dev)
        }
    }
}

fn load(root: &Path) -> Result<(Settings, ComposerGraph)> {
    let graph = ComposerGraph::load_root(root)?;
    let config = AssetsConfig::load_layered(root)?;
    let settings = Settings::resolve(root, graph.config(), &config);
    let graph = graph.with_installed(&settings.vendor_dir)?;
    Ok((settings, graph))
}

pub fn execute_install(root: PathBuf, dev_mode: bool) -> Result<()> {
    let (settings, graph) = load(&root)?;
    let matcher = SemverMatcher::new();
    let mut orchestrator = Orchestrator::new(settings, &graph, &ProcessRunner, &matcher);
    orchestrator.on_post_install(dev_mode)?;
    println!("{}", "Assets installed".green());
    Ok(())
}

pub fn execute_update(root: PathBuf, dev_mode: bool) -> Result<()> {
    let (settings, graph) = load(&root)?;
    let lock_file = settings.lock_file.clone();
    let matcher = SemverMatcher::new();
    let mut orchestrator = Orchestrator::new(settings, &graph, &ProcessRunner, &matcher);
    let lock = orchestrator.on_post_update(dev_mode)?;
    println!(
        "{} ({} npm install(s), {} bower package(s) locked in {})",
        "Assets updated".green(),
        lock.npm.len(),
        lock.bower.len(),
        lock_file.display()
    );
    Ok(())
}
