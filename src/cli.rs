use std::path::PathBuf;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    #[command(subcommand)]
    pub(crate) command: AssetsCommand,
    /// Run as if started in this directory (the one holding `composer.json`)
    #[clap(short = 'd', long, global = true)]
    pub(crate) working_dir: Option<PathBuf>,
    /// Log every step and tool invocation
    #[clap(short, long, global = true)]
    pub(crate) verbose: bool,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum AssetsCommand {
    /// Installs assets exactly as recorded in `extra-assets.lock`. Without a lock file this behaves like `update`.
    /// Meant for Composer's `post-install-cmd`
    Install {
        /// Skip dev-only requirements of the root package
        #[clap(long)]
        no_dev: bool,
    },
    /// Resolves all assets again and rewrites `extra-assets.lock`. Meant for Composer's `post-update-cmd`
    Update {
        /// Skip dev-only requirements of the root package
        #[clap(long)]
        no_dev: bool,
    },
}
