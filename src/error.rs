use std::path::PathBuf;
use thiserror::Error;

pub type AssetsResult<T> = Result<T, AssetsError>;

/// Every failure aborts the whole run. There is no partial success.
#[derive(Error, Debug)]
pub enum AssetsError {
    /// Two packages declare incompatible specifiers for the same dependency.
    #[error(
        "{package} requires {dependency} '{specifier}' but {existing_package} already requires incompatible '{existing_specifier}'"
    )]
    Conflict {
        dependency: String,
        existing_package: String,
        existing_specifier: String,
        package: String,
        specifier: String,
    },

    /// A manifest not written by us already exists at an install path.
    #[error("Can't install dependencies in '{}': there is already a {file} not managed by extra-assets", .path.display())]
    ManifestCollision { path: PathBuf, file: String },

    #[error("`{command}` failed in '{}' (exit code {code})", .path.display())]
    ToolFailure {
        command: String,
        path: PathBuf,
        code: i32,
    },

    #[error(
        "Installed dependencies in '{}' differ from the lock file ({drift}). Packages probably need to be downgraded. Consider deleting '{}' and running `extra-assets update`.",
        .path.display(),
        .cache_dir.display()
    )]
    Reproducibility {
        path: PathBuf,
        drift: String,
        cache_dir: PathBuf,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("WalkDir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Package graph error: {0}")]
    Graph(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
