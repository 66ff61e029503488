use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use crate::error::AssetsResult;
use crate::util::is_executable;

/// Creates a platform-specific "shim" forwarding execution to `target`.
///
/// On Unix this is a symbolic link at `shim_path`. On Windows it is a `.bat` script next to
/// `shim_path` that calls `target`. An existing shim is replaced.
///
/// # Errors
///
/// Returns an error if the old shim can't be removed or the new one can't be written.
pub fn create_shim<P: AsRef<Path>>(target: P, shim_path: P) -> AssetsResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::symlink;
        let shim_path = shim_path.as_ref();
        if shim_path.symlink_metadata().is_ok() {
            std::fs::remove_file(shim_path)?;
        }
        symlink(target, shim_path)?;
    }
    #[cfg(windows)]
    {
        let script = format!(
            "@echo off\r\ncall \"{}\" %*\r\n",
            target.as_ref().display()
        );
        std::fs::write(shim_path.as_ref().with_extension("bat"), script)?;
    }
    Ok(())
}

/// Publishes every executable directly under `source_dir` as a shim in `bin_dir`.
///
/// Used for `node_modules/.bin` of the root npm install. A missing `source_dir` publishes
/// nothing. Running it again with the same executables leaves the same shims.
///
/// Returns the shims written.
pub fn publish_binaries<P: AsRef<Path>, Q: AsRef<Path>>(source_dir: P, bin_dir: Q) -> AssetsResult<Vec<PathBuf>> {
    let source_dir = source_dir.as_ref();
    let bin_dir = bin_dir.as_ref();
    let mut published = Vec::new();
    if !source_dir.is_dir() {
        return Ok(published);
    }
    std::fs::create_dir_all(bin_dir)?;
    let source_dir = source_dir.canonicalize()?;

    let mut entries: Vec<_> = WalkDir::new(&source_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .collect::<Result<_, _>>()?;
    entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));

    for entry in entries {
        // node_modules/.bin entries are usually symlinks, judge what they point at
        let target = entry.path().to_path_buf();
        if !target.is_file() || !is_executable(&target) {
            continue;
        }
        let shim = bin_dir.join(entry.file_name());
        create_shim(&target, &shim)?;
        tracing::debug!(shim = %shim.display(), target = %target.display(), "published binary");
        published.push(shim);
    }
    Ok(published)
}
