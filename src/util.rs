use std::path::{Path, PathBuf};

/// Makes `path` relative to `base` when it lies inside it; otherwise returns it unchanged.
///
/// `.bowerrc` stores the components directory this way so the project can be moved.
pub fn relative_to<P: AsRef<Path>, B: AsRef<Path>>(path: P, base: B) -> PathBuf {
    let path = path.as_ref();
    match path.strip_prefix(base.as_ref()) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

/// Renders a path with forward slashes, as bower and npm expect in their config files.
pub fn to_slash<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Checks if a given path is an executable file on Unix.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Checks if a given path has a Windows executable extension (.exe, .bat, .cmd).
#[cfg(windows)]
pub fn is_executable(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        let ext = ext.to_ascii_lowercase();
        matches!(ext.as_str(), "exe" | "bat" | "cmd")
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_to_inside_base() {
        let rel = relative_to("/project/vendor", "/project");
        assert_eq!(rel, PathBuf::from("vendor"));
    }

    #[test]
    fn test_relative_to_outside_base() {
        let rel = relative_to("/opt/vendor", "/project");
        assert_eq!(rel, PathBuf::from("/opt/vendor"));
    }

    #[test]
    fn test_relative_to_same_dir() {
        assert_eq!(relative_to("/project", "/project"), PathBuf::from("/project"));
    }

    #[test]
    fn test_to_slash() {
        let path = PathBuf::from("vendor").join("bower_components");
        assert_eq!(to_slash(path), "vendor/bower_components");
    }
}
