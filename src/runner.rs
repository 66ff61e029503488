use std::path::Path;
use std::process::{Command, Stdio};
use crate::error::{AssetsError, AssetsResult};

/// Runs external package managers.
///
/// Every call names its working directory explicitly; nothing touches the process's
/// current directory.
pub trait ToolRunner {
    /// Runs `program` with stdout/stderr passed through and returns its exit code.
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> AssetsResult<i32>;

    /// Runs `program` silently and reports whether it succeeded.
    fn probe(&self, program: &str, args: &[&str]) -> bool;
}

/// Runs `program` and turns a non-zero exit into [`AssetsError::ToolFailure`].
pub fn run_checked(runner: &dyn ToolRunner, program: &str, args: &[&str], cwd: &Path) -> AssetsResult<()> {
    let command = format_command(program, args);
    tracing::debug!(command = %command, cwd = %cwd.display(), "running");
    let code = runner.run(program, args, cwd)?;
    if code != 0 {
        return Err(AssetsError::ToolFailure {
            command,
            path: cwd.to_path_buf(),
            code,
        });
    }
    Ok(())
}

pub fn format_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Spawns real processes.
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> AssetsResult<i32> {
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        // killed by a signal
        Ok(status.code().unwrap_or(-1))
    }

    fn probe(&self, program: &str, args: &[&str]) -> bool {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_command() {
        assert_eq!(format_command("npm", &["update", "--depth=9999"]), "npm update --depth=9999");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_checked_reports_failure() {
        let dir = tempdir().unwrap();
        let err = run_checked(&ProcessRunner, "sh", &["-c", "exit 3"], dir.path()).unwrap_err();
        match err {
            AssetsError::ToolFailure { command, path, code } => {
                assert_eq!(command, "sh -c exit 3");
                assert_eq!(path, dir.path());
                assert_eq!(code, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_uses_given_directory() {
        let dir = tempdir().unwrap();
        run_checked(&ProcessRunner, "sh", &["-c", "touch marker"], dir.path()).unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn test_probe_missing_program() {
        assert!(!ProcessRunner.probe("extra-assets-no-such-tool", &["--version"]));
    }
}
