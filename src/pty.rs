use crate::config::SessionConfig;
use crate::error::ReplayError;
use crate::pty_reader::PtyReader;
use anyhow::{Context, Result};
use portable_pty::{Child, CommandBuilder, MasterPty, PtySize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long `close` lets the shell exit on its own before killing it.
const EXIT_GRACE: Duration = Duration::from_millis(500);

/// Anything the player and prompt detection can type into.
pub trait PtyInput {
    /// Write raw bytes to the shell. A closed terminal is reported as
    /// [`ReplayError::SessionEnded`].
    fn write(&mut self, data: &[u8]) -> Result<(), ReplayError>;
}

/// A shell running inside a PTY
pub struct PtySession {
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
    writer: Box<dyn Write + Send>,
}

impl PtySession {
    /// Spawn the configured shell in a PTY, returning the session and reader separately
    pub fn spawn(config: &SessionConfig) -> Result<(Self, PtyReader)> {
        let pty_system = portable_pty::native_pty_system();

        let pair = pty_system
            .openpty(PtySize {
                rows: 24,
                cols: 80,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to open PTY")?;

        let mut cmd = CommandBuilder::new(resolve_program(&config.shell));
        cmd.env_clear();
        for (key, value) in child_env(config, |name| std::env::var_os(name)) {
            cmd.env(key, value);
        }
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(cwd);
        }

        info!(shell = %config.shell, term = %config.term, "Starting shell");

        let child = pair
            .slave
            .spawn_command(cmd)
            .with_context(|| format!("Failed to spawn shell: {}", config.shell))?;
        // Only the master side is used from here on.
        drop(pair.slave);

        let writer = pair
            .master
            .take_writer()
            .context("Failed to get PTY writer")?;

        let reader = pair
            .master
            .try_clone_reader()
            .context("Failed to get PTY reader")?;

        let session = PtySession {
            master: pair.master,
            child,
            writer,
        };

        Ok((session, PtyReader::spawn(reader)))
    }

    /// Resize the PTY. A zero dimension leaves the geometry untouched.
    pub fn resize(&self, cols: u16, rows: u16) -> Result<()> {
        if cols == 0 || rows == 0 {
            return Ok(());
        }
        debug!(cols, rows, "Resizing PTY");
        self.master
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to resize PTY")?;
        Ok(())
    }

    /// Check if the shell is still running
    pub fn is_running(&mut self) -> bool {
        self.child.try_wait().ok().flatten().is_none()
    }

    /// Close the master side and reap the shell.
    ///
    /// Dropping the writer and master hangs up the terminal. A shell that is
    /// still alive after a short grace period is killed, which in turn ends
    /// the reader's stream.
    pub fn close(self) -> Result<()> {
        let PtySession {
            master,
            mut child,
            writer,
        } = self;
        drop(writer);
        drop(master);

        let deadline = Instant::now() + EXIT_GRACE;
        while Instant::now() < deadline {
            if child.try_wait()?.is_some() {
                info!("Shell exited");
                return Ok(());
            }
            std::thread::sleep(Duration::from_millis(20));
        }

        warn!("Shell still running after hangup, killing it");
        child.kill().context("Failed to kill shell")?;
        child.wait().context("Failed to reap shell")?;
        Ok(())
    }
}

impl PtyInput for PtySession {
    fn write(&mut self, data: &[u8]) -> Result<(), ReplayError> {
        self.writer.write_all(data).map_err(ReplayError::ended)?;
        self.writer.flush().map_err(ReplayError::ended)?;
        Ok(())
    }
}

/// Build the shell's environment from scratch.
///
/// `SHELL` and `TERM` are always set, `PS1` only when non-empty, and every
/// allow-listed name is copied from `lookup` when it has a value there.
fn child_env(
    config: &SessionConfig,
    lookup: impl Fn(&str) -> Option<OsString>,
) -> BTreeMap<String, OsString> {
    let mut env = BTreeMap::new();
    env.insert("SHELL".to_string(), OsString::from(&config.shell));
    env.insert("TERM".to_string(), OsString::from(&config.term));
    if !config.ps1.is_empty() {
        env.insert("PS1".to_string(), OsString::from(&config.ps1));
    }
    for name in &config.env_passthrough {
        if let Some(value) = lookup(name) {
            env.insert(name.clone(), value);
        }
    }
    env
}

/// Resolve a bare program name against this process's `PATH`.
///
/// The shell's own environment is built from scratch and may carry no `PATH`,
/// so the lookup has to happen here.
fn resolve_program(program: &str) -> PathBuf {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.to_path_buf();
    }
    std::env::var_os("PATH")
        .iter()
        .flat_map(|paths| std::env::split_paths(paths))
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig {
            shell: "/bin/sh".to_string(),
            term: "dumb".to_string(),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_env_has_shell_and_term_only_by_default() {
        let env = child_env(&config(), |_| Some(OsString::from("leak")));
        assert_eq!(env.len(), 2);
        assert_eq!(env["SHELL"], "/bin/sh");
        assert_eq!(env["TERM"], "dumb");
    }

    #[test]
    fn test_env_sets_ps1_when_non_empty() {
        let mut config = config();
        config.ps1 = "$ ".to_string();
        let env = child_env(&config, |_| None);
        assert_eq!(env["PS1"], "$ ");
    }

    #[test]
    fn test_env_copies_allow_listed_variables_that_exist() {
        let mut config = config();
        config.env_passthrough = vec!["HOME".to_string(), "MISSING".to_string()];
        let env = child_env(&config, |name| {
            (name == "HOME").then(|| OsString::from("/home/demo"))
        });
        assert_eq!(env["HOME"], "/home/demo");
        assert!(!env.contains_key("MISSING"));
    }

    #[test]
    fn test_resolve_program_keeps_paths() {
        assert_eq!(resolve_program("/bin/sh"), PathBuf::from("/bin/sh"));
        assert_eq!(resolve_program("./shell"), PathBuf::from("./shell"));
    }

    #[test]
    fn test_resolve_program_unknown_name_is_unchanged() {
        assert_eq!(
            resolve_program("definitely-not-a-real-shell"),
            PathBuf::from("definitely-not-a-real-shell")
        );
    }
}
