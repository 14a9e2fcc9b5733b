/*!
 * Clipboard support for projprep
 *
 * Hands canvas text to whichever clipboard helper the system provides.
 */

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// A helper was found but failed
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Anything that can receive text
pub trait Clipboard {
    /// Copy text to the clipboard
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

/// Command-line clipboard helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardProvider {
    /// tmux paste buffer
    Tmux,
    /// Wayland `wl-copy`
    Wayland,
    /// X11 `xclip`
    Xclip,
    /// X11 `xsel`
    Xsel,
    /// macOS `pbcopy`
    MacOS,
    /// Windows / WSL `clip.exe`
    Windows,
}

impl ClipboardProvider {
    /// Program and arguments for this helper
    pub fn command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Tmux => ("tmux", &["load-buffer", "-w", "-"]),
            Self::Wayland => ("wl-copy", &[]),
            Self::Xclip => ("xclip", &["-selection", "clipboard", "-in"]),
            Self::Xsel => ("xsel", &["-b", "-i"]),
            Self::MacOS => ("pbcopy", &[]),
            Self::Windows => ("clip.exe", &[]),
        }
    }

    /// Helpers worth trying on this system, most preferred first
    pub fn detect() -> Vec<Self> {
        let mut candidates = Vec::new();
        if env::var_os("TMUX").is_some() {
            candidates.push(Self::Tmux);
        }
        if cfg!(target_os = "macos") {
            candidates.push(Self::MacOS);
        } else if cfg!(target_os = "windows") || env::var_os("WSL_DISTRO_NAME").is_some() {
            candidates.push(Self::Windows);
        } else {
            if env::var_os("WAYLAND_DISPLAY").is_some() {
                candidates.push(Self::Wayland);
            }
            candidates.push(Self::Xclip);
            candidates.push(Self::Xsel);
        }

        candidates
            .into_iter()
            .filter(|p| command_exists(p.command().0))
            .collect()
    }
}

impl Clipboard for ClipboardProvider {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let (cmd, args) = self.command();
        let mut child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| {
                ClipboardError::CommandFailed(format!("Failed to spawn {}: {}", cmd, e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        let status = child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed(format!(
                "{} exited with status: {}",
                cmd, status
            )))
        }
    }
}

/// Copy text with the first helper that succeeds
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut last_error = None;
    for provider in ClipboardProvider::detect() {
        match provider.copy_to_clipboard(text) {
            Ok(()) => {
                debug!("Copied {} bytes with {:?}", text.len(), provider);
                return Ok(());
            }
            Err(e) => {
                debug!("Clipboard helper {:?} failed: {}", provider, e);
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or(ClipboardError::NoClipboardFound))
}

/// Whether `command` is an executable file on the PATH
pub fn command_exists(command: &str) -> bool {
    let Some(paths) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&paths).any(|dir| is_executable(&dir.join(command)))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
