//! Copying block text to the system clipboard.
//!
//! [`ClipboardHelper`] tries a primary backend first and falls back to a
//! secondary one. Either way a success is confirmed to the user with a short
//! toast, and a failure is reported in the status area instead of a toast.
//!
//! Long-running callers use the in-process [`SystemClipboard`] (behind the
//! `clipboard` feature) as primary and pipe text into a platform copy command
//! ([`CommandClipboard`]) as fallback. A process that exits right after
//! copying uses [`ClipboardHelper::command_first`]: on X11 the in-process
//! owner takes the text with it when it exits, a copy command does not.

use crate::error::ClipboardError;
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

/// Text of the copy confirmation.
pub const COPIED_TEXT: &str = "已複製到剪貼簿";
/// How long the copy confirmation stays visible.
pub const TOAST_DURATION: Duration = Duration::from_secs(2);

/// Something that can place text on the clipboard.
pub trait ClipboardBackend {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

impl<B: ClipboardBackend + ?Sized> ClipboardBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        (**self).write_text(text)
    }
}

/// Where the copy confirmation and copy failures are shown.
pub trait CopyToast {
    /// Show `text` for `duration`.
    fn show(&self, text: &str, duration: Duration);

    /// Report that nothing could be copied.
    fn failed(&self, err: &ClipboardError) {
        let _ = err;
    }
}

/// Which backend ended up holding the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPath {
    Primary,
    Fallback,
}

/// Primary/fallback clipboard writer with a confirmation toast.
pub struct ClipboardHelper<P, F> {
    primary: P,
    fallback: F,
}

impl<P: ClipboardBackend, F: ClipboardBackend> ClipboardHelper<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// Copy `text`, trying the primary backend then the fallback.
    ///
    /// The toast is shown exactly once on success; on total failure it is
    /// told about the fallback's error instead.
    pub fn copy(&mut self, text: &str, toast: &dyn CopyToast) -> Result<CopyPath, ClipboardError> {
        let path = match self.primary.write_text(text) {
            Ok(()) => CopyPath::Primary,
            Err(primary_err) => {
                warn!(
                    "{} clipboard failed ({}), trying {}",
                    self.primary.name(),
                    primary_err,
                    self.fallback.name()
                );
                match self.fallback.write_text(text) {
                    Ok(()) => CopyPath::Fallback,
                    Err(e) => {
                        toast.failed(&e);
                        return Err(e);
                    }
                }
            }
        };

        debug!("Copied {} chars via {:?}", text.chars().count(), path);
        toast.show(COPIED_TEXT, TOAST_DURATION);
        Ok(path)
    }
}

impl<F: ClipboardBackend> ClipboardHelper<Box<dyn ClipboardBackend>, F> {
    /// Try `command` first when there is one, then `fallback`.
    pub fn command_first(command: Option<CommandClipboard>, fallback: F) -> Self {
        let primary: Box<dyn ClipboardBackend> = match command {
            Some(command) => Box::new(command),
            None => Box::new(NoClipboard),
        };
        Self::new(primary, fallback)
    }
}

// ── System clipboard ─────────────────────────────────────────────────────────

/// In-process clipboard access via `arboard`.
///
/// The handle is created on first use and kept for the life of the value:
/// on X11 the copied text is only served while the owner is alive.
#[cfg(feature = "clipboard")]
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "clipboard")]
impl ClipboardBackend for SystemClipboard {
    fn name(&self) -> &'static str {
        "system"
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let clipboard = match self.inner.take() {
            Some(c) => c,
            None => arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable {
                backend: "system",
                detail: e.to_string(),
            })?,
        };
        self.inner
            .insert(clipboard)
            .set_text(text.to_owned())
            .map_err(|e| ClipboardError::WriteFailed {
                backend: "system",
                detail: e.to_string(),
            })
    }
}

// ── Command fallback ─────────────────────────────────────────────────────────

/// Copy commands tried in order, as `(program, args)`.
const COPY_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
    ("clip", &[]),
];

/// Pipe text into an external copy command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// First copy command found on `PATH`.
    pub fn detect() -> Option<Self> {
        let path = std::env::var_os("PATH")?;
        let dirs: Vec<_> = std::env::split_paths(&path).collect();
        COPY_COMMANDS
            .iter()
            .find(|(program, _)| {
                dirs.iter().any(|dir| {
                    dir.join(program).is_file() || dir.join(format!("{program}.exe")).is_file()
                })
            })
            .map(|(program, args)| Self::new(*program, args))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ClipboardBackend for CommandClipboard {
    fn name(&self) -> &'static str {
        "command"
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let unavailable = |e: std::io::Error| ClipboardError::Unavailable {
            backend: "command",
            detail: format!("{}: {e}", self.program),
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(unavailable)?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(text.as_bytes()) {
                drop(stdin);
                // Reap the child; it may still be running with stdin closed.
                let _ = child.kill();
                let _ = child.wait();
                return Err(ClipboardError::WriteFailed {
                    backend: "command",
                    detail: format!("{}: {e}", self.program),
                });
            }
        }

        let status = child.wait().map_err(unavailable)?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::WriteFailed {
                backend: "command",
                detail: format!("{} exited with {status}", self.program),
            })
        }
    }
}

/// A backend that always fails; stands in when no copy command exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

impl ClipboardBackend for NoClipboard {
    fn name(&self) -> &'static str {
        "none"
    }

    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable {
            backend: "none",
            detail: "no clipboard command found on PATH".into(),
        })
    }
}
