//! Rendering targets of the log viewer

use std::io::Write;

use colored::Colorize;

use crate::errors::ConsoleError;
use crate::models::deployment::StatusExt;
use crate::notify::Notice;
use crate::stream::reconciler::{Connectivity, LogFrame, LogSource};

/// Result of a scroll attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    Scrolled,
    /// Nothing rendered yet; a later attempt may succeed
    NotReady,
}

/// Where the viewer draws frames
pub trait LogView: Send {
    fn render(&mut self, frame: &LogFrame) -> Result<(), ConsoleError>;

    fn scroll_to_bottom(&mut self) -> ScrollOutcome;

    fn notify(&mut self, notice: &Notice);
}

/// Line-oriented view over any writer.
///
/// Growth of the displayed text is written as a suffix. When the text is
/// replaced (for example the live stream giving way to the persisted log) a
/// divider is printed followed by the full new text.
pub struct TerminalView<W: Write + Send> {
    out: W,
    printed: String,
    source: Option<LogSource>,
    connectivity: Option<Connectivity>,
    status_label: Option<&'static str>,
    placeholder_shown: bool,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: String::new(),
            source: None,
            connectivity: None,
            status_label: None,
            placeholder_shown: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Text currently shown
    pub fn printed(&self) -> &str {
        &self.printed
    }

    /// Write text verbatim, blank lines included, ending on a fresh line
    fn write_text(&mut self, text: &str) -> Result<(), ConsoleError> {
        self.out.write_all(text.as_bytes())?;
        if !text.is_empty() && !text.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Part of `text` not yet on screen, when `text` continues the printed
    /// text at a line boundary.
    ///
    /// Printed text without a trailing newline was terminated on output, so
    /// the newline that continues it is already shown.
    fn unprinted_suffix<'t>(&self, text: &'t str) -> Option<&'t str> {
        if self.printed.is_empty() || !text.starts_with(&self.printed) {
            return None;
        }
        let rest = &text[self.printed.len()..];
        if self.printed.ends_with('\n') {
            Some(rest)
        } else {
            rest.strip_prefix('\n')
        }
    }
}

impl<W: Write + Send> LogView for TerminalView<W> {
    fn render(&mut self, frame: &LogFrame) -> Result<(), ConsoleError> {
        if let Some(status) = frame.status {
            if self.status_label != Some(status.label()) {
                writeln!(self.out, "{} {}", "Status:".bold(), status.badge())?;
                self.status_label = Some(status.label());
            }
        }

        if self.connectivity != Some(frame.connectivity) {
            match frame.connectivity {
                Connectivity::Live => writeln!(self.out, "{}", "● Live".green())?,
                Connectivity::Connecting => writeln!(self.out, "{}", "○ Connecting...".dimmed())?,
                Connectivity::Hidden => {}
            }
            self.connectivity = Some(frame.connectivity);
        }

        if frame.text == self.printed {
            if frame.text.is_empty() && !self.placeholder_shown {
                writeln!(self.out, "{}", "No logs yet...".dimmed())?;
                self.placeholder_shown = true;
            }
        } else if let Some(suffix) = self.unprinted_suffix(&frame.text) {
            self.write_text(suffix)?;
            self.printed = frame.text.clone();
        } else {
            if !self.printed.is_empty() || self.source.is_some_and(|s| s != frame.source) {
                let label = match frame.source {
                    LogSource::Live => "live logs",
                    LogSource::Snapshot => "saved logs",
                };
                writeln!(self.out, "{}", format!("──── {} ────", label).dimmed())?;
            }
            self.write_text(&frame.text)?;
            self.printed = frame.text.clone();
        }

        self.source = Some(frame.source);
        self.out.flush()?;
        Ok(())
    }

    fn scroll_to_bottom(&mut self) -> ScrollOutcome {
        if self.printed.is_empty() || self.out.flush().is_err() {
            return ScrollOutcome::NotReady;
        }
        ScrollOutcome::Scrolled
    }

    fn notify(&mut self, notice: &Notice) {
        let _ = writeln!(self.out, "{}", notice.render());
    }
}
