//! System clipboard access and the transient "Copied!" feedback

use anyhow::{Context, Result};
use copypasta::{ClipboardContext, ClipboardProvider};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// How long the copy confirmation stays visible
pub const COPY_FEEDBACK_DURATION: Duration = Duration::from_secs(2);

pub struct Clipboard {
    context: Option<ClipboardContext>,
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard {
    pub fn new() -> Self {
        // Headless sessions have no clipboard; callers fall back to stdout
        let context = ClipboardContext::new().ok();
        Self { context }
    }

    pub fn is_available(&self) -> bool {
        self.context.is_some()
    }

    /// Copy to the clipboard on a terminal, write to stdout when piped
    pub fn copy_or_pipe(&mut self, content: &str, is_tty: bool) -> Result<()> {
        if is_tty && self.is_available() {
            self.copy_to_clipboard(content)
        } else {
            self.write_to_stdout(content)
        }
    }

    pub fn copy_to_clipboard(&mut self, content: &str) -> Result<()> {
        let ctx = self
            .context
            .as_mut()
            .context("Clipboard is not available in this session")?;
        ctx.set_contents(content.to_string())
            .map_err(|e| anyhow::anyhow!("Failed to copy to clipboard: {}", e))?;
        tracing::debug!(bytes = content.len(), "Copied to clipboard");
        Ok(())
    }

    pub fn write_to_stdout(&self, content: &str) -> Result<()> {
        let mut stdout = io::stdout();
        stdout
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Which control most recently copied, and when
#[derive(Debug, Clone, Default)]
pub struct CopyFeedback {
    shown: Option<(String, Instant)>,
}

impl CopyFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as just copied, replacing any earlier confirmation
    pub fn record(&mut self, key: impl Into<String>) {
        self.record_at(key, Instant::now());
    }

    pub fn record_at(&mut self, key: impl Into<String>, at: Instant) {
        self.shown = Some((key.into(), at));
    }

    /// Key whose confirmation is still visible at `now`
    pub fn active_at(&self, now: Instant) -> Option<&str> {
        match &self.shown {
            Some((key, at)) if now.saturating_duration_since(*at) < COPY_FEEDBACK_DURATION => {
                Some(key.as_str())
            }
            _ => None,
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active_at(Instant::now())
    }

    pub fn is_active_for(&self, key: &str) -> bool {
        self.active() == Some(key)
    }
}
