//! Log sections and subscriber setup.
//!
//! Verification chains and scope flushes write human-readable sections:
//! a start marker with a title, optional body lines, and an end marker with
//! the elapsed time. Events go through `tracing` under the `pagecheck`
//! target so any subscriber can route them.

use std::time::Instant;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "PAGECHECK_LOG";

/// Install a fmt subscriber filtered by `PAGECHECK_LOG` (default `info`).
///
/// Returns `false` when a global subscriber was already installed.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Like [`init`], but emits one JSON object per event for CI log collectors
pub fn init_json() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

/// A titled log section, closed when dropped
#[derive(Debug)]
pub struct LogSection {
    title: String,
    level: Level,
    started: Instant,
}

impl LogSection {
    /// Open a section at `info` level
    #[must_use]
    pub fn begin(title: impl Into<String>) -> Self {
        Self::begin_at(Level::INFO, title)
    }

    /// Open a section at the given level
    #[must_use]
    pub fn begin_at(level: Level, title: impl Into<String>) -> Self {
        let section = Self {
            title: title.into(),
            level,
            started: Instant::now(),
        };
        section.emit(&format!("> {}", section.title));
        section
    }

    /// Section title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Write a body line inside the section
    pub fn line(&self, text: &str) {
        self.emit(&format!("  {text}"));
    }

    /// Write several body lines
    pub fn lines<'a>(&self, lines: impl IntoIterator<Item = &'a str>) {
        for line in lines {
            self.line(line);
        }
    }

    fn emit(&self, text: &str) {
        if self.level == Level::ERROR {
            tracing::error!(target: "pagecheck", "{text}");
        } else if self.level == Level::WARN {
            tracing::warn!(target: "pagecheck", "{text}");
        } else if self.level == Level::INFO {
            tracing::info!(target: "pagecheck", "{text}");
        } else if self.level == Level::DEBUG {
            tracing::debug!(target: "pagecheck", "{text}");
        } else {
            tracing::trace!(target: "pagecheck", "{text}");
        }
    }
}

impl Drop for LogSection {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        self.emit(&format!("< {} ({:.3}s)", self.title, elapsed.as_secs_f64()));
    }
}
