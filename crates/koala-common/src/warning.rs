//! Renderer warnings with deduplication.
//!
//! Malformed stylesheets tend to repeat the same mistake on every element, so
//! each distinct warning is reported only once per [`Diagnostics`] instance.
//! Output goes through [`log`], so embedders pick the sink (`env_logger` in
//! tests and tools).

use std::collections::HashSet;

/// Deduplicating warning sink.
///
/// Owned by whichever pass produces the warnings (the cascade's
/// `StyleResolver`, the layout session). Nothing here is process-global, so
/// two documents resolved side by side do not suppress each other's warnings.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    warned: HashSet<String>,
}

impl Diagnostics {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Warn about an unsupported feature (emitted once per unique message).
    ///
    /// Returns `true` if the warning was emitted, `false` if it had already
    /// been reported.
    ///
    /// # Example
    /// ```
    /// use koala_common::warning::Diagnostics;
    ///
    /// let mut diagnostics = Diagnostics::new();
    /// assert!(diagnostics.warn_once("CSS", "unknown unit 'furlong'"));
    /// assert!(!diagnostics.warn_once("CSS", "unknown unit 'furlong'"));
    /// ```
    pub fn warn_once(&mut self, component: &str, message: &str) -> bool {
        let key = format!("[{component}] {message}");
        let first = self.warned.insert(key);
        if first {
            log::warn!(target: "koala", "[Koala {component}] {message}");
        }
        first
    }

    /// Number of distinct warnings recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warned.len()
    }

    /// Whether no warnings have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warned.is_empty()
    }

    /// Whether a warning with this component and message has been recorded.
    #[must_use]
    pub fn has_warned(&self, component: &str, message: &str) -> bool {
        self.warned.contains(&format!("[{component}] {message}"))
    }

    /// Clear all recorded warnings (call when loading a new document).
    pub fn clear(&mut self) {
        self.warned.clear();
    }
}
