//! Watch state machine — decides when the status bar needs a redraw.
//!
//! The watcher only remembers the last line it handed out. Every poll is
//! rendered from scratch; the previous result is compared, never reused for
//! decisions about the device.

use crate::error::Result;
use crate::render::DisplayResult;

/// What the caller should do after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    /// Output changed (or first successful poll): draw this.
    Redraw(DisplayResult),
    /// Same output as last time.
    NoChange,
    /// The poll failed; keep showing the previous output.
    Keep,
}

/// Tracks the last displayed result across polls.
#[derive(Debug, Default)]
pub struct StatusWatcher {
    last: Option<DisplayResult>,
    consecutive_failures: u32,
}

impl StatusWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the outcome of one poll.
    pub fn update(&mut self, outcome: Result<DisplayResult>) -> WatchAction {
        match outcome {
            Ok(result) => {
                self.consecutive_failures = 0;
                if self.last.as_ref() == Some(&result) {
                    WatchAction::NoChange
                } else {
                    self.last = Some(result.clone());
                    WatchAction::Redraw(result)
                }
            }
            Err(e) => {
                self.consecutive_failures += 1;
                log::warn!(
                    "status poll failed ({} in a row): {e}",
                    self.consecutive_failures
                );
                WatchAction::Keep
            }
        }
    }

    /// The result currently on screen.
    pub fn last(&self) -> Option<&DisplayResult> {
        self.last.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
