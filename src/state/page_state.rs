/// Page lifecycle definitions for tracking a page through one crawl frame
///
/// This module defines all states a page can be in while the engine is
/// processing it, and the transitions allowed between them.
use std::fmt;

/// Represents the current state of a page within its crawl frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Page has been handed to the engine but not yet checked
    Pending,

    /// Page bytes are being fetched
    Fetching,

    /// Page parsed; its scripts, stylesheets and images are being fetched
    Extracting,

    /// Page's anchors are being followed
    Recursing,

    // ===== Short-Circuit States =====
    /// Page fetch raised a transport error
    FetchFailed,

    /// Page bytes did not yield a usable document
    ParseFailed,

    // ===== Terminal States =====
    /// Frame completed and navigation returned to the parent page
    Backtracked,

    /// Page had already been visited; nothing was done
    Duplicate,
}

impl PageState {
    /// Returns true if this is a terminal state (frame is finished)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Backtracked | Self::Duplicate)
    }

    /// Returns true if this state holds navigation (an `enter` without its `leave`)
    pub fn holds_navigation(&self) -> bool {
        matches!(
            self,
            Self::Fetching
                | Self::Extracting
                | Self::Recursing
                | Self::FetchFailed
                | Self::ParseFailed
        )
    }

    /// Checks whether moving from this state to `next` is allowed
    pub fn can_transition_to(&self, next: PageState) -> bool {
        use PageState::*;

        match (self, next) {
            (Pending, Fetching) | (Pending, Duplicate) => true,
            (Fetching, FetchFailed) | (Fetching, ParseFailed) | (Fetching, Extracting) => true,
            (Extracting, Recursing) => true,
            // Every frame that entered a page leaves it, whichever branch it took
            (from, Backtracked) => from.holds_navigation(),
            _ => false,
        }
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Recursing => "recursing",
            Self::FetchFailed => "fetch_failed",
            Self::ParseFailed => "parse_failed",
            Self::Backtracked => "backtracked",
            Self::Duplicate => "duplicate",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Fetching,
            Self::Extracting,
            Self::Recursing,
            Self::FetchFailed,
            Self::ParseFailed,
            Self::Backtracked,
            Self::Duplicate,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
