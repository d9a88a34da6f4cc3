/// Job status definitions for the crawl state machine
///
/// ```text
/// idle -> running -> { paused <-> running } -> { completed | stopped | failed }
/// ```
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the lifecycle state of a crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    // ===== Initial State =====
    /// Job has been configured but not started
    Idle,

    // ===== Active States =====
    /// The crawl loop is fetching pages
    Running,

    /// The crawl loop is suspended between iterations
    Paused,

    // ===== Terminal States =====
    /// Frontier exhausted or page budget reached
    Completed,

    /// Stopped on request with a partial corpus
    Stopped,

    /// Aborted by a fatal error; no corpus is delivered
    Failed,
}

impl JobStatus {
    /// Returns true if this is a terminal state (the job cannot run again)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Failed)
    }

    /// Returns true if the crawl loop is alive (running or paused)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// Returns true if the job finished with a deliverable corpus
    pub fn has_corpus(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }

    /// Returns true if the machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Running, Paused)
                | (Paused, Running)
                | (Running, Completed)
                | (Paused, Completed)
                | (Running, Stopped)
                | (Paused, Stopped)
                | (Idle, Failed)
                | (Running, Failed)
                | (Paused, Failed)
        )
    }

    /// Returns the stable string form used in logs and exports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its string form
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "running" => Some(Self::Running),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            "stopped" => Some(Self::Stopped),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::Running,
            Self::Paused,
            Self::Completed,
            Self::Stopped,
            Self::Failed,
        ]
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
