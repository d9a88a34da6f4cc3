//! State module for tracking crawl job progress
//!
//! # Components
//!
//! - `JobStatus`: the lifecycle state machine of a crawl job (idle, running,
//!   paused, completed, stopped, failed)

mod job_state;

pub use job_state::JobStatus;
