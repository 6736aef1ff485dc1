//! Scheduler layer for copy jobs
//!
//! This layer drives a server-side copy job from creation to a terminal
//! event. It polls the job's progress at a fixed interval, interprets the
//! log events embedded in each response, and honours cancellation between
//! polls.

pub mod config;
pub mod delay;
pub mod poller;

pub use config::PollerConfig;
pub use delay::{Delay, TokioDelay};
pub use poller::{FailureKind, JobPoller, PollError, PollState, PollSummary, ProgressSource};
