//! Core domain types
//!
//! These types describe a server-side copy job as SharePoint reports it:
//! the descriptor returned when the job is created, the progress response
//! returned by every status check, and the log events embedded in it.

pub mod event;
pub mod job;
