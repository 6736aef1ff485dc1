//! Data Transfer Objects for the SharePoint copy job endpoints
//!
//! Request and response envelopes exchanged with `_api/site/CreateCopyJobs`
//! and `_api/site/GetCopyJobProgress`.

pub mod copy_job;
