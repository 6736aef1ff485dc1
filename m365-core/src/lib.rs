//! M365 Core
//!
//! Core types for the SharePoint Online copy/move job tooling.
//!
//! This crate contains:
//! - Domain types: copy job descriptors, progress responses and the job log events embedded in them
//! - DTOs: request and response envelopes for the SharePoint copy job endpoints

pub mod domain;
pub mod dto;
