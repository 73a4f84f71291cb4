//! Core data models for Pocket Foreman.
//!
//! This crate provides the plain data types shared by every other crate:
//! task identifiers and records, journal entries for photo uploads, and the
//! identifier newtypes used for remote pages and pending structure changes.

pub mod ids;
pub mod journal;
pub mod task;

// Re-export main types
pub use ids::{ChangeId, PageId};
pub use journal::{section_label, JournalEntry};
pub use task::{ExternalLink, TaskIdentifier, TaskRecord, TaskStatus};
