/// Data models for taskvault
///
/// This module contains the persisted record types and their wire-edge
/// conversions.
///
/// # Models
///
/// - `user`: user accounts, the two-variant role, and its legacy encodings
/// - `task`: task records, creation drafts, partial-update patches, and
///   list filters

pub mod task;
pub mod user;
