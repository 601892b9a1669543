//! Repository layer for the journal storage collaborator.
//!
//! # Responsibility
//! - Define owner-scoped data access contracts for notes and folders.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Hierarchy references are stored as-is; no repository call validates
//!   that a parent or folder id exists.

pub mod journal_repo;
