//! Journal domain model for notes, folders and derived tree views.
//!
//! # Responsibility
//! - Define the records exchanged with storage and UI collaborators.
//! - Keep the derived tree shape separate from persisted records.
//!
//! # Invariants
//! - Every persisted record is identified by an opaque, stable id string.
//! - Every persisted record is scoped to exactly one `OwnerAddress`.
//! - `TreeNode` values are never persisted.

pub mod note;
pub mod owner;
pub mod tree;
