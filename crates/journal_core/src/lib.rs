//! Core domain logic for the wallet-scoped journal.
//! This crate owns the note organization rules (tree, search, breadcrumbs,
//! titles, recency) and the storage collaborator that feeds them.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod organizer;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::note::{
    CreateFolderInput, CreateNoteInput, Folder, FolderId, Note, NoteId, UpdateNoteInput,
    DEFAULT_NOTE_TITLE,
};
pub use model::owner::{OwnerAddress, OwnerAddressError};
pub use model::tree::{TreeNode, TreeNodeKind};
pub use organizer::{
    build_folder_tree, build_tree, build_tree_with_report, compare_names, compare_tree_nodes,
    generate_unique_title, get_folder_path, get_recent_notes, notes_in_folder, search_notes,
    TreeAnomaly, TreeBuild, RECENT_NOTES_DEFAULT_LIMIT,
};
pub use repo::journal_repo::{JournalRepository, RepoError, RepoResult, SqliteJournalRepository};
pub use service::journal_service::{JournalService, JournalServiceError, JournalServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
