//! Journal use-case service.
//!
//! # Responsibility
//! - Load one owner's snapshot from the repository and hand it to the
//!   organizer for tree, search, recency and breadcrumb views.
//! - Validate note/folder mutations above the repository layer.
//!
//! # Invariants
//! - Views are computed from a single repository read per call.
//! - New note titles are unique among notes of the same folder.
//! - Target folders of create/move operations must exist for the owner.
//! - Folder names are trimmed and must not be blank.

use crate::config::CoreConfig;
use crate::model::note::{
    CreateFolderInput, CreateNoteInput, Folder, FolderId, Note, NoteId, UpdateNoteInput,
    DEFAULT_NOTE_TITLE,
};
use crate::model::owner::OwnerAddress;
use crate::model::tree::TreeNode;
use crate::organizer::{
    build_folder_tree, build_tree_with_report, generate_unique_title, get_folder_path,
    get_recent_notes, search_notes, TreeBuild, RECENT_NOTES_DEFAULT_LIMIT,
};
use crate::repo::journal_repo::{JournalRepository, RepoError};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from journal service operations.
#[derive(Debug)]
pub enum JournalServiceError {
    /// Folder name is blank after trim.
    InvalidName,
    /// Target note does not exist for this owner.
    NoteNotFound(NoteId),
    /// Target or parent folder does not exist for this owner.
    FolderNotFound(FolderId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for JournalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "folder name must not be blank"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::FolderNotFound(id) => write!(f, "folder not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for JournalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for JournalServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(note_id) => Self::NoteNotFound(note_id),
            other => Self::Repo(other),
        }
    }
}

pub type JournalServiceResult<T> = Result<T, JournalServiceError>;

/// Journal service facade over repository implementations.
pub struct JournalService<R: JournalRepository> {
    repo: R,
    recent_limit: usize,
}

impl<R: JournalRepository> JournalService<R> {
    /// Creates service with the default recent-notes limit.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            recent_limit: RECENT_NOTES_DEFAULT_LIMIT,
        }
    }

    /// Creates service using limits from resolved configuration.
    pub fn with_config(repo: R, config: &CoreConfig) -> Self {
        Self {
            repo,
            recent_limit: config.recent_limit,
        }
    }

    /// Builds the owner's full folder/note tree with its anomaly report.
    pub fn workspace_tree(&self, owner: &OwnerAddress) -> JournalServiceResult<TreeBuild> {
        let notes = self.repo.list_notes(owner)?;
        let folders = self.repo.list_folders(owner)?;
        let build = build_tree_with_report(&notes, &folders);
        debug!(
            "event=workspace_tree module=service status=ok roots={} anomalies={}",
            build.roots.len(),
            build.anomalies.len()
        );
        Ok(build)
    }

    /// Builds the owner's folder-only tree.
    pub fn folder_tree(&self, owner: &OwnerAddress) -> JournalServiceResult<Vec<TreeNode>> {
        let folders = self.repo.list_folders(owner)?;
        Ok(build_folder_tree(&folders))
    }

    /// Lists notes directly inside `folder_id` (`None` = root).
    pub fn folder_notes(
        &self,
        owner: &OwnerAddress,
        folder_id: Option<&str>,
    ) -> JournalServiceResult<Vec<Note>> {
        self.repo
            .list_notes_in_folder(owner, folder_id)
            .map_err(Into::into)
    }

    /// Gets one note by id.
    pub fn get_note(
        &self,
        owner: &OwnerAddress,
        note_id: &str,
    ) -> JournalServiceResult<Option<Note>> {
        self.repo.get_note(owner, note_id).map_err(Into::into)
    }

    /// Searches all of the owner's notes by title or content.
    pub fn search_notes(
        &self,
        owner: &OwnerAddress,
        query: &str,
    ) -> JournalServiceResult<Vec<Note>> {
        let notes = self.repo.list_notes(owner)?;
        Ok(search_notes(&notes, query).into_iter().cloned().collect())
    }

    /// Returns the most recently updated notes.
    ///
    /// `limit` of `None` uses the configured default.
    pub fn recent_notes(
        &self,
        owner: &OwnerAddress,
        limit: Option<usize>,
    ) -> JournalServiceResult<Vec<Note>> {
        let notes = self.repo.list_notes(owner)?;
        let limit = limit.unwrap_or(self.recent_limit);
        Ok(get_recent_notes(&notes, limit).into_iter().cloned().collect())
    }

    /// Resolves the breadcrumb path for `folder_id`, root-most first.
    pub fn folder_path(
        &self,
        owner: &OwnerAddress,
        folder_id: Option<&str>,
    ) -> JournalServiceResult<Vec<Folder>> {
        if folder_id.is_none() {
            return Ok(Vec::new());
        }
        let folders = self.repo.list_folders(owner)?;
        Ok(get_folder_path(folder_id, &folders)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Creates one note with a title unique inside its folder.
    ///
    /// A blank title falls back to `"Untitled"`.
    pub fn create_note(
        &self,
        owner: &OwnerAddress,
        title: &str,
        content: impl Into<String>,
        folder_id: Option<FolderId>,
    ) -> JournalServiceResult<Note> {
        let folder_id = folder_id.filter(|id| !id.is_empty());
        if let Some(folder_id) = folder_id.as_deref() {
            self.ensure_folder_exists(owner, folder_id)?;
        }

        let base_title = match title.trim() {
            "" => DEFAULT_NOTE_TITLE,
            trimmed => trimmed,
        };
        let siblings = self
            .repo
            .list_notes_in_folder(owner, folder_id.as_deref())?;
        let existing_titles: Vec<&str> = siblings.iter().map(|note| note.title.as_str()).collect();
        let unique_title = generate_unique_title(&existing_titles, base_title);

        let input = CreateNoteInput {
            title: unique_title,
            content: content.into(),
            folder_id,
        };
        self.repo.create_note(owner, &input).map_err(Into::into)
    }

    /// Applies a partial note update.
    pub fn update_note(
        &self,
        owner: &OwnerAddress,
        input: UpdateNoteInput,
    ) -> JournalServiceResult<Note> {
        let mut input = input;
        if let Some(target) = input.folder_id.take() {
            let target = target.filter(|id| !id.is_empty());
            if let Some(folder_id) = target.as_deref() {
                self.ensure_folder_exists(owner, folder_id)?;
            }
            input.folder_id = Some(target);
        }
        self.repo.update_note(owner, &input).map_err(Into::into)
    }

    /// Moves one note to `target_folder_id` (`None` = root).
    pub fn move_note(
        &self,
        owner: &OwnerAddress,
        note_id: &str,
        target_folder_id: Option<FolderId>,
    ) -> JournalServiceResult<Note> {
        self.update_note(
            owner,
            UpdateNoteInput {
                folder_id: Some(target_folder_id),
                ..UpdateNoteInput::new(note_id)
            },
        )
    }

    /// Deletes one note.
    pub fn delete_note(&self, owner: &OwnerAddress, note_id: &str) -> JournalServiceResult<()> {
        self.repo.delete_note(owner, note_id).map_err(Into::into)
    }

    /// Creates one folder under an optional parent.
    pub fn create_folder(
        &self,
        owner: &OwnerAddress,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> JournalServiceResult<Folder> {
        let name = normalize_folder_name(name)?;
        let parent_id = parent_id.filter(|id| !id.is_empty());
        if let Some(parent_id) = parent_id.as_deref() {
            self.ensure_folder_exists(owner, parent_id)?;
        }

        let input = CreateFolderInput { name, parent_id };
        self.repo.create_folder(owner, &input).map_err(Into::into)
    }

    /// Deletes one folder and moves its contents to its parent.
    pub fn delete_folder(&self, owner: &OwnerAddress, folder_id: &str) -> JournalServiceResult<()> {
        self.repo.delete_folder(owner, folder_id).map_err(Into::into)
    }

    fn ensure_folder_exists(
        &self,
        owner: &OwnerAddress,
        folder_id: &str,
    ) -> JournalServiceResult<()> {
        match self.repo.get_folder(owner, folder_id)? {
            Some(_) => Ok(()),
            None => Err(JournalServiceError::FolderNotFound(folder_id.to_string())),
        }
    }
}

fn normalize_folder_name(value: &str) -> JournalServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(JournalServiceError::InvalidName);
    }
    Ok(trimmed.to_string())
}
