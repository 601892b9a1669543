//! Note and folder records.
//!
//! # Responsibility
//! - Define the flat records produced by the storage collaborator.
//! - Define create/update inputs accepted by the journal service.
//!
//! # Invariants
//! - `id` never changes once minted by storage.
//! - `folder_id` / `parent_id` of `None` means the implicit root.
//! - Timestamps are ISO-8601 strings and are never reformatted by core.

use crate::model::owner::OwnerAddress;
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque note identifier (UUID-shaped, minted by storage).
pub type NoteId = String;

/// Opaque folder identifier (UUID-shaped, minted by storage).
pub type FolderId = String;

/// Default title used when a caller does not provide one.
pub const DEFAULT_NOTE_TITLE: &str = "Untitled";

/// One note owned by a wallet address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Markdown body.
    pub content: String,
    /// Containing folder. Dangling values are legal and render at root.
    pub folder_id: Option<FolderId>,
    pub created_at: String,
    pub updated_at: String,
    pub owner_address: OwnerAddress,
}

/// One folder owned by a wallet address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    /// Parent folder. `None` means root-level folder.
    pub parent_id: Option<FolderId>,
    pub created_at: String,
    pub owner_address: OwnerAddress,
}

/// Input for note creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNoteInput {
    pub title: String,
    pub content: String,
    pub folder_id: Option<FolderId>,
}

/// Input for folder creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFolderInput {
    pub name: String,
    pub parent_id: Option<FolderId>,
}

/// Partial note update.
///
/// Fields left as `None` are not touched. For `folder_id`, `Some(None)`
/// moves the note to root. On the wire an absent `folder_id` key means
/// "unchanged" and an explicit `null` means "move to root".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNoteInput {
    pub id: NoteId,
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub folder_id: Option<Option<FolderId>>,
}

impl UpdateNoteInput {
    /// Creates an update for `id` that changes nothing yet.
    pub fn new(id: impl Into<NoteId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Returns whether this update carries no field changes.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.folder_id.is_none()
    }
}

/// Wraps any present value (including `null`) in `Some`.
///
/// Paired with `#[serde(default)]` so that a missing key stays `None`.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
