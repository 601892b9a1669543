//! Owner-scoped note/folder repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the CRUD collaborator that feeds flat note/folder snapshots
//!   into the organizer.
//! - Keep SQL details inside the repository boundary.
//!
//! # Invariants
//! - Every query is filtered by `owner_address`; owners never see each
//!   other's records.
//! - Note lists are ordered `updated_at DESC, id ASC`.
//! - Folder lists are ordered `name ASC, id ASC`.
//! - Deleting a folder re-parents its notes and sub-folders to the deleted
//!   folder's own parent in the same transaction.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::note::{
    CreateFolderInput, CreateNoteInput, Folder, FolderId, Note, NoteId, UpdateNoteInput,
};
use crate::model::owner::OwnerAddress;
use chrono::{SecondsFormat, Utc};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    owner_address,
    title,
    content,
    folder_id,
    created_at,
    updated_at
FROM notes";

const FOLDER_SELECT_SQL: &str = "SELECT
    id,
    owner_address,
    name,
    parent_id,
    created_at
FROM folders";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from journal repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target note or folder does not exist for this owner.
    NotFound(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "journal record not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "journal repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "journal repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted journal data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for one owner's notes and folders.
pub trait JournalRepository {
    /// Lists every note of `owner`, most recently updated first.
    fn list_notes(&self, owner: &OwnerAddress) -> RepoResult<Vec<Note>>;
    /// Lists notes directly inside `folder_id` (`None` = root).
    fn list_notes_in_folder(
        &self,
        owner: &OwnerAddress,
        folder_id: Option<&str>,
    ) -> RepoResult<Vec<Note>>;
    /// Loads one note by id.
    fn get_note(&self, owner: &OwnerAddress, note_id: &str) -> RepoResult<Option<Note>>;
    /// Creates one note and returns the stored record.
    fn create_note(&self, owner: &OwnerAddress, input: &CreateNoteInput) -> RepoResult<Note>;
    /// Applies a partial update, bumps `updated_at` and returns the result.
    fn update_note(&self, owner: &OwnerAddress, input: &UpdateNoteInput) -> RepoResult<Note>;
    /// Deletes one note.
    fn delete_note(&self, owner: &OwnerAddress, note_id: &str) -> RepoResult<()>;
    /// Lists every folder of `owner` by name.
    fn list_folders(&self, owner: &OwnerAddress) -> RepoResult<Vec<Folder>>;
    /// Loads one folder by id.
    fn get_folder(&self, owner: &OwnerAddress, folder_id: &str) -> RepoResult<Option<Folder>>;
    /// Creates one folder and returns the stored record.
    fn create_folder(&self, owner: &OwnerAddress, input: &CreateFolderInput)
        -> RepoResult<Folder>;
    /// Deletes one folder, moving its contents to its parent.
    ///
    /// Missing folders are a no-op.
    fn delete_folder(&self, owner: &OwnerAddress, folder_id: &str) -> RepoResult<()>;
}

/// SQLite-backed journal repository.
pub struct SqliteJournalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJournalRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_journal_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl JournalRepository for SqliteJournalRepository<'_> {
    fn list_notes(&self, owner: &OwnerAddress) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE owner_address = ?1
             ORDER BY updated_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([owner.as_str()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn list_notes_in_folder(
        &self,
        owner: &OwnerAddress,
        folder_id: Option<&str>,
    ) -> RepoResult<Vec<Note>> {
        let mut sql = format!("{NOTE_SELECT_SQL} WHERE owner_address = ?");
        let mut bind_values = vec![Value::Text(owner.as_str().to_string())];
        match folder_id.filter(|id| !id.is_empty()) {
            Some(folder_id) => {
                sql.push_str(" AND folder_id = ?");
                bind_values.push(Value::Text(folder_id.to_string()));
            }
            None => sql.push_str(" AND (folder_id IS NULL OR folder_id = '')"),
        }
        sql.push_str(" ORDER BY updated_at DESC, id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn get_note(&self, owner: &OwnerAddress, note_id: &str) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE owner_address = ?1
               AND id = ?2;"
        ))?;
        let mut rows = stmt.query(params![owner.as_str(), note_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn create_note(&self, owner: &OwnerAddress, input: &CreateNoteInput) -> RepoResult<Note> {
        let now = now_timestamp();
        let note = Note {
            id: mint_id(),
            title: input.title.clone(),
            content: input.content.clone(),
            folder_id: input.folder_id.clone(),
            created_at: now.clone(),
            updated_at: now,
            owner_address: owner.clone(),
        };

        self.conn.execute(
            "INSERT INTO notes (
                id,
                owner_address,
                title,
                content,
                folder_id,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                note.id.as_str(),
                owner.as_str(),
                note.title.as_str(),
                note.content.as_str(),
                note.folder_id.as_deref(),
                note.created_at.as_str(),
                note.updated_at.as_str(),
            ],
        )?;

        info!(
            "event=note_create module=repo status=ok note_id={} in_folder={}",
            note.id,
            note.folder_id.is_some()
        );
        Ok(note)
    }

    fn update_note(&self, owner: &OwnerAddress, input: &UpdateNoteInput) -> RepoResult<Note> {
        let mut assignments = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = &input.title {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(content) = &input.content {
            assignments.push("content = ?");
            bind_values.push(Value::Text(content.clone()));
        }
        if let Some(folder_id) = &input.folder_id {
            assignments.push("folder_id = ?");
            bind_values.push(folder_id.clone().map_or(Value::Null, Value::Text));
        }
        assignments.push("updated_at = ?");
        bind_values.push(Value::Text(now_timestamp()));

        bind_values.push(Value::Text(owner.as_str().to_string()));
        bind_values.push(Value::Text(input.id.clone()));

        let sql = format!(
            "UPDATE notes SET {} WHERE owner_address = ? AND id = ?;",
            assignments.join(", ")
        );
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(input.id.clone()));
        }

        self.get_note(owner, input.id.as_str())?
            .ok_or_else(|| RepoError::NotFound(input.id.clone()))
    }

    fn delete_note(&self, owner: &OwnerAddress, note_id: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM notes WHERE owner_address = ?1 AND id = ?2;",
            params![owner.as_str(), note_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(note_id.to_string()));
        }
        info!("event=note_delete module=repo status=ok note_id={note_id}");
        Ok(())
    }

    fn list_folders(&self, owner: &OwnerAddress) -> RepoResult<Vec<Folder>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FOLDER_SELECT_SQL}
             WHERE owner_address = ?1
             ORDER BY name ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([owner.as_str()])?;
        let mut folders = Vec::new();
        while let Some(row) = rows.next()? {
            folders.push(parse_folder_row(row)?);
        }
        Ok(folders)
    }

    fn get_folder(&self, owner: &OwnerAddress, folder_id: &str) -> RepoResult<Option<Folder>> {
        get_folder_with(self.conn, owner, folder_id)
    }

    fn create_folder(
        &self,
        owner: &OwnerAddress,
        input: &CreateFolderInput,
    ) -> RepoResult<Folder> {
        let folder = Folder {
            id: mint_id(),
            name: input.name.clone(),
            parent_id: input.parent_id.clone(),
            created_at: now_timestamp(),
            owner_address: owner.clone(),
        };

        self.conn.execute(
            "INSERT INTO folders (
                id,
                owner_address,
                name,
                parent_id,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                folder.id.as_str(),
                owner.as_str(),
                folder.name.as_str(),
                folder.parent_id.as_deref(),
                folder.created_at.as_str(),
            ],
        )?;

        info!(
            "event=folder_create module=repo status=ok folder_id={} has_parent={}",
            folder.id,
            folder.parent_id.is_some()
        );
        Ok(folder)
    }

    fn delete_folder(&self, owner: &OwnerAddress, folder_id: &str) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let Some(folder) = get_folder_with(&tx, owner, folder_id)? else {
            return Ok(());
        };

        let moved_notes = tx.execute(
            "UPDATE notes
             SET folder_id = ?3
             WHERE owner_address = ?1
               AND folder_id = ?2;",
            params![owner.as_str(), folder_id, folder.parent_id.as_deref()],
        )?;
        let moved_folders = tx.execute(
            "UPDATE folders
             SET parent_id = ?3
             WHERE owner_address = ?1
               AND parent_id = ?2;",
            params![owner.as_str(), folder_id, folder.parent_id.as_deref()],
        )?;
        tx.execute(
            "DELETE FROM folders WHERE owner_address = ?1 AND id = ?2;",
            params![owner.as_str(), folder_id],
        )?;
        tx.commit()?;

        info!(
            "event=folder_delete module=repo status=ok folder_id={folder_id} moved_notes={moved_notes} moved_folders={moved_folders}"
        );
        Ok(())
    }
}

fn get_folder_with(
    conn: &Connection,
    owner: &OwnerAddress,
    folder_id: &str,
) -> RepoResult<Option<Folder>> {
    let mut stmt = conn.prepare(&format!(
        "{FOLDER_SELECT_SQL}
         WHERE owner_address = ?1
           AND id = ?2;"
    ))?;
    let mut rows = stmt.query(params![owner.as_str(), folder_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_folder_row(row)?));
    }
    Ok(None)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    Ok(Note {
        id: row.get::<_, NoteId>("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        folder_id: row.get::<_, Option<FolderId>>("folder_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        owner_address: parse_owner_column(row, "notes")?,
    })
}

fn parse_folder_row(row: &Row<'_>) -> RepoResult<Folder> {
    Ok(Folder {
        id: row.get::<_, FolderId>("id")?,
        name: row.get("name")?,
        parent_id: row.get::<_, Option<FolderId>>("parent_id")?,
        created_at: row.get("created_at")?,
        owner_address: parse_owner_column(row, "folders")?,
    })
}

fn parse_owner_column(row: &Row<'_>, table: &str) -> RepoResult<OwnerAddress> {
    let value: String = row.get("owner_address")?;
    OwnerAddress::parse(value.as_str()).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid owner address `{value}` in {table}.owner_address"
        ))
    })
}

fn mint_id() -> String {
    Uuid::new_v4().to_string()
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn ensure_journal_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["notes", "folders"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
