use journal_core::db::open_db_in_memory;
use journal_core::{
    CoreConfig, CreateNoteInput, JournalRepository, JournalService, JournalServiceError,
    OwnerAddress, SqliteJournalRepository, TreeAnomaly, UpdateNoteInput,
};
use rusqlite::Connection;

const OWNER: &str = "0x00000000000000000000000000000000000000cc";

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn owner() -> OwnerAddress {
    OwnerAddress::parse(OWNER).unwrap()
}

#[test]
fn blank_titles_become_unique_untitled_per_folder() {
    let conn = setup();
    let service = JournalService::new(SqliteJournalRepository::try_new(&conn).unwrap());
    let owner = owner();

    let first = service.create_note(&owner, "   ", "", None).unwrap();
    let second = service.create_note(&owner, "", "", None).unwrap();
    let third = service.create_note(&owner, "Untitled", "", None).unwrap();
    assert_eq!(first.title, "Untitled");
    assert_eq!(second.title, "Untitled 1");
    assert_eq!(third.title, "Untitled 2");

    let folder = service.create_folder(&owner, "Work", None).unwrap();
    let in_folder = service
        .create_note(&owner, "", "", Some(folder.id.clone()))
        .unwrap();
    assert_eq!(in_folder.title, "Untitled");
    assert_eq!(in_folder.folder_id, Some(folder.id));
}

#[test]
fn explicit_titles_are_trimmed_and_deduplicated() {
    let conn = setup();
    let service = JournalService::new(SqliteJournalRepository::try_new(&conn).unwrap());
    let owner = owner();

    let first = service.create_note(&owner, " Standup ", "notes", None).unwrap();
    let second = service.create_note(&owner, "Standup", "more", None).unwrap();
    assert_eq!(first.title, "Standup");
    assert_eq!(second.title, "Standup 1");
    assert_eq!(second.content, "more");
}

#[test]
fn create_note_in_missing_folder_is_rejected() {
    let conn = setup();
    let service = JournalService::new(SqliteJournalRepository::try_new(&conn).unwrap());

    let err = service
        .create_note(&owner(), "Lost", "", Some("missing".to_string()))
        .unwrap_err();
    assert!(matches!(err, JournalServiceError::FolderNotFound(id) if id == "missing"));
}

#[test]
fn create_folder_validates_name_and_parent() {
    let conn = setup();
    let service = JournalService::new(SqliteJournalRepository::try_new(&conn).unwrap());
    let owner = owner();

    assert!(matches!(
        service.create_folder(&owner, "  ", None),
        Err(JournalServiceError::InvalidName)
    ));
    assert!(matches!(
        service.create_folder(&owner, "Child", Some("missing".to_string())),
        Err(JournalServiceError::FolderNotFound(_))
    ));

    let parent = service.create_folder(&owner, "  Parent ", None).unwrap();
    assert_eq!(parent.name, "Parent");
    let child = service
        .create_folder(&owner, "Child", Some(parent.id.clone()))
        .unwrap();
    assert_eq!(child.parent_id, Some(parent.id));
}

#[test]
fn workspace_tree_nests_owner_snapshot() {
    let conn = setup();
    let service = JournalService::new(SqliteJournalRepository::try_new(&conn).unwrap());
    let owner = owner();

    let work = service.create_folder(&owner, "Work", None).unwrap();
    let archive = service
        .create_folder(&owner, "Archive", Some(work.id.clone()))
        .unwrap();
    service
        .create_note(&owner, "Old plan", "", Some(archive.id.clone()))
        .unwrap();
    service.create_note(&owner, "Inbox", "", None).unwrap();

    let build = service.workspace_tree(&owner).unwrap();
    assert!(build.is_clean());
    assert_eq!(build.roots.len(), 2);
    assert_eq!(build.roots[0].name, "Work");
    assert_eq!(build.roots[1].name, "Inbox");
    let archive_node = build.roots[0].find(&archive.id).unwrap();
    assert_eq!(archive_node.children()[0].name, "Old plan");

    let folders_only = service.folder_tree(&owner).unwrap();
    assert_eq!(folders_only.len(), 1);
    assert_eq!(folders_only[0].subtree_len(), 2);
}

#[test]
fn workspace_tree_reports_dangling_folder_reference() {
    let conn = setup();
    let repo = SqliteJournalRepository::try_new(&conn).unwrap();
    let owner = owner();
    let orphan = repo
        .create_note(
            &owner,
            &CreateNoteInput {
                title: "Orphan".to_string(),
                content: String::new(),
                folder_id: Some("missing-id".to_string()),
            },
        )
        .unwrap();

    let service = JournalService::new(repo);
    let build = service.workspace_tree(&owner).unwrap();
    assert_eq!(build.roots.len(), 1);
    assert_eq!(build.roots[0].id, orphan.id);
    assert_eq!(
        build.anomalies,
        vec![TreeAnomaly::DanglingParent {
            node_id: orphan.id,
            parent_id: "missing-id".to_string(),
        }]
    );
}

#[test]
fn folder_path_resolves_breadcrumbs() {
    let conn = setup();
    let service = JournalService::new(SqliteJournalRepository::try_new(&conn).unwrap());
    let owner = owner();

    let a = service.create_folder(&owner, "A", None).unwrap();
    let b = service.create_folder(&owner, "B", Some(a.id.clone())).unwrap();
    let c = service.create_folder(&owner, "C", Some(b.id.clone())).unwrap();

    let path = service.folder_path(&owner, Some(c.id.as_str())).unwrap();
    assert_eq!(path, vec![a, b, c]);
    assert!(service.folder_path(&owner, None).unwrap().is_empty());
}

#[test]
fn search_and_recent_views_read_owner_notes() {
    let conn = setup();
    let repo = SqliteJournalRepository::try_new(&conn).unwrap();
    let config = CoreConfig {
        recent_limit: 2,
        ..CoreConfig::default()
    };
    let service = JournalService::with_config(repo, &config);
    let owner = owner();

    service.create_note(&owner, "Rust", "traits", None).unwrap();
    service.create_note(&owner, "Cooking", "rusty pan", None).unwrap();
    service.create_note(&owner, "Travel", "passport", None).unwrap();

    let hits = service.search_notes(&owner, "RUST").unwrap();
    let mut titles: Vec<&str> = hits.iter().map(|note| note.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, vec!["Cooking", "Rust"]);
    assert_eq!(service.search_notes(&owner, "  ").unwrap().len(), 3);

    assert_eq!(service.recent_notes(&owner, None).unwrap().len(), 2);
    assert_eq!(service.recent_notes(&owner, Some(10)).unwrap().len(), 3);
}

#[test]
fn move_note_checks_target_folder() {
    let conn = setup();
    let service = JournalService::new(SqliteJournalRepository::try_new(&conn).unwrap());
    let owner = owner();

    let folder = service.create_folder(&owner, "Work", None).unwrap();
    let note = service.create_note(&owner, "Plan", "", None).unwrap();

    let moved = service
        .move_note(&owner, &note.id, Some(folder.id.clone()))
        .unwrap();
    assert_eq!(moved.folder_id, Some(folder.id.clone()));

    let err = service
        .move_note(&owner, &note.id, Some("missing".to_string()))
        .unwrap_err();
    assert!(matches!(err, JournalServiceError::FolderNotFound(_)));

    let back = service.move_note(&owner, &note.id, None).unwrap();
    assert_eq!(back.folder_id, None);
    assert_eq!(
        service.folder_notes(&owner, Some(folder.id.as_str())).unwrap().len(),
        0
    );
}

#[test]
fn updating_or_deleting_missing_note_reports_note_not_found() {
    let conn = setup();
    let service = JournalService::new(SqliteJournalRepository::try_new(&conn).unwrap());
    let owner = owner();

    let err = service
        .update_note(
            &owner,
            UpdateNoteInput {
                title: Some("x".to_string()),
                ..UpdateNoteInput::new("missing")
            },
        )
        .unwrap_err();
    assert!(matches!(err, JournalServiceError::NoteNotFound(id) if id == "missing"));

    let err = service.delete_note(&owner, "missing").unwrap_err();
    assert!(matches!(err, JournalServiceError::NoteNotFound(_)));
}

#[test]
fn delete_folder_dissolves_into_parent() {
    let conn = setup();
    let service = JournalService::new(SqliteJournalRepository::try_new(&conn).unwrap());
    let owner = owner();

    let work = service.create_folder(&owner, "Work", None).unwrap();
    let note = service
        .create_note(&owner, "Plan", "", Some(work.id.clone()))
        .unwrap();

    service.delete_folder(&owner, &work.id).unwrap();

    let build = service.workspace_tree(&owner).unwrap();
    assert!(build.is_clean());
    assert_eq!(build.roots.len(), 1);
    assert_eq!(build.roots[0].id, note.id);
    assert!(service.get_note(&owner, &note.id).unwrap().is_some());
}
