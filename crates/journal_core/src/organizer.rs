//! Note organization views over flat note/folder snapshots.
//!
//! # Responsibility
//! - Build the nested folder tree rendered by the sidebar.
//! - Filter, rank and title notes without touching storage.
//! - Resolve breadcrumb paths for folders.
//!
//! # Invariants
//! - Every function is pure: inputs are borrowed and never mutated.
//! - Malformed hierarchy data never fails a call. Dangling parents render
//!   at root, parent cycles are cut, breadcrumb walks truncate.
//! - Siblings are ordered folders first, then by collated name (Unicode
//!   collation, CLDR root order).
//! - Empty-string parent ids are treated like `None` (root).

use crate::model::note::{Folder, Note};
use crate::model::tree::{TreeNode, TreeNodeKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use feruca::Collator;
use log::{debug, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

thread_local! {
    // `Collator::collate` takes `&mut self`.
    static NAME_COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

/// Default result size for [`get_recent_notes`].
pub const RECENT_NOTES_DEFAULT_LIMIT: usize = 10;

/// Hierarchy problem recovered while building a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeAnomaly {
    /// Declared parent id matches no folder or note; node rendered at root.
    DanglingParent { node_id: String, parent_id: String },
    /// Declared parent id is a note; node rendered at root.
    ParentIsNote { node_id: String, parent_id: String },
    /// Id already used by an earlier folder or note; this entry is dropped.
    DuplicateId { node_id: String },
    /// Folder parent chain looped back; this folder's parent link was cut.
    CycleBroken { folder_id: String, parent_id: String },
}

/// Tree roots plus every anomaly recovered while building them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeBuild {
    pub roots: Vec<TreeNode>,
    pub anomalies: Vec<TreeAnomaly>,
}

impl TreeBuild {
    /// Returns whether the input hierarchy was fully consistent.
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}

struct ArenaEntry<'a> {
    id: &'a str,
    name: &'a str,
    declared_parent: Option<&'a str>,
    is_folder: bool,
    parent: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    OnPath,
    Done,
}

/// Builds the sorted folder/note forest. Returns root nodes only.
pub fn build_tree(notes: &[Note], folders: &[Folder]) -> Vec<TreeNode> {
    build_tree_with_report(notes, folders).roots
}

/// Builds a folder-only forest, as used by folder pickers and the sidebar.
pub fn build_folder_tree(folders: &[Folder]) -> Vec<TreeNode> {
    build_tree(&[], folders)
}

/// Builds the sorted forest and reports recovered hierarchy anomalies.
pub fn build_tree_with_report(notes: &[Note], folders: &[Folder]) -> TreeBuild {
    let mut anomalies = Vec::new();
    let mut arena: Vec<ArenaEntry<'_>> = Vec::with_capacity(folders.len() + notes.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(folders.len() + notes.len());

    let folder_entries = folders.iter().map(|folder| ArenaEntry {
        id: folder.id.as_str(),
        name: folder.name.as_str(),
        declared_parent: non_empty(folder.parent_id.as_deref()),
        is_folder: true,
        parent: None,
    });
    let note_entries = notes.iter().map(|note| ArenaEntry {
        id: note.id.as_str(),
        name: note.title.as_str(),
        declared_parent: non_empty(note.folder_id.as_deref()),
        is_folder: false,
        parent: None,
    });

    for entry in folder_entries.chain(note_entries) {
        if index.contains_key(entry.id) {
            anomalies.push(TreeAnomaly::DuplicateId {
                node_id: entry.id.to_string(),
            });
            continue;
        }
        index.insert(entry.id, arena.len());
        arena.push(entry);
    }

    for position in 0..arena.len() {
        let Some(parent_id) = arena[position].declared_parent else {
            continue;
        };
        match index.get(parent_id) {
            Some(&parent) if arena[parent].is_folder => arena[position].parent = Some(parent),
            Some(_) => anomalies.push(TreeAnomaly::ParentIsNote {
                node_id: arena[position].id.to_string(),
                parent_id: parent_id.to_string(),
            }),
            None => anomalies.push(TreeAnomaly::DanglingParent {
                node_id: arena[position].id.to_string(),
                parent_id: parent_id.to_string(),
            }),
        }
    }

    break_parent_cycles(&mut arena, &mut anomalies);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); arena.len()];
    let mut roots = Vec::new();
    for (position, entry) in arena.iter().enumerate() {
        match entry.parent {
            Some(parent) => children[parent].push(position),
            None => roots.push(position),
        }
    }

    let mut root_nodes = materialize(&arena, &children, &roots);
    root_nodes.sort_by(compare_tree_nodes);

    if anomalies.is_empty() {
        debug!(
            "event=tree_build module=organizer status=ok folders={} notes={}",
            folders.len(),
            notes.len()
        );
    } else {
        warn!(
            "event=tree_build module=organizer status=recovered folders={} notes={} anomalies={}",
            folders.len(),
            notes.len(),
            anomalies.len()
        );
    }

    TreeBuild {
        roots: root_nodes,
        anomalies,
    }
}

/// Cuts every folder parent cycle so that each chain ends at root.
///
/// Folders are scanned in input order. When a walk reaches a folder that is
/// still on the current path, that folder is detached and becomes a root.
fn break_parent_cycles(arena: &mut [ArenaEntry<'_>], anomalies: &mut Vec<TreeAnomaly>) {
    let mut state = vec![VisitState::Unvisited; arena.len()];

    for start in 0..arena.len() {
        if !arena[start].is_folder || state[start] != VisitState::Unvisited {
            continue;
        }

        let mut path = Vec::new();
        let mut cursor = Some(start);
        while let Some(current) = cursor {
            match state[current] {
                VisitState::Done => break,
                VisitState::OnPath => {
                    anomalies.push(TreeAnomaly::CycleBroken {
                        folder_id: arena[current].id.to_string(),
                        parent_id: arena[current]
                            .declared_parent
                            .unwrap_or_default()
                            .to_string(),
                    });
                    arena[current].parent = None;
                    break;
                }
                VisitState::Unvisited => {
                    state[current] = VisitState::OnPath;
                    path.push(current);
                    cursor = arena[current].parent;
                }
            }
        }

        for visited in path {
            state[visited] = VisitState::Done;
        }
    }
}

/// Builds owned nodes bottom-up from the linked arena.
///
/// Walks with an explicit worklist; folder depth is not bounded by the stack.
fn materialize(
    arena: &[ArenaEntry<'_>],
    children: &[Vec<usize>],
    roots: &[usize],
) -> Vec<TreeNode> {
    let mut built: Vec<Option<TreeNode>> = std::iter::repeat_with(|| None)
        .take(arena.len())
        .collect();
    let mut pending: Vec<(usize, bool)> = roots.iter().map(|&root| (root, false)).collect();

    while let Some((position, expanded)) = pending.pop() {
        if !expanded {
            pending.push((position, true));
            pending.extend(children[position].iter().map(|&child| (child, false)));
            continue;
        }

        let entry = &arena[position];
        let parent_id = entry.declared_parent.map(str::to_string);
        let node = if entry.is_folder {
            let mut nested: Vec<TreeNode> = children[position]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            nested.sort_by(compare_tree_nodes);
            TreeNode {
                id: entry.id.to_string(),
                name: entry.name.to_string(),
                parent_id,
                kind: TreeNodeKind::Folder { children: nested },
            }
        } else {
            TreeNode::note_ref(entry.id, entry.name, parent_id)
        };
        built[position] = Some(node);
    }

    roots
        .iter()
        .filter_map(|&root| built[root].take())
        .collect()
}

/// Sibling order: folders before notes, then [`compare_names`].
pub fn compare_tree_nodes(left: &TreeNode, right: &TreeNode) -> Ordering {
    match (left.is_folder(), right.is_folder()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => compare_names(left.name.as_str(), right.name.as_str()),
    }
}

/// Locale-aware name comparison with a deterministic tie-break.
///
/// Names are collated with the Unicode Collation Algorithm (CLDR root), so
/// accented and non-Latin initials sort next to their base letters. Names
/// that collate equal fall back to a raw comparison where the lower-case
/// spelling sorts first.
pub fn compare_names(left: &str, right: &str) -> Ordering {
    NAME_COLLATOR
        .with(|collator| collator.borrow_mut().collate(left, right))
        .then_with(|| right.cmp(left))
}

/// Case-insensitive substring search over note title and content.
///
/// A blank query returns every note in input order.
pub fn search_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    if query.trim().is_empty() {
        return notes.iter().collect();
    }

    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|note| {
            note.title.to_lowercase().contains(&needle)
                || note.content.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Returns notes whose folder reference equals `folder_id` (`None` = root).
pub fn notes_in_folder<'a>(notes: &'a [Note], folder_id: Option<&str>) -> Vec<&'a Note> {
    let folder_id = non_empty(folder_id);
    notes
        .iter()
        .filter(|note| non_empty(note.folder_id.as_deref()) == folder_id)
        .collect()
}

/// Resolves the breadcrumb from the root-most ancestor down to `folder_id`.
///
/// The walk stops early, keeping what it found so far, when an id is
/// missing or when the chain revisits a folder.
pub fn get_folder_path<'a>(folder_id: Option<&str>, folders: &'a [Folder]) -> Vec<&'a Folder> {
    let mut by_id: HashMap<&str, &Folder> = HashMap::with_capacity(folders.len());
    for folder in folders {
        by_id.entry(folder.id.as_str()).or_insert(folder);
    }

    let mut path = Vec::new();
    let mut visited = HashSet::new();
    let mut cursor = non_empty(folder_id);
    while let Some(current) = cursor {
        if !visited.insert(current) {
            warn!("event=folder_path module=organizer status=cycle folder_id={current}");
            break;
        }
        let Some(folder) = by_id.get(current) else {
            break;
        };
        path.push(*folder);
        cursor = non_empty(folder.parent_id.as_deref());
    }

    path.reverse();
    path
}

/// Returns `base_title` or the first free `"{base_title} {n}"`, `n >= 1`.
///
/// Matching is exact and case-sensitive.
pub fn generate_unique_title<S: AsRef<str>>(existing_titles: &[S], base_title: &str) -> String {
    let taken: HashSet<&str> = existing_titles.iter().map(AsRef::as_ref).collect();
    if !taken.contains(base_title) {
        return base_title.to_string();
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{base_title} {counter}");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Returns up to `limit` notes, most recently updated first.
///
/// Ties keep input order. Unparseable `updated_at` values sort last.
pub fn get_recent_notes(notes: &[Note], limit: usize) -> Vec<&Note> {
    let mut ranked: Vec<(Option<DateTime<Utc>>, &Note)> = notes
        .iter()
        .map(|note| (parse_timestamp(note.updated_at.as_str()), note))
        .collect();

    ranked.sort_by(|(left, _), (right, _)| match (left, right) {
        (Some(left), Some(right)) => right.cmp(left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|(_, note)| note)
        .collect()
}

/// Parses an ISO-8601 timestamp for ordering.
///
/// Accepts RFC 3339, zone-less date-times (read as UTC) and plain dates.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|id| !id.is_empty())
}
