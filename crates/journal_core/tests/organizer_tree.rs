use journal_core::{
    build_folder_tree, build_tree, build_tree_with_report, compare_names, Folder, Note,
    OwnerAddress, TreeAnomaly, TreeNode,
};
use std::cmp::Ordering;

const OWNER: &str = "0x00000000000000000000000000000000000000aa";

fn owner() -> OwnerAddress {
    OwnerAddress::parse(OWNER).unwrap()
}

fn folder(id: &str, name: &str, parent_id: Option<&str>) -> Folder {
    Folder {
        id: id.to_string(),
        name: name.to_string(),
        parent_id: parent_id.map(str::to_string),
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
        owner_address: owner(),
    }
}

fn note(id: &str, title: &str, folder_id: Option<&str>) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        content: String::new(),
        folder_id: folder_id.map(str::to_string),
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
        updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        owner_address: owner(),
    }
}

fn names(nodes: &[TreeNode]) -> Vec<&str> {
    nodes.iter().map(|node| node.name.as_str()).collect()
}

fn collect_depths(nodes: &[TreeNode], depth: usize, out: &mut Vec<(String, usize)>) {
    for node in nodes {
        out.push((node.id.clone(), depth));
        collect_depths(node.children(), depth + 1, out);
    }
}

fn assert_siblings_ordered(nodes: &[TreeNode]) {
    for pair in nodes.windows(2) {
        let (left, right) = (&pair[0], &pair[1]);
        assert!(
            left.is_folder() || !right.is_folder(),
            "note `{}` sorted before folder `{}`",
            left.name,
            right.name
        );
        if left.is_folder() == right.is_folder() {
            assert_ne!(
                compare_names(&left.name, &right.name),
                Ordering::Greater,
                "`{}` sorted before `{}`",
                left.name,
                right.name
            );
        }
    }
    for node in nodes {
        assert_siblings_ordered(node.children());
    }
}

#[test]
fn empty_inputs_build_empty_forest() {
    assert!(build_tree(&[], &[]).is_empty());

    let build = build_tree_with_report(&[], &[]);
    assert!(build.roots.is_empty());
    assert!(build.is_clean());
}

#[test]
fn notes_nest_under_their_folders() {
    let folders = vec![
        folder("c", "Drafts", Some("b")),
        folder("a", "Work", None),
        folder("b", "Projects", Some("a")),
    ];
    let notes = vec![
        note("n-1", "Plan", Some("c")),
        note("n-2", "Inbox", None),
        note("n-3", "Roadmap", Some("b")),
    ];

    let roots = build_tree(&notes, &folders);
    assert_eq!(names(&roots), vec!["Work", "Inbox"]);

    let work = &roots[0];
    assert_eq!(names(work.children()), vec!["Projects"]);
    let projects = &work.children()[0];
    assert_eq!(names(projects.children()), vec!["Drafts", "Roadmap"]);
    let drafts = &projects.children()[0];
    assert_eq!(names(drafts.children()), vec!["Plan"]);
    assert_eq!(drafts.parent_id.as_deref(), Some("b"));
}

#[test]
fn every_node_appears_once_at_its_chain_depth() {
    let folders = vec![
        folder("a", "A", None),
        folder("b", "B", Some("a")),
        folder("c", "C", Some("b")),
        folder("d", "D", Some("a")),
    ];
    let notes = vec![
        note("n-1", "one", Some("c")),
        note("n-2", "two", None),
        note("n-3", "three", Some("d")),
    ];

    let build = build_tree_with_report(&notes, &folders);
    assert!(build.is_clean());

    let mut depths = Vec::new();
    collect_depths(&build.roots, 0, &mut depths);
    depths.sort();

    let expected = vec![
        ("a".to_string(), 0),
        ("b".to_string(), 1),
        ("c".to_string(), 2),
        ("d".to_string(), 1),
        ("n-1".to_string(), 3),
        ("n-2".to_string(), 0),
        ("n-3".to_string(), 2),
    ];
    assert_eq!(depths, expected);
    assert_eq!(
        build.roots.iter().map(TreeNode::subtree_len).sum::<usize>(),
        folders.len() + notes.len()
    );
}

#[test]
fn build_is_idempotent_and_leaves_inputs_untouched() {
    let folders = vec![folder("a", "Beta", None), folder("b", "alpha", Some("a"))];
    let notes = vec![note("n-1", "Zed", Some("a")), note("n-2", "ant", None)];
    let folders_before = folders.clone();
    let notes_before = notes.clone();

    let first = build_tree(&notes, &folders);
    let second = build_tree(&notes, &folders);

    assert_eq!(first, second);
    assert_eq!(folders, folders_before);
    assert_eq!(notes, notes_before);
}

#[test]
fn siblings_sort_folders_first_then_by_name_at_every_depth() {
    let folders = vec![
        folder("f-1", "beta", None),
        folder("f-2", "Alpha", None),
        folder("f-3", "zulu", Some("f-2")),
        folder("f-4", "Echo", Some("f-2")),
    ];
    let notes = vec![
        note("n-1", "zeta", None),
        note("n-2", "Apple", None),
        note("n-3", "apple", None),
        note("n-4", "banana", Some("f-2")),
        note("n-5", "Aardvark", Some("f-2")),
    ];

    let roots = build_tree(&notes, &folders);
    assert_eq!(names(&roots), vec!["Alpha", "beta", "apple", "Apple", "zeta"]);
    assert_eq!(
        names(roots[0].children()),
        vec!["Echo", "zulu", "Aardvark", "banana"]
    );
    assert_siblings_ordered(&roots);
}

#[test]
fn dangling_folder_reference_renders_note_at_root() {
    let folders = vec![folder("a", "Work", None)];
    let notes = vec![note("n-1", "Lost", Some("missing-id"))];

    let build = build_tree_with_report(&notes, &folders);
    assert_eq!(names(&build.roots), vec!["Work", "Lost"]);
    assert_eq!(build.roots[1].parent_id.as_deref(), Some("missing-id"));
    assert_eq!(
        build.anomalies,
        vec![TreeAnomaly::DanglingParent {
            node_id: "n-1".to_string(),
            parent_id: "missing-id".to_string(),
        }]
    );
}

#[test]
fn dangling_parent_folder_renders_subtree_at_root() {
    let folders = vec![folder("b", "Orphan", Some("gone")), folder("c", "Child", Some("b"))];

    let roots = build_tree(&[], &folders);
    assert_eq!(names(&roots), vec!["Orphan"]);
    assert_eq!(names(roots[0].children()), vec!["Child"]);
}

#[test]
fn parent_pointing_at_note_is_treated_as_dangling() {
    let notes = vec![note("n-1", "Host", None), note("n-2", "Guest", Some("n-1"))];

    let build = build_tree_with_report(&notes, &[]);
    assert_eq!(names(&build.roots), vec!["Guest", "Host"]);
    assert!(build.roots.iter().all(|node| node.children().is_empty()));
    assert_eq!(
        build.anomalies,
        vec![TreeAnomaly::ParentIsNote {
            node_id: "n-2".to_string(),
            parent_id: "n-1".to_string(),
        }]
    );
}

#[test]
fn parent_cycle_is_cut_and_every_folder_is_kept() {
    let folders = vec![
        folder("x", "X", Some("y")),
        folder("y", "Y", Some("x")),
        folder("z", "Z", Some("y")),
    ];
    let notes = vec![note("n-1", "Inside", Some("y"))];

    let build = build_tree_with_report(&notes, &folders);
    assert_eq!(names(&build.roots), vec!["X"]);
    let y = &build.roots[0].children()[0];
    assert_eq!(y.id, "y");
    assert_eq!(names(y.children()), vec!["Z", "Inside"]);
    assert_eq!(build.roots[0].subtree_len(), 4);
    assert_eq!(
        build.anomalies,
        vec![TreeAnomaly::CycleBroken {
            folder_id: "x".to_string(),
            parent_id: "y".to_string(),
        }]
    );
}

#[test]
fn self_parented_folder_renders_at_root() {
    let folders = vec![folder("s", "Loop", Some("s"))];

    let build = build_tree_with_report(&[], &folders);
    assert_eq!(names(&build.roots), vec!["Loop"]);
    assert!(build.roots[0].children().is_empty());
    assert!(matches!(
        build.anomalies.as_slice(),
        [TreeAnomaly::CycleBroken { folder_id, .. }] if folder_id == "s"
    ));
}

#[test]
fn duplicate_ids_keep_first_entry() {
    let folders = vec![folder("dup", "Folder", None)];
    let notes = vec![note("dup", "Shadow", None), note("n-1", "Real", Some("dup"))];

    let build = build_tree_with_report(&notes, &folders);
    assert_eq!(names(&build.roots), vec!["Folder"]);
    assert_eq!(names(build.roots[0].children()), vec!["Real"]);
    assert_eq!(
        build.anomalies,
        vec![TreeAnomaly::DuplicateId {
            node_id: "dup".to_string(),
        }]
    );
}

#[test]
fn empty_parent_id_means_root() {
    let folders = vec![folder("a", "Work", Some(""))];
    let notes = vec![note("n-1", "Loose", Some(""))];

    let build = build_tree_with_report(&notes, &folders);
    assert_eq!(names(&build.roots), vec!["Work", "Loose"]);
    assert!(build.is_clean());
}

#[test]
fn folder_tree_contains_folders_only() {
    let folders = vec![folder("a", "Work", None), folder("b", "Home", None)];

    let roots = build_folder_tree(&folders);
    assert_eq!(names(&roots), vec!["Home", "Work"]);
    assert!(roots.iter().all(TreeNode::is_folder));
}

#[test]
fn tree_serializes_with_type_discriminator() {
    let folders = vec![folder("a", "Work", None)];
    let notes = vec![note("n-1", "Plan", Some("a"))];

    let roots = build_tree(&notes, &folders);
    let value = serde_json::to_value(&roots[0]).unwrap();

    assert_eq!(value["type"], "folder");
    assert_eq!(value["id"], "a");
    assert_eq!(value["parent_id"], serde_json::Value::Null);
    let child = &value["children"][0];
    assert_eq!(child["type"], "note");
    assert_eq!(child["name"], "Plan");
    assert_eq!(child["parent_id"], "a");
    assert!(child.get("children").is_none());

    let restored: TreeNode = serde_json::from_value(value).unwrap();
    assert_eq!(restored, roots[0]);
}

#[test]
fn accented_and_non_latin_names_sort_in_collation_order() {
    let folders = vec![
        folder("f-1", "Zebra", None),
        folder("f-2", "École", None),
        folder("f-3", "Apple", None),
        folder("f-4", "ecole", None),
    ];

    let roots = build_folder_tree(&folders);
    assert_eq!(names(&roots), vec!["Apple", "ecole", "École", "Zebra"]);
    assert_eq!(compare_names("Ångström", "Zulu"), Ordering::Less);
    assert_eq!(compare_names("über", "Uber"), Ordering::Greater);
}

#[test]
fn deep_folder_chain_builds_without_recursion_limits() {
    const DEPTH: usize = 1_000;
    let folders: Vec<Folder> = (0..DEPTH)
        .map(|level| {
            let parent = level.checked_sub(1).map(|up| format!("f-{up}"));
            folder(&format!("f-{level}"), &format!("Level {level}"), parent.as_deref())
        })
        .collect();
    let notes = vec![note("n-leaf", "Leaf", Some(format!("f-{}", DEPTH - 1).as_str()))];

    let build = build_tree_with_report(&notes, &folders);
    assert!(build.is_clean());
    assert_eq!(build.roots.len(), 1);
    assert_eq!(build.roots[0].subtree_len(), DEPTH + 1);

    let leaf = build.roots[0].find("n-leaf").unwrap();
    assert_eq!(leaf.parent_id.as_deref(), Some(format!("f-{}", DEPTH - 1).as_str()));
    assert!(!leaf.is_folder());
}
