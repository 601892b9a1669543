//! Journal CLI entry point.
//!
//! # Responsibility
//! - Provide a smoke probe that verifies `journal_core` linkage.
//! - Print one owner's workspace tree from a journal database file.

use journal_core::db::open_db;
use journal_core::{
    init_logging_from_config, CoreConfig, JournalService, OwnerAddress, SqliteJournalRepository,
    TreeAnomaly, TreeNode,
};
use log::error;
use std::process::ExitCode;

const USAGE: &str = "usage: journal_cli [tree <db_path> <owner_address>]";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => {
            println!("journal_core ping={}", journal_core::ping());
            println!("journal_core version={}", journal_core::core_version());
            ExitCode::SUCCESS
        }
        ["tree", db_path, owner] => match print_tree(db_path, owner) {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                error!("event=cli_tree module=cli status=error error={message}");
                eprintln!("{message}");
                ExitCode::FAILURE
            }
        },
        _ => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
    }
}

fn print_tree(db_path: &str, owner: &str) -> Result<(), String> {
    let owner = OwnerAddress::parse(owner).map_err(|err| err.to_string())?;
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let repo = SqliteJournalRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = JournalService::new(repo);

    let build = service
        .workspace_tree(&owner)
        .map_err(|err| err.to_string())?;
    print!("{}", render_tree(&build.roots));
    for anomaly in &build.anomalies {
        println!("! {}", describe_anomaly(anomaly));
    }
    Ok(())
}

/// Renders one indented line per node, in sibling order.
fn render_tree(roots: &[TreeNode]) -> String {
    let mut out = String::new();
    let mut pending: Vec<(&TreeNode, usize)> = roots.iter().rev().map(|node| (node, 0)).collect();
    while let Some((node, depth)) = pending.pop() {
        let marker = if node.is_folder() { "+" } else { "-" };
        out.push_str(&format!("{}{marker} {}\n", "  ".repeat(depth), node.name));
        pending.extend(node.children().iter().rev().map(|child| (child, depth + 1)));
    }
    out
}

fn describe_anomaly(anomaly: &TreeAnomaly) -> String {
    match anomaly {
        TreeAnomaly::DanglingParent { node_id, parent_id } => {
            format!("{node_id}: parent {parent_id} not found, shown at root")
        }
        TreeAnomaly::ParentIsNote { node_id, parent_id } => {
            format!("{node_id}: parent {parent_id} is a note, shown at root")
        }
        TreeAnomaly::DuplicateId { node_id } => format!("{node_id}: duplicate id skipped"),
        TreeAnomaly::CycleBroken {
            folder_id,
            parent_id,
        } => format!("{folder_id}: parent cycle through {parent_id} cut, shown at root"),
    }
}
