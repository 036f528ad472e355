mod script;
pub use script::cmd_run;

use std::path::Path;

use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::checklist_io::{self, ChecklistIoError};
use crate::io::config_io;
use crate::model::config::ListConfig;
use crate::model::item::{ItemBlock, ItemId, ListItem};
use crate::ops::list_manager::{ListError, ListManager};
use crate::sort::sorted_items::{ChildrenOnDelete, SortedItems};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let cwd = std::env::current_dir()?;
    let mut config = config_io::read_config(cli.config.as_deref(), &cwd)?;
    if let Some(sort) = cli.sort {
        config.list.sort = sort;
    }
    let config = config.list;

    match cli.command {
        // Read commands
        Commands::Show(args) => cmd_show(&args.file, &config, json),
        Commands::Find(args) => cmd_find(args, &config, json),

        // Single edits
        Commands::Add { file, op } => cmd_edit(&file.file, EditOp::Add(op), &config),
        Commands::Check { file, op } => cmd_edit(&file.file, EditOp::Check(op), &config),
        Commands::Uncheck { file, op } => cmd_edit(&file.file, EditOp::Uncheck(op), &config),
        Commands::Indent { file, op } => cmd_edit(&file.file, EditOp::Indent(op), &config),
        Commands::Outdent { file, op } => cmd_edit(&file.file, EditOp::Outdent(op), &config),
        Commands::Mv { file, op } => cmd_edit(&file.file, EditOp::Mv(op), &config),
        Commands::Rm { file, op } => cmd_edit(&file.file, EditOp::Rm(op), &config),
        Commands::Edit { file, op } => cmd_edit(&file.file, EditOp::Edit(op), &config),
        Commands::ClearChecked(args) => cmd_edit(&args.file, EditOp::ClearChecked, &config),
        Commands::CheckAll(args) => cmd_edit(&args.file, EditOp::CheckAll, &config),
        Commands::UncheckAll(args) => cmd_edit(&args.file, EditOp::UncheckAll, &config),

        // Maintenance
        Commands::Normalize(args) => cmd_normalize(&args.file, &config),
        Commands::Run(args) => cmd_run(args, &config),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_list(path: &Path, config: &ListConfig) -> Result<ListManager, ChecklistIoError> {
    let records = checklist_io::read_checklist(path)?;
    Ok(ListManager::from_records(records, config))
}

fn save_list(path: &Path, manager: &ListManager) -> Result<(), ChecklistIoError> {
    checklist_io::write_checklist(path, &manager.to_records())
}

fn id_at(manager: &ListManager, position: usize) -> Result<ItemId, ListError> {
    manager
        .items()
        .get(position)
        .map(|i| i.id)
        .ok_or(ListError::PositionOutOfRange {
            position,
            len: manager.items().len(),
        })
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Apply one edit, recording it in the history. Returns a one-line summary.
pub(crate) fn apply_op(manager: &mut ListManager, op: &EditOp) -> Result<String, ListError> {
    let message = match op {
        EditOp::Add(add) => {
            let item = manager.new_item(add.text.clone());
            let item = if add.child { item.into_child() } else { item };
            let position = manager.add(add.at, Some(ItemBlock::new(item)), true)?;
            format!("added at {}", position)
        }
        EditOp::Check(p) | EditOp::Uncheck(p) => {
            let checked = matches!(op, EditOp::Check(_));
            let id = id_at(manager, p.position)?;
            let changed = manager.change_checked_by_id(id, checked, true)?;
            let verb = if checked { "checked" } else { "unchecked" };
            if changed {
                format!("{} {}", verb, p.position)
            } else {
                format!("already {}", verb)
            }
        }
        EditOp::Indent(p) | EditOp::Outdent(p) => {
            let indent = matches!(op, EditOp::Indent(_));
            if manager.change_is_child(p.position, indent, true)? {
                format!("{} {}", if indent { "indented" } else { "outdented" }, p.position)
            } else {
                "unchanged".to_string()
            }
        }
        EditOp::Mv(m) => match manager.move_item(m.from, m.to, true)? {
            Some(position) => format!("moved to {}", position),
            None => "not moved".to_string(),
        },
        EditOp::Rm(r) => {
            let id = id_at(manager, r.position)?;
            let children = if r.keep_children {
                ChildrenOnDelete::Only(Vec::new())
            } else {
                ChildrenOnDelete::Cascade
            };
            let block = manager.delete_by_id(id, children, true)?;
            format!("deleted {} row{}", block.len(), plural(block.len()))
        }
        EditOp::Edit(e) => {
            let id = id_at(manager, e.position)?;
            if manager.change_body(id, e.text.clone(), true)? {
                format!("edited {}", e.position)
            } else {
                "unchanged".to_string()
            }
        }
        EditOp::ClearChecked => {
            let n = manager.delete_checked_items(true)?;
            format!("deleted {} checked row{}", n, plural(n))
        }
        EditOp::CheckAll | EditOp::UncheckAll => {
            let checked = matches!(op, EditOp::CheckAll);
            let n = manager.change_checked_for_all(checked, true)?;
            let verb = if checked { "checked" } else { "unchecked" };
            format!("{} {} row{}", verb, n, plural(n))
        }
        EditOp::Undo => {
            if manager.undo()? {
                "undone".to_string()
            } else {
                "nothing to undo".to_string()
            }
        }
        EditOp::Redo => {
            if manager.redo()? {
                "redone".to_string()
            } else {
                "nothing to redo".to_string()
            }
        }
    };
    Ok(message)
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(path: &Path, config: &ListConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let manager = load_list(path, config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&list_to_json(manager.items()))?);
        return Ok(());
    }
    for (position, item) in manager.items().iter().enumerate() {
        println!("{}", format_row(position, item));
    }
    Ok(())
}

fn cmd_find(args: FindArgs, config: &ListConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let re = Regex::new(&args.pattern)?;
    let manager = load_list(&args.file, config)?;
    let hits: Vec<(usize, &ListItem)> = manager
        .items()
        .iter()
        .enumerate()
        .filter(|(_, item)| re.is_match(&item.body))
        .collect();

    if json {
        let items: Vec<ItemJson> = hits
            .iter()
            .map(|(position, item)| item_to_json(*position, item))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    for (position, item) in hits {
        println!("{}", format_row(position, item));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_edit(path: &Path, op: EditOp, config: &ListConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut manager = load_list(path, config)?;
    let message = apply_op(&mut manager, &op)?;
    save_list(path, &manager)?;
    println!("{}", message);
    Ok(())
}

fn cmd_normalize(path: &Path, config: &ListConfig) -> Result<(), Box<dyn std::error::Error>> {
    let records = checklist_io::read_checklist(path)?;
    let mut items = SortedItems::new(config.sort);
    let repaired = items.init(records);
    checklist_io::write_checklist(path, &items.to_records())?;
    println!(
        "normalized {} row{} ({} repaired)",
        items.len(),
        plural(items.len()),
        repaired
    );
    Ok(())
}
