use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::config::SortPolicy;

#[derive(Parser)]
#[command(name = "ck", about = concat!("ck v", env!("CARGO_PKG_VERSION"), " - nested checklists in plain text"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: checklist.toml in the current directory)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Sort order for display positions: plain or checked
    #[arg(long, global = true, value_parser = parse_sort)]
    pub sort: Option<SortPolicy>,
}

fn parse_sort(s: &str) -> Result<SortPolicy, String> {
    SortPolicy::parse(s).ok_or_else(|| format!("unknown sort '{}' (expected plain or checked)", s))
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the checklist with display positions
    Show(FileArgs),
    /// List rows whose text matches a regex
    Find(FindArgs),
    /// Add a row
    Add {
        #[command(flatten)]
        file: FileArgs,
        #[command(flatten)]
        op: AddOp,
    },
    /// Check a row
    Check {
        #[command(flatten)]
        file: FileArgs,
        #[command(flatten)]
        op: PositionOp,
    },
    /// Uncheck a row
    Uncheck {
        #[command(flatten)]
        file: FileArgs,
        #[command(flatten)]
        op: PositionOp,
    },
    /// Nest a row under the row above it
    Indent {
        #[command(flatten)]
        file: FileArgs,
        #[command(flatten)]
        op: PositionOp,
    },
    /// Make a nested row top-level
    Outdent {
        #[command(flatten)]
        file: FileArgs,
        #[command(flatten)]
        op: PositionOp,
    },
    /// Move a row (and its children)
    Mv {
        #[command(flatten)]
        file: FileArgs,
        #[command(flatten)]
        op: MvOp,
    },
    /// Delete a row (and its children)
    Rm {
        #[command(flatten)]
        file: FileArgs,
        #[command(flatten)]
        op: RmOp,
    },
    /// Replace the text of a row
    Edit {
        #[command(flatten)]
        file: FileArgs,
        #[command(flatten)]
        op: EditTextOp,
    },
    /// Delete every checked row
    ClearChecked(FileArgs),
    /// Check every row
    CheckAll(FileArgs),
    /// Uncheck every row
    UncheckAll(FileArgs),
    /// Repair ids and orders and rewrite the file in canonical form
    Normalize(FileArgs),
    /// Apply a script of edits, one per line (supports undo and redo)
    Run(RunArgs),
}

// ---------------------------------------------------------------------------
// Shared args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct FileArgs {
    /// Checklist file (.json for JSON, anything else for markdown)
    pub file: PathBuf,
}

#[derive(Args)]
pub struct FindArgs {
    /// Checklist file
    pub file: PathBuf,
    /// Regex pattern to search for
    pub pattern: String,
}

#[derive(Args)]
pub struct RunArgs {
    /// Checklist file
    pub file: PathBuf,
    /// Script file (default: read from stdin)
    pub script: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Edit operations (shared by single commands and scripts)
// ---------------------------------------------------------------------------

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AddOp {
    /// Row text
    pub text: String,
    /// Display position to insert at (default: end of the unchecked rows)
    #[arg(long)]
    pub at: Option<usize>,
    /// Nest the new row under the row above it
    #[arg(long)]
    pub child: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PositionOp {
    /// Display position of the row
    pub position: usize,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MvOp {
    /// Display position of the row to move
    pub from: usize,
    /// Display position to move it to
    pub to: usize,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RmOp {
    /// Display position of the row
    pub position: usize,
    /// Keep the row's children instead of deleting them
    #[arg(long)]
    pub keep_children: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EditTextOp {
    /// Display position of the row
    pub position: usize,
    /// New text
    pub text: String,
}

/// One line of a `run` script
#[derive(Parser, Debug)]
#[command(name = "script", no_binary_name = true, disable_help_flag = true)]
pub struct ScriptLine {
    #[command(subcommand)]
    pub op: EditOp,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Add(AddOp),
    Check(PositionOp),
    Uncheck(PositionOp),
    Indent(PositionOp),
    Outdent(PositionOp),
    Mv(MvOp),
    Rm(RmOp),
    Edit(EditTextOp),
    ClearChecked,
    CheckAll,
    UncheckAll,
    Undo,
    Redo,
}
