use std::io::Read;

use clap::Parser;

use super::{apply_op, load_list, save_list};
use crate::cli::commands::{RunArgs, ScriptLine};
use crate::model::config::ListConfig;

/// Apply a script of edits to one checklist and save once at the end.
/// Any failing line aborts the run and leaves the file untouched.
pub fn cmd_run(args: RunArgs, config: &ListConfig) -> Result<(), Box<dyn std::error::Error>> {
    let script = match args.script {
        Some(ref path) => std::fs::read_to_string(path)
            .map_err(|e| format!("could not read {}: {}", path.display(), e))?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let mut manager = load_list(&args.file, config)?;
    let mut messages = Vec::new();
    for (index, raw) in script.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let words = split_words(line).map_err(|e| format!("line {}: {}", line_no, e))?;
        let parsed = ScriptLine::try_parse_from(&words)
            .map_err(|_| format!("line {}: invalid command: {}", line_no, line))?;
        let message =
            apply_op(&mut manager, &parsed.op).map_err(|e| format!("line {}: {}", line_no, e))?;
        messages.push(message);
    }

    save_list(&args.file, &manager)?;
    for message in messages {
        println!("{}", message);
    }
    tracing::debug!(
        can_undo = manager.can_undo(),
        can_redo = manager.can_redo(),
        "script finished"
    );
    Ok(())
}

/// Split a script line into words. Single or double quotes group words.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
