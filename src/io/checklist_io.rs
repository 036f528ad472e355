use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::item::ItemRecord;
use crate::parse::{parse_checklist, serialize_checklist};

/// Error type for checklist and config file I/O
#[derive(Debug, thiserror::Error)]
pub enum ChecklistIoError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("invalid checklist JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("could not parse checklist.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
}

/// On-disk representation of a checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistFormat {
    /// Markdown checkbox lines
    Markdown,
    /// A JSON array of item records
    Json,
}

impl ChecklistFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ChecklistFormat::Json,
            _ => ChecklistFormat::Markdown,
        }
    }
}

/// Read a checklist file. A missing file is an empty checklist.
pub fn read_checklist(path: &Path) -> Result<Vec<ItemRecord>, ChecklistIoError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no checklist file, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(ChecklistIoError::ReadError {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    decode(&text, ChecklistFormat::from_path(path))
}

pub fn decode(text: &str, format: ChecklistFormat) -> Result<Vec<ItemRecord>, ChecklistIoError> {
    match format {
        ChecklistFormat::Markdown => Ok(parse_checklist(text)),
        ChecklistFormat::Json if text.trim().is_empty() => Ok(Vec::new()),
        ChecklistFormat::Json => Ok(serde_json::from_str(text)?),
    }
}

pub fn encode(records: &[ItemRecord], format: ChecklistFormat) -> Result<String, ChecklistIoError> {
    match format {
        ChecklistFormat::Markdown => Ok(serialize_checklist(records)),
        ChecklistFormat::Json => {
            let mut text = serde_json::to_string_pretty(records)?;
            text.push('\n');
            Ok(text)
        }
    }
}

/// Write records to `path` in the format its extension selects
pub fn write_checklist(path: &Path, records: &[ItemRecord]) -> Result<(), ChecklistIoError> {
    let text = encode(records, ChecklistFormat::from_path(path))?;
    atomic_write(path, text.as_bytes()).map_err(|source| ChecklistIoError::WriteError {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), rows = records.len(), "wrote checklist");
    Ok(())
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
