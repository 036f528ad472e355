use std::fs;
use std::io;
use std::path::Path;

use crate::io::checklist_io::ChecklistIoError;
use crate::model::config::ChecklistConfig;

pub const CONFIG_FILE: &str = "checklist.toml";

/// Load configuration.
///
/// An explicit `path` must exist. Otherwise `checklist.toml` in `dir` is used
/// when present, and defaults when it is not.
pub fn read_config(path: Option<&Path>, dir: &Path) -> Result<ChecklistConfig, ChecklistIoError> {
    let (config_path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (dir.join(CONFIG_FILE), false),
    };
    let text = match fs::read_to_string(&config_path) {
        Ok(text) => text,
        Err(e) if !required && e.kind() == io::ErrorKind::NotFound => {
            return Ok(ChecklistConfig::default());
        }
        Err(source) => {
            return Err(ChecklistIoError::ReadError {
                path: config_path,
                source,
            });
        }
    };
    let config: ChecklistConfig = toml::from_str(&text)?;
    tracing::debug!(path = %config_path.display(), sort = config.list.sort.as_str(), "loaded config");
    Ok(config)
}
