pub mod checklist_io;
pub mod config_io;

pub use checklist_io::{ChecklistFormat, ChecklistIoError, read_checklist, write_checklist};
pub use config_io::read_config;
