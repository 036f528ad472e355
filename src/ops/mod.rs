pub mod list_manager;

pub use list_manager::{ListError, ListManager};
