pub mod change;
pub mod change_history;

pub use change::{Change, Direction};
pub use change_history::{ChangeHistory, DEFAULT_HISTORY_LIMIT};
