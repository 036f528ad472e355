//! Ordered, nested checklists with checked-state sorting and exact undo/redo.
//!
//! [`ops::ListManager`] is the entry point: it owns the sorted rows of one
//! checklist and the history of changes made to them.

pub mod cli;
pub mod history;
pub mod io;
pub mod model;
pub mod ops;
pub mod parse;
pub mod sort;
