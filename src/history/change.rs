use crate::model::item::{ItemBlock, ItemId, ListItem};
use crate::ops::list_manager::{ListError, ListManager};
use crate::sort::sorted_items::ChildrenOnDelete;

/// Which way a recorded change is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Replay the change (redo)
    Forward,
    /// Revert the change (undo)
    Reverse,
}

/// A reversible record of one list mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Rows were added
    Add {
        /// Requested display position
        position: usize,
        /// The inserted rows as they were placed
        block: ItemBlock,
        /// Parents whose checked flag followed their children
        reconciled: Vec<(ItemId, bool)>,
    },
    /// A row, and possibly some of its children, was deleted
    Delete {
        /// Display position before the delete
        position: usize,
        /// The removed rows with their orders before the delete
        block: ItemBlock,
        /// Children left behind that had to be made top-level
        promoted: Vec<ItemId>,
        reconciled: Vec<(ItemId, bool)>,
    },
    /// A row (with its children) was moved
    Move {
        from: usize,
        to: usize,
        /// Where the row actually ended up
        position_after: usize,
        /// The moved rows before the move
        before: ItemBlock,
        reconciled: Vec<(ItemId, bool)>,
    },
    /// A checked flag changed; `flipped` also holds rows changed by the cascade
    Checked {
        id: ItemId,
        checked: bool,
        flipped: Vec<ItemId>,
    },
    /// A row was indented or outdented
    IsChild {
        id: ItemId,
        position: usize,
        is_child: bool,
        reconciled: Vec<(ItemId, bool)>,
    },
    /// Every checked row was removed
    DeleteChecked {
        removed: Vec<ListItem>,
        promoted: Vec<ItemId>,
    },
    /// Every row was checked or unchecked
    CheckedForAll { checked: bool, flipped: Vec<ItemId> },
    /// A row's text was edited
    Body {
        id: ItemId,
        old: String,
        new: String,
    },
}

impl Change {
    /// Short name for logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            Change::Add { .. } => "add",
            Change::Delete { .. } => "delete",
            Change::Move { .. } => "move",
            Change::Checked { .. } => "checked",
            Change::IsChild { .. } => "is-child",
            Change::DeleteChecked { .. } => "delete-checked",
            Change::CheckedForAll { .. } => "checked-for-all",
            Change::Body { .. } => "body",
        }
    }

    /// Replay or revert this change on `manager` without recording anything.
    pub fn apply(&self, manager: &mut ListManager, direction: Direction) -> Result<(), ListError> {
        match direction {
            Direction::Forward => self.apply_forward(manager),
            Direction::Reverse => self.apply_inverse(manager),
        }
    }

    fn apply_forward(&self, manager: &mut ListManager) -> Result<(), ListError> {
        match self {
            Change::Add {
                position, block, ..
            } => {
                manager.add(Some(*position), Some(block.clone()), false)?;
            }
            Change::Delete { block, .. } => {
                let children = block.children.iter().map(|c| c.id).collect();
                manager.delete_by_id(block.item.id, ChildrenOnDelete::Only(children), false)?;
            }
            Change::Move { from, to, .. } => {
                manager.move_item(*from, *to, false)?;
            }
            Change::Checked { id, checked, .. } => {
                manager.change_checked_by_id(*id, *checked, false)?;
            }
            Change::IsChild {
                position, is_child, ..
            } => {
                manager.change_is_child(*position, *is_child, false)?;
            }
            Change::DeleteChecked { .. } => {
                manager.delete_checked_items(false)?;
            }
            Change::CheckedForAll { checked, .. } => {
                manager.change_checked_for_all(*checked, false)?;
            }
            Change::Body { id, new, .. } => {
                manager.change_body(*id, new.clone(), false)?;
            }
        }
        Ok(())
    }

    fn apply_inverse(&self, manager: &mut ListManager) -> Result<(), ListError> {
        match self {
            Change::Add {
                block, reconciled, ..
            } => {
                manager.revert_reconciled(reconciled)?;
                manager.undo_add(block)?;
            }
            Change::Delete {
                block,
                promoted,
                reconciled,
                ..
            } => {
                manager.revert_reconciled(reconciled)?;
                manager.restore(block.clone().into_rows(), promoted)?;
            }
            Change::Move {
                before, reconciled, ..
            } => {
                manager.revert_reconciled(reconciled)?;
                manager.undo_move(before)?;
            }
            Change::Checked {
                checked, flipped, ..
            }
            | Change::CheckedForAll { checked, flipped } => {
                manager.set_checked_ids(flipped, !*checked)?;
            }
            Change::IsChild {
                id,
                is_child,
                reconciled,
                ..
            } => {
                manager.revert_reconciled(reconciled)?;
                manager.set_is_child_by_id(*id, !*is_child)?;
            }
            Change::DeleteChecked { removed, promoted } => {
                manager.restore(removed.clone(), promoted)?;
            }
            Change::Body { id, old, .. } => {
                manager.change_body(*id, old.clone(), false)?;
            }
        }
        Ok(())
    }
}
