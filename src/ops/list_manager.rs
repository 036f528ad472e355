use std::collections::{HashMap, HashSet};

use crate::history::change::{Change, Direction};
use crate::history::change_history::ChangeHistory;
use crate::model::config::{ListConfig, SortPolicy};
use crate::model::item::{ItemBlock, ItemId, ItemRecord, ListItem};
use crate::sort::sorted_items::{ChildrenOnDelete, SortedItems};

/// Error type for list operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("item not found: {0}")]
    NotFound(ItemId),
    #[error("invalid position: {position} (list has {len} items)")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("duplicate item id: {0}")]
    DuplicateId(ItemId),
}

/// The mutation API of one checklist editing session.
///
/// Every mutation updates the sorted rows and, when `push_change` is true,
/// records a [`Change`] so it can be undone. Undo and redo replay changes with
/// `push_change = false`.
#[derive(Debug, Clone)]
pub struct ListManager {
    items: SortedItems,
    history: ChangeHistory,
    next_id: u32,
}

impl Default for ListManager {
    fn default() -> Self {
        Self::new(&ListConfig::default())
    }
}

impl ListManager {
    pub fn new(config: &ListConfig) -> Self {
        ListManager {
            items: SortedItems::new(config.sort),
            history: ChangeHistory::new(config.history_limit),
            next_id: 0,
        }
    }

    /// Start a session from loaded records. Orders and ids are repaired.
    pub fn from_records(records: Vec<ItemRecord>, config: &ListConfig) -> Self {
        let mut manager = Self::new(config);
        manager.items.init(records);
        manager.next_id = manager.items.max_id().map_or(0, |id| id.0.saturating_add(1));
        manager
    }

    pub fn items(&self) -> &SortedItems {
        &self.items
    }

    pub fn history(&self) -> &ChangeHistory {
        &self.history
    }

    pub fn policy(&self) -> SortPolicy {
        self.items.policy()
    }

    pub fn set_policy(&mut self, policy: SortPolicy) {
        self.items.set_policy(policy);
    }

    /// Records in structural order, for saving
    pub fn to_records(&self) -> Vec<ItemRecord> {
        self.items.to_records()
    }

    /// A fresh unchecked top-level row with an unused id
    pub fn new_item(&mut self, body: impl Into<String>) -> ListItem {
        let id = ItemId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        ListItem::new(id, body)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Insert `block` at display `position`.
    ///
    /// Without a position the row goes to the end of the unchecked rows.
    /// Without a block an empty row is created, nested if a neighbouring row
    /// is a child. Returns the display position the row ended up at.
    pub fn add(
        &mut self,
        position: Option<usize>,
        block: Option<ItemBlock>,
        push_change: bool,
    ) -> Result<usize, ListError> {
        let len = self.items.len();
        let position = position.unwrap_or_else(|| self.end_of_unchecked());
        if position > len {
            return Err(ListError::PositionOutOfRange { position, len });
        }

        let mut block = match block {
            Some(block) => block,
            None => {
                let nested = self.items.get(position).is_some_and(|i| i.is_child)
                    || position
                        .checked_sub(1)
                        .and_then(|p| self.items.get(p))
                        .is_some_and(|i| i.is_child);
                let mut item = self.new_item("");
                item.is_child = nested;
                ItemBlock::new(item)
            }
        };
        self.check_new_ids(&block)?;

        let order = match position.checked_sub(1).and_then(|p| self.items.get(p)) {
            Some(prev) => prev.order + 1,
            None => 0,
        };
        if order == 0 {
            block.item.is_child = false;
        }
        block.item.order = order;
        for child in block.children.iter_mut() {
            child.is_child = true;
        }

        let head = block.item.id;
        let ids = block.ids();
        self.items.insert(block);
        let placed = self.snapshot(&ids)?;
        let mut affected = vec![head];
        affected.extend(self.structural_before(head));
        let reconciled = self.reconcile_parents(&affected);
        let placed_at = self.items.position_of(head).ok_or(ListError::NotFound(head))?;
        tracing::debug!(id = %head, position, placed_at, "added row");

        if push_change {
            self.history.push(Change::Add {
                position,
                block: placed,
                reconciled,
            });
        }
        Ok(placed_at)
    }

    /// Delete the row `id`. `children` selects which of its children go with
    /// it; the others join the preceding parent, or become top-level when no
    /// parent precedes them. Returns the removed rows.
    pub fn delete_by_id(
        &mut self,
        id: ItemId,
        children: ChildrenOnDelete,
        push_change: bool,
    ) -> Result<ItemBlock, ListError> {
        let (_, item) = self.items.find_by_id(id).ok_or(ListError::NotFound(id))?;
        let mut affected: Vec<ItemId> = item.children.clone();
        affected.extend(self.items.find_parent(id).map(|(_, p)| p.id));

        let removed = self
            .items
            .remove_by_id(id, children)
            .ok_or(ListError::NotFound(id))?;
        let gone = removed.block.ids();
        affected.retain(|a| !gone.contains(a));
        let reconciled = self.reconcile_parents(&affected);
        tracing::debug!(%id, rows = removed.block.len(), promoted = removed.promoted.len(), "deleted row");

        if push_change {
            self.history.push(Change::Delete {
                position: removed.position,
                block: removed.block.clone(),
                promoted: removed.promoted.clone(),
                reconciled,
            });
        }
        Ok(removed.block)
    }

    /// Move the row at display position `from` to `to`, taking its children
    /// along. Returns the position the row ended up at, or None when `to`
    /// lies inside the moved rows.
    ///
    /// A parent dropped in front of another parent's child is nested into
    /// that parent together with its own children. A child dropped at the
    /// very top becomes a parent.
    pub fn move_item(
        &mut self,
        from: usize,
        to: usize,
        push_change: bool,
    ) -> Result<Option<usize>, ListError> {
        let len = self.items.len();
        let (head, from_order) = self
            .items
            .get(from)
            .map(|i| (i.id, i.order))
            .ok_or(ListError::PositionOutOfRange { position: from, len })?;
        let to_order = self
            .items
            .get(to)
            .map(|i| i.order)
            .ok_or(ListError::PositionOutOfRange { position: to, len })?;
        let before = self.block_of(head)?;
        let count = before.len();
        let parent_before = self.items.find_parent(head).map(|(_, p)| p.id);

        if (from_order..from_order + count).contains(&to_order) {
            return Ok(None);
        }
        let insert_order = if to_order > from_order {
            to_order + 1 - count
        } else {
            to_order
        };

        let (mut rows, _) = self.items.remove_rows(&before.ids());
        for (offset, row) in rows.iter_mut().enumerate() {
            row.order = insert_order + offset;
        }
        if let Some(first) = rows.first_mut().filter(|_| insert_order == 0) {
            first.is_child = false;
        }
        self.items.restore_rows(rows);

        let lands_in_block = self
            .items
            .iter()
            .find(|i| i.order == insert_order + count)
            .is_some_and(|i| i.is_child);
        if lands_in_block {
            if let Some(item) = self.items.find_by_id_mut(head) {
                item.is_child = true;
            }
            self.items.re_sort();
        }

        let mut affected = vec![head];
        affected.extend(parent_before);
        let reconciled = self.reconcile_parents(&affected);

        let position_after = self.items.position_of(head).ok_or(ListError::NotFound(head))?;
        tracing::debug!(id = %head, from, to, position_after, "moved row");

        if push_change {
            self.history.push(Change::Move {
                from,
                to,
                position_after,
                before,
                reconciled,
            });
        }
        Ok(Some(position_after))
    }

    /// Put moved rows back where they were before the move.
    /// Returns the restored display position of the moved row.
    pub fn undo_move(&mut self, item_before_move: &ItemBlock) -> Result<usize, ListError> {
        let ids = item_before_move.ids();
        for id in &ids {
            if self.items.find_by_id(*id).is_none() {
                return Err(ListError::NotFound(*id));
            }
        }
        self.items.remove_rows(&ids);
        self.items.restore_rows(item_before_move.clone().into_rows());
        let head = item_before_move.item.id;
        self.items.position_of(head).ok_or(ListError::NotFound(head))
    }

    /// Remove rows placed by an add, without touching any other row.
    pub(crate) fn undo_add(&mut self, placed: &ItemBlock) -> Result<(), ListError> {
        let head = placed.item.id;
        let children = placed.children.iter().map(|c| c.id).collect();
        self.items
            .remove_by_id(head, ChildrenOnDelete::Only(children))
            .ok_or(ListError::NotFound(head))?;
        Ok(())
    }

    /// Set the checked flag of `id`.
    ///
    /// Checking a parent checks its children, and checking the last unchecked
    /// child checks its parent. Unchecking a child unchecks its parent.
    /// Returns false if the flag already had that value.
    pub fn change_checked_by_id(
        &mut self,
        id: ItemId,
        checked: bool,
        push_change: bool,
    ) -> Result<bool, ListError> {
        let (_, item) = self.items.find_by_id(id).ok_or(ListError::NotFound(id))?;
        if item.checked == checked {
            return Ok(false);
        }

        let mut flipped = vec![id];
        if !item.is_child {
            if checked {
                flipped.extend(
                    item.children
                        .iter()
                        .filter(|c| self.items.find_by_id(**c).is_some_and(|(_, c)| !c.checked)),
                );
            }
        } else if let Some((_, parent)) = self.items.find_parent(id) {
            let others_checked = parent
                .children
                .iter()
                .filter(|c| **c != id)
                .all(|c| self.items.find_by_id(*c).is_some_and(|(_, c)| c.checked));
            let cascade = if checked {
                !parent.checked && others_checked
            } else {
                parent.checked
            };
            if cascade {
                flipped.push(parent.id);
            }
        }

        self.apply_checked(&flipped, checked);
        tracing::debug!(%id, checked, flipped = flipped.len(), "changed checked");

        if push_change {
            self.history.push(Change::Checked {
                id,
                checked,
                flipped,
            });
        }
        Ok(true)
    }

    /// Indent (`is_child = true`) or outdent the row at display `position`.
    ///
    /// An indented parent hands its children to the new parent. An outdented
    /// child takes the siblings below it as its own children. The first row
    /// cannot be indented. Returns false if nothing changed.
    pub fn change_is_child(
        &mut self,
        position: usize,
        is_child: bool,
        push_change: bool,
    ) -> Result<bool, ListError> {
        let len = self.items.len();
        let (id, current, order) = self
            .items
            .get(position)
            .map(|i| (i.id, i.is_child, i.order))
            .ok_or(ListError::PositionOutOfRange { position, len })?;
        if current == is_child || (is_child && order == 0) {
            return Ok(false);
        }

        self.set_is_child_by_id(id, is_child)?;
        let mut affected = vec![id];
        affected.extend(self.structural_before(id));
        let reconciled = self.reconcile_parents(&affected);
        tracing::debug!(%id, is_child, "changed nesting");

        if push_change {
            self.history.push(Change::IsChild {
                id,
                position,
                is_child,
                reconciled,
            });
        }
        Ok(true)
    }

    /// Remove every checked row. Returns how many rows were removed.
    pub fn delete_checked_items(&mut self, push_change: bool) -> Result<usize, ListError> {
        let ids: Vec<ItemId> = self
            .items
            .iter()
            .filter(|i| i.checked)
            .map(|i| i.id)
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let (removed, promoted) = self.items.remove_rows(&ids);
        let count = removed.len();
        tracing::debug!(count, promoted = promoted.len(), "deleted checked rows");

        if push_change {
            self.history.push(Change::DeleteChecked { removed, promoted });
        }
        Ok(count)
    }

    /// Check or uncheck every row. Returns how many rows changed.
    pub fn change_checked_for_all(
        &mut self,
        checked: bool,
        push_change: bool,
    ) -> Result<usize, ListError> {
        let flipped: Vec<ItemId> = self
            .items
            .iter()
            .filter(|i| i.checked != checked)
            .map(|i| i.id)
            .collect();
        if flipped.is_empty() {
            return Ok(0);
        }

        self.apply_checked(&flipped, checked);
        let count = flipped.len();
        tracing::debug!(checked, count, "changed checked for all rows");

        if push_change {
            self.history
                .push(Change::CheckedForAll { checked, flipped });
        }
        Ok(count)
    }

    /// Replace the text of `id`. Returns false if the text was unchanged.
    pub fn change_body(
        &mut self,
        id: ItemId,
        body: impl Into<String>,
        push_change: bool,
    ) -> Result<bool, ListError> {
        let body = body.into();
        let item = self.items.find_by_id_mut(id).ok_or(ListError::NotFound(id))?;
        if item.body == body {
            return Ok(false);
        }
        let old = std::mem::replace(&mut item.body, body.clone());

        if push_change {
            self.history.push(Change::Body { id, old, new: body });
        }
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Undo / redo
    // -----------------------------------------------------------------------

    /// Revert the most recent change. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, ListError> {
        let Some(change) = self.history.undo().cloned() else {
            return Ok(false);
        };
        tracing::debug!(kind = change.kind(), "undo");
        if let Err(e) = change.apply(self, Direction::Reverse) {
            tracing::warn!(kind = change.kind(), error = %e, "undo failed");
            self.history.cancel_undo();
            return Err(e);
        }
        Ok(true)
    }

    /// Replay the most recently undone change. Returns false if there was
    /// nothing to redo.
    pub fn redo(&mut self) -> Result<bool, ListError> {
        let Some(change) = self.history.redo().cloned() else {
            return Ok(false);
        };
        tracing::debug!(kind = change.kind(), "redo");
        if let Err(e) = change.apply(self, Direction::Forward) {
            tracing::warn!(kind = change.kind(), error = %e, "redo failed");
            self.history.cancel_redo();
            return Err(e);
        }
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Used when reverting changes
    // -----------------------------------------------------------------------

    /// Put removed rows back at their old orders and re-nest the rows that
    /// were promoted by the removal.
    pub(crate) fn restore(
        &mut self,
        rows: Vec<ListItem>,
        promoted: &[ItemId],
    ) -> Result<(), ListError> {
        for row in &rows {
            if self.items.find_by_id(row.id).is_some() {
                return Err(ListError::DuplicateId(row.id));
            }
        }
        if let Some(missing) = promoted.iter().find(|id| self.items.find_by_id(**id).is_none()) {
            return Err(ListError::NotFound(*missing));
        }
        self.items.restore_rows(rows);
        for id in promoted {
            let item = self.items.find_by_id_mut(*id).ok_or(ListError::NotFound(*id))?;
            item.is_child = true;
        }
        if !promoted.is_empty() {
            self.items.re_sort();
        }
        Ok(())
    }

    pub(crate) fn set_checked_ids(&mut self, ids: &[ItemId], checked: bool) -> Result<(), ListError> {
        for id in ids {
            if self.items.find_by_id(*id).is_none() {
                return Err(ListError::NotFound(*id));
            }
        }
        self.apply_checked(ids, checked);
        Ok(())
    }

    pub(crate) fn set_is_child_by_id(&mut self, id: ItemId, is_child: bool) -> Result<(), ListError> {
        let item = self.items.find_by_id_mut(id).ok_or(ListError::NotFound(id))?;
        item.is_child = is_child;
        self.items.re_sort();
        Ok(())
    }

    /// Undo the parent flags set by [`Self::reconcile_parents`]
    pub(crate) fn revert_reconciled(&mut self, reconciled: &[(ItemId, bool)]) -> Result<(), ListError> {
        if reconciled.is_empty() {
            return Ok(());
        }
        if let Some((missing, _)) = reconciled.iter().find(|(id, _)| self.items.find_by_id(*id).is_none()) {
            return Err(ListError::NotFound(*missing));
        }
        for (id, checked) in reconciled {
            if let Some(item) = self.items.find_by_id_mut(*id) {
                item.checked = !*checked;
            }
        }
        self.items.re_sort();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn apply_checked(&mut self, ids: &[ItemId], checked: bool) {
        for id in ids {
            if let Some(item) = self.items.find_by_id_mut(*id) {
                item.checked = checked;
            }
        }
        self.items.re_sort();
    }

    /// Display position right after the last row whose block is unchecked
    fn end_of_unchecked(&self) -> usize {
        if self.items.policy() != SortPolicy::CheckedGrouping {
            return self.items.len();
        }
        let parent_checked: HashMap<ItemId, bool> = self
            .items
            .iter()
            .filter(|p| !p.is_child)
            .flat_map(|p| p.children.iter().map(move |c| (*c, p.checked)))
            .collect();
        self.items
            .iter()
            .position(|i| parent_checked.get(&i.id).copied().unwrap_or(i.checked))
            .unwrap_or(self.items.len())
    }

    /// Set the checked flag of each affected block's parent from its
    /// children: checked once every child is checked, unchecked once one is
    /// not. Returns the flipped parents with their new flag.
    fn reconcile_parents(&mut self, affected: &[ItemId]) -> Vec<(ItemId, bool)> {
        let mut parents: Vec<ItemId> = Vec::new();
        for id in affected {
            let anchor = match self.items.find_parent(*id) {
                Some((_, parent)) => Some(parent.id),
                None => self.items.find_by_id(*id).map(|(_, i)| i.id),
            };
            if let Some(p) = anchor
                && !parents.contains(&p)
            {
                parents.push(p);
            }
        }

        let mut flipped = Vec::new();
        for p in parents {
            let Some((_, parent)) = self.items.find_by_id(p) else {
                continue;
            };
            if parent.children.is_empty() {
                continue;
            }
            let all_checked = parent
                .children
                .iter()
                .all(|c| self.items.find_by_id(*c).is_some_and(|(_, c)| c.checked));
            if all_checked != parent.checked {
                flipped.push((p, all_checked));
            }
        }
        if flipped.is_empty() {
            return flipped;
        }

        for (id, checked) in &flipped {
            if let Some(item) = self.items.find_by_id_mut(*id) {
                item.checked = *checked;
            }
        }
        self.items.re_sort();
        tracing::debug!(?flipped, "reconciled parent checked flags");
        flipped
    }

    /// The row directly before `id` in structural order
    fn structural_before(&self, id: ItemId) -> Option<ItemId> {
        let (_, item) = self.items.find_by_id(id)?;
        let order = item.order.checked_sub(1)?;
        self.items.iter().find(|i| i.order == order).map(|i| i.id)
    }

    /// Value copy of a row and its children, in structural order
    fn block_of(&self, id: ItemId) -> Result<ItemBlock, ListError> {
        let (_, item) = self.items.find_by_id(id).ok_or(ListError::NotFound(id))?;
        let mut children: Vec<ListItem> = item
            .children
            .iter()
            .filter_map(|c| self.items.find_by_id(*c).map(|(_, c)| c.clone()))
            .collect();
        children.sort_by_key(|c| c.order);
        Ok(ItemBlock::with_children(item.clone(), children))
    }

    /// Value copy of exactly the rows `ids`, the first one as head
    fn snapshot(&self, ids: &[ItemId]) -> Result<ItemBlock, ListError> {
        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            let (_, row) = self.items.find_by_id(*id).ok_or(ListError::NotFound(*id))?;
            rows.push(row.clone());
        }
        rows.sort_by_key(|r| r.order);
        let head = rows.remove(0);
        Ok(ItemBlock::with_children(head, rows))
    }

    fn check_new_ids(&mut self, block: &ItemBlock) -> Result<(), ListError> {
        let mut seen = HashSet::new();
        for id in block.ids() {
            if !seen.insert(id) || self.items.find_by_id(id).is_some() {
                return Err(ListError::DuplicateId(id));
            }
        }
        if let Some(max) = seen.into_iter().max() {
            self.next_id = self.next_id.max(max.0.saturating_add(1));
        }
        Ok(())
    }
}
