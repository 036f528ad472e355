use std::collections::{HashMap, HashSet};

use crate::model::config::SortPolicy;
use crate::model::item::{ItemBlock, ItemId, ItemRecord, ListItem};
use crate::sort::comparator::{self, Anchor};

/// Which children go along when a parent row is removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildrenOnDelete {
    /// Remove every child of the row
    Cascade,
    /// Remove only the listed children; the rest stay in the list
    Only(Vec<ItemId>),
}

/// Result of removing a row from the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    /// Display position the row had before removal
    pub position: usize,
    /// The removed rows, with the orders they had before removal
    pub block: ItemBlock,
    /// Rows that lost their parent and were made top-level
    pub promoted: Vec<ItemId>,
}

/// A row whose display position changed during a re-sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reposition {
    pub id: ItemId,
    pub from: usize,
    pub to: usize,
}

/// Rows kept in display order.
///
/// `order` values are dense (`0..len`) between operations and describe the
/// structural sequence: each parent directly followed by its children.
/// The display order is that sequence rearranged by the comparator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedItems {
    policy: SortPolicy,
    items: Vec<ListItem>,
}

impl Default for SortedItems {
    fn default() -> Self {
        Self::new(SortPolicy::default())
    }
}

impl SortedItems {
    pub fn new(policy: SortPolicy) -> Self {
        SortedItems {
            policy,
            items: Vec::new(),
        }
    }

    pub fn from_records(records: Vec<ItemRecord>, policy: SortPolicy) -> Self {
        let mut sorted = Self::new(policy);
        sorted.init(records);
        sorted
    }

    /// Replace the contents with `records`, repairing missing or duplicate
    /// orders and ids. Missing ids are assigned silently; everything else
    /// that had to be fixed is counted and returned.
    pub fn init(&mut self, records: Vec<ItemRecord>) -> usize {
        let mut repaired = 0;

        // Orders: the first holder of a value keeps it; missing or repeated
        // values fall back to the input index. Ties keep input order.
        let mut seen_orders = HashSet::new();
        let mut keys: Vec<(i64, usize)> = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match record.order {
                Some(o) if o >= 0 && seen_orders.insert(o) => keys.push((o, index)),
                _ => {
                    repaired += 1;
                    keys.push((index as i64, index));
                }
            }
        }
        let mut ranked: Vec<usize> = (0..records.len()).collect();
        ranked.sort_by_key(|&i| keys[i]);
        let mut order_of = vec![0; records.len()];
        for (rank, &i) in ranked.iter().enumerate() {
            order_of[i] = rank;
        }

        let mut next_id = records
            .iter()
            .filter_map(|r| r.id)
            .max()
            .map_or(0, |m| m.saturating_add(1));
        let mut seen_ids = HashSet::new();
        let mut items = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let id = match record.id {
                Some(id) if seen_ids.insert(id) => id,
                missing_or_repeated => {
                    if missing_or_repeated.is_some() {
                        repaired += 1;
                    }
                    let id = next_id;
                    next_id = next_id.saturating_add(1);
                    seen_ids.insert(id);
                    id
                }
            };
            items.push(ListItem {
                id: ItemId(id),
                body: record.body,
                checked: record.checked,
                is_child: record.is_child,
                order: order_of[index],
                children: Vec::new(),
            });
        }
        self.items = items;

        let promoted = self.relink();
        for id in &promoted {
            tracing::warn!(%id, "child row has no parent, made top-level");
        }
        repaired += promoted.len();
        if repaired > 0 {
            tracing::warn!(repaired, "repaired checklist input");
        }
        self.sort();
        repaired
    }

    pub fn policy(&self) -> SortPolicy {
        self.policy
    }

    /// Switch sort policy and re-sort
    pub fn set_policy(&mut self, policy: SortPolicy) -> Vec<Reposition> {
        self.policy = policy;
        self.re_sort()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&ListItem> {
        self.items.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[ListItem] {
        &self.items
    }

    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    pub fn find_by_id(&self, id: ItemId) -> Option<(usize, &ListItem)> {
        self.items.iter().enumerate().find(|(_, i)| i.id == id)
    }

    /// The parent owning the child row `id`, with its display position.
    /// None when `id` is missing or is not a recognised child.
    pub fn find_parent(&self, id: ItemId) -> Option<(usize, &ListItem)> {
        self.items
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_child && p.children.contains(&id))
    }

    pub fn max_id(&self) -> Option<ItemId> {
        self.items.iter().map(|i| i.id).max()
    }

    /// Rows in structural order
    pub fn structural(&self) -> Vec<&ListItem> {
        let mut rows: Vec<&ListItem> = self.items.iter().collect();
        rows.sort_by_key(|i| i.order);
        rows
    }

    /// Flat records in structural order, for saving
    pub fn to_records(&self) -> Vec<ItemRecord> {
        self.structural().into_iter().map(ItemRecord::from).collect()
    }

    /// Insert a block at `block.item.order`, shifting later rows down.
    /// Returns the display position of the block's head.
    pub fn insert(&mut self, block: ItemBlock) -> usize {
        let head = block.item.id;
        let start = block.item.order.min(self.items.len());
        let rows = block
            .into_rows()
            .into_iter()
            .enumerate()
            .map(|(offset, mut row)| {
                row.order = start + offset;
                row
            })
            .collect();
        self.restore_rows(rows);
        self.position_of(head).unwrap_or(start)
    }

    /// Put rows back at the orders they carry. Rows must come from a removal
    /// of the current state and are placed in ascending order.
    pub(crate) fn restore_rows(&mut self, mut rows: Vec<ListItem>) {
        rows.sort_by_key(|r| r.order);
        for mut row in rows {
            let at = row.order.min(self.items.len());
            for item in self.items.iter_mut().filter(|i| i.order >= at) {
                item.order += 1;
            }
            row.order = at;
            row.children.clear();
            self.items.push(row);
        }
        self.relink();
        self.sort();
    }

    /// Remove the row `id` and the selected children.
    pub fn remove_by_id(&mut self, id: ItemId, children: ChildrenOnDelete) -> Option<Removed> {
        let (position, item) = self.find_by_id(id)?;
        let mut ids = vec![id];
        match children {
            ChildrenOnDelete::Cascade => ids.extend(item.children.iter().copied()),
            ChildrenOnDelete::Only(selected) => ids.extend(
                item.children
                    .iter()
                    .filter(|c| selected.contains(c))
                    .copied(),
            ),
        }
        let (mut rows, promoted) = self.remove_rows(&ids);
        if rows.is_empty() {
            return None;
        }
        let head = rows.remove(0);
        Some(Removed {
            position,
            block: ItemBlock::with_children(head, rows),
            promoted,
        })
    }

    /// Remove the given rows, closing the gaps in `order`. Returns the removed
    /// rows in structural order with their old orders, and the ids of rows
    /// that were promoted because they lost their parent.
    pub(crate) fn remove_rows(&mut self, ids: &[ItemId]) -> (Vec<ListItem>, Vec<ItemId>) {
        let (mut removed, kept): (Vec<ListItem>, Vec<ListItem>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|i| ids.contains(&i.id));
        self.items = kept;
        removed.sort_by_key(|r| r.order);
        for row in removed.iter_mut() {
            row.children.clear();
        }
        self.renumber();
        let promoted = self.relink();
        self.sort();
        (removed, promoted)
    }

    pub(crate) fn find_by_id_mut(&mut self, id: ItemId) -> Option<&mut ListItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Recompute parent links and display order after rows were edited in
    /// place. Reports every row whose display position changed.
    pub fn re_sort(&mut self) -> Vec<Reposition> {
        let before: HashMap<ItemId, usize> = self
            .items
            .iter()
            .enumerate()
            .map(|(pos, i)| (i.id, pos))
            .collect();
        self.relink();
        self.sort();
        self.items
            .iter()
            .enumerate()
            .filter_map(|(to, i)| {
                let from = before.get(&i.id).copied()?;
                (from != to).then_some(Reposition { id: i.id, from, to })
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn renumber(&mut self) {
        let mut idx: Vec<usize> = (0..self.items.len()).collect();
        idx.sort_by_key(|&i| self.items[i].order);
        for (rank, i) in idx.into_iter().enumerate() {
            self.items[i].order = rank;
        }
    }

    /// Attach every child to the nearest preceding parent in structural order.
    /// A child with nothing before it is made top-level; those ids are returned.
    fn relink(&mut self) -> Vec<ItemId> {
        let mut idx: Vec<usize> = (0..self.items.len()).collect();
        idx.sort_by_key(|&i| self.items[i].order);
        for item in self.items.iter_mut() {
            item.children.clear();
        }

        let mut promoted = Vec::new();
        let mut links = Vec::new();
        let mut parent: Option<usize> = None;
        for i in idx {
            let item = &mut self.items[i];
            match (item.is_child, parent) {
                (true, Some(p)) => links.push((p, item.id)),
                (true, None) => {
                    item.is_child = false;
                    promoted.push(item.id);
                    parent = Some(i);
                }
                (false, _) => parent = Some(i),
            }
        }
        for (p, child) in links {
            self.items[p].children.push(child);
        }
        if !promoted.is_empty() {
            tracing::debug!(?promoted, "promoted rows without parent");
        }
        promoted
    }

    fn sort(&mut self) {
        let lookup: HashMap<ItemId, Anchor> = self
            .items
            .iter()
            .filter(|p| !p.is_child)
            .flat_map(|p| p.children.iter().map(move |c| (*c, Anchor::of(p))))
            .collect();
        let policy = self.policy;
        self.items
            .sort_by(|a, b| comparator::compare(policy, a, b, &lookup));
    }
}
