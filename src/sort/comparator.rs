//! Display ordering of checklist rows.
//!
//! Two rows are first classified by how they relate structurally (both
//! top-level, siblings under one parent, parent and own child, ...) and the
//! relation then decides which keys are compared. Children have no children of
//! their own, so resolving a row's block needs at most one parent lookup.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::config::SortPolicy;
use crate::model::item::{ItemId, ListItem};

/// The identifying keys of the row that places a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub id: ItemId,
    pub order: usize,
    pub checked: bool,
}

impl Anchor {
    pub fn of(item: &ListItem) -> Self {
        Anchor {
            id: item.id,
            order: item.order,
            checked: item.checked,
        }
    }

    fn block_key(&self) -> (bool, usize, ItemId) {
        (self.checked, self.order, self.id)
    }
}

/// Resolves the parent of a child row
pub trait ParentLookup {
    fn parent_of(&self, child: ItemId) -> Option<Anchor>;
}

impl ParentLookup for HashMap<ItemId, Anchor> {
    fn parent_of(&self, child: ItemId) -> Option<Anchor> {
        self.get(&child).copied()
    }
}

/// How two rows relate structurally, from the point of view of the first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Identical,
    BothTop,
    SameParent(Anchor),
    DifferentParents(Anchor, Anchor),
    /// One row is a child, the other an unrelated top-level row
    ChildAndTop { child_parent: Anchor, child_is_a: bool },
    /// The first row is the parent of the second
    OwnsOther,
    /// The first row is a child of the second
    OwnedByOther,
}

/// The parent of `item`, or None when it is top-level. A child whose parent
/// cannot be resolved, or that claims itself as parent, counts as top-level.
fn resolved_parent(item: &ListItem, lookup: &impl ParentLookup) -> Option<Anchor> {
    if !item.is_child {
        return None;
    }
    lookup.parent_of(item.id).filter(|p| p.id != item.id)
}

pub fn relation(a: &ListItem, b: &ListItem, lookup: &impl ParentLookup) -> Relation {
    if a.id == b.id {
        return Relation::Identical;
    }
    match (resolved_parent(a, lookup), resolved_parent(b, lookup)) {
        (None, None) => Relation::BothTop,
        (Some(pa), Some(pb)) if pa.id == pb.id => Relation::SameParent(pa),
        (Some(pa), Some(pb)) => Relation::DifferentParents(pa, pb),
        (None, Some(pb)) if pb.id == a.id => Relation::OwnsOther,
        (Some(pa), None) if pa.id == b.id => Relation::OwnedByOther,
        (Some(pa), None) => Relation::ChildAndTop {
            child_parent: pa,
            child_is_a: true,
        },
        (None, Some(pb)) => Relation::ChildAndTop {
            child_parent: pb,
            child_is_a: false,
        },
    }
}

/// Compare two rows for display under `policy`.
pub fn compare(
    policy: SortPolicy,
    a: &ListItem,
    b: &ListItem,
    lookup: &impl ParentLookup,
) -> Ordering {
    let rel = relation(a, b, lookup);
    match policy {
        SortPolicy::Plain => compare_plain(rel, a, b),
        SortPolicy::CheckedGrouping => compare_checked(rel, a, b),
    }
}

/// Like [`compare`], with absent rows sorting first
pub fn compare_opt(
    policy: SortPolicy,
    a: Option<&ListItem>,
    b: Option<&ListItem>,
    lookup: &impl ParentLookup,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare(policy, a, b, lookup),
    }
}

fn compare_plain(rel: Relation, a: &ListItem, b: &ListItem) -> Ordering {
    a.order.cmp(&b.order).then_with(|| match rel {
        Relation::Identical => Ordering::Equal,
        // Parent and child may share an order while a block is in flight
        Relation::OwnsOther => Ordering::Less,
        Relation::OwnedByOther => Ordering::Greater,
        _ => a.id.cmp(&b.id),
    })
}

fn compare_checked(rel: Relation, a: &ListItem, b: &ListItem) -> Ordering {
    match rel {
        Relation::Identical => Ordering::Equal,
        Relation::BothTop => Anchor::of(a).block_key().cmp(&Anchor::of(b).block_key()),
        Relation::SameParent(parent) => {
            within_block(&parent, a).cmp(&within_block(&parent, b))
        }
        Relation::DifferentParents(pa, pb) => pa.block_key().cmp(&pb.block_key()),
        Relation::ChildAndTop {
            child_parent,
            child_is_a,
        } => {
            if child_is_a {
                child_parent.block_key().cmp(&Anchor::of(b).block_key())
            } else {
                Anchor::of(a).block_key().cmp(&child_parent.block_key())
            }
        }
        Relation::OwnsOther => {
            let parent = Anchor::of(a);
            within_block(&parent, a).cmp(&within_block(&parent, b))
        }
        Relation::OwnedByOther => {
            let parent = Anchor::of(b);
            within_block(&parent, a).cmp(&within_block(&parent, b))
        }
    }
}

/// Rank of a row inside its block. An unchecked parent heads its block; a
/// checked parent sits after its still-unchecked children and before the
/// checked ones.
fn within_block(parent: &Anchor, item: &ListItem) -> (u8, usize, ItemId) {
    if item.id == parent.id {
        let tier = if parent.checked { 1 } else { 0 };
        return (tier, 0, item.id);
    }
    let tier = match (parent.checked, item.checked) {
        (false, _) => 1,
        (true, false) => 0,
        (true, true) => 2,
    };
    (tier, item.order, item.id)
}
