pub mod comparator;
pub mod sorted_items;

pub use comparator::{Anchor, ParentLookup, Relation, compare, compare_opt};
pub use sorted_items::{ChildrenOnDelete, Removed, Reposition, SortedItems};
