use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a checklist row within one editing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A checklist row as held by the sorted collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: ItemId,
    /// Row text
    pub body: String,
    pub checked: bool,
    /// True if this row is nested under the nearest preceding parent row
    pub is_child: bool,
    /// Structural position; unique and dense within a collection at rest
    pub order: usize,
    /// Ids of the rows owned by this parent, in structural order.
    /// Always empty for child rows.
    pub children: Vec<ItemId>,
}

impl ListItem {
    /// Create an unchecked top-level row. The order is assigned on insertion.
    pub fn new(id: ItemId, body: impl Into<String>) -> Self {
        ListItem {
            id,
            body: body.into(),
            checked: false,
            is_child: false,
            order: 0,
            children: Vec::new(),
        }
    }

    /// Builder-style: mark this row as nested
    pub fn into_child(mut self) -> Self {
        self.is_child = true;
        self
    }

    /// Builder-style: set the checked flag
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Number of rows this item spans when it moves (itself plus children)
    pub fn item_count(&self) -> usize {
        self.children.len() + 1
    }

    /// The checkbox character used in the text format
    pub fn checkbox_char(&self) -> char {
        if self.checked { 'x' } else { ' ' }
    }
}

impl fmt::Display for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_child {
            write!(f, "  ")?;
        }
        write!(f, "[{}] {}", self.checkbox_char(), self.body)
    }
}

/// A detached row together with the child rows that travel with it.
///
/// This is the payload for inserting rows and the value copy kept by the
/// change history so that a removal can be reverted verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemBlock {
    pub item: ListItem,
    pub children: Vec<ListItem>,
}

impl ItemBlock {
    pub fn new(item: ListItem) -> Self {
        ItemBlock {
            item,
            children: Vec::new(),
        }
    }

    pub fn with_children(item: ListItem, children: Vec<ListItem>) -> Self {
        ItemBlock { item, children }
    }

    pub fn len(&self) -> usize {
        self.children.len() + 1
    }

    /// Ids of every row in the block, head first
    pub fn ids(&self) -> Vec<ItemId> {
        std::iter::once(self.item.id)
            .chain(self.children.iter().map(|c| c.id))
            .collect()
    }

    /// Consume the block into its rows, head first
    pub fn into_rows(self) -> Vec<ListItem> {
        let mut rows = Vec::with_capacity(self.children.len() + 1);
        rows.push(self.item);
        rows.extend(self.children);
        rows
    }
}

/// The external shape of a row, as exchanged with whatever loads and saves notes.
///
/// `id` and `order` may be missing or duplicated on input; they are repaired
/// when a collection is initialised and always present on output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub body: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub is_child: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl ItemRecord {
    pub fn new(body: impl Into<String>) -> Self {
        ItemRecord {
            id: None,
            body: body.into(),
            checked: false,
            is_child: false,
            order: None,
        }
    }
}

impl From<&ListItem> for ItemRecord {
    fn from(item: &ListItem) -> Self {
        ItemRecord {
            id: Some(item.id.0),
            body: item.body.clone(),
            checked: item.checked,
            is_child: item.is_child,
            order: Some(item.order as i64),
        }
    }
}
