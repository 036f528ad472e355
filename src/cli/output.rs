use serde::Serialize;

use crate::model::item::ListItem;
use crate::sort::sorted_items::SortedItems;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ItemJson {
    pub position: usize,
    pub id: u32,
    pub body: String,
    pub checked: bool,
    pub is_child: bool,
    pub order: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<u32>,
}

#[derive(Serialize)]
pub struct ListJson {
    pub sort: &'static str,
    pub items: Vec<ItemJson>,
}

pub fn item_to_json(position: usize, item: &ListItem) -> ItemJson {
    ItemJson {
        position,
        id: item.id.0,
        body: item.body.clone(),
        checked: item.checked,
        is_child: item.is_child,
        order: item.order,
        children: item.children.iter().map(|c| c.0).collect(),
    }
}

/// The whole list in display order
pub fn list_to_json(items: &SortedItems) -> ListJson {
    ListJson {
        sort: items.policy().as_str(),
        items: items
            .iter()
            .enumerate()
            .map(|(pos, item)| item_to_json(pos, item))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// One display row: position, then the row with its checkbox
pub fn format_row(position: usize, item: &ListItem) -> String {
    format!("{:>3} {}", position, item)
}
