use crate::model::item::ItemRecord;

/// Serialize records back to checklist text, one row per line in the given
/// order. Children are indented by two spaces. Line breaks inside a body are
/// written as spaces.
pub fn serialize_checklist(records: &[ItemRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len());
    for record in records {
        let indent = if record.is_child { "  " } else { "" };
        let mark = if record.checked { 'x' } else { ' ' };
        let body = record.body.replace(['\r', '\n'], " ");
        if body.is_empty() {
            lines.push(format!("{indent}- [{mark}]"));
        } else {
            lines.push(format!("{indent}- [{mark}] {body}"));
        }
    }
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
