use crate::model::item::ItemRecord;

/// Parse checklist text into records in file order.
///
/// Each row is a markdown checkbox line, `- [ ] body` or `- [x] body`. A row
/// indented by at least two spaces (or a tab) is a child. Lines that are not
/// checkbox rows are skipped. Bodies are kept as written, trailing spaces
/// included.
pub fn parse_checklist(source: &str) -> Vec<ItemRecord> {
    source
        .lines()
        .filter_map(parse_row)
        .enumerate()
        .map(|(index, mut record)| {
            record.order = Some(index as i64);
            record
        })
        .collect()
}

/// Parse a single checkbox line
pub fn parse_row(line: &str) -> Option<ItemRecord> {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    let rest = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))?;

    let (checked, body) = if let Some(body) = strip_box(rest, ' ') {
        (false, body)
    } else if let Some(body) = strip_box(rest, 'x').or_else(|| strip_box(rest, 'X')) {
        (true, body)
    } else {
        return None;
    };

    Some(ItemRecord {
        checked,
        is_child: indent.contains('\t') || indent.len() >= 2,
        ..ItemRecord::new(body)
    })
}

fn strip_box(rest: &str, mark: char) -> Option<&str> {
    let mut chars = rest.chars();
    if chars.next() != Some('[') || chars.next() != Some(mark) || chars.next() != Some(']') {
        return None;
    }
    let after = chars.as_str();
    match after.strip_prefix(' ') {
        Some(body) => Some(body),
        None if after.is_empty() => Some(after),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::checklist_serializer::serialize_checklist;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_rows_and_nesting() {
        let source = "\
# Groceries

- [ ] Milk
  - [x] Oat
  - [ ] Whole
- [X] Bread
";
        let records = parse_checklist(source);
        let summary: Vec<(&str, bool, bool, Option<i64>)> = records
            .iter()
            .map(|r| (r.body.as_str(), r.checked, r.is_child, r.order))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Milk", false, false, Some(0)),
                ("Oat", true, true, Some(1)),
                ("Whole", false, true, Some(2)),
                ("Bread", true, false, Some(3)),
            ]
        );
        assert!(records.iter().all(|r| r.id.is_none()));
    }

    #[test]
    fn test_parse_empty_body() {
        let record = parse_row("- [ ]").unwrap();
        assert_eq!(record.body, "");
        let record = parse_row("- [x] ").unwrap();
        assert_eq!(record.body, "");
        assert!(record.checked);
    }

    #[test]
    fn test_parse_keeps_trailing_spaces() {
        let record = parse_row("- [ ] Tea  ").unwrap();
        assert_eq!(record.body, "Tea  ");
        let source = "- [ ] Tea  \n  - [x] Milk \n";
        assert_eq!(serialize_checklist(&parse_checklist(source)), source);
    }

    #[test]
    fn test_parse_tab_indent_is_child() {
        assert!(parse_row("\t- [ ] Tea").unwrap().is_child);
        assert!(!parse_row(" - [ ] Tea").unwrap().is_child);
    }

    #[test]
    fn test_skip_non_checkbox_lines() {
        assert!(parse_row("- plain bullet").is_none());
        assert!(parse_row("- [y] odd").is_none());
        assert!(parse_row("- [ ]no space").is_none());
        assert!(parse_row("Some prose").is_none());
        assert_eq!(parse_checklist("notes\n\n").len(), 0);
    }

    #[test]
    fn test_star_bullets() {
        let record = parse_row("* [x] Done").unwrap();
        assert!(record.checked);
        assert_eq!(record.body, "Done");
    }
}
