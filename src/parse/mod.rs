pub mod checklist_parser;
pub mod checklist_serializer;

pub use checklist_parser::{parse_checklist, parse_row};
pub use checklist_serializer::serialize_checklist;
