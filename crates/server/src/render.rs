//! Plain-text rendering of a grouped listing for non-JSON clients.

use std::fmt::Write;

use consoleport_types::{CommandListing, GroupedListing};

pub fn render_listing(listing: &GroupedListing) -> String {
    if listing.is_empty() {
        return "No commands available.\n".to_string();
    }

    let mut text = String::new();
    for (index, (group, entries)) in listing.iter().enumerate() {
        if index > 0 {
            text.push('\n');
        }
        let _ = writeln!(text, "{group}");
        let width = entries.iter().map(|entry| entry.name().len()).max().unwrap_or(0);
        for entry in entries {
            match entry {
                CommandListing::Command(schema) => {
                    let _ = writeln!(text, "  {:<width$}  {}", schema.name, schema.description);
                    let _ = writeln!(text, "  {:<width$}  usage: {}", "", schema.synopsis);
                }
                CommandListing::Missing(missing) => {
                    let _ = writeln!(text, "  {:<width$}  ({})", missing.name, missing.error);
                }
            }
        }
    }
    text
}
