//! Plain-text and JSON renderings of generated reviews for the CLI.

use std::fmt::Write;

use reviewgen_core::GeneratedItem;

/// One block per review: a numbered header line, the text, a blank line.
pub fn format_text(items: &[GeneratedItem]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(
            out,
            "Review {} [{}] {}",
            i + 1,
            item.category,
            item.rating.stars()
        );
        let _ = writeln!(out, "{}", item.text);
        out.push('\n');
    }
    out
}

pub fn format_json(items: &[GeneratedItem]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(items)
}
