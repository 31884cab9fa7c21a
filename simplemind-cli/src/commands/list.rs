//! Listing commands: sections and the home page.

use anyhow::{Context, Result};
use simplemind_core::{ListingEntry, Site};

/// Print the sub-categories of an identifier
pub fn show_section(site: &Site, uri: &str, json: bool) -> Result<()> {
    let entries = site
        .section(uri)
        .with_context(|| format!("Cannot list section '{uri}'"))?;
    print_entries(&entries, json)
}

/// Print every file in the store, newest first
pub fn list_recent(site: &Site, json: bool) -> Result<()> {
    let entries = site.listing();
    print_entries(&entries, json)
}

fn print_entries(entries: &[ListingEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No content found");
        return Ok(());
    }
    for entry in entries {
        println!(
            "{}  {}  ({})",
            entry.modified.format("%Y-%m-%d %H:%M"),
            entry.uri,
            entry.name
        );
    }
    Ok(())
}
