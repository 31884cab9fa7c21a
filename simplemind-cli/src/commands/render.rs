//! Resolve and render commands.

use crate::RenderMode;
use anyhow::{Context, Result};
use simplemind_core::{pipeline::PipelineOptions, render, Page, Site};

/// Print the store path for an identifier
pub fn resolve_uri(site: &Site, uri: &str) -> Result<()> {
    let path = site
        .resolver()
        .resolve(uri)
        .with_context(|| format!("Cannot resolve '{uri}'"))?;
    println!("{path}");
    Ok(())
}

/// Render an article or a whole journal to stdout
pub fn render_uri(
    site: &Site,
    uri: &str,
    mode: RenderMode,
    with_metadata: bool,
    json: bool,
) -> Result<()> {
    let pages = match mode {
        RenderMode::Article => vec![site
            .article(uri)
            .with_context(|| format!("Cannot render article '{uri}'"))?],
        RenderMode::Journal => site
            .journal(uri)
            .with_context(|| format!("Cannot render journal '{uri}'"))?,
    };

    if json {
        match mode {
            RenderMode::Article => println!("{}", serde_json::to_string_pretty(&pages[0])?),
            RenderMode::Journal => println!("{}", serde_json::to_string_pretty(&pages)?),
        }
        return Ok(());
    }

    let options = PipelineOptions::from(site.config());
    for page in &pages {
        print_page(page, with_metadata, &options);
    }
    Ok(())
}

fn print_page(page: &Page, with_metadata: bool, options: &PipelineOptions) {
    if page.result.is_template {
        tracing::info!("{:?} is a template, printing its source", page.path);
    }
    if with_metadata {
        let preamble = page.result.metadata_text();
        if !preamble.is_empty() {
            println!("{}", render::text(&preamble, options));
        }
    }
    println!("{}", page.result.html);
}
