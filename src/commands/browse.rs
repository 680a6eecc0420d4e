// Listing commands: ls, tools, categories

use anyhow::Result;
use colored::*;
use prompt_library::library::{FilterOptions, ViewMode};
use prompt_library::render::{listing_lines, paint_hex, Viewport};
use prompt_library::store::PromptStore;
use std::time::Instant;

use super::common::load_listing;
use crate::cli::FilterArgs;

pub async fn handle_ls<S: PromptStore>(
    store: &S,
    filters: &FilterArgs,
    view_mode: ViewMode,
    viewport: Viewport,
    start: Instant,
) -> Result<()> {
    let mut listing = load_listing(store, filters).await?;
    listing.state.set_view_mode(view_mode);

    for line in listing_lines(&listing.state, listing.page, listing.total_pages, viewport) {
        println!("{}", line);
    }

    tracing::debug!(
        visible = listing.state.visible().len(),
        fetched = listing.state.records().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Listing rendered"
    );
    Ok(())
}

pub async fn handle_tools<S: PromptStore>(store: &S, start: Instant) -> Result<()> {
    let tools = store.list_tools().await?;

    println!(
        "{} ({}ms)\n",
        "AI tools:".green(),
        start.elapsed().as_millis()
    );
    if tools.is_empty() {
        println!("  No tools defined");
    }
    for tool in &tools {
        let color = tool.color.as_deref().unwrap_or(prompt_library::model::DEFAULT_TOOL_COLOR);
        println!("  {} {}", paint_hex("●", color), tool.name.bold());
    }
    Ok(())
}

pub async fn handle_categories<S: PromptStore>(store: &S, start: Instant) -> Result<()> {
    let categories = store.list_categories().await?;
    let names = FilterOptions::collect(&[], &[], &categories).categories;

    println!(
        "{} ({}ms)\n",
        "Categories:".green(),
        start.elapsed().as_millis()
    );
    if names.is_empty() {
        println!("  No categories defined");
    }
    for name in &names {
        let color = prompt_library::palette::category_color(Some(name));
        println!("  {} {}", paint_hex("●", color), name.bold());
    }
    Ok(())
}
