// Single-prompt commands: show, favorite, open

use anyhow::{Context, Result};
use colored::*;
use prompt_library::config::Config;
use prompt_library::detail::{load_detail, toggle_favorite, track_view, DetailState};
use prompt_library::error::FetchError;
use prompt_library::render::detail::state_lines;
use prompt_library::share::open_link;
use prompt_library::store::PromptStore;
use std::time::Instant;

pub async fn handle_show<S: PromptStore>(
    store: &S,
    config: &Config,
    id: &str,
    track: bool,
    start: Instant,
) -> Result<()> {
    let mut state = load_detail(store, id).await;

    if track {
        if let Some(detail) = state.detail_mut() {
            track_view(store, &mut detail.record).await;
        }
    }

    match state {
        DetailState::NotFound => Err(FetchError::not_found(id).into()),
        DetailState::Failed(reason) => Err(anyhow::anyhow!("Failed to load prompt '{}': {}", id, reason)),
        _ => {
            for line in state_lines(&state, config) {
                println!("{}", line.paint());
            }
            tracing::debug!(prompt_id = id, elapsed_ms = start.elapsed().as_millis() as u64, "Detail shown");
            Ok(())
        }
    }
}

pub async fn handle_favorite<S: PromptStore>(store: &S, id: &str, start: Instant) -> Result<()> {
    let mut record = store.get_prompt(id).await?;
    let favorite = toggle_favorite(store, &mut record)
        .await
        .context("Failed to update favorite")?;

    let verb = if favorite { "Favorited" } else { "Unfavorited" };
    println!(
        "✓ {} {} ({}ms)",
        verb,
        record.title.bold(),
        start.elapsed().as_millis()
    );
    Ok(())
}

pub async fn handle_open<S: PromptStore>(store: &S, config: &Config, id: &str, start: Instant) -> Result<()> {
    let record = store.get_prompt(id).await?;
    let url = record
        .attachment_url(config.endpoint_or_empty(), &config.storage_bucket)
        .with_context(|| format!("Prompt '{}' has no attachment", id))?;

    open_link(&url)?;
    println!(
        "✓ Opened {} ({}ms)",
        url.dimmed(),
        start.elapsed().as_millis()
    );
    Ok(())
}
