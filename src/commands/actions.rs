// Action commands: copy, share, export

use anyhow::Result;
use colored::*;
use is_terminal::IsTerminal;
use prompt_library::clipboard::Clipboard;
use prompt_library::library::export::{export_text, write_export};
use prompt_library::model::PromptRecord;
use prompt_library::share::{open_link, SharePayload, ShareTarget};
use prompt_library::store::PromptStore;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::common::{fetch_records, load_listing};
use crate::cli::FilterArgs;

/// One record copies its body; several copy the export document
pub fn copy_text(records: &[PromptRecord]) -> String {
    match records {
        [single] => single.prompt_text.clone(),
        many => export_text(many),
    }
}

pub async fn handle_copy<S: PromptStore>(store: &S, ids: &[String], start: Instant) -> Result<()> {
    let records = fetch_records(store, ids).await?;
    let content = copy_text(&records);

    let is_tty = std::io::stdout().is_terminal();
    let mut clipboard = Clipboard::new();
    clipboard.copy_or_pipe(&content, is_tty)?;

    if is_tty && clipboard.is_available() {
        let what = match records.as_slice() {
            [single] => single.title.clone(),
            many => format!("{} prompts", many.len()),
        };
        println!(
            "✓ Copied {} to clipboard ({}ms)",
            what.bold(),
            start.elapsed().as_millis()
        );
    }
    Ok(())
}

/// Single-record share for one id, the selection layout for several
pub fn share_payload(records: &[PromptRecord]) -> SharePayload {
    match records {
        [single] => SharePayload::single(single),
        many => SharePayload::selection(many),
    }
}

pub async fn handle_share<S: PromptStore>(
    store: &S,
    ids: &[String],
    via: ShareTarget,
    open: bool,
    start: Instant,
) -> Result<()> {
    let records = fetch_records(store, ids).await?;
    let payload = share_payload(&records);

    match payload.link(via) {
        None => {
            let mut clipboard = Clipboard::new();
            clipboard.copy_or_pipe(&payload.text, std::io::stdout().is_terminal())?;
            if clipboard.is_available() {
                eprintln!(
                    "✓ Share text copied to clipboard ({}ms)",
                    start.elapsed().as_millis()
                );
            }
        }
        Some(link) => {
            if open {
                if let Err(e) = open_link(&link) {
                    tracing::warn!(error = %e, "Failed to open share link");
                    eprintln!("{}", format!("Could not open {} link: {}", via, e).yellow());
                }
            }
            println!("{}", link);
        }
    }
    Ok(())
}

/// Visible records, narrowed to `ids` when any are given
pub fn select_for_export<'a>(visible: &'a [PromptRecord], ids: &[String]) -> Vec<&'a PromptRecord> {
    if ids.is_empty() {
        return visible.iter().collect();
    }
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    visible.iter().filter(|r| wanted.contains(r.id.as_str())).collect()
}

pub async fn handle_export<S: PromptStore>(
    store: &S,
    filters: &FilterArgs,
    ids: &[String],
    output: Option<&Path>,
    start: Instant,
) -> Result<Option<PathBuf>> {
    let mut listing = load_listing(store, filters).await?;

    let selected: Vec<String> = select_for_export(listing.state.visible(), ids)
        .into_iter()
        .map(|r| r.id.clone())
        .collect();
    listing.state.toggle_selection_mode();
    for id in &selected {
        listing.state.toggle_selection(id);
    }

    if listing.state.selected_count() == 0 {
        println!("No prompts to export");
        return Ok(None);
    }

    let content = listing.state.export_selection();
    let path = write_export(&content, output, Path::new("."))?;
    println!(
        "✓ Exported {} prompts to {} ({}ms)",
        listing.state.selected_count(),
        path.display().to_string().bold(),
        start.elapsed().as_millis()
    );
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_library::store::MemoryStore;

    fn record(id: &str, body: &str) -> PromptRecord {
        let mut r = PromptRecord::new(id, format!("Prompt {}", id));
        r.prompt_text = body.to_string();
        r
    }

    #[test]
    fn test_copy_single_is_body() {
        assert_eq!(copy_text(&[record("1", "Just the body")]), "Just the body");
    }

    #[test]
    fn test_copy_many_is_export() {
        let text = copy_text(&[record("1", "a"), record("2", "b")]);
        assert_eq!(text.matches("---\n\n").count(), 2);
        assert!(text.starts_with("Title: Prompt 1\n"));
    }

    #[test]
    fn test_share_payload_subjects() {
        assert_eq!(share_payload(&[record("1", "a")]).subject, "Prompt Share: Prompt 1");
        assert_eq!(
            share_payload(&[record("1", "a"), record("2", "b")]).subject,
            "Shared Prompts"
        );
    }

    #[test]
    fn test_select_for_export_keeps_visible_order() {
        let visible = vec![record("a", ""), record("b", ""), record("c", "")];
        let picked = select_for_export(&visible, &["c".to_string(), "a".to_string()]);
        let ids: Vec<_> = picked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(select_for_export(&visible, &[]).len(), 3);
    }

    #[tokio::test]
    async fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.txt");
        let store = MemoryStore::new(vec![record("1", "one"), record("2", "two")]);
        let filters = FilterArgs {
            page: 1,
            ..Default::default()
        };

        let path = handle_export(&store, &filters, &["2".to_string()], Some(&output), Instant::now())
            .await
            .unwrap()
            .unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("Content:\ntwo"));
        assert!(!written.contains("Content:\none"));
    }

    #[tokio::test]
    async fn test_export_nothing_selected_is_noop() {
        let store = MemoryStore::new(vec![record("1", "one")]);
        let filters = FilterArgs {
            search: Some("zzz".into()),
            page: 1,
            ..Default::default()
        };
        let result = handle_export(&store, &filters, &[], None, Instant::now()).await.unwrap();
        assert!(result.is_none());
    }
}
