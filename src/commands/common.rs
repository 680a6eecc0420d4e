// Shared helpers for command handlers

use anyhow::Result;
use prompt_library::error_help::{format_unknown_name, resolve_name};
use prompt_library::library::{FilterCriteria, FilterOptions, LibraryState};
use prompt_library::model::PromptRecord;
use prompt_library::store::{fetch_library, PromptStore};

use crate::cli::FilterArgs;

/// An error whose message is already formatted for the terminal
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(pub String);

/// A fetched page with the user's filters applied
pub struct Listing {
    pub state: LibraryState,
    pub page: u32,
    pub total_pages: u32,
    pub options: FilterOptions,
}

/// Normalize tool and category names to the catalog's spelling. Unknown
/// names fail with suggestions.
pub fn resolve_criteria(mut criteria: FilterCriteria, options: &FilterOptions) -> Result<FilterCriteria> {
    if let Some(tool) = criteria.tool.take() {
        let resolved = resolve_name(&tool, &options.tools).ok_or_else(|| {
            Reported(format_unknown_name("tool", &tool, &options.tools, "plib tools"))
        })?;
        criteria.tool = Some(resolved.to_string());
    }
    if let Some(category) = criteria.category.take() {
        let resolved = resolve_name(&category, &options.categories).ok_or_else(|| {
            Reported(format_unknown_name(
                "category",
                &category,
                &options.categories,
                "plib categories",
            ))
        })?;
        criteria.category = Some(resolved.to_string());
    }
    Ok(criteria)
}

pub async fn load_listing<S: PromptStore>(store: &S, filters: &FilterArgs) -> Result<Listing> {
    let data = fetch_library(store, filters.page).await?;
    let options = FilterOptions::collect(&data.page.records, &data.tools, &data.categories);
    let criteria = resolve_criteria(filters.criteria(), &options)?;

    let total_pages = data.page.total_pages();
    let mut state = LibraryState::new(data.page.records);
    state.set_criteria(criteria);

    Ok(Listing {
        state,
        page: data.page.page,
        total_pages,
        options,
    })
}

/// Fetch each id, returned in default listing order (newest first)
pub async fn fetch_records<S: PromptStore>(store: &S, ids: &[String]) -> Result<Vec<PromptRecord>> {
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        if records.iter().any(|r: &PromptRecord| &r.id == id) {
            continue;
        }
        records.push(store.get_prompt(id).await?);
    }
    Ok(FilterCriteria::default().derive(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use prompt_library::model::Tool;
    use prompt_library::store::MemoryStore;

    fn tool(name: &str) -> Tool {
        Tool {
            id: None,
            name: name.to_string(),
            color: None,
        }
    }

    fn record(id: &str, day: u32, tool_name: &str) -> PromptRecord {
        let mut r = PromptRecord::new(id, format!("Prompt {}", id));
        r.created_at = Some(Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap());
        r.tool = Some(tool(tool_name));
        r
    }

    fn store() -> MemoryStore {
        MemoryStore::new(vec![
            record("1", 1, "ChatGPT"),
            record("2", 2, "Claude"),
            record("3", 3, "ChatGPT"),
        ])
        .with_reference_lists(vec![tool("ChatGPT"), tool("Claude")], Vec::new())
    }

    #[test]
    fn test_resolve_criteria_normalizes_case() {
        let options = FilterOptions {
            tools: vec!["ChatGPT".into()],
            categories: vec!["Writing".into()],
        };
        let criteria = FilterCriteria {
            tool: Some("chatgpt".into()),
            category: Some("WRITING".into()),
            ..Default::default()
        };
        let resolved = resolve_criteria(criteria, &options).unwrap();
        assert_eq!(resolved.tool.as_deref(), Some("ChatGPT"));
        assert_eq!(resolved.category.as_deref(), Some("Writing"));
    }

    #[test]
    fn test_resolve_criteria_unknown_name() {
        let options = FilterOptions::default();
        let criteria = FilterCriteria {
            tool: Some("Bard".into()),
            ..Default::default()
        };
        let err = resolve_criteria(criteria, &options).unwrap_err();
        assert!(err.downcast_ref::<Reported>().is_some());
    }

    #[tokio::test]
    async fn test_load_listing_applies_filters() {
        let filters = FilterArgs {
            tool: Some("claude".into()),
            page: 1,
            ..Default::default()
        };
        let listing = load_listing(&store(), &filters).await.unwrap();
        let ids: Vec<_> = listing.state.visible().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
        assert_eq!(listing.total_pages, 1);
        assert_eq!(listing.options.tools, vec!["ChatGPT", "Claude"]);
    }

    #[tokio::test]
    async fn test_fetch_records_listing_order() {
        let ids = vec!["1".to_string(), "3".to_string(), "1".to_string()];
        let records = fetch_records(&store(), &ids).await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    #[tokio::test]
    async fn test_fetch_records_missing_id() {
        let err = fetch_records(&store(), &["9".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
