//! Detail view loading and the two write-backs it triggers

use crate::error::FetchResult;
use crate::model::PromptRecord;
use crate::store::PromptStore;

/// A loaded prompt plus its related prompts
#[derive(Debug, Clone)]
pub struct PromptDetail {
    pub record: PromptRecord,
    pub related: Vec<PromptRecord>,
}

#[derive(Debug, Clone)]
pub enum DetailState {
    Loading,
    Loaded(Box<PromptDetail>),
    NotFound,
    /// Fetch failed for a reason other than a missing record
    Failed(String),
}

impl DetailState {
    pub fn detail(&self) -> Option<&PromptDetail> {
        match self {
            DetailState::Loaded(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn detail_mut(&mut self) -> Option<&mut PromptDetail> {
        match self {
            DetailState::Loaded(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Fetch the record, then prompts from the same category. A related-list
/// failure leaves the list empty.
pub async fn load_detail<S: PromptStore>(store: &S, id: &str) -> DetailState {
    let record = match store.get_prompt(id).await {
        Ok(record) => record,
        Err(e) if e.is_not_found() => return DetailState::NotFound,
        Err(e) => {
            tracing::warn!(prompt_id = id, error = %e, "Failed to load prompt");
            return DetailState::Failed(e.to_string());
        }
    };

    let related = match record.category.as_ref().map(|c| c.name.as_str()) {
        Some(category) if !category.is_empty() => store
            .related_prompts(category, &record.id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(prompt_id = id, error = %e, "Failed to load related prompts");
                Vec::new()
            }),
        _ => Vec::new(),
    };

    DetailState::Loaded(Box::new(PromptDetail { record, related }))
}

/// Count a view. On success the displayed counter takes the new value; a
/// failure is logged and otherwise ignored.
pub async fn track_view<S: PromptStore>(store: &S, record: &mut PromptRecord) -> Option<u64> {
    match store.increment_view_count(&record.id).await {
        Ok(count) => {
            record.usage_count = count;
            Some(count)
        }
        Err(e) => {
            tracing::warn!(prompt_id = %record.id, error = %e, "Failed to record view");
            None
        }
    }
}

/// Flip the favorite flag remotely, and locally only once the write lands
pub async fn toggle_favorite<S: PromptStore>(store: &S, record: &mut PromptRecord) -> FetchResult<bool> {
    let favorite = !record.is_favorite;
    if let Err(e) = store.set_favorite(&record.id, favorite).await {
        tracing::warn!(prompt_id = %record.id, error = %e, "Failed to update favorite");
        return Err(e);
    }
    record.is_favorite = favorite;
    Ok(favorite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::store::MemoryStore;

    fn in_category(id: &str, category: &str) -> PromptRecord {
        let mut record = PromptRecord::new(id, format!("Prompt {}", id));
        record.category = Some(Category {
            id: None,
            name: category.to_string(),
            color: None,
            image_url: None,
        });
        record
    }

    fn store() -> MemoryStore {
        MemoryStore::new(vec![
            in_category("1", "Writing"),
            in_category("2", "Writing"),
            in_category("3", "Code"),
            in_category("4", "Writing"),
            in_category("5", "Writing"),
            in_category("6", "Writing"),
        ])
    }

    #[tokio::test]
    async fn test_load_detail_with_related() {
        let state = load_detail(&store(), "1").await;
        let detail = state.detail().unwrap();
        assert_eq!(detail.record.id, "1");
        assert_eq!(detail.related.len(), 3);
        assert!(detail.related.iter().all(|r| r.id != "1" && r.category_name() == "Writing"));
    }

    #[tokio::test]
    async fn test_load_detail_not_found() {
        assert!(matches!(load_detail(&store(), "99").await, DetailState::NotFound));
    }

    #[tokio::test]
    async fn test_load_detail_failure() {
        let store = store();
        store.set_fail_reads(true);
        assert!(matches!(load_detail(&store, "1").await, DetailState::Failed(_)));
    }

    #[tokio::test]
    async fn test_track_view_failure_keeps_detail() {
        let store = store();
        let mut state = load_detail(&store, "3").await;
        store.set_fail_writes(true);

        let record = &mut state.detail_mut().unwrap().record;
        assert_eq!(track_view(&store, record).await, None);
        assert_eq!(record.usage_count, 0);
        assert!(state.detail().is_some());
    }

    #[tokio::test]
    async fn test_track_view_updates_counter() {
        let store = store();
        let mut record = store.snapshot("3").unwrap();
        assert_eq!(track_view(&store, &mut record).await, Some(1));
        assert_eq!(record.usage_count, 1);
    }

    #[tokio::test]
    async fn test_toggle_favorite_applies_on_success() {
        let store = store();
        let mut record = store.snapshot("2").unwrap();
        assert!(toggle_favorite(&store, &mut record).await.unwrap());
        assert!(record.is_favorite);
        assert!(store.snapshot("2").unwrap().is_favorite);
    }

    #[tokio::test]
    async fn test_toggle_favorite_unchanged_on_failure() {
        let store = store();
        store.set_fail_writes(true);
        let mut record = store.snapshot("2").unwrap();
        assert!(toggle_favorite(&store, &mut record).await.is_err());
        assert!(!record.is_favorite);
    }
}
