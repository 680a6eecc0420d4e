//! Data fetch layer seam
//!
//! [`PromptStore`] is everything the library needs from the hosted database.
//! [`crate::supabase::SupabaseClient`] is the real implementation;
//! [`MemoryStore`] backs the mock server and the tests.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::{FetchError, FetchResult};
use crate::model::{Category, PromptRecord, Tool};

/// Records per listing page
pub const PAGE_SIZE: u32 = 20;

/// Number of related prompts shown on a detail view
pub const RELATED_LIMIT: usize = 3;

/// Number of pages needed for `total` records, never less than one
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    (total.div_ceil(size)).max(1) as u32
}

/// Row offset of a 1-based page
pub fn page_offset(page: u32, page_size: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(page_size)
}

/// One page of the listing plus the overall count
#[derive(Debug, Clone, Default)]
pub struct PromptPage {
    pub records: Vec<PromptRecord>,
    pub page: u32,
    pub total_count: u64,
}

impl PromptPage {
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, PAGE_SIZE)
    }
}

/// A page and the reference lists for the filter dropdowns
#[derive(Debug, Clone, Default)]
pub struct LibraryData {
    pub page: PromptPage,
    pub tools: Vec<Tool>,
    pub categories: Vec<Category>,
}

pub trait PromptStore: Send + Sync {
    /// One page, newest first, with tool/category/type joined
    fn list_prompts(&self, page: u32) -> impl Future<Output = FetchResult<Vec<PromptRecord>>> + Send;

    fn count_prompts(&self) -> impl Future<Output = FetchResult<u64>> + Send;

    /// Fails with [`FetchError::NotFound`] when nothing matches
    fn get_prompt(&self, id: &str) -> impl Future<Output = FetchResult<PromptRecord>> + Send;

    /// Up to three prompts in `category`, excluding `exclude_id`
    fn related_prompts(
        &self,
        category: &str,
        exclude_id: &str,
    ) -> impl Future<Output = FetchResult<Vec<PromptRecord>>> + Send;

    fn set_favorite(&self, id: &str, favorite: bool) -> impl Future<Output = FetchResult<()>> + Send;

    /// Atomically bump the usage counter, returning the new value
    fn increment_view_count(&self, id: &str) -> impl Future<Output = FetchResult<u64>> + Send;

    fn list_tools(&self) -> impl Future<Output = FetchResult<Vec<Tool>>> + Send;

    fn list_categories(&self) -> impl Future<Output = FetchResult<Vec<Category>>> + Send;

    fn fetch_page(&self, page: u32) -> impl Future<Output = FetchResult<PromptPage>> + Send {
        async move {
            let records = self.list_prompts(page).await?;
            let total_count = self.count_prompts().await?;
            Ok(PromptPage {
                records,
                page: page.max(1),
                total_count,
            })
        }
    }
}

/// Fetch a page and the dropdown reference lists. Reference list failures
/// degrade to empty lists; a page failure is returned.
pub async fn fetch_library<S: PromptStore>(store: &S, page: u32) -> FetchResult<LibraryData> {
    let page = store.fetch_page(page).await?;

    let tools = store.list_tools().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load tools");
        Vec::new()
    });
    let categories = store.list_categories().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories");
        Vec::new()
    });

    Ok(LibraryData {
        page,
        tools,
        categories,
    })
}

/// Monotonic tag for outstanding requests. A response is applied only when
/// its tag is still the latest one issued.
#[derive(Debug, Default, Clone)]
pub struct RequestGeneration {
    current: u64,
}

impl RequestGeneration {
    /// Issue a new tag, superseding every earlier one
    pub fn next(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.current
    }
}

/// In-memory catalog with optional failure injection
#[derive(Debug, Default)]
pub struct MemoryStore {
    prompts: Mutex<Vec<PromptRecord>>,
    tools: Vec<Tool>,
    categories: Vec<Category>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new(prompts: Vec<PromptRecord>) -> Self {
        Self {
            prompts: Mutex::new(prompts),
            ..Default::default()
        }
    }

    pub fn with_reference_lists(mut self, tools: Vec<Tool>, categories: Vec<Category>) -> Self {
        self.tools = tools;
        self.categories = categories;
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current copy of a stored record
    pub fn snapshot(&self, id: &str) -> Option<PromptRecord> {
        self.lock().iter().find(|p| p.id == id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PromptRecord>> {
        // A poisoned lock only means a test panicked mid-update
        self.prompts.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_reads(&self) -> FetchResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(FetchError::Http {
                status: 503,
                body: "reads disabled".to_string(),
            });
        }
        Ok(())
    }

    fn check_writes(&self) -> FetchResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FetchError::Http {
                status: 503,
                body: "writes disabled".to_string(),
            });
        }
        Ok(())
    }

    fn sorted_names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = items.to_vec();
        out.sort_by(|a, b| name(a).cmp(name(b)));
        out
    }
}

impl PromptStore for MemoryStore {
    async fn list_prompts(&self, page: u32) -> FetchResult<Vec<PromptRecord>> {
        self.check_reads()?;
        let mut all = self.lock().clone();
        all.sort_by(|a, b| b.created_or_epoch().cmp(&a.created_or_epoch()));
        Ok(all
            .into_iter()
            .skip(page_offset(page, PAGE_SIZE) as usize)
            .take(PAGE_SIZE as usize)
            .collect())
    }

    async fn count_prompts(&self) -> FetchResult<u64> {
        self.check_reads()?;
        Ok(self.lock().len() as u64)
    }

    async fn get_prompt(&self, id: &str) -> FetchResult<PromptRecord> {
        self.check_reads()?;
        self.snapshot(id).ok_or_else(|| FetchError::not_found(id))
    }

    async fn related_prompts(&self, category: &str, exclude_id: &str) -> FetchResult<Vec<PromptRecord>> {
        self.check_reads()?;
        Ok(self
            .lock()
            .iter()
            .filter(|p| p.id != exclude_id)
            .filter(|p| p.category.as_ref().map(|c| c.name.as_str()) == Some(category))
            .take(RELATED_LIMIT)
            .cloned()
            .collect())
    }

    async fn set_favorite(&self, id: &str, favorite: bool) -> FetchResult<()> {
        self.check_writes()?;
        let mut prompts = self.lock();
        let record = prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| FetchError::not_found(id))?;
        record.is_favorite = favorite;
        Ok(())
    }

    async fn increment_view_count(&self, id: &str) -> FetchResult<u64> {
        self.check_writes()?;
        let mut prompts = self.lock();
        let record = prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| FetchError::not_found(id))?;
        record.usage_count += 1;
        Ok(record.usage_count)
    }

    async fn list_tools(&self) -> FetchResult<Vec<Tool>> {
        self.check_reads()?;
        Ok(Self::sorted_names(&self.tools, |t| t.name.as_str()))
    }

    async fn list_categories(&self) -> FetchResult<Vec<Category>> {
        self.check_reads()?;
        Ok(Self::sorted_names(&self.categories, |c| c.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn catalog(n: u32) -> Vec<PromptRecord> {
        (0..n)
            .map(|i| {
                let mut r = PromptRecord::new(format!("{}", i), format!("Prompt {}", i));
                r.created_at = Some(Utc.timestamp_opt(1_700_000_000 + i64::from(i), 0).unwrap());
                r
            })
            .collect()
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(100, 20), 5);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(0, 20), 0);
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
    }

    #[test]
    fn test_request_generation_discards_stale() {
        let mut generation = RequestGeneration::default();
        let first = generation.next();
        let second = generation.next();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[tokio::test]
    async fn test_fetch_page_paginates_newest_first() {
        let store = MemoryStore::new(catalog(45));
        let page = store.fetch_page(1).await.unwrap();
        assert_eq!(page.records.len(), 20);
        assert_eq!(page.records[0].id, "44");
        assert_eq!(page.total_count, 45);
        assert_eq!(page.total_pages(), 3);

        let last = store.fetch_page(3).await.unwrap();
        assert_eq!(last.records.len(), 5);
        assert_eq!(last.records[4].id, "0");
    }

    #[tokio::test]
    async fn test_fetch_library_degrades_reference_lists() {
        let store = MemoryStore::new(catalog(2));
        let data = fetch_library(&store, 1).await.unwrap();
        assert_eq!(data.page.records.len(), 2);
        assert!(data.tools.is_empty());

        store.set_fail_reads(true);
        assert!(fetch_library(&store, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_prompt_is_not_found() {
        let store = MemoryStore::new(catalog(1));
        let err = store.get_prompt("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_increment_returns_new_value() {
        let store = MemoryStore::new(catalog(1));
        assert_eq!(store.increment_view_count("0").await.unwrap(), 1);
        assert_eq!(store.increment_view_count("0").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reference_lists_are_alphabetical() {
        let tool = |name: &str| Tool {
            id: None,
            name: name.to_string(),
            color: None,
        };
        let store = MemoryStore::new(Vec::new())
            .with_reference_lists(vec![tool("Midjourney"), tool("ChatGPT")], Vec::new());
        let names: Vec<_> = store
            .list_tools()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["ChatGPT", "Midjourney"]);
    }
}
