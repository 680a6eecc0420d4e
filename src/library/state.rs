use std::collections::HashSet;

use super::export;
use super::filter::{FilterCriteria, SortKey};
use crate::model::{Category, PromptRecord, Tool};

/// Card grid or table rows over the same derived list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    Table,
}

impl ViewMode {
    pub fn toggled(&self) -> ViewMode {
        match self {
            ViewMode::Grid => ViewMode::Table,
            ViewMode::Table => ViewMode::Grid,
        }
    }
}

/// Names offered in the tool and category dropdowns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterOptions {
    pub tools: Vec<String>,
    pub categories: Vec<String>,
}

impl FilterOptions {
    /// Reference lists win when present; otherwise fall back to the names
    /// seen in the fetched records
    pub fn collect(records: &[PromptRecord], tools: &[Tool], categories: &[Category]) -> Self {
        let tools = if tools.is_empty() {
            distinct_sorted(records.iter().filter_map(|r| r.tool.as_ref().map(|t| t.name.as_str())))
        } else {
            distinct_sorted(tools.iter().map(|t| t.name.as_str()))
        };

        let categories = if categories.is_empty() {
            distinct_sorted(
                records
                    .iter()
                    .filter_map(|r| r.category.as_ref().map(|c| c.name.as_str())),
            )
        } else {
            distinct_sorted(categories.iter().map(|c| c.name.as_str()))
        };

        Self { tools, categories }
    }
}

fn distinct_sorted<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = names
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    out.sort();
    out
}

/// Listing controller: owns the fetched page, the filter criteria, the view
/// mode and the multi-select set. The visible list is re-derived after every
/// change so readers never see a stale derivation.
#[derive(Debug, Clone, Default)]
pub struct LibraryState {
    records: Vec<PromptRecord>,
    criteria: FilterCriteria,
    visible: Vec<PromptRecord>,
    view_mode: ViewMode,
    selection_mode: bool,
    selected: HashSet<String>,
}

impl LibraryState {
    pub fn new(records: Vec<PromptRecord>) -> Self {
        let mut state = Self {
            records,
            ..Default::default()
        };
        state.rederive();
        state
    }

    fn rederive(&mut self) {
        self.visible = self.criteria.derive(&self.records);
    }

    pub fn records(&self) -> &[PromptRecord] {
        &self.records
    }

    /// The filtered, sorted list every view renders
    pub fn visible(&self) -> &[PromptRecord] {
        &self.visible
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Swap in a freshly fetched page. Selected ids that no longer exist are
    /// dropped.
    pub fn replace_records(&mut self, records: Vec<PromptRecord>) {
        let known: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        self.selected.retain(|id| known.contains(id.as_str()));
        self.records = records;
        self.rederive();
    }

    /// Apply a local change to one record (favorite flag, usage counter)
    pub fn update_record<F>(&mut self, id: &str, update: F) -> bool
    where
        F: FnOnce(&mut PromptRecord),
    {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                update(record);
                self.rederive();
                true
            }
            None => false,
        }
    }

    pub fn find(&self, id: &str) -> Option<&PromptRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    // Filter criteria

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.rederive();
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.criteria.search = query.into();
        self.rederive();
    }

    pub fn set_tool(&mut self, tool: Option<String>) {
        self.criteria.tool = tool;
        self.rederive();
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.criteria.category = category;
        self.rederive();
    }

    pub fn set_min_rating(&mut self, rating: Option<f64>) {
        self.criteria.min_rating = rating;
        self.rederive();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.criteria.sort = sort;
        self.rederive();
    }

    pub fn toggle_favorites_only(&mut self) {
        self.criteria.favorites_only = !self.criteria.favorites_only;
        self.rederive();
    }

    /// Reset every criterion to its default
    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.rederive();
    }

    pub fn has_active_filters(&self) -> bool {
        self.criteria.has_active_filters()
    }

    // View mode

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggled();
    }

    // Selection

    pub fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    /// Enter or leave selection mode. Leaving clears the selection.
    pub fn toggle_selection_mode(&mut self) {
        self.selection_mode = !self.selection_mode;
        if !self.selection_mode {
            self.selected.clear();
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Add or remove one id. Ignored outside selection mode; returns whether
    /// the selection changed.
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if !self.selection_mode {
            return false;
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
        true
    }

    /// Clear when everything visible is already selected, otherwise select
    /// exactly the visible list
    pub fn select_all_or_none(&mut self) {
        if !self.visible.is_empty() && self.selected.len() == self.visible.len() {
            self.selected.clear();
        } else {
            self.selected = self.visible.iter().map(|r| r.id.clone()).collect();
        }
    }

    /// Selected records in visible-list order
    pub fn selected_records(&self) -> Vec<&PromptRecord> {
        self.visible
            .iter()
            .filter(|r| self.selected.contains(&r.id))
            .collect()
    }

    /// Export document for the current selection; empty when nothing visible
    /// is selected
    pub fn export_selection(&self) -> String {
        export::export_text(self.selected_records())
    }

    pub fn share_selection(&self) -> String {
        export::share_dialog_text(self.selected_records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn five() -> Vec<PromptRecord> {
        (1..=5)
            .map(|i| {
                let mut r = PromptRecord::new(format!("p{}", i), format!("Prompt {}", i));
                r.created_at = Some(Utc.with_ymd_and_hms(2024, 1, i, 12, 0, 0).unwrap());
                r.rating = Some(i as f64);
                r
            })
            .collect()
    }

    fn selecting(records: Vec<PromptRecord>) -> LibraryState {
        let mut state = LibraryState::new(records);
        state.toggle_selection_mode();
        state
    }

    #[test]
    fn test_toggle_selection_requires_selection_mode() {
        let mut state = LibraryState::new(five());
        assert!(!state.toggle_selection("p1"));
        assert_eq!(state.selected_count(), 0);

        state.toggle_selection_mode();
        assert!(state.toggle_selection("p1"));
        assert!(state.is_selected("p1"));
        assert!(state.toggle_selection("p1"));
        assert!(!state.is_selected("p1"));
    }

    #[test]
    fn test_leaving_selection_mode_clears_selection() {
        let mut state = selecting(five());
        state.toggle_selection("p1");
        state.toggle_selection("p2");
        state.toggle_selection_mode();
        assert_eq!(state.selected_count(), 0);
        assert!(!state.selection_mode());
    }

    #[test]
    fn test_select_all_or_none_alternates() {
        let mut state = selecting(five());
        for id in ["p1", "p2", "p3", "p4", "p5"] {
            state.toggle_selection(id);
        }

        state.select_all_or_none();
        assert_eq!(state.selected_count(), 0);

        state.select_all_or_none();
        assert_eq!(state.selected_count(), 5);
    }

    #[test]
    fn test_select_all_respects_active_filters() {
        let mut state = selecting(five());
        state.set_min_rating(Some(4.0));
        assert_eq!(state.visible().len(), 2);

        state.select_all_or_none();
        assert_eq!(state.selected_count(), 2);
        assert!(state.is_selected("p4"));
        assert!(state.is_selected("p5"));
        assert!(!state.is_selected("p1"));
    }

    #[test]
    fn test_select_all_on_empty_list_selects_nothing() {
        let mut state = selecting(Vec::new());
        state.select_all_or_none();
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_export_follows_visible_order_not_selection_order() {
        let mut state = selecting(five());
        state.toggle_selection("p1");
        state.toggle_selection("p3");

        let text = state.export_selection();
        assert_eq!(text.matches("---\n\n").count(), 2);
        // Newest first: p3 (Jan 3) before p1 (Jan 1)
        let p3 = text.find("Title: Prompt 3").unwrap();
        let p1 = text.find("Title: Prompt 1").unwrap();
        assert!(p3 < p1);
    }

    #[test]
    fn test_export_skips_selected_but_hidden_records() {
        let mut state = selecting(five());
        state.toggle_selection("p1");
        state.toggle_selection("p5");
        state.set_min_rating(Some(3.0));
        let text = state.export_selection();
        assert!(text.contains("Title: Prompt 5"));
        assert!(!text.contains("Title: Prompt 1"));
    }

    #[test]
    fn test_clear_filters_restores_defaults() {
        let mut state = LibraryState::new(five());
        state.set_search("prompt");
        state.set_tool(Some("ChatGPT".to_string()));
        state.set_category(Some("Code".to_string()));
        state.set_min_rating(Some(2.0));
        state.set_sort(SortKey::TitleDesc);
        state.toggle_favorites_only();
        assert!(state.has_active_filters());

        state.clear_filters();
        assert_eq!(state.criteria(), &FilterCriteria::default());
        assert_eq!(state.visible().len(), 5);
    }

    #[test]
    fn test_replace_records_prunes_missing_selection() {
        let mut state = selecting(five());
        state.toggle_selection("p1");
        state.toggle_selection("p2");
        let remaining: Vec<_> = five().into_iter().skip(1).collect();
        state.replace_records(remaining);
        assert!(!state.is_selected("p1"));
        assert!(state.is_selected("p2"));
    }

    #[test]
    fn test_update_record_rederives() {
        let mut state = LibraryState::new(five());
        state.toggle_favorites_only();
        assert!(state.visible().is_empty());

        assert!(state.update_record("p2", |r| r.is_favorite = true));
        assert_eq!(state.visible().len(), 1);
        assert!(!state.update_record("missing", |r| r.is_favorite = true));
    }

    #[test]
    fn test_view_mode_toggle() {
        let mut state = LibraryState::new(Vec::new());
        assert_eq!(state.view_mode(), ViewMode::Grid);
        state.toggle_view_mode();
        assert_eq!(state.view_mode(), ViewMode::Table);
        state.set_view_mode(ViewMode::Grid);
        assert_eq!(state.view_mode(), ViewMode::Grid);
    }

    #[test]
    fn test_filter_options_prefer_reference_lists() {
        let mut a = PromptRecord::new("1", "a");
        a.tool = Some(Tool {
            id: None,
            name: "Zed".to_string(),
            color: None,
        });
        let mut b = PromptRecord::new("2", "b");
        b.tool = Some(Tool {
            id: None,
            name: "Alpha".to_string(),
            color: None,
        });
        let records = vec![a.clone(), b, a];

        let fallback = FilterOptions::collect(&records, &[], &[]);
        assert_eq!(fallback.tools, vec!["Alpha", "Zed"]);
        assert!(fallback.categories.is_empty());

        let reference = vec![Tool {
            id: None,
            name: "Claude".to_string(),
            color: None,
        }];
        let options = FilterOptions::collect(&records, &reference, &[]);
        assert_eq!(options.tools, vec!["Claude"]);
    }
}
