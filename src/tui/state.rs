use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

use crate::clipboard::CopyFeedback;
use crate::detail::DetailState;
use crate::error::FetchResult;
use crate::library::{FilterOptions, LibraryState, ViewMode};
use crate::model::PromptRecord;
use crate::share::{SharePayload, ShareTarget};
use crate::store::{LibraryData, RequestGeneration};

/// How long status bar messages stay up
pub const STATUS_DURATION: Duration = Duration::from_secs(3);

/// Rating thresholds offered by the rating picker
pub const RATING_CHOICES: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Listing,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Tool,
    Category,
    Rating,
}

impl PickerKind {
    pub fn title(&self) -> &'static str {
        match self {
            PickerKind::Tool => "AI Tool",
            PickerKind::Category => "Category",
            PickerKind::Rating => "Minimum Rating",
        }
    }
}

/// A dropdown over tool, category or rating choices
#[derive(Debug, Clone, PartialEq)]
pub struct Picker {
    pub kind: PickerKind,
    /// First entry is always "Any"
    pub choices: Vec<String>,
    pub cursor: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShareDialog {
    pub payload: SharePayload,
    pub cursor: usize,
}

impl ShareDialog {
    pub fn target(&self) -> ShareTarget {
        ShareTarget::ALL[self.cursor.min(ShareTarget::ALL.len() - 1)]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    Help,
    Picker(Picker),
    Share(ShareDialog),
    /// Attachment preview with its resolved URL
    Lightbox { filename: String, url: String },
}

/// Side effects requested by key handling, carried out by the run loop
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    FetchPage { page: u32, generation: u64 },
    LoadDetail { id: String, generation: u64 },
    ToggleFavorite(PromptRecord),
    /// Copy `text`; `key` names the control for the "Copied!" feedback
    Copy { key: String, text: String },
    Share { target: ShareTarget, payload: SharePayload },
    OpenUrl(String),
    Export(String),
}

/// Completed background work
#[derive(Debug)]
pub enum FetchMessage {
    Library {
        generation: u64,
        result: FetchResult<LibraryData>,
    },
    Detail {
        generation: u64,
        state: DetailState,
    },
    Favorite {
        id: String,
        result: Result<bool, String>,
    },
}

/// Everything the browser shows, independent of the terminal
#[derive(Debug)]
pub struct BrowserState {
    pub library: LibraryState,
    pub options: FilterOptions,
    pub cursor: usize,
    pub page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub screen: Screen,
    pub detail: DetailState,
    pub detail_scroll: u16,
    pub overlay: Option<Overlay>,
    pub search_input: bool,
    pub loading: bool,
    pub load_error: Option<String>,
    /// Cards per row at the last draw
    pub grid_columns: usize,
    pub status_message: Option<(String, Instant)>,
    pub copy_feedback: CopyFeedback,
    pub endpoint: String,
    pub bucket: String,
    list_generation: RequestGeneration,
    detail_generation: RequestGeneration,
}

impl BrowserState {
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            library: LibraryState::default(),
            options: FilterOptions::default(),
            cursor: 0,
            page: 1,
            total_pages: 1,
            total_count: 0,
            screen: Screen::Listing,
            detail: DetailState::Loading,
            detail_scroll: 0,
            overlay: None,
            search_input: false,
            loading: false,
            load_error: None,
            grid_columns: 1,
            status_message: None,
            copy_feedback: CopyFeedback::new(),
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            list_generation: RequestGeneration::default(),
            detail_generation: RequestGeneration::default(),
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Drop the status message once it has been up long enough
    pub fn expire_status(&mut self, now: Instant) {
        if let Some((_, at)) = &self.status_message {
            if now.saturating_duration_since(*at) >= STATUS_DURATION {
                self.status_message = None;
            }
        }
    }

    pub fn current_record(&self) -> Option<&PromptRecord> {
        self.library.visible().get(self.cursor)
    }

    fn clamp_cursor(&mut self) {
        let len = self.library.visible().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    /// Start fetching `page`, superseding any listing request in flight
    pub fn request_page(&mut self, page: u32) -> Action {
        self.loading = true;
        self.page = page.max(1);
        Action::FetchPage {
            page: self.page,
            generation: self.list_generation.next(),
        }
    }

    fn open_detail(&mut self, id: String) -> Action {
        self.screen = Screen::Detail;
        self.detail = DetailState::Loading;
        self.detail_scroll = 0;
        Action::LoadDetail {
            id,
            generation: self.detail_generation.next(),
        }
    }

    /// Apply a finished fetch. Responses from superseded requests are ignored.
    pub fn apply(&mut self, message: FetchMessage) {
        match message {
            FetchMessage::Library { generation, result } => {
                if !self.list_generation.is_current(generation) {
                    tracing::debug!(generation, "Discarding stale listing response");
                    return;
                }
                self.loading = false;
                match result {
                    Ok(data) => {
                        self.options = FilterOptions::collect(&data.page.records, &data.tools, &data.categories);
                        self.total_pages = data.page.total_pages();
                        self.total_count = data.page.total_count;
                        self.page = data.page.page;
                        self.library.replace_records(data.page.records);
                        self.load_error = None;
                        self.clamp_cursor();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to load prompts");
                        self.load_error = Some(e.to_string());
                        self.set_status("Failed to load prompts");
                    }
                }
            }
            FetchMessage::Detail { generation, state } => {
                if !self.detail_generation.is_current(generation) {
                    tracing::debug!(generation, "Discarding stale detail response");
                    return;
                }
                if let Some(detail) = state.detail() {
                    let usage = detail.record.usage_count;
                    self.library
                        .update_record(&detail.record.id, |r| r.usage_count = usage);
                }
                self.detail = state;
            }
            FetchMessage::Favorite { id, result } => match result {
                Ok(favorite) => {
                    self.library.update_record(&id, |r| r.is_favorite = favorite);
                    if let Some(detail) = self.detail.detail_mut() {
                        if detail.record.id == id {
                            detail.record.is_favorite = favorite;
                        }
                    }
                    self.clamp_cursor();
                    self.set_status(if favorite {
                        "Added to favorites"
                    } else {
                        "Removed from favorites"
                    });
                }
                Err(e) => {
                    self.set_status(format!("Failed to update favorite: {}", e));
                }
            },
        }
    }

    /// Handle one key press, returning the side effects it asks for
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Action::Quit];
        }

        if let Some(overlay) = self.overlay.take() {
            return self.handle_overlay_key(overlay, key);
        }

        if self.search_input {
            self.handle_search_key(key);
            return Vec::new();
        }

        match self.screen {
            Screen::Listing => self.handle_listing_key(key),
            Screen::Detail => self.handle_detail_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.search_input = false,
            KeyCode::Backspace => {
                let mut query = self.library.criteria().search.clone();
                query.pop();
                self.library.set_search(query);
            }
            KeyCode::Char(c) => {
                let mut query = self.library.criteria().search.clone();
                query.push(c);
                self.library.set_search(query);
            }
            _ => {}
        }
        self.cursor = 0;
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.library.visible().len();
        if len == 0 {
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    fn vertical_step(&self) -> isize {
        match self.library.view_mode() {
            ViewMode::Grid => self.grid_columns.max(1) as isize,
            ViewMode::Table => 1,
        }
    }

    fn open_picker(&mut self, kind: PickerKind) {
        let mut choices = vec!["Any".to_string()];
        let current = match kind {
            PickerKind::Tool => {
                choices.extend(self.options.tools.iter().cloned());
                self.library.criteria().tool.clone()
            }
            PickerKind::Category => {
                choices.extend(self.options.categories.iter().cloned());
                self.library.criteria().category.clone()
            }
            PickerKind::Rating => {
                choices.extend(RATING_CHOICES.iter().map(|r| format!("{}+ stars", r)));
                self.library
                    .criteria()
                    .min_rating
                    .map(|r| format!("{}+ stars", r))
            }
        };
        let cursor = current
            .and_then(|c| choices.iter().position(|choice| *choice == c))
            .unwrap_or(0);
        self.overlay = Some(Overlay::Picker(Picker {
            kind,
            choices,
            cursor,
        }));
    }

    fn apply_picker(&mut self, picker: &Picker) {
        let choice = match picker.cursor {
            0 => None,
            i => picker.choices.get(i).cloned(),
        };
        match picker.kind {
            PickerKind::Tool => self.library.set_tool(choice),
            PickerKind::Category => self.library.set_category(choice),
            PickerKind::Rating => self
                .library
                .set_min_rating(picker.cursor.checked_sub(1).and_then(|i| RATING_CHOICES.get(i).copied())),
        }
        self.cursor = 0;
    }

    fn share_dialog(&mut self, payload: SharePayload) {
        self.overlay = Some(Overlay::Share(ShareDialog { payload, cursor: 0 }));
    }

    fn handle_listing_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let mut actions = Vec::new();
        match key.code {
            KeyCode::Char('q') => actions.push(Action::Quit),
            KeyCode::Char('?') => self.overlay = Some(Overlay::Help),
            KeyCode::Char('/') => self.search_input = true,
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(self.vertical_step()),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-self.vertical_step()),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1),
            KeyCode::Char('g') | KeyCode::Home => self.cursor = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.cursor = self.library.visible().len().saturating_sub(1)
            }
            KeyCode::Enter => {
                if let Some(id) = self.current_record().map(|r| r.id.clone()) {
                    if self.library.selection_mode() {
                        self.library.toggle_selection(&id);
                    } else {
                        actions.push(self.open_detail(id));
                    }
                }
            }
            KeyCode::Char('t') => self.open_picker(PickerKind::Tool),
            KeyCode::Char('c') => self.open_picker(PickerKind::Category),
            KeyCode::Char('r') => self.open_picker(PickerKind::Rating),
            KeyCode::Char('s') => {
                let next = self.library.criteria().sort.next();
                self.library.set_sort(next);
                self.set_status(format!("Sorted by {}", next.display_name()));
            }
            KeyCode::Char('f') => {
                self.library.toggle_favorites_only();
                self.cursor = 0;
            }
            KeyCode::Char('x') => {
                self.library.clear_filters();
                self.cursor = 0;
                self.set_status("Filters cleared");
            }
            KeyCode::Char('v') => self.library.toggle_view_mode(),
            KeyCode::Char('m') => {
                self.library.toggle_selection_mode();
                let message = if self.library.selection_mode() {
                    "Selection mode: Space selects, a selects all, e exports, S shares"
                } else {
                    "Selection cleared"
                };
                self.set_status(message);
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.current_record().map(|r| r.id.clone()) {
                    self.library.toggle_selection(&id);
                }
            }
            KeyCode::Char('a') if self.library.selection_mode() => self.library.select_all_or_none(),
            KeyCode::Char('e') if self.library.selection_mode() => {
                if self.library.selected_records().is_empty() {
                    self.set_status("Nothing selected");
                } else {
                    actions.push(Action::Export(self.library.export_selection()));
                }
            }
            KeyCode::Char('S') if self.library.selection_mode() => {
                if self.library.selected_records().is_empty() {
                    self.set_status("Nothing selected");
                } else {
                    let payload = SharePayload::selection(self.library.selected_records());
                    self.share_dialog(payload);
                }
            }
            KeyCode::Char('y') => {
                if self.library.selection_mode() && !self.library.selected_records().is_empty() {
                    actions.push(Action::Copy {
                        key: "selection".to_string(),
                        text: self.library.export_selection(),
                    });
                } else if let Some(record) = self.current_record() {
                    actions.push(Action::Copy {
                        key: format!("body:{}", record.id),
                        text: record.prompt_text.clone(),
                    });
                }
            }
            KeyCode::Char('F') => {
                if let Some(record) = self.current_record() {
                    actions.push(Action::ToggleFavorite(record.clone()));
                }
            }
            KeyCode::Char('n') | KeyCode::PageDown => {
                if self.page < self.total_pages {
                    actions.push(self.request_page(self.page + 1));
                }
            }
            KeyCode::Char('p') | KeyCode::PageUp => {
                if self.page > 1 {
                    actions.push(self.request_page(self.page - 1));
                }
            }
            KeyCode::Char('R') => actions.push(self.request_page(self.page)),
            _ => {}
        }
        actions
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let mut actions = Vec::new();
        let record = self.detail.detail().map(|d| d.record.clone());

        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') | KeyCode::Char('h') => {
                self.screen = Screen::Listing;
            }
            KeyCode::Char('?') => self.overlay = Some(Overlay::Help),
            KeyCode::Down | KeyCode::Char('j') => self.detail_scroll = self.detail_scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.detail_scroll = self.detail_scroll.saturating_sub(1),
            KeyCode::Char(c @ '1'..='3') => {
                let index = c as usize - '1' as usize;
                let related = self
                    .detail
                    .detail()
                    .and_then(|d| d.related.get(index))
                    .map(|r| r.id.clone());
                if let Some(id) = related {
                    actions.push(self.open_detail(id));
                }
            }
            _ => {}
        }

        let Some(record) = record else {
            return actions;
        };

        match key.code {
            KeyCode::Char('y') => actions.push(Action::Copy {
                key: format!("body:{}", record.id),
                text: record.prompt_text.clone(),
            }),
            KeyCode::Char('Y') => match record.output_text.as_deref().filter(|o| !o.is_empty()) {
                Some(output) => actions.push(Action::Copy {
                    key: format!("output:{}", record.id),
                    text: output.to_string(),
                }),
                None => self.set_status("No output to copy"),
            },
            KeyCode::Char('s') => self.share_dialog(SharePayload::single(&record)),
            KeyCode::Char('F') => actions.push(Action::ToggleFavorite(record)),
            KeyCode::Char('o') => match record.attachment_url(&self.endpoint, &self.bucket) {
                Some(url) if record.has_image_attachment() => {
                    self.overlay = Some(Overlay::Lightbox {
                        filename: record.attachment_filename.clone().unwrap_or_default(),
                        url,
                    });
                }
                Some(url) => actions.push(Action::OpenUrl(url)),
                None => self.set_status("No attachment"),
            },
            _ => {}
        }
        actions
    }

    fn handle_overlay_key(&mut self, overlay: Overlay, key: KeyEvent) -> Vec<Action> {
        match overlay {
            // Any key closes help
            Overlay::Help => Vec::new(),
            Overlay::Picker(mut picker) => {
                match key.code {
                    KeyCode::Esc => {}
                    KeyCode::Enter => self.apply_picker(&picker),
                    KeyCode::Down | KeyCode::Char('j') => {
                        picker.cursor = (picker.cursor + 1).min(picker.choices.len().saturating_sub(1));
                        self.overlay = Some(Overlay::Picker(picker));
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        picker.cursor = picker.cursor.saturating_sub(1);
                        self.overlay = Some(Overlay::Picker(picker));
                    }
                    _ => self.overlay = Some(Overlay::Picker(picker)),
                }
                Vec::new()
            }
            Overlay::Share(mut dialog) => match key.code {
                KeyCode::Esc => Vec::new(),
                KeyCode::Enter => vec![Action::Share {
                    target: dialog.target(),
                    payload: dialog.payload,
                }],
                KeyCode::Down | KeyCode::Char('j') => {
                    dialog.cursor = (dialog.cursor + 1).min(ShareTarget::ALL.len() - 1);
                    self.overlay = Some(Overlay::Share(dialog));
                    Vec::new()
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    dialog.cursor = dialog.cursor.saturating_sub(1);
                    self.overlay = Some(Overlay::Share(dialog));
                    Vec::new()
                }
                _ => {
                    self.overlay = Some(Overlay::Share(dialog));
                    Vec::new()
                }
            },
            Overlay::Lightbox { filename, url } => match key.code {
                KeyCode::Enter | KeyCode::Char('o') => vec![Action::OpenUrl(url)],
                KeyCode::Esc | KeyCode::Char('q') => Vec::new(),
                _ => {
                    self.overlay = Some(Overlay::Lightbox { filename, url });
                    Vec::new()
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::PromptDetail;
    use crate::error::FetchError;
    use crate::model::Tool;
    use crate::store::PromptPage;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    fn record(id: &str, title: &str, tool: &str) -> PromptRecord {
        let mut r = PromptRecord::new(id, title);
        r.prompt_text = format!("body of {}", title);
        r.tool = Some(Tool {
            id: None,
            name: tool.to_string(),
            color: None,
        });
        r
    }

    fn loaded() -> BrowserState {
        let mut state = BrowserState::new("https://abc.supabase.co", "prompt-assets");
        let action = state.request_page(1);
        let generation = match action {
            Action::FetchPage { generation, .. } => generation,
            other => panic!("unexpected {:?}", other),
        };
        state.apply(FetchMessage::Library {
            generation,
            result: Ok(LibraryData {
                page: PromptPage {
                    records: vec![
                        record("1", "Alpha", "ChatGPT"),
                        record("2", "Beta", "Claude"),
                        record("3", "Gamma", "ChatGPT"),
                    ],
                    page: 1,
                    total_count: 45,
                },
                tools: Vec::new(),
                categories: Vec::new(),
            }),
        });
        state
    }

    #[test]
    fn test_library_response_populates_state() {
        let state = loaded();
        assert!(!state.loading);
        assert_eq!(state.library.visible().len(), 3);
        assert_eq!(state.total_pages, 3);
        assert_eq!(state.options.tools, vec!["ChatGPT", "Claude"]);
    }

    #[test]
    fn test_stale_library_response_is_discarded() {
        let mut state = loaded();
        let Action::FetchPage { generation: old, .. } = state.request_page(2) else {
            panic!("expected fetch");
        };
        let Action::FetchPage { generation: new, .. } = state.request_page(3) else {
            panic!("expected fetch");
        };

        state.apply(FetchMessage::Library {
            generation: old,
            result: Ok(LibraryData::default()),
        });
        assert_eq!(state.library.visible().len(), 3);
        assert!(state.loading);

        state.apply(FetchMessage::Library {
            generation: new,
            result: Err(FetchError::Http {
                status: 500,
                body: String::new(),
            }),
        });
        assert!(!state.loading);
        assert!(state.load_error.is_some());
        assert_eq!(state.library.visible().len(), 3);
    }

    #[test]
    fn test_search_typing_filters_live() {
        let mut state = loaded();
        state.handle_key(ch('/'));
        for c in "gam".chars() {
            state.handle_key(ch(c));
        }
        assert_eq!(state.library.visible().len(), 1);
        state.handle_key(key(KeyCode::Backspace));
        assert_eq!(state.library.criteria().search, "ga");
        state.handle_key(key(KeyCode::Enter));
        assert!(!state.search_input);
    }

    #[test]
    fn test_tool_picker_sets_filter() {
        let mut state = loaded();
        state.handle_key(ch('t'));
        state.handle_key(ch('j'));
        state.handle_key(ch('j'));
        state.handle_key(key(KeyCode::Enter));
        assert_eq!(state.library.criteria().tool.as_deref(), Some("Claude"));
        assert_eq!(state.library.visible().len(), 1);

        state.handle_key(ch('x'));
        assert!(!state.library.has_active_filters());
    }

    #[test]
    fn test_rating_picker() {
        let mut state = loaded();
        state.handle_key(ch('r'));
        for _ in 0..4 {
            state.handle_key(ch('j'));
        }
        state.handle_key(key(KeyCode::Enter));
        assert_eq!(state.library.criteria().min_rating, Some(4.0));
    }

    #[test]
    fn test_selection_flow() {
        let mut state = loaded();
        state.handle_key(ch(' '));
        assert_eq!(state.library.selected_count(), 0);

        state.handle_key(ch('m'));
        state.handle_key(ch(' '));
        assert_eq!(state.library.selected_count(), 1);
        state.handle_key(ch('a'));
        assert_eq!(state.library.selected_count(), 3);

        let actions = state.handle_key(ch('e'));
        match actions.as_slice() {
            [Action::Export(text)] => assert_eq!(text.matches("---\n\n").count(), 3),
            other => panic!("unexpected {:?}", other),
        }

        state.handle_key(ch('a'));
        assert_eq!(state.library.selected_count(), 0);
        state.handle_key(ch('S'));
        assert!(state.overlay.is_none());
    }

    #[test]
    fn test_enter_toggles_selection_in_selection_mode() {
        let mut state = loaded();
        state.handle_key(ch('m'));

        let actions = state.handle_key(key(KeyCode::Enter));
        assert!(actions.is_empty());
        assert_eq!(state.screen, Screen::Listing);
        assert_eq!(state.library.selected_count(), 1);

        state.handle_key(key(KeyCode::Enter));
        assert_eq!(state.library.selected_count(), 0);

        state.handle_key(ch('m'));
        let actions = state.handle_key(key(KeyCode::Enter));
        assert!(matches!(actions.as_slice(), [Action::LoadDetail { .. }]));
        assert_eq!(state.screen, Screen::Detail);
    }

    #[test]
    fn test_selection_hidden_by_filters_counts_as_nothing_selected() {
        let mut state = loaded();
        state.handle_key(ch('m'));
        state.handle_key(ch(' '));
        state.library.set_search("zzz-no-match");
        assert_eq!(state.library.selected_count(), 1);

        assert!(state.handle_key(ch('e')).is_empty());
        assert_eq!(
            state.status_message.as_ref().map(|(m, _)| m.as_str()),
            Some("Nothing selected")
        );
        assert!(state.handle_key(ch('y')).is_empty());
        state.handle_key(ch('S'));
        assert!(state.overlay.is_none());
    }

    #[test]
    fn test_copy_without_selection_copies_body() {
        let mut state = loaded();
        let actions = state.handle_key(ch('y'));
        assert_eq!(
            actions,
            vec![Action::Copy {
                key: "body:1".to_string(),
                text: "body of Alpha".to_string()
            }]
        );
    }

    #[test]
    fn test_detail_roundtrip_and_stale_detail() {
        let mut state = loaded();
        let first = state.handle_key(key(KeyCode::Enter));
        assert_eq!(state.screen, Screen::Detail);
        let Some(Action::LoadDetail { generation: stale, .. }) = first.into_iter().next() else {
            panic!("expected detail load");
        };

        state.handle_key(key(KeyCode::Esc));
        state.handle_key(ch('j'));
        let second = state.handle_key(key(KeyCode::Enter));
        let Some(Action::LoadDetail { id, generation }) = second.into_iter().next() else {
            panic!("expected detail load");
        };
        assert_eq!(id, "2");

        let mut stale_record = record("1", "Alpha", "ChatGPT");
        stale_record.usage_count = 99;
        state.apply(FetchMessage::Detail {
            generation: stale,
            state: DetailState::Loaded(Box::new(PromptDetail {
                record: stale_record,
                related: Vec::new(),
            })),
        });
        assert!(matches!(state.detail, DetailState::Loading));

        state.apply(FetchMessage::Detail {
            generation,
            state: DetailState::NotFound,
        });
        assert!(matches!(state.detail, DetailState::NotFound));
    }

    #[test]
    fn test_share_dialog_from_detail() {
        let mut state = loaded();
        let Some(Action::LoadDetail { generation, .. }) =
            state.handle_key(key(KeyCode::Enter)).into_iter().next()
        else {
            panic!("expected detail load");
        };
        state.apply(FetchMessage::Detail {
            generation,
            state: DetailState::Loaded(Box::new(PromptDetail {
                record: record("1", "Alpha", "ChatGPT"),
                related: Vec::new(),
            })),
        });

        state.handle_key(ch('s'));
        state.handle_key(ch('j'));
        let actions = state.handle_key(key(KeyCode::Enter));
        match actions.as_slice() {
            [Action::Share { target, payload }] => {
                assert_eq!(*target, ShareTarget::WhatsApp);
                assert_eq!(payload.subject, "Prompt Share: Alpha");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(state.overlay.is_none());
    }

    #[test]
    fn test_favorite_applied_only_on_success() {
        let mut state = loaded();
        state.apply(FetchMessage::Favorite {
            id: "2".to_string(),
            result: Err("503".to_string()),
        });
        assert!(!state.library.find("2").unwrap().is_favorite);

        state.apply(FetchMessage::Favorite {
            id: "2".to_string(),
            result: Ok(true),
        });
        assert!(state.library.find("2").unwrap().is_favorite);
    }

    #[test]
    fn test_status_expires() {
        let mut state = loaded();
        state.set_status("hello");
        let now = Instant::now();
        state.expire_status(now);
        assert!(state.status_message.is_some());
        state.expire_status(now + STATUS_DURATION);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn test_grid_moves_by_row() {
        let mut state = loaded();
        state.grid_columns = 2;
        state.handle_key(ch('j'));
        assert_eq!(state.cursor, 2);
        state.handle_key(ch('j'));
        assert_eq!(state.cursor, 2);
        state.handle_key(ch('h'));
        assert_eq!(state.cursor, 1);
    }
}
