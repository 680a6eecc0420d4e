//! Interactive terminal browser over the prompt catalog
//!
//! Key handling and fetched data live in [`state::BrowserState`]; this module
//! owns the terminal and carries out the [`state::Action`]s key handling
//! asks for. Fetches run as tokio tasks and report back over a channel, so
//! the UI never blocks on the network.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    widgets::TableState,
    Terminal,
};
use std::{
    io,
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::detail::{load_detail, toggle_favorite, track_view};
use crate::library::export::write_export;
use crate::model::PromptRecord;
use crate::share::{open_link, SharePayload, ShareTarget};
use crate::store::{fetch_library, PromptStore};

pub mod state;
mod ui;

use state::{Action, BrowserState, FetchMessage};

/// How long to wait for a key before checking for finished fetches
const TICK: Duration = Duration::from_millis(100);

pub struct PromptBrowser<S> {
    store: Arc<S>,
    config: Config,
    state: BrowserState,
    clipboard: Clipboard,
    runtime: Handle,
    tx: UnboundedSender<FetchMessage>,
    rx: UnboundedReceiver<FetchMessage>,
    table_state: TableState,
}

impl<S: PromptStore + 'static> PromptBrowser<S> {
    /// Must be called from within a tokio runtime
    pub fn new(store: S, config: Config) -> Result<Self> {
        let runtime = Handle::try_current().context("The browser needs a tokio runtime")?;
        let (tx, rx) = unbounded_channel();
        let state = BrowserState::new(config.endpoint_or_empty(), config.storage_bucket.clone());

        Ok(Self {
            store: Arc::new(store),
            config,
            state,
            clipboard: Clipboard::new(),
            runtime,
            tx,
            rx,
            table_state: TableState::default(),
        })
    }

    pub fn set_initial_search(&mut self, query: &str) {
        self.state.library.set_search(query);
    }

    pub fn run(mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Run app
        let res = self.run_app(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        res
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let first = self.state.request_page(1);
        self.dispatch(vec![first]);

        loop {
            while let Ok(message) = self.rx.try_recv() {
                self.state.apply(message);
            }
            self.state.expire_status(Instant::now());

            terminal.draw(|f| ui::draw(f, &mut self.state, &self.config, &mut self.table_state))?;

            if !event::poll(TICK)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let actions = self.state.handle_key(key);
                if self.dispatch(actions) {
                    return Ok(());
                }
            }
        }
    }

    /// Carry out requested actions; true when the browser should exit
    fn dispatch(&mut self, actions: Vec<Action>) -> bool {
        for action in actions {
            match action {
                Action::Quit => return true,
                Action::FetchPage { page, generation } => self.spawn_fetch_page(page, generation),
                Action::LoadDetail { id, generation } => self.spawn_load_detail(id, generation),
                Action::ToggleFavorite(record) => self.spawn_toggle_favorite(record),
                Action::Copy { key, text } => {
                    self.copy(key, &text);
                }
                Action::Share { target, payload } => self.share(target, payload),
                Action::OpenUrl(url) => self.open(&url),
                Action::Export(content) => self.export(&content),
            }
        }
        false
    }

    fn spawn_fetch_page(&self, page: u32, generation: u64) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = fetch_library(store.as_ref(), page).await;
            let _ = tx.send(FetchMessage::Library { generation, result });
        });
    }

    fn spawn_load_detail(&self, id: String, generation: u64) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let mut state = load_detail(store.as_ref(), &id).await;
            if let Some(detail) = state.detail_mut() {
                track_view(store.as_ref(), &mut detail.record).await;
            }
            let _ = tx.send(FetchMessage::Detail { generation, state });
        });
    }

    fn spawn_toggle_favorite(&self, mut record: PromptRecord) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = toggle_favorite(store.as_ref(), &mut record)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(FetchMessage::Favorite {
                id: record.id,
                result,
            });
        });
    }

    fn copy(&mut self, key: String, text: &str) -> bool {
        match self.clipboard.copy_to_clipboard(text) {
            Ok(()) => {
                self.state.copy_feedback.record(key);
                self.state.set_status("✓ Copied!");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Clipboard copy failed");
                self.state.set_status(format!("Copy failed: {}", e));
                false
            }
        }
    }

    fn share(&mut self, target: ShareTarget, payload: SharePayload) {
        match payload.link(target) {
            None => {
                self.copy("share".to_string(), &payload.text);
            }
            Some(link) => self.open(&link),
        }
    }

    fn open(&mut self, url: &str) {
        match open_link(url) {
            Ok(()) => self.state.set_status("✓ Opened in browser"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open link");
                if self.copy("link".to_string(), url) {
                    self.state.set_status("Could not open a browser; link copied");
                }
            }
        }
    }

    fn export(&mut self, content: &str) {
        let count = self.state.library.selected_records().len();
        match write_export(content, None, Path::new(".")) {
            Ok(path) => self
                .state
                .set_status(format!("✓ Exported {} prompts to {}", count, path.display())),
            Err(e) => {
                tracing::warn!(error = %e, "Export failed");
                self.state.set_status(format!("Export failed: {}", e));
            }
        }
    }
}
