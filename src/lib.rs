//! Prompt Library - browse, filter, copy and share prompts from a hosted catalog
//!
//! Prompts live in a Supabase project and are read through its PostgREST
//! interface. This crate fetches a page at a time, derives the visible list
//! locally (search, tool, category, rating, favorites, sort), and turns
//! selections into plain-text exports or share links.
//!
//! # Quick Start
//!
//! ```no_run
//! use prompt_library::{fetch_library, Config, LibraryState, SupabaseClient};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let client = SupabaseClient::new(&config)?;
//!
//! let data = fetch_library(&client, 1).await?;
//! let mut state = LibraryState::new(data.page.records);
//! state.set_search("logo");
//! println!("{} matching prompts", state.visible().len());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`model`]: Prompt records and their joined tool, category and type
//! - [`store`]: The [`PromptStore`] seam, paging and an in-memory store
//! - [`supabase`]: PostgREST client for the hosted catalog
//! - [`library`]: Filtering, sorting, selection and export formatting
//! - [`detail`]: Single-prompt loading, view tracking and favorites
//! - [`share`]: Clipboard, WhatsApp and email share payloads
//! - [`render`]: Cards, table rows and the detail view for the terminal
//! - [`tui`]: Interactive browser (feature-gated)

pub mod clipboard;
pub mod config;
pub mod detail;
pub mod error;
pub mod error_help;
pub mod library;
pub mod logging;
pub mod model;
pub mod palette;
pub mod render;
pub mod share;
pub mod store;
pub mod supabase;

#[cfg(feature = "tui")]
pub mod tui;

pub use clipboard::{Clipboard, CopyFeedback};
pub use config::Config;
pub use detail::{DetailState, PromptDetail};
pub use error::{FetchError, FetchResult};
pub use library::{FilterCriteria, FilterOptions, LibraryState, SortKey, ViewMode};
pub use logging::{init_logging, log_command_execution, log_fetch_operation, LogConfig};
pub use model::{Category, PromptRecord, PromptType, Tool};
pub use render::{TerminalViewport, Viewport, ViewportObserver};
pub use share::{SharePayload, ShareTarget};
pub use store::{fetch_library, LibraryData, MemoryStore, PromptPage, PromptStore, RequestGeneration};
pub use supabase::SupabaseClient;
