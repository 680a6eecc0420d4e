//! Command-line interface definitions and parsing

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use prompt_library::library::{FilterCriteria, SortKey};
use prompt_library::model::MAX_RATING;
use prompt_library::share::ShareTarget;

#[derive(Parser)]
#[command(name = "plib")]
#[command(version)]
#[command(about = "Browse, filter, copy and share prompts from a hosted prompt library")]
#[command(after_help = "COMMANDS BY CATEGORY:

BROWSING:
  ls, l, list     List a page of prompts with filters
  show, s         Show one prompt with related prompts
  tools           List AI tools
  categories      List categories
  tui, t          Interactive browser (default on a terminal)

ACTIONS:
  copy, c         Copy prompt text to the clipboard
  share           Share by clipboard, WhatsApp or email
  export, x       Export prompts to a text file
  favorite, fav   Toggle the favorite flag
  open            Open a prompt's attachment

SYSTEM:
  config          Show effective settings or the config file path

EXAMPLES:
  plib ls --tool ChatGPT --rating 4       # Well-rated ChatGPT prompts
  plib ls --search logo --sort title      # Search, sorted A-Z
  plib share 42 --via whatsapp --open     # Open a WhatsApp share link
  plib export --favorites                 # Export favorites on page 1

Run 'plib COMMAND --help' for more information on a command.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Listing filters shared by `ls` and `export`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive text matched against title, model and tags
    #[arg(short = 's', long = "search", value_name = "QUERY")]
    pub search: Option<String>,
    /// Only prompts for this AI tool
    #[arg(long = "tool", value_name = "NAME")]
    pub tool: Option<String>,
    /// Only prompts in this category
    #[arg(long = "category", value_name = "NAME")]
    pub category: Option<String>,
    /// Minimum rating, 0 to 5
    #[arg(short = 'r', long = "rating", value_name = "N", value_parser = parse_rating)]
    pub rating: Option<f64>,
    /// Sort order: newest, oldest, title, z-a, highest, lowest
    #[arg(long = "sort", value_name = "KEY", default_value = "newest")]
    pub sort: SortKey,
    /// Only favorites
    #[arg(long = "favorites")]
    pub favorites: bool,
    /// Page of the listing to fetch (20 per page)
    #[arg(short = 'p', long = "page", default_value_t = 1)]
    pub page: u32,
}

impl FilterArgs {
    /// Criteria with tool and category names as given; callers resolve
    /// spelling against the catalog first
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search: self.search.clone().unwrap_or_default(),
            tool: self.tool.clone(),
            category: self.category.clone(),
            min_rating: self.rating,
            sort: self.sort,
            favorites_only: self.favorites,
        }
    }
}

fn parse_rating(s: &str) -> Result<f64, String> {
    let rating: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if (0.0..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(format!("rating must be between 0 and {}", MAX_RATING))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    // === BROWSING ===
    /// List a page of prompts
    #[command(alias = "l", alias = "list")]
    Ls {
        #[command(flatten)]
        filters: FilterArgs,
        /// Table rows instead of cards
        #[arg(long = "table", conflicts_with = "grid")]
        table: bool,
        /// Card grid (default)
        #[arg(long = "grid")]
        grid: bool,
    },
    /// Show one prompt with related prompts
    #[command(alias = "s")]
    Show {
        /// Prompt id
        id: String,
        /// Don't count this as a view
        #[arg(long = "no-track")]
        no_track: bool,
    },
    /// List AI tools
    Tools,
    /// List categories
    Categories,
    /// Interactive browser
    #[command(alias = "t")]
    Tui {
        /// Initial search query
        search: Option<String>,
    },

    // === ACTIONS ===
    /// Copy prompt text; several ids copy an export document
    #[command(alias = "c")]
    Copy {
        /// Prompt ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Share one or more prompts
    Share {
        /// Prompt ids
        #[arg(required = true)]
        ids: Vec<String>,
        /// clipboard, whatsapp or email
        #[arg(long = "via", default_value = "clipboard")]
        via: ShareTarget,
        /// Open the share link in the default handler
        #[arg(long = "open")]
        open: bool,
    },
    /// Export prompts to a text file
    #[command(alias = "x")]
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Export only these ids (still in listing order)
        #[arg(long = "ids", value_delimiter = ',', num_args = 1..)]
        ids: Vec<String>,
        /// Output path (default: selected-prompts-<date>.txt)
        #[arg(short = 'o', long = "output", value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Toggle the favorite flag
    #[command(alias = "fav")]
    Favorite {
        /// Prompt id
        id: String,
    },
    /// Open a prompt's attachment in the browser
    Open {
        /// Prompt id
        id: String,
    },

    // === SYSTEM ===
    /// Show settings
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Effective settings, with the key masked
    Show,
    /// Location of the config file
    Path,
}
