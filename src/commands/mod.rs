pub mod actions;
pub mod browse;
pub mod common;
pub mod configuration;
pub mod detail;

pub use actions::{handle_copy, handle_export, handle_share};
pub use browse::{handle_categories, handle_ls, handle_tools};
pub use common::Reported;
pub use configuration::handle_config;
pub use detail::{handle_favorite, handle_open, handle_show};
