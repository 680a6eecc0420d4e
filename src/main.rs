use anyhow::Result;
use clap::Parser;
use colored::*;
use is_terminal::IsTerminal;
use std::env;
use std::time::Instant;

use prompt_library::error_help;
use prompt_library::{
    init_logging, log_command_execution, Config, FetchError, LogConfig, SupabaseClient,
    TerminalViewport, ViewMode, ViewportObserver,
};

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::Reported;

const COMMAND_NAMES: &[&str] = &[
    "ls", "l", "list", "show", "s", "tools", "categories", "tui", "t", "copy", "c", "share",
    "export", "x", "favorite", "fav", "open", "config", "help",
];

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the process environment is used as is
    dotenvy::dotenv().ok();

    let start = Instant::now();

    // Parse CLI with custom error handling for better suggestions
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if let clap::error::ErrorKind::InvalidSubcommand = e.kind() {
                if let Some(cmd) = env::args().nth(1) {
                    let available: Vec<String> = COMMAND_NAMES.iter().map(|c| c.to_string()).collect();
                    eprintln!(
                        "{}",
                        error_help::format_unknown_name("command", &cmd, &available, "plib --help")
                    );
                    std::process::exit(1);
                }
            }
            e.exit();
        }
    };

    // Only initialize logging if explicitly requested via env var
    if LogConfig::requested() {
        init_logging(LogConfig::from_env())?;
    }

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let config = Config::load()?;

    // If no command provided, launch the browser on a terminal, otherwise show help
    let Some(command) = cli.command else {
        if std::io::stdout().is_terminal() {
            return finish("tui", start, run_tui(config, None));
        }
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    let name = command_name(&command);
    let result = dispatch(command, config, start).await;
    finish(name, start, result)
}

/// Log the outcome and turn errors into a formatted message and exit code
fn finish(name: &str, start: Instant, result: Result<()>) -> Result<()> {
    log_command_execution(name, start.elapsed().as_millis() as u64, &result);

    if let Err(e) = result {
        eprintln!("{}", describe_error(&e));
        std::process::exit(1);
    }
    Ok(())
}

fn describe_error(error: &anyhow::Error) -> String {
    if let Some(reported) = error.downcast_ref::<Reported>() {
        return reported.0.clone();
    }
    if let Some(fetch) = error.downcast_ref::<FetchError>() {
        return error_help::format_fetch_error(fetch);
    }
    format!("Error: {:#}", error).red().to_string()
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Ls { .. } => "ls",
        Commands::Show { .. } => "show",
        Commands::Tools => "tools",
        Commands::Categories => "categories",
        Commands::Tui { .. } => "tui",
        Commands::Copy { .. } => "copy",
        Commands::Share { .. } => "share",
        Commands::Export { .. } => "export",
        Commands::Favorite { .. } => "favorite",
        Commands::Open { .. } => "open",
        Commands::Config { .. } => "config",
    }
}

async fn dispatch(command: Commands, config: Config, start: Instant) -> Result<()> {
    match command {
        Commands::Config { action } => commands::handle_config(&action, &config),
        Commands::Tui { search } => run_tui(config, search.as_deref()),
        Commands::Ls { filters, table, .. } => {
            let store = SupabaseClient::new(&config)?;
            let view_mode = if table { ViewMode::Table } else { ViewMode::Grid };
            commands::handle_ls(&store, &filters, view_mode, TerminalViewport.viewport(), start).await
        }
        Commands::Show { id, no_track } => {
            let store = SupabaseClient::new(&config)?;
            commands::handle_show(&store, &config, &id, !no_track, start).await
        }
        Commands::Tools => {
            let store = SupabaseClient::new(&config)?;
            commands::handle_tools(&store, start).await
        }
        Commands::Categories => {
            let store = SupabaseClient::new(&config)?;
            commands::handle_categories(&store, start).await
        }
        Commands::Copy { ids } => {
            let store = SupabaseClient::new(&config)?;
            commands::handle_copy(&store, &ids, start).await
        }
        Commands::Share { ids, via, open } => {
            let store = SupabaseClient::new(&config)?;
            commands::handle_share(&store, &ids, via, open || config.open_links, start).await
        }
        Commands::Export { filters, ids, output } => {
            let store = SupabaseClient::new(&config)?;
            commands::handle_export(&store, &filters, &ids, output.as_deref(), start)
                .await
                .map(|_| ())
        }
        Commands::Favorite { id } => {
            let store = SupabaseClient::new(&config)?;
            commands::handle_favorite(&store, &id, start).await
        }
        Commands::Open { id } => {
            let store = SupabaseClient::new(&config)?;
            commands::handle_open(&store, &config, &id, start).await
        }
    }
}

#[cfg(feature = "tui")]
fn run_tui(config: Config, search: Option<&str>) -> Result<()> {
    use prompt_library::tui::PromptBrowser;

    let store = SupabaseClient::new(&config)?;
    let mut browser = PromptBrowser::new(store, config)?;
    if let Some(query) = search {
        browser.set_initial_search(query);
    }
    // The browser polls the terminal synchronously while fetches run on the runtime
    tokio::task::block_in_place(|| browser.run())
}

#[cfg(not(feature = "tui"))]
fn run_tui(_config: Config, _search: Option<&str>) -> Result<()> {
    anyhow::bail!("The interactive browser is not available in this build (enable the 'tui' feature)")
}
