//! User-facing error messages with suggestions
//!
//! Unknown tool or category names get a "did you mean" list built by fuzzy
//! matching against the names the catalog actually has.

use colored::*;
use fuzzy_matcher::{skim::SkimMatcherV2, FuzzyMatcher};

use crate::error::FetchError;

/// Best fuzzy matches for `query` among `candidates`, highest score first
pub fn suggestions<'a>(query: &str, candidates: &'a [String], limit: usize) -> Vec<&'a str> {
    let matcher = SkimMatcherV2::default().ignore_case();
    let mut scored: Vec<(&str, i64)> = candidates
        .iter()
        .filter_map(|c| matcher.fuzzy_match(c, query).map(|score| (c.as_str(), score)))
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().take(limit).map(|(c, _)| c).collect()
}

/// Exact name, matched case-insensitively. Filters compare display names
/// exactly, so CLI input is normalized to the catalog's spelling first.
pub fn resolve_name<'a>(query: &str, candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .find(|c| c.eq_ignore_ascii_case(query))
        .map(String::as_str)
}

/// `kind` is "tool" or "category"; `list_command` lists the valid names
pub fn format_unknown_name(kind: &str, name: &str, available: &[String], list_command: &str) -> String {
    let mut message = format!("Error: Unknown {} '{}'\n\n", kind, name).red().to_string();

    let similar = suggestions(name, available, 3);
    if !similar.is_empty() {
        message.push_str(&"Did you mean one of these?\n".yellow().to_string());
        for candidate in similar {
            message.push_str(&format!("  - {}\n", candidate));
        }
        message.push('\n');
    }

    message.push_str(&format!(
        "Try '{}' to see every {}.\n",
        list_command.cyan(),
        kind
    ));
    message
}

pub fn format_prompt_not_found(id: &str) -> String {
    let mut message = format!("Error: Prompt '{}' not found\n\n", id).red().to_string();
    message.push_str(&format!(
        "Prompt ids are listed in the first column of '{}'.\n",
        "plib ls --table".cyan()
    ));
    message
}

/// Explain a fetch failure, with next steps for configuration problems
pub fn format_fetch_error(error: &FetchError) -> String {
    let mut message = format!("Error: {}\n", error).red().to_string();

    match error {
        FetchError::NotFound { id } => return format_prompt_not_found(id),
        FetchError::Config(_) => {
            message.push_str("\nSet the connection in the environment or a .env file:\n");
            message.push_str(&format!("  {}\n", "PROMPT_LIBRARY_URL=https://<project>.supabase.co".cyan()));
            message.push_str(&format!("  {}\n", "PROMPT_LIBRARY_ANON_KEY=<anon key>".cyan()));
            message.push_str(&format!("Or edit the file shown by '{}'.\n", "plib config path".cyan()));
        }
        FetchError::Http { status, .. } if *status == 401 || *status == 403 => {
            message.push_str(&format!(
                "\nThe anon key was rejected. Check it with '{}'.\n",
                "plib config show".cyan()
            ));
        }
        FetchError::Transport(_) => {
            message.push_str("\nCheck your network connection and the endpoint URL.\n");
        }
        _ => {}
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["ChatGPT".into(), "Claude".into(), "Midjourney".into()]
    }

    #[test]
    fn test_suggestions_rank_close_names() {
        let names = names();
        let found = suggestions("midjrny", &names, 3);
        assert_eq!(found.first(), Some(&"Midjourney"));
        assert!(suggestions("zzzz", &names, 3).is_empty());
    }

    #[test]
    fn test_resolve_name_ignores_case() {
        let names = names();
        assert_eq!(resolve_name("chatgpt", &names), Some("ChatGPT"));
        assert_eq!(resolve_name("chat", &names), None);
    }

    #[test]
    fn test_unknown_name_message() {
        colored::control::set_override(false);
        let message = format_unknown_name("tool", "Claud", &names(), "plib tools");
        assert!(message.contains("Unknown tool 'Claud'"));
        assert!(message.contains("  - Claude"));
        assert!(message.contains("plib tools"));
    }

    #[test]
    fn test_config_error_has_next_steps() {
        colored::control::set_override(false);
        let message = format_fetch_error(&FetchError::Config("endpoint not set".into()));
        assert!(message.contains("PROMPT_LIBRARY_URL"));
    }
}
