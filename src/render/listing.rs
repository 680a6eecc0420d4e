//! Listing header, active filter summary and empty state

use colored::Colorize;

use crate::library::{FilterCriteria, LibraryState, ViewMode};

use super::{card::grid_lines, table::table_lines, Viewport};

pub const EMPTY_TITLE: &str = "No prompts found";
pub const EMPTY_HINT: &str = "Try adjusting your search terms or filters";

/// `12 prompts · Page 1 of 3`
pub fn header_line(count: usize, page: u32, total_pages: u32) -> String {
    let noun = if count == 1 { "prompt" } else { "prompts" };
    format!("{} {} · Page {} of {}", count, noun, page.max(1), total_pages.max(1))
}

/// Human summary of the active criteria, `None` when nothing narrows the list
pub fn filter_summary(criteria: &FilterCriteria) -> Option<String> {
    let mut parts = Vec::new();
    if !criteria.search.is_empty() {
        parts.push(format!("search \"{}\"", criteria.search));
    }
    if let Some(tool) = &criteria.tool {
        parts.push(format!("tool {}", tool));
    }
    if let Some(category) = &criteria.category {
        parts.push(format!("category {}", category));
    }
    if let Some(rating) = criteria.min_rating {
        parts.push(format!("rating ≥ {}", rating));
    }
    if criteria.favorites_only {
        parts.push("favorites".to_string());
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Everything `plib ls` prints
pub fn listing_lines(state: &LibraryState, page: u32, total_pages: u32, viewport: Viewport) -> Vec<String> {
    let mut out = vec![header_line(state.visible().len(), page, total_pages)
        .bold()
        .to_string()];

    let sort = format!("Sorted by {}", state.criteria().sort.display_name());
    match filter_summary(state.criteria()) {
        Some(summary) => out.push(format!("{} · filtered by {}", sort, summary).dimmed().to_string()),
        None => out.push(sort.dimmed().to_string()),
    }
    out.push(String::new());

    if state.visible().is_empty() {
        out.push(EMPTY_TITLE.bold().to_string());
        out.push(EMPTY_HINT.dimmed().to_string());
        return out;
    }

    match state.view_mode() {
        ViewMode::Grid => out.extend(grid_lines(state, viewport)),
        ViewMode::Table => out.extend(table_lines(state, viewport)),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PromptRecord;

    #[test]
    fn test_header_line() {
        assert_eq!(header_line(12, 1, 3), "12 prompts · Page 1 of 3");
        assert_eq!(header_line(1, 2, 2), "1 prompt · Page 2 of 2");
        assert_eq!(header_line(0, 1, 0), "0 prompts · Page 1 of 1");
    }

    #[test]
    fn test_filter_summary() {
        let mut criteria = FilterCriteria::default();
        assert_eq!(filter_summary(&criteria), None);
        criteria.search = "logo".to_string();
        criteria.min_rating = Some(4.0);
        assert_eq!(
            filter_summary(&criteria).unwrap(),
            "search \"logo\", rating ≥ 4"
        );
    }

    #[test]
    fn test_empty_state() {
        colored::control::set_override(false);
        let mut state = LibraryState::new(vec![PromptRecord::new("1", "Alpha")]);
        state.set_search("zzz");
        let lines = listing_lines(&state, 1, 1, Viewport::new(100));
        assert!(lines.contains(&EMPTY_TITLE.to_string()));
        assert!(lines.contains(&EMPTY_HINT.to_string()));
    }
}
