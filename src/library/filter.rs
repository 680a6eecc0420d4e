//! Filter criteria and the derivation of the visible list

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::model::PromptRecord;

/// Listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    NewestFirst,
    OldestFirst,
    TitleAsc,
    TitleDesc,
    RatingDesc,
    RatingAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::NewestFirst,
        SortKey::OldestFirst,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
        SortKey::RatingDesc,
        SortKey::RatingAsc,
    ];

    /// Wire name, e.g. `created_at_desc`
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::NewestFirst => "created_at_desc",
            SortKey::OldestFirst => "created_at_asc",
            SortKey::TitleAsc => "title_asc",
            SortKey::TitleDesc => "title_desc",
            SortKey::RatingDesc => "rating_desc",
            SortKey::RatingAsc => "rating_asc",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortKey::NewestFirst => "Newest First",
            SortKey::OldestFirst => "Oldest First",
            SortKey::TitleAsc => "Title A-Z",
            SortKey::TitleDesc => "Title Z-A",
            SortKey::RatingDesc => "Highest Rated",
            SortKey::RatingAsc => "Lowest Rated",
        }
    }

    /// Next key in menu order, wrapping around
    pub fn next(&self) -> SortKey {
        let idx = Self::ALL.iter().position(|k| k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn compare(&self, a: &PromptRecord, b: &PromptRecord) -> Ordering {
        match self {
            SortKey::NewestFirst => b
                .created_or_epoch()
                .cmp(&a.created_or_epoch())
                .then_with(|| a.id.cmp(&b.id)),
            SortKey::OldestFirst => a
                .created_or_epoch()
                .cmp(&b.created_or_epoch())
                .then_with(|| b.id.cmp(&a.id)),
            SortKey::TitleAsc => compare_titles(&a.title, &b.title),
            SortKey::TitleDesc => compare_titles(&b.title, &a.title),
            SortKey::RatingDesc => b.rating_value().total_cmp(&a.rating_value()),
            SortKey::RatingAsc => a.rating_value().total_cmp(&b.rating_value()),
        }
    }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created_at_desc" | "newest" => Ok(SortKey::NewestFirst),
            "created_at_asc" | "oldest" => Ok(SortKey::OldestFirst),
            "title_asc" | "title" | "a-z" => Ok(SortKey::TitleAsc),
            "title_desc" | "z-a" => Ok(SortKey::TitleDesc),
            "rating_desc" | "top" | "highest" => Ok(SortKey::RatingDesc),
            "rating_asc" | "lowest" => Ok(SortKey::RatingAsc),
            other => Err(format!(
                "unknown sort key '{}' (expected one of: {})",
                other,
                Self::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// Everything the listing can be narrowed by
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterCriteria {
    pub search: String,
    pub tool: Option<String>,
    pub category: Option<String>,
    pub min_rating: Option<f64>,
    pub sort: SortKey,
    pub favorites_only: bool,
}

impl FilterCriteria {
    /// True when any narrowing filter is set. Sort order and favorites-only do
    /// not count, matching when the "clear filters" action is offered.
    pub fn has_active_filters(&self) -> bool {
        !self.search.is_empty()
            || self.tool.is_some()
            || self.category.is_some()
            || self.min_rating.is_some()
    }

    /// Whether a single record passes every active filter
    pub fn matches(&self, record: &PromptRecord) -> bool {
        if !self.search.is_empty() && !matches_query(record, &self.search.to_lowercase()) {
            return false;
        }

        if let Some(ref tool) = self.tool {
            if record.tool_name() != tool {
                return false;
            }
        }

        if let Some(ref category) = self.category {
            if record.category_name() != category {
                return false;
            }
        }

        if let Some(threshold) = self.min_rating {
            if record.rating_value() < threshold {
                return false;
            }
        }

        if self.favorites_only && !record.is_favorite {
            return false;
        }

        true
    }

    /// Filter then sort, producing a new list. The input is left untouched.
    pub fn derive(&self, records: &[PromptRecord]) -> Vec<PromptRecord> {
        let mut visible: Vec<PromptRecord> = records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect();

        // sort_by is stable, so title and rating ties keep fetch order
        visible.sort_by(|a, b| self.sort.compare(a, b));
        visible
    }
}

/// `query` must already be lowercased
fn matches_query(record: &PromptRecord, query: &str) -> bool {
    record.title.to_lowercase().contains(query)
        || record
            .ai_tool_model
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
            .contains(query)
        || record.tags.iter().any(|tag| tag.to_lowercase().contains(query))
}
