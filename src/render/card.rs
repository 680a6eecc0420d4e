//! Grid cards

use crate::library::LibraryState;
use crate::model::PromptRecord;
use crate::palette::category_badge_color;

use super::{fit, rating_suffix, short_date, single_line, stars, LineStyle, StyledLine, Viewport};

/// Body characters shown on a card
pub const CARD_EXCERPT_CHARS: usize = 120;
/// Tags shown on a card
pub const CARD_TAGS: usize = 3;
const CARD_BODY_LINES: usize = 3;
const GUTTER: usize = 2;

/// Greedy word wrap, hard-splitting words longer than `width`
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() { 0 } else { 1 } + word.chars().count();
        if current.chars().count() + needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lines of one card. `selected` is `Some` only in selection mode.
pub fn card_lines(record: &PromptRecord, width: usize, selected: Option<bool>) -> Vec<StyledLine> {
    let mut lines = Vec::new();

    let checkbox = match selected {
        Some(true) => "[x] ",
        Some(false) => "[ ] ",
        None => "",
    };
    let mut badge = format!("{}● {}", checkbox, record.tool_name());
    if let Some(model) = record.model() {
        badge.push_str(&format!(" · {}", model));
    }
    let badge_style = if selected == Some(true) {
        LineStyle::Selected
    } else {
        LineStyle::Hex(record.tool_color().to_string())
    };
    lines.push(StyledLine::new(badge, badge_style));

    let mut meta = Vec::new();
    if let Some(version) = record.version_label() {
        meta.push(version);
    }
    meta.push(format!("{} uses", record.usage_count));
    if record.is_favorite {
        meta.push("♥".to_string());
    }
    lines.push(StyledLine::new(meta.join(" · "), LineStyle::Dimmed));

    lines.push(StyledLine::new(record.title.clone(), LineStyle::Heading));

    let excerpt = single_line(&record.excerpt(CARD_EXCERPT_CHARS));
    let mut body = wrap(&excerpt, width);
    body.truncate(CARD_BODY_LINES);
    body.resize(CARD_BODY_LINES, String::new());
    lines.extend(body.into_iter().map(StyledLine::plain));

    let category = record.category_name();
    lines.push(StyledLine::new(
        category,
        LineStyle::Hex(category_badge_color(category).to_string()),
    ));

    let tags: Vec<String> = record
        .tags
        .iter()
        .take(CARD_TAGS)
        .map(|t| format!("#{}", t))
        .collect();
    lines.push(StyledLine::new(tags.join(" "), LineStyle::Dimmed));

    let rating = record.rating_value();
    lines.push(StyledLine::new(
        format!("{} {}", stars(rating), rating_suffix(rating)),
        LineStyle::Rating,
    ));

    let status_line = match &record.output_status {
        Some(status) => StyledLine::new(
            format!("{} · {}", status.label(), short_date(record.created_at)),
            LineStyle::Status(status.kind()),
        ),
        None => StyledLine::new(short_date(record.created_at), LineStyle::Dimmed),
    };
    lines.push(status_line);

    lines
}

/// The visible list as rows of cards, colored and ready to print
pub fn grid_lines(state: &LibraryState, viewport: Viewport) -> Vec<String> {
    let columns = viewport.grid_columns();
    let total = usize::from(viewport.columns).max(20);
    let width = (total.saturating_sub(GUTTER * (columns - 1)) / columns).max(10);
    let rule = "─".repeat(width);

    let mut out = Vec::new();
    for row in state.visible().chunks(columns) {
        let cards: Vec<Vec<StyledLine>> = row
            .iter()
            .map(|record| {
                let selected = state
                    .selection_mode()
                    .then(|| state.is_selected(&record.id));
                card_lines(record, width, selected)
            })
            .collect();
        let height = cards.iter().map(Vec::len).max().unwrap_or(0);

        for i in 0..height {
            let cells: Vec<String> = cards
                .iter()
                .map(|card| match card.get(i) {
                    Some(line) => line.paint_padded(&fit(&line.text, width)).to_string(),
                    None => " ".repeat(width),
                })
                .collect();
            out.push(cells.join(&" ".repeat(GUTTER)).trim_end().to_string());
        }
        out.push(vec![rule.as_str(); cards.len()].join(&" ".repeat(GUTTER)));
    }
    out
}
