//! Table view rows

use colored::Colorize;

use crate::library::LibraryState;
use crate::model::PromptRecord;
use crate::palette::category_color;

use super::{fit, paint_hex, short_date, single_line, LineStyle, StyledLine, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub checkbox: Option<bool>,
    pub title: String,
    pub excerpt: String,
    pub tool: String,
    pub tool_color: String,
    pub category: String,
    pub rating: String,
    pub status: Option<StyledLine>,
    pub usage: String,
    pub date: String,
}

impl TableRow {
    pub fn new(record: &PromptRecord, viewport: Viewport, selected: Option<bool>) -> Self {
        let rating = match record.rating {
            Some(r) if r > 0.0 => format!("★ {:.1}", r),
            _ => "-".to_string(),
        };
        Self {
            checkbox: selected,
            title: record.title.clone(),
            excerpt: single_line(&record.excerpt(viewport.table_excerpt_len())),
            tool: record.tool_name().to_string(),
            tool_color: record.tool_color().to_string(),
            category: record.category_name().to_string(),
            rating,
            status: record
                .output_status
                .as_ref()
                .map(|s| StyledLine::new(s.label(), LineStyle::Status(s.kind()))),
            usage: record.usage_count.to_string(),
            date: short_date(record.created_at),
        }
    }
}

/// Widths of the fixed columns; the title takes what is left
struct Columns {
    tool: usize,
    category: usize,
    rating: usize,
    status: usize,
    usage: usize,
    date: usize,
    /// Status, usage and date are dropped on compact terminals
    compact: bool,
}

impl Columns {
    fn for_viewport(viewport: Viewport) -> Self {
        Self {
            tool: 12,
            category: 12,
            rating: 6,
            status: 10,
            usage: 6,
            date: 7,
            compact: viewport.is_compact(),
        }
    }

    fn fixed_width(&self) -> usize {
        let mut width = self.tool + self.category + self.rating + 3;
        if !self.compact {
            width += self.status + self.usage + self.date + 3;
        }
        width
    }
}

/// Header plus two lines per record (title row, excerpt), colored
pub fn table_lines(state: &LibraryState, viewport: Viewport) -> Vec<String> {
    let cols = Columns::for_viewport(viewport);
    let checkbox_width = if state.selection_mode() { 4 } else { 0 };
    let title_width = usize::from(viewport.columns)
        .saturating_sub(cols.fixed_width() + checkbox_width + 1)
        .max(12);

    let mut header = format!(
        "{}{} {} {} {}",
        " ".repeat(checkbox_width),
        fit("Title", title_width),
        fit("Tool", cols.tool),
        fit("Category", cols.category),
        fit("Rating", cols.rating),
    );
    if !cols.compact {
        header.push_str(&format!(
            " {} {} {}",
            fit("Status", cols.status),
            fit("Uses", cols.usage),
            fit("Created", cols.date)
        ));
    }

    let mut out = vec![header.trim_end().bold().to_string()];
    for record in state.visible() {
        let selected = state.selection_mode().then(|| state.is_selected(&record.id));
        let row = TableRow::new(record, viewport, selected);

        let checkbox = match row.checkbox {
            Some(true) => "[x] ",
            Some(false) => "[ ] ",
            None => "",
        };
        let mut line = format!(
            "{}{} {} {} {}",
            checkbox,
            fit(&row.title, title_width).bold(),
            paint_hex(&fit(&row.tool, cols.tool), &row.tool_color),
            paint_hex(&fit(&row.category, cols.category), category_color(Some(&row.category))),
            fit(&row.rating, cols.rating).yellow(),
        );
        if !cols.compact {
            let status = match &row.status {
                Some(status) => status.paint_padded(&fit(&status.text, cols.status)).to_string(),
                None => " ".repeat(cols.status),
            };
            line.push_str(&format!(
                " {} {} {}",
                status,
                fit(&row.usage, cols.usage),
                fit(&row.date, cols.date).dimmed()
            ));
        }
        out.push(line.trim_end().to_string());

        if !row.excerpt.is_empty() {
            out.push(format!(
                "{}{}",
                " ".repeat(checkbox_width),
                fit(&row.excerpt, title_width).dimmed()
            ));
        }
    }
    out
}
