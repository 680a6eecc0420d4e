//! Plain-text renditions of prompts for export, copy and share
//!
//! The export block layout is shared with files people already have on disk,
//! so field order and the `---` separator must not change.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::model::PromptRecord;

pub const NOT_SPECIFIED: &str = "Not specified";
pub const BLOCK_SEPARATOR: &str = "---\n\n";

fn or_not_specified(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NOT_SPECIFIED)
}

fn tool_field(record: &PromptRecord) -> &str {
    record.tool_name()
}

fn category_field(record: &PromptRecord) -> &str {
    record.category_name()
}

fn status_field(record: &PromptRecord) -> &str {
    or_not_specified(record.output_status.as_ref().map(|s| s.label()))
}

/// `4`, `4.5`, or `N/A` for unrated and zero
pub fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(r) if r != 0.0 => format!("{}", r),
        _ => "N/A".to_string(),
    }
}

/// `M/D/YYYY` in local time
pub fn numeric_date(at: Option<DateTime<Utc>>) -> String {
    at.map(|dt| dt.with_timezone(&Local).format("%-m/%-d/%Y").to_string())
        .unwrap_or_default()
}

/// The header, body and stats of one prompt, without a trailing separator
pub fn share_text(record: &PromptRecord) -> String {
    format!(
        "Title: {}\nTool: {}\nModel: {}\nCategory: {}\nOutput Status: {}\n\nContent:\n{}\n\nRating: {}/5\nUsage: {} times\nCreated: {}",
        record.title,
        tool_field(record),
        or_not_specified(record.model()),
        category_field(record),
        status_field(record),
        record.prompt_text,
        format_rating(record.rating),
        record.usage_count,
        numeric_date(record.created_at),
    )
}

/// One export block: the share text followed by a blank line and separator
pub fn export_block(record: &PromptRecord) -> String {
    format!("{}\n\n{}", share_text(record), BLOCK_SEPARATOR)
}

/// Concatenated export blocks, in the order given
pub fn export_text<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a PromptRecord>,
{
    records.into_iter().map(export_block).collect()
}

/// Block layout used by the multi-prompt share dialog
pub fn share_dialog_block(record: &PromptRecord) -> String {
    let rating = record.rating.map(|r| format!("{}", r)).unwrap_or_default();
    format!(
        "Title: {}\nTool: {}\nModel: {}\nCategory: {}\nOutput Status: {}\nContent:\n{}\n\nRating: {}\nUsage: {}\nCreated: {}\n\n{}",
        record.title,
        tool_field(record),
        or_not_specified(record.model()),
        category_field(record),
        status_field(record),
        record.prompt_text,
        rating,
        record.usage_count,
        numeric_date(record.created_at),
        BLOCK_SEPARATOR,
    )
}

pub fn share_dialog_text<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a PromptRecord>,
{
    records.into_iter().map(share_dialog_block).collect()
}

/// `selected-prompts-YYYY-MM-DD.txt`
pub fn default_export_filename(date: NaiveDate) -> String {
    format!("selected-prompts-{}.txt", date.format("%Y-%m-%d"))
}

/// Write an export document, defaulting to today's file name in `dir`
pub fn write_export(content: &str, output: Option<&Path>, dir: &Path) -> Result<PathBuf> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => dir.join(default_export_filename(Local::now().date_naive())),
    };

    fs::write(&path, content)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;

    Ok(path)
}
