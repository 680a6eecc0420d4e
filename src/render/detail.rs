//! Detail view

use crate::config::Config;
use crate::detail::{DetailState, PromptDetail};
use crate::model::StatusKind;
use crate::palette::category_color;

use super::{long_date, rating_suffix, stars, LineStyle, StyledLine};

pub const NOT_FOUND_TEXT: &str = "Prompt not found";

fn field(label: &str, value: impl AsRef<str>) -> StyledLine {
    StyledLine::plain(format!("{:<10} {}", format!("{}:", label), value.as_ref()))
}

fn section(title: &str) -> StyledLine {
    StyledLine::new(format!("\n{}", title), LineStyle::Heading)
}

/// Full detail of one prompt, ending with its related prompts
pub fn detail_lines(detail: &PromptDetail, config: &Config) -> Vec<StyledLine> {
    let record = &detail.record;
    let mut lines = Vec::new();

    let favorite = if record.is_favorite { " ♥" } else { "" };
    lines.push(StyledLine::new(
        format!("{}{}", record.title, favorite),
        LineStyle::Heading,
    ));
    lines.push(StyledLine::new(
        format!("● {}", record.tool_name()),
        LineStyle::Hex(record.tool_color().to_string()),
    ));
    lines.push(StyledLine::new(
        format!("Category:  {}", record.category_name()),
        LineStyle::Hex(category_color(record.category.as_ref().map(|c| c.name.as_str())).to_string()),
    ));
    if let Some(kind) = record.type_name() {
        lines.push(field("Type", kind));
    }
    if let Some(model) = record.model() {
        lines.push(field("Model", model));
    }
    if let Some(version) = record.version_label() {
        lines.push(field("Version", version));
    }
    if let Some(status) = &record.output_status {
        lines.push(StyledLine::new(
            format!("{:<10} {}", "Status:", status.label()),
            match status.kind() {
                StatusKind::Other => LineStyle::Plain,
                kind => LineStyle::Status(kind),
            },
        ));
    }

    let rating = record.rating_value();
    lines.push(StyledLine::new(
        format!("{:<10} {} {}", "Rating:", stars(rating), rating_suffix(rating)),
        LineStyle::Rating,
    ));
    lines.push(field("Usage", format!("{} times", record.usage_count)));
    if let Some(credits) = record.credits_used {
        lines.push(field("Credits", credits.to_string()));
    }
    if record.created_at.is_some() {
        lines.push(field("Created", long_date(record.created_at)));
    }
    if record.updated_at.is_some() {
        lines.push(field("Updated", long_date(record.updated_at)));
    }
    if !record.tags.is_empty() {
        let tags: Vec<String> = record.tags.iter().map(|t| format!("#{}", t)).collect();
        lines.push(StyledLine::new(
            format!("{:<10} {}", "Tags:", tags.join(" ")),
            LineStyle::Dimmed,
        ));
    }

    lines.push(section("Prompt"));
    lines.extend(record.prompt_text.lines().map(StyledLine::plain));

    if let Some(output) = record.output_text.as_deref().filter(|o| !o.is_empty()) {
        lines.push(section("Output"));
        lines.extend(output.lines().map(StyledLine::plain));
    }

    if let Some(url) = record.attachment_url(config.endpoint_or_empty(), &config.storage_bucket) {
        lines.push(section("Attachment"));
        let kind = if record.has_image_attachment() {
            "image, press o or run `plib open` to preview"
        } else {
            "file"
        };
        lines.push(StyledLine::new(
            format!(
                "{} ({})",
                record.attachment_filename.as_deref().unwrap_or_default(),
                kind
            ),
            LineStyle::Plain,
        ));
        lines.push(StyledLine::new(url, LineStyle::Dimmed));
    }

    if !detail.related.is_empty() {
        lines.push(section("Related prompts"));
        for related in &detail.related {
            lines.push(StyledLine::plain(format!(
                "  {:<6} {}  {}",
                related.id,
                related.title,
                stars(related.rating_value())
            )));
        }
    }

    lines
}

/// Lines for any detail state, including loading and failures
pub fn state_lines(state: &DetailState, config: &Config) -> Vec<StyledLine> {
    match state {
        DetailState::Loading => vec![StyledLine::new("Loading...", LineStyle::Dimmed)],
        DetailState::Loaded(detail) => detail_lines(detail, config),
        DetailState::NotFound => vec![StyledLine::new(NOT_FOUND_TEXT, LineStyle::Heading)],
        DetailState::Failed(reason) => vec![
            StyledLine::new(NOT_FOUND_TEXT, LineStyle::Heading),
            StyledLine::new(reason.clone(), LineStyle::Dimmed),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PromptRecord;

    fn detail(record: PromptRecord) -> PromptDetail {
        PromptDetail {
            record,
            related: Vec::new(),
        }
    }

    fn texts(lines: &[StyledLine]) -> Vec<String> {
        lines.iter().map(|l| l.text.clone()).collect()
    }

    fn config() -> Config {
        Config {
            endpoint: Some("https://abc.supabase.co".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_detail_shows_body_and_output() {
        let mut record = PromptRecord::new("7", "Logo ideas");
        record.prompt_text = "Line one\nLine two".to_string();
        record.output_text = Some("Result".to_string());
        record.is_favorite = true;
        record.usage_count = 4;

        let lines = texts(&detail_lines(&detail(record), &config()));
        assert_eq!(lines[0], "Logo ideas ♥");
        assert!(lines.contains(&"Line two".to_string()));
        assert!(lines.contains(&"\nOutput".to_string()));
        assert!(lines.iter().any(|l| l.ends_with("4 times")));
        assert!(!lines.contains(&"\nAttachment".to_string()));
    }

    #[test]
    fn test_attachment_url_always_shown() {
        let mut record = PromptRecord::new("7", "Doc");
        record.attachment_filename = Some("notes.pdf".to_string());
        let lines = texts(&detail_lines(&detail(record), &config()));
        assert!(lines.contains(&"notes.pdf (file)".to_string()));
        assert!(lines.contains(
            &"https://abc.supabase.co/storage/v1/object/public/prompt-assets/notes.pdf".to_string()
        ));
    }

    #[test]
    fn test_not_found_state() {
        let lines = texts(&state_lines(&DetailState::NotFound, &config()));
        assert_eq!(lines, vec![NOT_FOUND_TEXT.to_string()]);
    }

    #[test]
    fn test_related_listed() {
        let mut d = detail(PromptRecord::new("1", "Main"));
        d.related.push(PromptRecord::new("2", "Sibling"));
        let lines = texts(&detail_lines(&d, &config()));
        assert!(lines.contains(&"\nRelated prompts".to_string()));
        assert!(lines.iter().any(|l| l.contains("Sibling")));
    }
}
