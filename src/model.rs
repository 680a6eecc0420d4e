//! Prompt records and reference lists as they come back from the database
//!
//! Rows are decoded leniently: the hosted catalog has been edited by hand over
//! time, so ids may be numbers, tags may be strings, and ratings may drift out
//! of range. Every oddity decodes to its zero value instead of failing the
//! whole page.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const UNKNOWN_TOOL: &str = "Unknown Tool";
pub const DEFAULT_TOOL_COLOR: &str = "#6B7280";
pub const UNCATEGORIZED: &str = "Uncategorized";
pub const MAX_RATING: f64 = 5.0;

static IMAGE_ATTACHMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp)$").expect("valid image regex"));

/// An AI tool (ChatGPT, Midjourney, ...) a prompt was written for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, rename = "color_hex")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, rename = "color_hex")]
    pub color: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptType {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// How well a prompt's output turned out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Successful,
    SoSo,
    Failure,
    Other,
}

/// Output status label. The set is open; unknown labels keep their text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OutputStatus(String);

impl OutputStatus {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> StatusKind {
        match self.0.to_lowercase().as_str() {
            "successful" => StatusKind::Successful,
            "so-so" => StatusKind::SoSo,
            "failure" => StatusKind::Failure,
            _ => StatusKind::Other,
        }
    }
}

impl std::fmt::Display for OutputStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single prompt with its joined tool, category and type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt_text: String,
    #[serde(default)]
    pub output_text: Option<String>,
    #[serde(default, deserialize_with = "deserialize_rating")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage_count: u64,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_status")]
    pub output_status: Option<OutputStatus>,
    #[serde(default, deserialize_with = "deserialize_label")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "deserialize_label")]
    pub ai_tool_model: Option<String>,
    #[serde(default, deserialize_with = "deserialize_label")]
    pub attachment_filename: Option<String>,
    #[serde(default)]
    pub credits_used: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_favorite: bool,
    #[serde(default, rename = "ai_tools")]
    pub tool: Option<Tool>,
    #[serde(default, rename = "categories")]
    pub category: Option<Category>,
    #[serde(default, rename = "prompt_types")]
    pub prompt_type: Option<PromptType>,
}

impl PromptRecord {
    /// A bare record with every optional field unset
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            prompt_text: String::new(),
            output_text: None,
            rating: None,
            usage_count: 0,
            created_at: None,
            updated_at: None,
            tags: Vec::new(),
            output_status: None,
            version: None,
            ai_tool_model: None,
            attachment_filename: None,
            credits_used: None,
            is_favorite: false,
            tool: None,
            category: None,
            prompt_type: None,
        }
    }

    /// Tool display name, `Unknown Tool` when the join is missing
    pub fn tool_name(&self) -> &str {
        self.tool
            .as_ref()
            .map(|t| t.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_TOOL)
    }

    pub fn tool_color(&self) -> &str {
        self.tool
            .as_ref()
            .and_then(|t| t.color.as_deref())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_TOOL_COLOR)
    }

    /// Category display name, `Uncategorized` when the join is missing
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(UNCATEGORIZED)
    }

    pub fn type_name(&self) -> Option<&str> {
        self.prompt_type
            .as_ref()
            .map(|t| t.name.as_str())
            .filter(|n| !n.is_empty())
    }

    /// Rating with absent treated as zero
    pub fn rating_value(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    /// Creation time with absent treated as the Unix epoch
    pub fn created_or_epoch(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn model(&self) -> Option<&str> {
        self.ai_tool_model.as_deref().filter(|m| !m.is_empty())
    }

    /// Version label with a leading `v`
    pub fn version_label(&self) -> Option<String> {
        self.version.as_deref().map(|v| {
            if v.starts_with('v') {
                v.to_string()
            } else {
                format!("v{}", v)
            }
        })
    }

    pub fn has_image_attachment(&self) -> bool {
        self.attachment_filename
            .as_deref()
            .map(|f| IMAGE_ATTACHMENT.is_match(f))
            .unwrap_or(false)
    }

    /// Public URL for the attachment, if any
    pub fn attachment_url(&self, endpoint: &str, bucket: &str) -> Option<String> {
        let filename = self.attachment_filename.as_deref()?;
        if filename.starts_with("http") {
            return Some(filename.to_string());
        }
        Some(format!(
            "{}/storage/v1/object/public/{}/{}",
            endpoint.trim_end_matches('/'),
            bucket,
            filename
        ))
    }

    /// First `max_chars` characters of the body, with `...` when cut
    pub fn excerpt(&self, max_chars: usize) -> String {
        if self.prompt_text.chars().count() > max_chars {
            let cut: String = self.prompt_text.chars().take(max_chars).collect();
            format!("{}...", cut)
        } else {
            self.prompt_text.clone()
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn value_to_label(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;
    value_to_label(value).ok_or_else(|| Error::custom("Expected string or number for id"))
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    Ok(value_to_label(value))
}

fn deserialize_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    Ok(value_to_label(value))
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<OutputStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_label(deserializer)?.map(OutputStatus))
}

fn deserialize_rating<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    let rating = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(rating.filter(|r| r.is_finite()).map(|r| {
        if !(0.0..=MAX_RATING).contains(&r) {
            tracing::warn!(rating = r, "Rating out of range, clamping");
        }
        r.clamp(0.0, MAX_RATING)
    }))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => parse_timestamp(&s),
        _ => None,
    })
}

/// Parse an RFC 3339 timestamp, or a naive one taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return Some(dt);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;

    Ok(match value {
        Value::Array(arr) => arr
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) => {
            // Legacy rows store a JSON string or a comma-separated list
            if s.starts_with('[') && s.ends_with(']') {
                serde_json::from_str(&s).unwrap_or_default()
            } else {
                s.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            }
        }
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_row() {
        let row = json!({
            "id": 17,
            "title": "Logo brief",
            "prompt_text": "Design a logo",
            "rating": 4.5,
            "usage_count": 12,
            "created_at": "2024-03-01T12:00:00.123456+00:00",
            "tags": ["design", "brand"],
            "output_status": "Successful",
            "version": 2,
            "ai_tool_model": "gpt-4o",
            "attachment_filename": "logo.PNG",
            "credits_used": 3,
            "is_favorite": true,
            "ai_tools": {"id": 1, "name": "ChatGPT", "color_hex": "#10A37F"},
            "categories": {"id": 2, "name": "Images", "image_url": null, "color_hex": null},
            "prompt_types": {"id": 3, "name": "Instruction"}
        });

        let record: PromptRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.id, "17");
        assert_eq!(record.rating, Some(4.5));
        assert_eq!(record.tags, vec!["design", "brand"]);
        assert_eq!(record.output_status.as_ref().unwrap().kind(), StatusKind::Successful);
        assert_eq!(record.version_label().as_deref(), Some("v2"));
        assert_eq!(record.tool_name(), "ChatGPT");
        assert_eq!(record.tool_color(), "#10A37F");
        assert_eq!(record.category_name(), "Images");
        assert_eq!(record.type_name(), Some("Instruction"));
        assert!(record.has_image_attachment());
        assert!(record.is_favorite);
    }

    #[test]
    fn test_decode_sparse_row_uses_zero_values() {
        let row = json!({
            "id": "abc",
            "title": null,
            "rating": null,
            "usage_count": null,
            "tags": null,
            "ai_tools": null
        });

        let record: PromptRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.title, "");
        assert_eq!(record.rating_value(), 0.0);
        assert_eq!(record.usage_count, 0);
        assert!(record.tags.is_empty());
        assert_eq!(record.tool_name(), UNKNOWN_TOOL);
        assert_eq!(record.tool_color(), DEFAULT_TOOL_COLOR);
        assert_eq!(record.category_name(), UNCATEGORIZED);
        assert_eq!(record.created_or_epoch(), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_rating_is_clamped() {
        let high: PromptRecord = serde_json::from_value(json!({"id": "1", "rating": 7})).unwrap();
        let low: PromptRecord = serde_json::from_value(json!({"id": "2", "rating": -1})).unwrap();
        let text: PromptRecord = serde_json::from_value(json!({"id": "3", "rating": "3.5"})).unwrap();
        assert_eq!(high.rating, Some(5.0));
        assert_eq!(low.rating, Some(0.0));
        assert_eq!(text.rating, Some(3.5));
    }

    #[test]
    fn test_legacy_tag_formats() {
        let csv: PromptRecord =
            serde_json::from_value(json!({"id": "1", "tags": "seo, blog ,"})).unwrap();
        let encoded: PromptRecord =
            serde_json::from_value(json!({"id": "2", "tags": "[\"a\",\"b\"]"})).unwrap();
        let junk: PromptRecord = serde_json::from_value(json!({"id": "3", "tags": 5})).unwrap();
        assert_eq!(csv.tags, vec!["seo", "blog"]);
        assert_eq!(encoded.tags, vec!["a", "b"]);
        assert!(junk.tags.is_empty());
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        let parsed = parse_timestamp("2024-05-06T07:08:09").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-06T07:08:09+00:00");
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_empty_status_is_unset() {
        let record: PromptRecord =
            serde_json::from_value(json!({"id": "1", "output_status": ""})).unwrap();
        assert!(record.output_status.is_none());
        assert_eq!(OutputStatus::new("So-So").kind(), StatusKind::SoSo);
        assert_eq!(OutputStatus::new("meh").kind(), StatusKind::Other);
    }

    #[test]
    fn test_attachment_url_resolution() {
        let mut record = PromptRecord::new("1", "t");
        assert!(record.attachment_url("https://db.example", "prompt-assets").is_none());
        assert!(!record.has_image_attachment());

        record.attachment_filename = Some("notes.pdf".to_string());
        assert!(!record.has_image_attachment());
        assert_eq!(
            record.attachment_url("https://db.example/", "prompt-assets").unwrap(),
            "https://db.example/storage/v1/object/public/prompt-assets/notes.pdf"
        );

        record.attachment_filename = Some("https://cdn.example/a.webp".to_string());
        assert!(record.has_image_attachment());
        assert_eq!(
            record.attachment_url("https://db.example", "prompt-assets").unwrap(),
            "https://cdn.example/a.webp"
        );
    }

    #[test]
    fn test_excerpt_counts_characters() {
        let mut record = PromptRecord::new("1", "t");
        record.prompt_text = "é".repeat(130);
        let excerpt = record.excerpt(120);
        assert_eq!(excerpt.chars().count(), 123);
        assert!(excerpt.ends_with("..."));

        record.prompt_text = "short".to_string();
        assert_eq!(record.excerpt(120), "short");
    }
}
