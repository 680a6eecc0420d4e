//! Color assignments for categories, tools and output status badges

use crate::model::StatusKind;

/// Detail-view palette indexed by the category name hash
pub const CATEGORY_PALETTE: [&str; 8] = [
    "#EF4444", "#F97316", "#EAB308", "#22C55E", "#06B6D4", "#3B82F6", "#8B5CF6", "#EC4899",
];

pub const NEUTRAL: &str = "#6b7280";

/// Sum of UTF-16 code units, the same value a browser computes with `charCodeAt`
pub fn category_hash(name: &str) -> u64 {
    name.encode_utf16().map(u64::from).sum()
}

/// Deterministic palette color for a category name. Missing names map to the
/// first palette entry.
pub fn category_color(name: Option<&str>) -> &'static str {
    let hash = name.map(category_hash).unwrap_or(0);
    CATEGORY_PALETTE[(hash % CATEGORY_PALETTE.len() as u64) as usize]
}

/// Fixed badge color for the well-known category names used on cards
pub fn category_badge_color(name: &str) -> &'static str {
    match name.to_lowercase().as_str() {
        "images" => "#f59e0b",
        "writing" => "#10b981",
        "code" => "#3b82f6",
        "business" => "#8b5cf6",
        "creative" => "#ef4444",
        "analysis" => "#06b6d4",
        _ => NEUTRAL,
    }
}

/// (background, foreground) for an output status badge
pub fn status_colors(kind: StatusKind) -> (&'static str, &'static str) {
    match kind {
        StatusKind::Successful => ("#dcfce7", "#166534"),
        StatusKind::SoSo => ("#fef9c3", "#92400e"),
        StatusKind::Failure => ("#fee2e2", "#b91c1c"),
        StatusKind::Other => ("#f1f5f9", "#475569"),
    }
}

/// Parse `#rrggbb` (alpha suffix ignored) into components
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() < 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_color_is_deterministic() {
        // "Code" = 67 + 111 + 100 + 101 = 379, 379 % 8 = 3
        assert_eq!(category_hash("Code"), 379);
        assert_eq!(category_color(Some("Code")), "#22C55E");
        assert_eq!(category_color(Some("Code")), category_color(Some("Code")));
    }

    #[test]
    fn test_missing_category_uses_first_color() {
        assert_eq!(category_color(None), "#EF4444");
        assert_eq!(category_color(Some("")), "#EF4444");
    }

    #[test]
    fn test_hash_uses_utf16_units() {
        // U+1F600 is a surrogate pair: 0xD83D + 0xDE00
        assert_eq!(category_hash("😀"), 0xD83D + 0xDE00);
    }

    #[test]
    fn test_badge_colors() {
        assert_eq!(category_badge_color("Writing"), "#10b981");
        assert_eq!(category_badge_color("Gardening"), NEUTRAL);
        assert_eq!(status_colors(StatusKind::Failure).1, "#b91c1c");
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#10A37F"), Some((0x10, 0xA3, 0x7F)));
        assert_eq!(hex_to_rgb("#f9dc3bff"), Some((0xf9, 0xdc, 0x3b)));
        assert_eq!(hex_to_rgb("red"), None);
        assert_eq!(hex_to_rgb("#12"), None);
    }
}
