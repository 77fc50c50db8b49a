//! Place-category normalization.
//!
//! User input for categories is free text ("Beaches", "temple", "ALL").
//! [`normalize_category`] maps it to one of the canonical labels so that
//! filtering and storage agree on spelling. `"all"` is a sentinel meaning
//! "no category filter".

/// Canonical category labels, as stored on places.
pub const STANDARD_CATEGORIES: &[&str] = &[
    "beach",
    "mountain",
    "ancient cities",
    "religious sites",
    "engineering marvels",
    "royal residences",
    "rock art",
    "prehistoric sites",
    "sacred mountains",
    "cultural",
    "adventure",
    "nature",
];

/// Sentinel meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Normalize a free-text category to its canonical label.
///
/// Lowercases, strips a trailing "es"/"s" plural suffix and resolves common
/// synonyms. Canonical labels and the `all` sentinel pass through unchanged,
/// so the function is idempotent. Unknown inputs come back lowercased and
/// de-pluralized but unmapped. Total: never fails.
pub fn normalize_category(category: &str) -> String {
    let normalized = category.to_lowercase();

    // Already-canonical labels must not be re-stripped ("religious sites"
    // would otherwise lose its plural and stop matching anything).
    if normalized == ALL_CATEGORIES || STANDARD_CATEGORIES.contains(&normalized.as_str()) {
        return normalized;
    }

    let stripped = if let Some(s) = normalized.strip_suffix("es") {
        s
    } else if let Some(s) = normalized.strip_suffix('s') {
        s
    } else {
        &normalized
    };

    let mapped = match stripped {
        "beach" => "beach",
        "mountain" => "mountain",
        "ancient" | "ancient city" => "ancient cities",
        "religious" | "religious site" | "temple" => "religious sites",
        "engineering" => "engineering marvels",
        "royal" => "royal residences",
        "rock" => "rock art",
        "prehistoric" => "prehistoric sites",
        "sacred" => "sacred mountains",
        "cultural" | "city" => "cultural",
        "adventure" => "adventure",
        "nature" | "forest" | "waterfall" | "lake" | "island" | "sunset" => "nature",
        other => other,
    };

    mapped.to_string()
}

/// Whether the input resolves to a canonical category (or the `all` sentinel).
pub fn is_valid_category(category: &str) -> bool {
    let normalized = normalize_category(category);
    normalized == ALL_CATEGORIES || STANDARD_CATEGORIES.contains(&normalized.as_str())
}
