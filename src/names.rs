// 🔤 Name Resolver - canonical keys for free-text geography names
//
// Names come from two sources that never agreed on spelling: the map
// geometry property bags and the metrics dataset. Both go through
// `normalize` before any comparison.
//
//   "Jammu & Kashmir" → "jammu and kashmir"
//   "Uttar   Pradesh" → "uttar pradesh"

use crate::entities::EntityType;

/// Canonical lookup key: lowercase, `&` → `and`, single spaces, trimmed.
pub fn normalize(name: &str) -> String {
    name.to_lowercase()
        .replace('&', "and")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized name plus type, so a city and a state both named "Delhi" stay apart.
pub fn composite_key(name: &str, entity_type: EntityType) -> String {
    format!("{}::{}", normalize(name), entity_type.as_str())
}

/// True when both names normalize to the same key
pub fn same_name(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
