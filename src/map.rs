// 🧭 Map contract - geometry names in, fill styles out
//
// The polygon renderer is external. It hands us each geometry's property
// bag and asks for a fill; on hover/click it hands back the resolved name.
//
// Property bags come from untyped GeoJSON, so names hide under different
// keys depending on the source file. `NAME_PROPERTY_KEYS` is the accepted
// list, in priority order: the first key holding a non-empty string wins.

use crate::classifier::{classify, IntensityBucket};
use crate::entities::{EntityType, GeoEntity};
use crate::store::GeoEntityStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Accepted name keys, highest priority first.
/// District-level keys come before state-level keys so that a district
/// polygon carrying both resolves to the district.
pub const NAME_PROPERTY_KEYS: [&str; 8] = [
    "district", "DISTRICT", "dtname", "st_nm", "ST_NM", "NAME_1", "name", "NAME",
];

/// Highlight colors shared by every data bucket
pub const HOVER_FILL: &str = "#ffb300";
pub const PRESSED_FILL: &str = "#ff6f00";

// ============================================================================
// PROPERTY BAG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Null,
    Other(serde_json::Value),
}

impl PropertyValue {
    /// Trimmed text, if this is a non-empty string
    pub fn as_name(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text.trim()).filter(|text| !text.is_empty()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeometryProperties(BTreeMap<String, PropertyValue>);

impl GeometryProperties {
    pub fn new() -> Self {
        GeometryProperties(BTreeMap::new())
    }

    pub fn with(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn with_text(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(key, PropertyValue::Text(value.into()))
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }
}

/// First non-empty name among `NAME_PROPERTY_KEYS`, in order
pub fn resolve_geometry_name(properties: &GeometryProperties) -> Option<String> {
    NAME_PROPERTY_KEYS
        .iter()
        .filter_map(|key| properties.get(key))
        .find_map(PropertyValue::as_name)
        .map(str::to_string)
}

// ============================================================================
// STYLES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillStyle {
    pub fill: String,
    pub hover_fill: String,
    pub pressed_fill: String,
    pub bucket: IntensityBucket,
    pub interactive: bool,
}

impl FillStyle {
    pub fn for_bucket(bucket: IntensityBucket) -> Self {
        let fill = bucket.color().to_string();

        if bucket.has_data() {
            FillStyle {
                fill,
                hover_fill: HOVER_FILL.to_string(),
                pressed_fill: PRESSED_FILL.to_string(),
                bucket,
                interactive: true,
            }
        } else {
            FillStyle {
                hover_fill: fill.clone(),
                pressed_fill: fill.clone(),
                fill,
                bucket,
                interactive: false,
            }
        }
    }

    pub fn no_data() -> Self {
        FillStyle::for_bucket(IntensityBucket::NoData)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryStyle {
    pub name: Option<String>,
    pub style: FillStyle,
}

/// Styles geometries against one dataset (normally the active view)
#[derive(Debug, Clone)]
pub struct MapStyler {
    store: Arc<GeoEntityStore>,
}

impl MapStyler {
    pub fn new(dataset: &[GeoEntity]) -> Self {
        MapStyler {
            store: Arc::new(GeoEntityStore::build(dataset)),
        }
    }

    pub fn from_store(store: Arc<GeoEntityStore>) -> Self {
        MapStyler { store }
    }

    pub fn bucket_for(&self, name: &str, type_hint: Option<EntityType>) -> IntensityBucket {
        classify(
            self.store
                .lookup(name, type_hint)
                .map(|entity| entity.intensity),
        )
    }

    pub fn style_for(&self, name: &str, type_hint: Option<EntityType>) -> FillStyle {
        FillStyle::for_bucket(self.bucket_for(name, type_hint))
    }

    /// Resolve the name from the property bag, then style it.
    /// Nameless geometries get the no-data style and stay non-interactive.
    pub fn style_geometry(
        &self,
        properties: &GeometryProperties,
        type_hint: Option<EntityType>,
    ) -> GeometryStyle {
        match resolve_geometry_name(properties) {
            Some(name) => GeometryStyle {
                style: self.style_for(&name, type_hint),
                name: Some(name),
            },
            None => GeometryStyle {
                name: None,
                style: FillStyle::no_data(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dataset() -> Vec<GeoEntity> {
        vec![
            GeoEntity::new("Karnataka", EntityType::State).with_metrics(10.0, 1, 85.0),
            GeoEntity::new("Mysuru", EntityType::District)
                .with_parent("Karnataka")
                .with_metrics(3.0, 1, 25.0),
        ]
    }

    #[test]
    fn test_first_present_key_wins() {
        let properties = GeometryProperties::new()
            .with_text("NAME", "Fallback")
            .with_text("st_nm", "Karnataka")
            .with_text("district", "Mysuru");

        assert_eq!(resolve_geometry_name(&properties), Some("Mysuru".to_string()));
    }

    #[test]
    fn test_empty_and_non_text_values_are_skipped() {
        let properties = GeometryProperties::new()
            .with_text("district", "   ")
            .with("dtname", PropertyValue::Null)
            .with("st_nm", PropertyValue::Number(29.0))
            .with_text("NAME_1", " Karnataka ");

        assert_eq!(resolve_geometry_name(&properties), Some("Karnataka".to_string()));
    }

    #[test]
    fn test_unknown_keys_resolve_to_none() {
        let properties = GeometryProperties::new().with_text("title", "Karnataka");
        assert_eq!(resolve_geometry_name(&properties), None);
        assert_eq!(resolve_geometry_name(&GeometryProperties::new()), None);
    }

    #[test]
    fn test_property_bag_from_geojson() {
        let properties: GeometryProperties = serde_json::from_str(
            r#"{"ST_NM": "Karnataka", "id": 7, "extra": {"nested": true}, "name": null}"#,
        )
        .unwrap();

        assert_eq!(resolve_geometry_name(&properties), Some("Karnataka".to_string()));
        assert_eq!(properties.get("id"), Some(&PropertyValue::Number(7.0)));
    }

    #[test]
    fn test_style_for_known_entity() {
        let styler = MapStyler::new(&dataset());
        let style = styler.style_for("karnataka", Some(EntityType::State));

        assert_eq!(style.bucket, IntensityBucket::Highest);
        assert_eq!(style.fill, IntensityBucket::Highest.color());
        assert_eq!(style.hover_fill, HOVER_FILL);
        assert_eq!(style.pressed_fill, PRESSED_FILL);
        assert!(style.interactive);
    }

    #[test]
    fn test_style_for_unknown_name_is_no_data() {
        let styler = MapStyler::new(&dataset());
        let style = styler.style_for("Atlantis", None);

        assert_eq!(style, FillStyle::no_data());
        assert_eq!(style.hover_fill, style.fill);
        assert!(!style.interactive);
    }

    #[test]
    fn test_nameless_geometry_is_no_data() {
        let styler = MapStyler::new(&dataset());
        let styled = styler.style_geometry(&GeometryProperties::new(), None);

        assert_eq!(styled.name, None);
        assert_eq!(styled.style.bucket, IntensityBucket::NoData);
    }

    #[test]
    fn test_style_geometry_resolves_then_classifies() {
        let styler = MapStyler::new(&dataset());
        let properties = GeometryProperties::new().with_text("dtname", "MYSURU");
        let styled = styler.style_geometry(&properties, None);

        assert_eq!(styled.name, Some("MYSURU".to_string()));
        assert_eq!(styled.style.bucket, IntensityBucket::Medium);
    }
}
