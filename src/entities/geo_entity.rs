// 🗺️ GeoEntity - one record of geographic/business metrics
//
// Entities arrive once, in full, from the data provider and are never
// mutated afterwards. Rollups are new values built from them.

use crate::error::MetricsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENTITY TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    State,
    District,
    City,
    Region,
    College,
}

impl EntityType {
    pub const ALL: [EntityType; 5] = [
        EntityType::State,
        EntityType::District,
        EntityType::City,
        EntityType::Region,
        EntityType::College,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::State => "state",
            EntityType::District => "district",
            EntityType::City => "city",
            EntityType::Region => "region",
            EntityType::College => "college",
        }
    }

    /// Sub-regions counted when deciding whether a state can be drilled into.
    pub fn is_sub_region(&self) -> bool {
        matches!(
            self,
            EntityType::District | EntityType::City | EntityType::College
        )
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "state" => Ok(EntityType::State),
            "district" => Ok(EntityType::District),
            "city" => Ok(EntityType::City),
            "region" => Ok(EntityType::Region),
            "college" => Ok(EntityType::College),
            _ => Err(MetricsError::UnknownEntityType(s.to_string())),
        }
    }
}

// ============================================================================
// COORDINATES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

// ============================================================================
// GEO ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoEntity {
    pub name: String,

    /// Non-negative; not validated by the engine
    pub revenue: f64,

    pub colleges: u64,

    /// Display string such as "+12%"; never recomputed by rollups
    pub growth: String,

    /// Score in [0, 100] driving color classification
    pub intensity: f64,

    #[serde(rename = "type")]
    pub entity_type: EntityType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl GeoEntity {
    pub fn new(name: impl Into<String>, entity_type: EntityType) -> Self {
        GeoEntity {
            name: name.into(),
            revenue: 0.0,
            colleges: 0,
            growth: "+0%".to_string(),
            intensity: 0.0,
            entity_type,
            parent_name: None,
            coordinates: None,
        }
    }

    /// Zero-valued state used when a rollup has no backing state record
    pub fn placeholder_state(name: impl Into<String>) -> Self {
        GeoEntity::new(name, EntityType::State)
    }

    pub fn with_metrics(mut self, revenue: f64, colleges: u64, intensity: f64) -> Self {
        self.revenue = revenue;
        self.colleges = colleges;
        self.intensity = intensity;
        self
    }

    pub fn with_growth(mut self, growth: impl Into<String>) -> Self {
        self.growth = growth.into();
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_name = Some(parent.into());
        self
    }

    pub fn with_coordinates(mut self, longitude: f64, latitude: f64) -> Self {
        self.coordinates = Some(Coordinates { longitude, latitude });
        self
    }

    pub fn is_state(&self) -> bool {
        self.entity_type == EntityType::State
    }

    /// Owning state name: own name for states, parent otherwise
    pub fn owning_state(&self) -> Option<&str> {
        if self.is_state() {
            Some(self.name.as_str())
        } else {
            self.parent_name
                .as_deref()
                .filter(|parent| !parent.trim().is_empty())
        }
    }
}
