// 📥 Data Provider - load the entity list once, in order
//
// Sources: CSV (one row per entity) or JSON (array of GeoEntity).
// Ingestion is where the data gets checked. The engine downstream takes
// whatever it is given; `validate` reports what looks wrong without
// dropping or fixing anything.

use crate::entities::{Coordinates, EntityType, GeoEntity};
use crate::error::MetricsError;
use crate::names::normalize;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

// ============================================================================
// CSV INPUT
// ============================================================================

/// One CSV row. Header:
/// name,type,revenue,colleges,growth,intensity,parentName,longitude,latitude
#[derive(Debug, Deserialize)]
struct CsvRecord {
    name: String,
    #[serde(rename = "type")]
    entity_type: String,
    revenue: f64,
    colleges: u64,
    #[serde(default)]
    growth: Option<String>,
    intensity: f64,
    #[serde(rename = "parentName", default)]
    parent_name: Option<String>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    latitude: Option<f64>,
}

impl CsvRecord {
    fn into_entity(self, line: usize) -> Result<GeoEntity, MetricsError> {
        let entity_type: EntityType =
            self.entity_type
                .parse()
                .map_err(|err: MetricsError| MetricsError::InvalidRecord {
                    line,
                    message: err.to_string(),
                })?;

        let coordinates = match (self.longitude, self.latitude) {
            (Some(longitude), Some(latitude)) => Some(Coordinates { longitude, latitude }),
            _ => None,
        };

        Ok(GeoEntity {
            name: self.name.trim().to_string(),
            revenue: self.revenue,
            colleges: self.colleges,
            growth: self
                .growth
                .filter(|growth| !growth.trim().is_empty())
                .unwrap_or_else(|| "+0%".to_string()),
            intensity: self.intensity,
            entity_type,
            parent_name: self
                .parent_name
                .map(|parent| parent.trim().to_string())
                .filter(|parent| !parent.is_empty()),
            coordinates,
        })
    }
}

/// Load entities from CSV, preserving row order
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<GeoEntity>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open entity CSV: {:?}", path))?;

    read_csv(&mut reader).with_context(|| format!("Failed to parse entity CSV: {:?}", path))
}

/// Parse entities from in-memory CSV text
pub fn parse_csv(text: &str) -> Result<Vec<GeoEntity>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    read_csv(&mut reader)
}

fn read_csv<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Vec<GeoEntity>> {
    let mut entities = Vec::new();

    for (index, row) in reader.deserialize::<CsvRecord>().enumerate() {
        // Header is line 1
        let line = index + 2;
        let record = row.map_err(|err| MetricsError::InvalidRecord {
            line,
            message: err.to_string(),
        })?;
        entities.push(record.into_entity(line)?);
    }

    Ok(entities)
}

/// Load entities from a JSON array
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<GeoEntity>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read entity JSON: {:?}", path))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse entity JSON: {:?}", path))
}

/// Load by extension: `.json` → JSON, anything else → CSV
pub fn load_entities<P: AsRef<Path>>(path: P) -> Result<Vec<GeoEntity>> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let entities = if is_json {
        load_json(path)?
    } else {
        load_csv(path)?
    };

    info!(path = %path.display(), entities = entities.len(), "loaded entities");
    Ok(entities)
}

// ============================================================================
// INGEST VALIDATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Value outside what the engine assumes
    Warning,  // Accepted, but will behave by policy (overwrite, orphan)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestIssue {
    pub severity: Severity,
    /// Position in the input list
    pub index: usize,
    pub entity: String,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub entity_count: usize,
    pub state_count: usize,
    pub issues: Vec<IngestIssue>,
    pub checked_at: DateTime<Utc>,
}

impl IngestReport {
    pub fn critical_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Critical)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} entities ({} states), {} critical, {} warnings",
            self.entity_count,
            self.state_count,
            self.critical_count(),
            self.warning_count()
        )
    }
}

/// Check the invariants the engine assumes but does not enforce
pub fn validate(entities: &[GeoEntity]) -> IngestReport {
    let mut issues = Vec::new();

    let state_names: HashSet<String> = entities
        .iter()
        .filter(|entity| entity.is_state())
        .map(|entity| normalize(&entity.name))
        .collect();

    let mut seen_states = HashSet::new();
    let mut state_count = 0;

    for (index, entity) in entities.iter().enumerate() {
        let mut flag = |severity: Severity, field: &str, message: String| {
            issues.push(IngestIssue {
                severity,
                index,
                entity: entity.name.clone(),
                field: field.to_string(),
                message,
            });
        };

        if normalize(&entity.name).is_empty() {
            flag(Severity::Critical, "name", "Name is empty".to_string());
        }

        if !entity.revenue.is_finite() || entity.revenue < 0.0 {
            flag(
                Severity::Critical,
                "revenue",
                format!("Revenue must be a non-negative number, got {}", entity.revenue),
            );
        }

        if !entity.intensity.is_finite() || !(0.0..=100.0).contains(&entity.intensity) {
            flag(
                Severity::Critical,
                "intensity",
                format!("Intensity must be within [0, 100], got {}", entity.intensity),
            );
        }

        if entity.is_state() {
            state_count += 1;
            if !seen_states.insert(normalize(&entity.name)) {
                flag(
                    Severity::Warning,
                    "name",
                    "Duplicate state; the later record wins".to_string(),
                );
            }
            continue;
        }

        match entity.owning_state() {
            None => flag(
                Severity::Warning,
                "parentName",
                format!("{} has no parent state", entity.entity_type),
            ),
            Some(parent) if !state_names.contains(&normalize(parent)) => flag(
                Severity::Warning,
                "parentName",
                format!("Parent {:?} is not a known state", parent),
            ),
            Some(_) => {}
        }
    }

    let report = IngestReport {
        entity_count: entities.len(),
        state_count,
        issues,
        checked_at: Utc::now(),
    };

    if report.is_clean() {
        info!("{}", report.summary());
    } else {
        warn!("{}", report.summary());
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SAMPLE_CSV: &str = "\
name,type,revenue,colleges,growth,intensity,parentName,longitude,latitude
Maharashtra,state,100,2,+12%,50,,75.7,19.7
Mumbai,district,50,1,+20%,90,Maharashtra,,
Pune, city ,30,1,,45,Maharashtra,73.8,18.5
";

    #[test]
    fn test_parse_csv_preserves_order_and_optionals() {
        let entities = parse_csv(SAMPLE_CSV).unwrap();

        assert_eq!(entities.len(), 3);
        assert_eq!(entities[0].name, "Maharashtra");
        assert_eq!(entities[0].parent_name, None);
        assert_eq!(
            entities[0].coordinates,
            Some(Coordinates { longitude: 75.7, latitude: 19.7 })
        );
        assert_eq!(entities[1].parent_name.as_deref(), Some("Maharashtra"));
        assert_eq!(entities[1].coordinates, None);
        assert_eq!(entities[2].entity_type, EntityType::City);
        assert_eq!(entities[2].growth, "+0%");
    }

    #[test]
    fn test_parse_csv_reports_line_of_bad_type() {
        let text = "name,type,revenue,colleges,growth,intensity,parentName,longitude,latitude\n\
                    Goa,state,1,1,+1%,1,,,\n\
                    Atlantis,continent,1,1,+1%,1,,,\n";

        let err = parse_csv(text).unwrap_err();
        let err = err.downcast::<MetricsError>().unwrap();
        assert!(matches!(err, MetricsError::InvalidRecord { line: 3, .. }));
    }

    #[test]
    fn test_parse_csv_rejects_negative_colleges() {
        let text = "name,type,revenue,colleges,growth,intensity,parentName,longitude,latitude\n\
                    Goa,state,1,-1,+1%,1,,,\n";

        assert!(parse_csv(text).is_err());
    }

    #[test]
    fn test_load_entities_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("entities.csv");
        fs::write(&csv_path, SAMPLE_CSV).unwrap();
        assert_eq!(load_entities(&csv_path).unwrap().len(), 3);

        let json_path = dir.path().join("entities.json");
        let mut file = fs::File::create(&json_path).unwrap();
        write!(
            file,
            r#"[{{"name": "Goa", "revenue": 20, "colleges": 1, "growth": "+3%", "intensity": 15, "type": "state"}},
               {{"name": "Panaji", "revenue": 5, "colleges": 1, "growth": "+1%", "intensity": 30, "type": "city", "parentName": "Goa"}}]"#
        )
        .unwrap();

        let entities = load_entities(&json_path).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].parent_name.as_deref(), Some("Goa"));
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = load_entities("/definitely/not/here.csv").unwrap_err();
        assert!(err.to_string().contains("Failed to open entity CSV"));
    }

    #[test]
    fn test_validate_clean_dataset() {
        let entities = parse_csv(SAMPLE_CSV).unwrap();
        let report = validate(&entities);

        assert!(report.is_clean());
        assert_eq!(report.entity_count, 3);
        assert_eq!(report.state_count, 1);
    }

    #[test]
    fn test_validate_flags_ranges_duplicates_and_orphans() {
        let entities = vec![
            GeoEntity::new("Goa", EntityType::State).with_metrics(-1.0, 1, 150.0),
            GeoEntity::new("goa", EntityType::State).with_metrics(1.0, 1, 10.0),
            GeoEntity::new("Leh", EntityType::District).with_parent("Ladakh"),
            GeoEntity::new("Floating", EntityType::College),
        ];

        let report = validate(&entities);

        assert_eq!(report.critical_count(), 2);
        assert_eq!(report.warning_count(), 3);

        let fields: Vec<(usize, &str)> = report
            .issues
            .iter()
            .map(|issue| (issue.index, issue.field.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                (0, "revenue"),
                (0, "intensity"),
                (1, "name"),
                (2, "parentName"),
                (3, "parentName"),
            ]
        );
    }
}
