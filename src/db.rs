// 💾 SQLite persistence for the provider's entity list
//
// The provider supplies the list once, in full. An import replaces the
// stored list atomically; reads return it in the original input order
// (insertion sequence), which the aggregator's first-seen ordering needs.

use crate::entities::{Coordinates, EntityType, GeoEntity};
use crate::store::fingerprint;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Record of one completed import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRun {
    pub source: String,
    pub entity_count: i64,
    pub fingerprint: String,
    pub imported_at: DateTime<Utc>,
}

pub fn open_database<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {:?}", path))?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS geo_entities (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            revenue REAL NOT NULL,
            colleges INTEGER NOT NULL,
            growth TEXT NOT NULL,
            intensity REAL NOT NULL,
            parent_name TEXT,
            longitude REAL,
            latitude REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS import_runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            entity_count INTEGER NOT NULL,
            fingerprint TEXT NOT NULL,
            imported_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_geo_entities_parent ON geo_entities(parent_name)",
        [],
    )?;

    Ok(())
}

/// Replace the stored list with `entities` in one transaction
pub fn replace_entities(conn: &mut Connection, entities: &[GeoEntity], source: &str) -> Result<usize> {
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM geo_entities", [])?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO geo_entities (
                name, entity_type, revenue, colleges, growth, intensity,
                parent_name, longitude, latitude
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;

        for entity in entities {
            let colleges = i64::try_from(entity.colleges)
                .with_context(|| format!("College count too large for {:?}", entity.name))?;

            stmt.execute(params![
                entity.name,
                entity.entity_type.as_str(),
                entity.revenue,
                colleges,
                entity.growth,
                entity.intensity,
                entity.parent_name,
                entity.coordinates.map(|c| c.longitude),
                entity.coordinates.map(|c| c.latitude),
            ])?;
        }
    }

    let run = ImportRun {
        source: source.to_string(),
        entity_count: entities.len() as i64,
        fingerprint: fingerprint(entities)?,
        imported_at: Utc::now(),
    };

    tx.execute(
        "INSERT INTO import_runs (source, entity_count, fingerprint, imported_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            run.source,
            run.entity_count,
            run.fingerprint,
            run.imported_at.to_rfc3339(),
        ],
    )?;

    tx.commit()?;

    info!(source, entities = entities.len(), "replaced stored entities");
    Ok(entities.len())
}

/// All stored entities in input order
pub fn get_all_entities(conn: &Connection) -> Result<Vec<GeoEntity>> {
    let mut stmt = conn.prepare(
        "SELECT name, entity_type, revenue, colleges, growth, intensity,
                parent_name, longitude, latitude
         FROM geo_entities
         ORDER BY seq",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, f64>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, Option<f64>>(7)?,
            row.get::<_, Option<f64>>(8)?,
        ))
    })?;

    let mut entities = Vec::new();
    for row in rows {
        let (name, entity_type, revenue, colleges, growth, intensity, parent_name, longitude, latitude) =
            row?;

        let entity_type: EntityType = entity_type
            .parse()
            .with_context(|| format!("Corrupt entity type for {:?}", name))?;

        let coordinates = match (longitude, latitude) {
            (Some(longitude), Some(latitude)) => Some(Coordinates { longitude, latitude }),
            _ => None,
        };

        let colleges = u64::try_from(colleges)
            .with_context(|| format!("Negative college count for {:?}", name))?;

        entities.push(GeoEntity {
            colleges,
            name,
            revenue,
            growth,
            intensity,
            entity_type,
            parent_name,
            coordinates,
        });
    }

    Ok(entities)
}

pub fn count_entities(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM geo_entities", [], |row| row.get(0))?;

    Ok(count)
}

pub fn last_import(conn: &Connection) -> Result<Option<ImportRun>> {
    let row = conn
        .query_row(
            "SELECT source, entity_count, fingerprint, imported_at
             FROM import_runs
             ORDER BY id DESC
             LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    match row {
        None => Ok(None),
        Some((source, entity_count, fingerprint, imported_at)) => {
            let imported_at = DateTime::parse_from_rfc3339(&imported_at)
                .context("Corrupt import timestamp")?
                .with_timezone(&Utc);

            Ok(Some(ImportRun {
                source,
                entity_count,
                fingerprint,
                imported_at,
            }))
        }
    }
}
