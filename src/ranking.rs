// 🏆 Ranking + summary metrics for the tabular display
//
// Table rows: active dataset sorted by revenue (descending, stable so
// ties keep input order), cut to the top N.
//
// Summary totals: when a dataset mixes states with their sub-regions,
// only states are summed, otherwise a state and its children would
// count twice.

use crate::classifier::{classify, IntensityBucket};
use crate::entities::{EntityType, GeoEntity};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_N: usize = 10;

/// Stable revenue-descending ranking, truncated to `n`
pub fn top_by_revenue(dataset: &[GeoEntity], n: usize) -> Vec<GeoEntity> {
    let mut ranked = dataset.to_vec();
    // slice::sort_by is stable
    ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    ranked.truncate(n);
    ranked
}

// ============================================================================
// TABLE ROWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub rank: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub revenue: f64,
    pub colleges: u64,
    pub growth: String,
    pub intensity: f64,
    pub bucket: IntensityBucket,
}

pub fn table_rows(dataset: &[GeoEntity], n: usize) -> Vec<TableRow> {
    top_by_revenue(dataset, n)
        .into_iter()
        .enumerate()
        .map(|(index, entity)| TableRow {
            rank: index + 1,
            bucket: classify(Some(entity.intensity)),
            name: entity.name,
            entity_type: entity.entity_type,
            revenue: entity.revenue,
            colleges: entity.colleges,
            growth: entity.growth,
            intensity: entity.intensity,
        })
        .collect()
}

// ============================================================================
// SUMMARY METRICS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub total_revenue: f64,
    pub total_colleges: u64,

    /// Entities actually summed
    pub counted_entities: usize,

    /// True when only states were summed
    pub states_only: bool,
}

impl SummaryMetrics {
    pub fn compute(dataset: &[GeoEntity]) -> Self {
        let has_states = dataset.iter().any(GeoEntity::is_state);
        let has_others = dataset.iter().any(|entity| !entity.is_state());
        let states_only = has_states && has_others;

        let mut summary = SummaryMetrics {
            states_only,
            ..Default::default()
        };

        for entity in dataset
            .iter()
            .filter(|entity| !states_only || entity.is_state())
        {
            summary.total_revenue += entity.revenue;
            summary.total_colleges += entity.colleges;
            summary.counted_entities += 1;
        }

        summary
    }

    pub fn summary(&self) -> String {
        format!(
            "Revenue: {:.2} | Colleges: {} | Entities counted: {}",
            self.total_revenue, self.total_colleges, self.counted_entities
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entity(name: &str, entity_type: EntityType, revenue: f64) -> GeoEntity {
        GeoEntity::new(name, entity_type).with_metrics(revenue, 1, 50.0)
    }

    #[test]
    fn test_ranking_is_descending() {
        let dataset = vec![
            entity("A", EntityType::State, 10.0),
            entity("B", EntityType::State, 30.0),
            entity("C", EntityType::State, 20.0),
        ];

        let names: Vec<String> = top_by_revenue(&dataset, 10)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_ranking_ties_keep_input_order() {
        let dataset = vec![
            entity("First", EntityType::City, 50.0),
            entity("Big", EntityType::City, 90.0),
            entity("Second", EntityType::City, 50.0),
            entity("Third", EntityType::City, 50.0),
        ];

        let names: Vec<String> = top_by_revenue(&dataset, 10)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Big", "First", "Second", "Third"]);
    }

    #[test]
    fn test_ranking_truncates_to_top_n() {
        let dataset: Vec<GeoEntity> = (0..15)
            .map(|i| entity(&format!("E{i}"), EntityType::District, i as f64))
            .collect();

        let top = top_by_revenue(&dataset, DEFAULT_TOP_N);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].name, "E14");
        assert_eq!(top[9].name, "E5");
        assert_eq!(top_by_revenue(&dataset[..3], DEFAULT_TOP_N).len(), 3);
    }

    #[test]
    fn test_table_rows_carry_rank_and_bucket() {
        let dataset = vec![
            GeoEntity::new("Low", EntityType::City).with_metrics(1.0, 1, 5.0),
            GeoEntity::new("Hot", EntityType::City).with_metrics(2.0, 1, 95.0),
        ];

        let rows = table_rows(&dataset, 10);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].name, "Hot");
        assert_eq!(rows[0].bucket, IntensityBucket::Highest);
        assert_eq!(rows[1].bucket, IntensityBucket::Low);
    }

    #[test]
    fn test_summary_mixed_levels_counts_states_only() {
        let dataset = vec![
            GeoEntity::new("Maharashtra", EntityType::State).with_metrics(100.0, 2, 50.0),
            GeoEntity::new("Mumbai", EntityType::District).with_metrics(50.0, 1, 90.0),
            GeoEntity::new("Goa", EntityType::State).with_metrics(20.0, 4, 10.0),
        ];

        let summary = SummaryMetrics::compute(&dataset);
        assert_eq!(summary.total_revenue, 120.0);
        assert_eq!(summary.total_colleges, 6);
        assert_eq!(summary.counted_entities, 2);
        assert!(summary.states_only);
    }

    #[test]
    fn test_summary_single_level_counts_everything() {
        let states = vec![
            GeoEntity::new("A", EntityType::State).with_metrics(1.0, 1, 0.0),
            GeoEntity::new("B", EntityType::State).with_metrics(2.0, 2, 0.0),
        ];
        let cities = vec![
            GeoEntity::new("X", EntityType::City).with_metrics(3.0, 3, 0.0),
            GeoEntity::new("Y", EntityType::College).with_metrics(4.0, 4, 0.0),
        ];

        assert_eq!(SummaryMetrics::compute(&states).total_revenue, 3.0);
        assert_eq!(SummaryMetrics::compute(&cities).total_colleges, 7);
        assert!(!SummaryMetrics::compute(&cities).states_only);
        assert_eq!(SummaryMetrics::compute(&[]), SummaryMetrics::default());
    }
}
