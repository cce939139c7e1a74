// 📊 Aggregator - roll sub-state entities up to state level
//
// For every entity, the owning state is its own name (states) or its
// parent (everything else). Per owning state, in first-seen order:
//
//   revenue   = Σ children.revenue   (+ the state's own revenue)
//   colleges  = Σ children.colleges  (+ the state's own colleges)
//   intensity = max(state, children) - hotspot, not average
//   growth    = the state's own value, never recomputed
//
// Input entities are never mutated; every call builds fresh rollups.

use crate::entities::GeoEntity;
use crate::error::MetricsError;
use crate::names::normalize;
use crate::store::GeoEntityStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

// ============================================================================
// ORPHAN POLICY
// ============================================================================

/// What to do with non-state entities whose parent is not a known state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Seed a zero-valued placeholder state for the unknown parent
    #[default]
    Lenient,

    /// Leave the entity out of every rollup
    Exclude,

    /// Leave it out and report it in `AggregationReport::orphans`
    Strict,
}

impl OrphanPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrphanPolicy::Lenient => "lenient",
            OrphanPolicy::Exclude => "exclude",
            OrphanPolicy::Strict => "strict",
        }
    }
}

impl fmt::Display for OrphanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrphanPolicy {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(OrphanPolicy::Lenient),
            "exclude" => Ok(OrphanPolicy::Exclude),
            "strict" => Ok(OrphanPolicy::Strict),
            _ => Err(MetricsError::UnknownOrphanPolicy(s.to_string())),
        }
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrphanReason {
    /// No parentName at all
    MissingParent,

    /// parentName matches no state entity
    UnknownParent(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orphan {
    pub entity: GeoEntity,
    pub reason: OrphanReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationReport {
    /// Rollups in first-seen order of owning states
    pub states: Vec<GeoEntity>,

    /// Only populated under `OrphanPolicy::Strict`
    pub orphans: Vec<Orphan>,
}

impl AggregationReport {
    pub fn has_orphans(&self) -> bool {
        !self.orphans.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} state rollups, {} orphaned entities",
            self.states.len(),
            self.orphans.len()
        )
    }
}

// ============================================================================
// AGGREGATOR
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    pub policy: OrphanPolicy,
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator {
            policy: OrphanPolicy::default(),
        }
    }

    pub fn with_policy(policy: OrphanPolicy) -> Self {
        Aggregator { policy }
    }

    pub fn aggregate(&self, entities: &[GeoEntity]) -> AggregationReport {
        let store = GeoEntityStore::build(entities);
        self.aggregate_with_store(entities, &store)
    }

    /// Same as `aggregate`, reusing an already built store for `entities`
    pub fn aggregate_with_store(
        &self,
        entities: &[GeoEntity],
        store: &GeoEntityStore,
    ) -> AggregationReport {
        let mut states: Vec<GeoEntity> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();
        let mut orphans = Vec::new();

        for entity in entities {
            let owner = match entity.owning_state() {
                Some(owner) => owner,
                None => {
                    self.record_orphan(&mut orphans, entity, OrphanReason::MissingParent);
                    continue;
                }
            };

            let known = store.state(owner);
            if known.is_none() && self.policy != OrphanPolicy::Lenient {
                self.record_orphan(
                    &mut orphans,
                    entity,
                    OrphanReason::UnknownParent(owner.to_string()),
                );
                continue;
            }

            let key = normalize(owner);
            let slot = *slots.entry(key).or_insert_with(|| {
                let seed = match known {
                    Some(state) => state.clone(),
                    None => GeoEntity::placeholder_state(owner),
                };
                states.push(seed);
                states.len() - 1
            });

            if !entity.is_state() {
                let rollup = &mut states[slot];
                rollup.revenue += entity.revenue;
                rollup.colleges += entity.colleges;
                rollup.intensity = rollup.intensity.max(entity.intensity);
            }
        }

        AggregationReport { states, orphans }
    }

    fn record_orphan(&self, orphans: &mut Vec<Orphan>, entity: &GeoEntity, reason: OrphanReason) {
        if self.policy != OrphanPolicy::Strict {
            return;
        }

        warn!(
            entity = %entity.name,
            entity_type = %entity.entity_type,
            reason = ?reason,
            "entity has no resolvable owning state"
        );
        orphans.push(Orphan {
            entity: entity.clone(),
            reason,
        });
    }
}

/// State rollups under the default (lenient) policy
pub fn aggregate_to_state_level(entities: &[GeoEntity]) -> Vec<GeoEntity> {
    Aggregator::new().aggregate(entities).states
}
