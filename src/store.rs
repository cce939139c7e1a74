// 🗂️ GeoEntity Store - lookup indices over the flat entity list
//
// Three indices, all keyed by normalized names:
// - composite key (name + type) → any entity
// - state name                  → type = state
// - district name               → type = district
//
// Construction is a fold over the input list. Duplicates overwrite
// earlier entries (last write wins), which is policy, not an error.

use crate::entities::{EntityType, GeoEntity};
use crate::names::{composite_key, normalize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoEntityStore {
    entities: Vec<GeoEntity>,
    by_key: HashMap<String, usize>,
    states: HashMap<String, usize>,
    districts: HashMap<String, usize>,
}

impl GeoEntityStore {
    pub fn build(entities: &[GeoEntity]) -> Self {
        let mut store = GeoEntityStore {
            entities: entities.to_vec(),
            ..Default::default()
        };

        for (index, entity) in store.entities.iter().enumerate() {
            store
                .by_key
                .insert(composite_key(&entity.name, entity.entity_type), index);

            match entity.entity_type {
                EntityType::State => {
                    store.states.insert(normalize(&entity.name), index);
                }
                EntityType::District => {
                    store.districts.insert(normalize(&entity.name), index);
                }
                _ => {}
            }
        }

        store
    }

    pub fn entities(&self) -> &[GeoEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Best match for a free-text name.
    ///
    /// Precedence: composite key for the hinted type, then the district
    /// index, then the state index. No hint skips the first step.
    pub fn lookup(&self, name: &str, type_hint: Option<EntityType>) -> Option<&GeoEntity> {
        let key = normalize(name);
        if key.is_empty() {
            return None;
        }

        let hinted = type_hint.and_then(|entity_type| {
            self.by_key
                .get(&composite_key(name, entity_type))
                .copied()
        });

        hinted
            .or_else(|| self.districts.get(&key).copied())
            .or_else(|| self.states.get(&key).copied())
            .map(|index| &self.entities[index])
    }

    pub fn get(&self, name: &str, entity_type: EntityType) -> Option<&GeoEntity> {
        self.by_key
            .get(&composite_key(name, entity_type))
            .map(|&index| &self.entities[index])
    }

    pub fn state(&self, name: &str) -> Option<&GeoEntity> {
        self.states
            .get(&normalize(name))
            .map(|&index| &self.entities[index])
    }

    pub fn district(&self, name: &str) -> Option<&GeoEntity> {
        self.districts
            .get(&normalize(name))
            .map(|&index| &self.entities[index])
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(&normalize(name))
    }

    /// Non-state entities whose parent normalizes to `state_name`, in input order
    pub fn children_of<'a>(&'a self, state_name: &str) -> impl Iterator<Item = &'a GeoEntity> + 'a {
        let key = normalize(state_name);
        self.entities.iter().filter(move |entity| {
            !entity.is_state()
                && entity
                    .parent_name
                    .as_deref()
                    .is_some_and(|parent| normalize(parent) == key)
        })
    }

    /// Number of district/city/college children of a state
    pub fn sub_region_count(&self, state_name: &str) -> usize {
        self.children_of(state_name)
            .filter(|entity| entity.entity_type.is_sub_region())
            .count()
    }
}

// ============================================================================
// FINGERPRINT + CACHE
// ============================================================================

/// SHA-256 over the JSON-serialized entity list; equal lists give equal fingerprints
pub fn fingerprint(entities: &[GeoEntity]) -> serde_json::Result<String> {
    let mut hasher = Sha256::new();
    for entity in entities {
        hasher.update(serde_json::to_vec(entity)?);
        hasher.update(b"\n");
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Memoizes the last built store. Pure optimization: a miss rebuilds.
#[derive(Debug, Default)]
pub struct StoreCache {
    last: Option<(String, Arc<GeoEntityStore>)>,
}

impl StoreCache {
    pub fn new() -> Self {
        StoreCache { last: None }
    }

    pub fn get_or_build(&mut self, entities: &[GeoEntity]) -> Arc<GeoEntityStore> {
        let print = match fingerprint(entities) {
            Ok(print) => print,
            Err(e) => {
                warn!(error = %e, "fingerprint failed, building uncached store");
                self.last = None;
                return Arc::new(GeoEntityStore::build(entities));
            }
        };

        if let Some((cached_print, store)) = &self.last {
            if *cached_print == print {
                debug!(entities = entities.len(), "store cache hit");
                return Arc::clone(store);
            }
        }

        debug!(entities = entities.len(), "building entity store");
        let store = Arc::new(GeoEntityStore::build(entities));
        self.last = Some((print, Arc::clone(&store)));
        store
    }
}
