// 🎛️ Selection Controller - view mode + drill-down as a reducer
//
//   (ViewModel, SelectionEvent) → ViewModel
//
// States:
//   Overview             dataset = projection of the current view mode
//   Drilldown(state)     dataset = the state plus all of its children
//
// Events:
//   SetViewMode(mode)    → Overview, selection cleared, projection recomputed
//   ClickGeography(n, t) → Drilldown(n) if n is a state with > 1 sub-regions,
//                          otherwise absorbed (no change)
//   Reset                → Overview with the state-level projection
//
// Every transition is total. Nothing is mutated in place; each step
// returns a fresh ViewModel with a freshly built dataset.

use crate::aggregation::Aggregator;
use crate::entities::{EntityType, GeoEntity};
use crate::error::MetricsError;
use crate::names::normalize;
use crate::store::GeoEntityStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

// ============================================================================
// VIEW MODE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Aggregated state rollups
    #[default]
    State,

    /// States + districts, unaggregated
    District,

    /// States + cities, unaggregated
    City,

    /// The whole collection, unfiltered
    Mixed,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [
        ViewMode::State,
        ViewMode::District,
        ViewMode::City,
        ViewMode::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::State => "state",
            ViewMode::District => "district",
            ViewMode::City => "city",
            ViewMode::Mixed => "mixed",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewMode::State => "States",
            ViewMode::District => "Districts",
            ViewMode::City => "Cities",
            ViewMode::Mixed => "Mixed",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "state" => Ok(ViewMode::State),
            "district" => Ok(ViewMode::District),
            "city" => Ok(ViewMode::City),
            "mixed" => Ok(ViewMode::Mixed),
            _ => Err(MetricsError::UnknownViewMode(s.to_string())),
        }
    }
}

// ============================================================================
// VIEW MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "lowercase")]
pub enum Selection {
    #[default]
    Overview,
    Drilldown(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub view_mode: ViewMode,
    pub selection: Selection,
    pub dataset: Vec<GeoEntity>,
}

impl ViewModel {
    pub fn selected_state(&self) -> Option<&str> {
        match &self.selection {
            Selection::Overview => None,
            Selection::Drilldown(state) => Some(state.as_str()),
        }
    }

    pub fn is_drilldown(&self) -> bool {
        matches!(self.selection, Selection::Drilldown(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SelectionEvent {
    SetViewMode {
        mode: ViewMode,
    },
    ClickGeography {
        name: String,
        #[serde(rename = "type")]
        entity_type: EntityType,
    },
    Reset,
}

// ============================================================================
// CONTROLLER
// ============================================================================

/// Owns the full entity collection and answers every event against it
#[derive(Debug, Clone)]
pub struct SelectionController {
    store: GeoEntityStore,
    aggregator: Aggregator,
}

impl SelectionController {
    pub fn new(entities: Vec<GeoEntity>) -> Self {
        SelectionController::with_aggregator(entities, Aggregator::new())
    }

    pub fn with_aggregator(entities: Vec<GeoEntity>, aggregator: Aggregator) -> Self {
        SelectionController {
            store: GeoEntityStore::build(&entities),
            aggregator,
        }
    }

    pub fn entities(&self) -> &[GeoEntity] {
        self.store.entities()
    }

    pub fn store(&self) -> &GeoEntityStore {
        &self.store
    }

    /// Starting point: Overview over state rollups
    pub fn initial(&self) -> ViewModel {
        self.overview(ViewMode::State)
    }

    pub fn reduce(&self, model: &ViewModel, event: &SelectionEvent) -> ViewModel {
        match event {
            SelectionEvent::SetViewMode { mode } => self.overview(*mode),
            SelectionEvent::ClickGeography { name, entity_type } => {
                self.click(model, name, *entity_type)
            }
            SelectionEvent::Reset => self.overview(ViewMode::State),
        }
    }

    pub fn set_view_mode(&self, model: &ViewModel, mode: ViewMode) -> ViewModel {
        self.reduce(model, &SelectionEvent::SetViewMode { mode })
    }

    pub fn click_geography(&self, model: &ViewModel, name: &str, entity_type: EntityType) -> ViewModel {
        self.reduce(
            model,
            &SelectionEvent::ClickGeography {
                name: name.to_string(),
                entity_type,
            },
        )
    }

    pub fn reset(&self, model: &ViewModel) -> ViewModel {
        self.reduce(model, &SelectionEvent::Reset)
    }

    /// One of the four fixed projections over the full collection
    pub fn projection(&self, mode: ViewMode) -> Vec<GeoEntity> {
        let entities = self.store.entities();

        match mode {
            ViewMode::State => self
                .aggregator
                .aggregate_with_store(entities, &self.store)
                .states,
            ViewMode::District => filter_types(entities, &[EntityType::State, EntityType::District]),
            ViewMode::City => filter_types(entities, &[EntityType::State, EntityType::City]),
            ViewMode::Mixed => entities.to_vec(),
        }
    }

    /// The state itself plus every entity parented to it, in input order.
    /// Only the indexed state record counts as the state itself.
    pub fn drilldown_dataset(&self, state_name: &str) -> Vec<GeoEntity> {
        let key = normalize(state_name);
        let own = self.store.state(state_name);

        self.store
            .entities()
            .iter()
            .filter(|entity| {
                if entity.is_state() {
                    own.is_some_and(|state| std::ptr::eq(state, *entity))
                } else {
                    entity
                        .parent_name
                        .as_deref()
                        .is_some_and(|parent| normalize(parent) == key)
                }
            })
            .cloned()
            .collect()
    }

    fn overview(&self, mode: ViewMode) -> ViewModel {
        ViewModel {
            view_mode: mode,
            selection: Selection::Overview,
            dataset: self.projection(mode),
        }
    }

    fn click(&self, model: &ViewModel, name: &str, entity_type: EntityType) -> ViewModel {
        if entity_type != EntityType::State {
            debug!(geography = name, %entity_type, "click absorbed: not a state");
            return model.clone();
        }

        let sub_regions = self.store.sub_region_count(name);
        if sub_regions <= 1 {
            debug!(geography = name, sub_regions, "click absorbed: nothing to drill into");
            return model.clone();
        }

        // No state record: use the parent spelling the rollup was seeded with
        let state_name = match self.store.state(name) {
            Some(state) => state.name.clone(),
            None => self
                .store
                .children_of(name)
                .find_map(GeoEntity::owning_state)
                .unwrap_or(name)
                .to_string(),
        };

        debug!(state = %state_name, sub_regions, "drilling down");
        ViewModel {
            view_mode: model.view_mode,
            dataset: self.drilldown_dataset(&state_name),
            selection: Selection::Drilldown(state_name),
        }
    }
}

fn filter_types(entities: &[GeoEntity], types: &[EntityType]) -> Vec<GeoEntity> {
    entities
        .iter()
        .filter(|entity| types.contains(&entity.entity_type))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture() -> Vec<GeoEntity> {
        vec![
            GeoEntity::new("Maharashtra", EntityType::State).with_metrics(100.0, 2, 50.0),
            GeoEntity::new("Mumbai", EntityType::District)
                .with_parent("Maharashtra")
                .with_metrics(50.0, 1, 90.0),
            GeoEntity::new("Pune", EntityType::City)
                .with_parent("Maharashtra")
                .with_metrics(30.0, 1, 45.0),
            GeoEntity::new("Goa", EntityType::State).with_metrics(20.0, 1, 15.0),
            GeoEntity::new("Panaji", EntityType::City)
                .with_parent("Goa")
                .with_metrics(5.0, 1, 30.0),
            GeoEntity::new("Konkan", EntityType::Region)
                .with_parent("Maharashtra")
                .with_metrics(7.0, 0, 10.0),
            GeoEntity::new("IIT Bombay", EntityType::College)
                .with_parent("Maharashtra")
                .with_metrics(12.0, 1, 70.0),
        ]
    }

    fn names(model: &ViewModel) -> Vec<&str> {
        model.dataset.iter().map(|entity| entity.name.as_str()).collect()
    }

    #[test]
    fn test_initial_is_state_overview() {
        let controller = SelectionController::new(fixture());
        let model = controller.initial();

        assert_eq!(model.view_mode, ViewMode::State);
        assert_eq!(model.selected_state(), None);
        assert_eq!(names(&model), vec!["Maharashtra", "Goa"]);
        assert_eq!(model.dataset[0].revenue, 199.0);
        assert_eq!(model.dataset[0].intensity, 90.0);
    }

    #[test]
    fn test_view_mode_projections() {
        let controller = SelectionController::new(fixture());
        let model = controller.initial();

        let district = controller.set_view_mode(&model, ViewMode::District);
        assert_eq!(names(&district), vec!["Maharashtra", "Mumbai", "Goa"]);

        let city = controller.set_view_mode(&model, ViewMode::City);
        assert_eq!(names(&city), vec!["Maharashtra", "Pune", "Goa", "Panaji"]);

        let mixed = controller.set_view_mode(&model, ViewMode::Mixed);
        assert_eq!(mixed.dataset, fixture());

        // Unaggregated projections carry raw state values
        assert_eq!(district.dataset[0].revenue, 100.0);
    }

    #[test]
    fn test_view_mode_clears_selection() {
        let controller = SelectionController::new(fixture());
        let drilled = controller.click_geography(&controller.initial(), "Maharashtra", EntityType::State);
        assert!(drilled.is_drilldown());

        for mode in ViewMode::ALL {
            let model = controller.set_view_mode(&drilled, mode);
            assert_eq!(model.selected_state(), None);
            assert_eq!(model.view_mode, mode);
        }
    }

    #[test]
    fn test_same_mode_twice_is_identical() {
        let controller = SelectionController::new(fixture());
        let model = controller.initial();

        for mode in ViewMode::ALL {
            let first = controller.set_view_mode(&model, mode);
            let second = controller.set_view_mode(&first, mode);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_click_state_with_many_children_drills_down() {
        let controller = SelectionController::new(fixture());
        let model = controller.set_view_mode(&controller.initial(), ViewMode::City);

        let drilled = controller.click_geography(&model, "maharashtra", EntityType::State);

        assert_eq!(drilled.selection, Selection::Drilldown("Maharashtra".to_string()));
        assert_eq!(drilled.view_mode, ViewMode::City);
        assert_eq!(
            names(&drilled),
            vec!["Maharashtra", "Mumbai", "Pune", "Konkan", "IIT Bombay"]
        );
    }

    #[test]
    fn test_click_state_without_record_drills_into_rollup() {
        let controller = SelectionController::new(vec![
            GeoEntity::new("Leh", EntityType::District)
                .with_parent("Ladakh")
                .with_metrics(8.0, 2, 35.0),
            GeoEntity::new("Kargil", EntityType::District)
                .with_parent("Ladakh")
                .with_metrics(4.0, 1, 20.0),
            GeoEntity::new("Goa", EntityType::State).with_metrics(20.0, 1, 15.0),
        ]);
        let model = controller.initial();
        assert_eq!(names(&model), vec!["Ladakh", "Goa"]);

        let drilled = controller.click_geography(&model, "LADAKH", EntityType::State);

        assert_eq!(drilled.selection, Selection::Drilldown("Ladakh".to_string()));
        assert_eq!(names(&drilled), vec!["Leh", "Kargil"]);
    }

    #[test]
    fn test_drilldown_keeps_only_indexed_duplicate_state() {
        let mut entities = fixture();
        entities.push(GeoEntity::new("maharashtra", EntityType::State).with_metrics(1.0, 0, 5.0));
        let controller = SelectionController::new(entities);

        let drilled = controller.click_geography(&controller.initial(), "Maharashtra", EntityType::State);

        assert_eq!(drilled.selection, Selection::Drilldown("maharashtra".to_string()));
        assert_eq!(
            names(&drilled),
            vec!["Mumbai", "Pune", "Konkan", "IIT Bombay", "maharashtra"]
        );
    }

    #[test]
    fn test_click_state_with_one_child_is_absorbed() {
        let controller = SelectionController::new(fixture());
        let model = controller.initial();

        let after = controller.click_geography(&model, "Goa", EntityType::State);
        assert_eq!(after, model);
    }

    #[test]
    fn test_click_non_state_or_unknown_is_absorbed() {
        let controller = SelectionController::new(fixture());
        let model = controller.initial();

        assert_eq!(controller.click_geography(&model, "Mumbai", EntityType::District), model);
        assert_eq!(controller.click_geography(&model, "Atlantis", EntityType::State), model);
        // A district name clicked as a state must not drill
        assert_eq!(controller.click_geography(&model, "Mumbai", EntityType::State), model);
    }

    #[test]
    fn test_reset_returns_to_state_overview() {
        let controller = SelectionController::new(fixture());
        let model = controller.set_view_mode(&controller.initial(), ViewMode::Mixed);
        let drilled = controller.click_geography(&model, "Maharashtra", EntityType::State);

        let reset = controller.reset(&drilled);
        assert_eq!(reset, controller.initial());
    }

    #[test]
    fn test_reduce_does_not_touch_input_model() {
        let controller = SelectionController::new(fixture());
        let model = controller.initial();
        let snapshot = model.clone();

        let _ = controller.reduce(
            &model,
            &SelectionEvent::ClickGeography {
                name: "Maharashtra".to_string(),
                entity_type: EntityType::State,
            },
        );
        assert_eq!(model, snapshot);
    }

    #[test]
    fn test_event_json_shape() {
        let event: SelectionEvent =
            serde_json::from_str(r#"{"event": "clickGeography", "name": "Goa", "type": "state"}"#)
                .unwrap();
        assert_eq!(
            event,
            SelectionEvent::ClickGeography {
                name: "Goa".to_string(),
                entity_type: EntityType::State,
            }
        );

        let event: SelectionEvent =
            serde_json::from_str(r#"{"event": "setViewMode", "mode": "district"}"#).unwrap();
        assert_eq!(event, SelectionEvent::SetViewMode { mode: ViewMode::District });
    }

    #[test]
    fn test_view_mode_from_str() {
        assert_eq!("Mixed".parse::<ViewMode>(), Ok(ViewMode::Mixed));
        assert!("country".parse::<ViewMode>().is_err());
    }
}
