// 🖥️ Dashboard - the one mutable seat around the pure reducer
//
// Holds the controller and the current ViewModel. Each event swaps in
// the next ViewModel; the reducer itself never mutates anything.
// Shared by the TUI and the HTTP server.

use crate::aggregation::Aggregator;
use crate::config::DashboardConfig;
use crate::entities::{EntityType, GeoEntity};
use crate::map::{GeometryProperties, GeometryStyle, MapStyler};
use crate::ranking::{table_rows, SummaryMetrics, TableRow};
use crate::selection::{SelectionController, SelectionEvent, ViewMode, ViewModel};
use crate::store::StoreCache;
use tracing::info;

pub struct Dashboard {
    controller: SelectionController,
    model: ViewModel,
    top_n: usize,
    styles: StoreCache,
}

impl Dashboard {
    pub fn new(entities: Vec<GeoEntity>, config: &DashboardConfig) -> Self {
        let controller = SelectionController::with_aggregator(
            entities,
            Aggregator::with_policy(config.orphan_policy),
        );
        let model = controller.initial();

        Dashboard {
            controller,
            model,
            top_n: config.top_n,
            styles: StoreCache::new(),
        }
    }

    pub fn view(&self) -> &ViewModel {
        &self.model
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn apply(&mut self, event: &SelectionEvent) -> &ViewModel {
        let next = self.controller.reduce(&self.model, event);

        if next.selection != self.model.selection || next.view_mode != self.model.view_mode {
            info!(
                view_mode = %next.view_mode,
                selected = next.selected_state().unwrap_or("-"),
                entities = next.dataset.len(),
                "view changed"
            );
        }

        self.model = next;
        &self.model
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> &ViewModel {
        self.apply(&SelectionEvent::SetViewMode { mode })
    }

    pub fn click(&mut self, name: &str, entity_type: EntityType) -> &ViewModel {
        self.apply(&SelectionEvent::ClickGeography {
            name: name.to_string(),
            entity_type,
        })
    }

    pub fn reset(&mut self) -> &ViewModel {
        self.apply(&SelectionEvent::Reset)
    }

    pub fn table(&self) -> Vec<TableRow> {
        table_rows(&self.model.dataset, self.top_n)
    }

    pub fn summary(&self) -> SummaryMetrics {
        SummaryMetrics::compute(&self.model.dataset)
    }

    /// Style a map geometry against the active dataset
    pub fn style_geometry(
        &mut self,
        properties: &GeometryProperties,
        type_hint: Option<EntityType>,
    ) -> GeometryStyle {
        let store = self.styles.get_or_build(&self.model.dataset);
        MapStyler::from_store(store).style_geometry(properties, type_hint)
    }
}
