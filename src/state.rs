//! User-facing control state
//!
//! Seeded from the registry at mount, mutated only by interaction handlers,
//! never persisted. Pushing it onto the rendered layers is the synchronizer's job.

use crate::filter::CodeFilter;
use crate::prelude::HashMap;
use crate::registry::{FilterCategory, LayerRegistry, OpacityBucket};
use crate::surface::ClickOutcome;
use serde::{Deserialize, Serialize};

/// Marker the user last clicked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedStation {
    pub station_id: String,
    pub name: String,
}

impl SelectedStation {
    pub fn new(station_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    visibility: HashMap<String, bool>,
    opacity: HashMap<OpacityBucket, f32>,
    filters: HashMap<FilterCategory, CodeFilter>,
    legend_collapsed: HashMap<FilterCategory, bool>,
    selected_station: Option<SelectedStation>,
    selection_seq: u64,
}

impl UiState {
    pub fn from_registry(registry: &LayerRegistry) -> Self {
        let visibility = registry
            .groups()
            .iter()
            .map(|g| (g.name.clone(), g.visible))
            .collect();

        Self {
            visibility,
            opacity: OpacityBucket::ALL.iter().map(|b| (*b, 1.0)).collect(),
            filters: FilterCategory::ALL
                .iter()
                .map(|c| (*c, CodeFilter::new()))
                .collect(),
            legend_collapsed: FilterCategory::ALL.iter().map(|c| (*c, false)).collect(),
            selected_station: None,
            selection_seq: 0,
        }
    }

    /// Unknown group names read as hidden
    pub fn visibility(&self, group: &str) -> bool {
        self.visibility.get(group).copied().unwrap_or(false)
    }

    pub fn set_visibility(&mut self, group: &str, visible: bool) -> bool {
        match self.visibility.get_mut(group) {
            Some(current) => {
                *current = visible;
                true
            }
            None => {
                log::warn!("visibility change for unknown group {group}");
                false
            }
        }
    }

    /// Flips a group's checkbox; returns the new value
    pub fn toggle_visibility(&mut self, group: &str) -> bool {
        let next = !self.visibility(group);
        self.set_visibility(group, next);
        self.visibility(group)
    }

    pub fn opacity(&self, bucket: OpacityBucket) -> f32 {
        self.opacity.get(&bucket).copied().unwrap_or(1.0)
    }

    /// Clamped to [0, 1]; non-finite input is ignored
    pub fn set_opacity(&mut self, bucket: OpacityBucket, value: f32) {
        if !value.is_finite() {
            return;
        }
        self.opacity.insert(bucket, value.clamp(0.0, 1.0));
    }

    pub fn filter(&self, category: FilterCategory) -> &CodeFilter {
        self.filters
            .get(&category)
            .unwrap_or(empty_filter())
    }

    pub fn filter_mut(&mut self, category: FilterCategory) -> &mut CodeFilter {
        self.filters.entry(category).or_default()
    }

    /// Legend item click: OR-toggles a single code
    pub fn toggle_code(&mut self, category: FilterCategory, code: &str) -> bool {
        self.filter_mut(category).toggle(code)
    }

    /// "Show all" click
    pub fn show_all(&mut self, category: FilterCategory) {
        self.filter_mut(category).clear();
    }

    pub fn legend_collapsed(&self, category: FilterCategory) -> bool {
        self.legend_collapsed.get(&category).copied().unwrap_or(false)
    }

    pub fn set_legend_collapsed(&mut self, category: FilterCategory, collapsed: bool) {
        self.legend_collapsed.insert(category, collapsed);
    }

    pub fn toggle_legend_collapsed(&mut self, category: FilterCategory) -> bool {
        let next = !self.legend_collapsed(category);
        self.set_legend_collapsed(category, next);
        next
    }

    /// Empties the filter and expands the legend of a category whose layer went away
    pub fn reset_category(&mut self, category: FilterCategory) {
        self.show_all(category);
        self.set_legend_collapsed(category, false);
    }

    pub fn selected_station(&self) -> Option<&SelectedStation> {
        self.selected_station.as_ref()
    }

    /// Increments on every selection change, including re-selecting the same station
    pub fn selection_seq(&self) -> u64 {
        self.selection_seq
    }

    pub fn select_station(&mut self, station: SelectedStation) {
        log::debug!("station selected: {} ({})", station.name, station.station_id);
        self.selected_station = Some(station);
        self.selection_seq += 1;
    }

    pub fn clear_selection(&mut self) {
        if self.selected_station.take().is_some() {
            self.selection_seq += 1;
        }
    }

    /// Applies a map click. A click on empty map keeps the current selection.
    pub fn apply_click(&mut self, outcome: ClickOutcome) -> bool {
        match outcome {
            ClickOutcome::Station(station) => {
                self.select_station(station);
                true
            }
            ClickOutcome::Miss | ClickOutcome::Ignored => false,
        }
    }
}

fn empty_filter() -> &'static CodeFilter {
    static EMPTY: once_cell::sync::Lazy<CodeFilter> = once_cell::sync::Lazy::new(CodeFilter::new);
    &EMPTY
}
