//! Pushes UI state onto the layer handles the surface already holds
//!
//! Nothing here creates or drops layers. Tile-service groups are addressed
//! through their member layers, every other group through its single handle.

use crate::filter::{build_cql_filter, CodeFilter};
use crate::layers::base::LayerTrait;
use crate::prelude::HashMap;
use crate::registry::{
    FilterCategory, GroupSource, LayerCategory, LayerGroupConfig, LayerRegistry, OpacityBucket,
};
use crate::state::UiState;
use crate::surface::MapSurface;

/// Calls `f` on every handle that renders `group`
fn for_each_handle(
    group: &LayerGroupConfig,
    surface: &mut MapSurface,
    mut f: impl FnMut(&mut dyn LayerTrait),
) {
    match &group.source {
        GroupSource::Soil(source) | GroupSource::Imsangdo(source) => {
            for member in &source.layer_names {
                if let Some(layer) = surface.tile_layer_mut(member) {
                    f(layer);
                }
            }
        }
        GroupSource::HikingTrail(_) | GroupSource::MountainStationMarkers => {
            if let Some(layer) = surface.group_layer_mut(&group.name) {
                f(layer.as_layer_mut());
            }
        }
    }
}

/// Applies each group's visibility to its handles, skipping handles that already match.
///
/// When a handle is switched off, a filterable category gets its filter
/// emptied and its legend expanded, and hiding the markers drops the station
/// selection. Returns the number of handle writes.
pub fn apply_visibility(registry: &LayerRegistry, surface: &mut MapSurface, state: &mut UiState) -> usize {
    let mut writes = 0;

    for group in registry.groups() {
        let target = state.visibility(&group.name);
        let mut hidden_now = false;

        for_each_handle(group, surface, |layer| {
            if layer.is_visible() != target {
                layer.set_visible(target);
                writes += 1;
                hidden_now |= !target;
            }
        });

        if hidden_now {
            log::debug!("group {} hidden", group.name);
            match group.category() {
                LayerCategory::Soil | LayerCategory::Imsangdo => {
                    if let Some(category) = group.category().filter_category() {
                        state.reset_category(category);
                    }
                }
                LayerCategory::MountainStationMarkers => state.clear_selection(),
                LayerCategory::HikingTrail => {}
            }
        }
    }

    writes
}

/// Sets the opacity of every handle in `bucket`; `value` is clamped to [0, 1]
/// and non-finite input is ignored
pub fn apply_opacity(
    bucket: OpacityBucket,
    value: f32,
    registry: &LayerRegistry,
    surface: &mut MapSurface,
) -> usize {
    if !value.is_finite() {
        return 0;
    }
    let value = value.clamp(0.0, 1.0);
    let mut writes = 0;

    for group in registry.groups_of(bucket.layer_category()) {
        for_each_handle(group, surface, |layer| {
            if layer.opacity() != value {
                layer.set_opacity(value);
                writes += 1;
            }
        });
    }

    writes
}

/// Sets or removes `CQL_FILTER` on every member layer of `category`.
/// Returns the number of layers whose filter changed.
pub fn apply_attribute_filter(
    category: FilterCategory,
    filter: &CodeFilter,
    registry: &LayerRegistry,
    surface: &mut MapSurface,
) -> usize {
    let expression = build_cql_filter(category.attribute(), filter.codes());
    let mut changed = 0;

    for group in registry.groups_of(category.layer_category()) {
        for member in group.member_layers() {
            if let Some(layer) = surface.tile_layer_mut(member) {
                if layer.set_cql_filter(expression.clone()) {
                    changed += 1;
                }
            }
        }
    }

    changed
}

/// Categories with at least one visible group, in registry order
pub fn legend_categories(registry: &LayerRegistry, state: &UiState) -> Vec<LayerCategory> {
    let mut categories = Vec::new();
    for group in registry.groups() {
        let category = group.category();
        if state.visibility(&group.name) && !categories.contains(&category) {
            categories.push(category);
        }
    }
    categories
}

/// Handle writes made by one [`LayerSynchronizer::sync`] pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub visibility: usize,
    pub filters: usize,
    pub opacity: usize,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.visibility == 0 && self.filters == 0 && self.opacity == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
struct AppliedState {
    mount: u64,
    visibility: Vec<bool>,
    filters: HashMap<FilterCategory, CodeFilter>,
    opacity: HashMap<OpacityBucket, f32>,
}

/// Re-applies only the parts of the state that changed since the last pass
#[derive(Debug, Default)]
pub struct LayerSynchronizer {
    applied: Option<AppliedState>,
}

impl LayerSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs visibility first, then filters, then opacity, so a filter reset
    /// caused by hiding a group reaches the layers in the same pass.
    pub fn sync(
        &mut self,
        registry: &LayerRegistry,
        surface: &mut MapSurface,
        state: &mut UiState,
    ) -> SyncReport {
        let Some(mount) = surface.mount_id() else {
            self.applied = None;
            return SyncReport::default();
        };

        // A new mount starts from freshly built handles
        let previous = self.applied.take().filter(|a| a.mount == mount);
        let mut report = SyncReport::default();

        let visibility = visibility_vector(registry, state);
        if previous.as_ref().map(|p| &p.visibility) != Some(&visibility) {
            report.visibility = apply_visibility(registry, surface, state);
        }

        let mut filters = HashMap::default();
        for category in FilterCategory::ALL {
            let current = state.filter(category).clone();
            let unchanged = previous
                .as_ref()
                .and_then(|p| p.filters.get(&category))
                .is_some_and(|applied| *applied == current);
            if !unchanged {
                report.filters += apply_attribute_filter(category, &current, registry, surface);
            }
            filters.insert(category, current);
        }

        let mut opacity = HashMap::default();
        for bucket in OpacityBucket::ALL {
            let value = state.opacity(bucket);
            let unchanged = previous
                .as_ref()
                .and_then(|p| p.opacity.get(&bucket))
                .is_some_and(|applied| *applied == value);
            if !unchanged {
                report.opacity += apply_opacity(bucket, value, registry, surface);
            }
            opacity.insert(bucket, value);
        }

        if !report.is_empty() {
            log::debug!("layer sync: {:?}", report);
        }

        self.applied = Some(AppliedState {
            mount,
            // Side effects above may have changed the state again
            visibility: visibility_vector(registry, state),
            filters,
            opacity,
        });
        report
    }
}

fn visibility_vector(registry: &LayerRegistry, state: &UiState) -> Vec<bool> {
    registry
        .groups()
        .iter()
        .map(|g| state.visibility(&g.name))
        .collect()
}
