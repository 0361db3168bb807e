//! Floating layer and legend panel

use crate::legend::{legend_entries, parse_hex_color, HIKING_TRAIL_COLOR, HIKING_TRAIL_LABEL};
use crate::registry::{FilterCategory, LayerCategory, LayerRegistry};
use crate::state::UiState;
use crate::sync::legend_categories;
use crate::ui::style::{swatch_color, PanelStyle};
use egui::{Color32, Rect, RichText, Sense, Stroke, Ui, Vec2};

const SHOW_ALL: &str = "모두 표시";

fn heading(category: FilterCategory) -> &'static str {
    match category {
        FilterCategory::Soil => "토양 범례 (클릭하여 필터)",
        FilterCategory::Imsangdo => "임상도 범례 (클릭하여 필터)",
    }
}

/// Screen rects of the panel's interactive rows from the last `show`
#[derive(Debug, Clone, Default)]
pub struct LegendLayout {
    pub checkboxes: Vec<(String, Rect)>,
    pub headings: Vec<(FilterCategory, Rect)>,
    pub show_all: Vec<(FilterCategory, Rect)>,
    pub entries: Vec<(FilterCategory, &'static str, Rect)>,
}

impl LegendLayout {
    pub fn checkbox(&self, group: &str) -> Option<Rect> {
        self.checkboxes
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, rect)| *rect)
    }

    pub fn heading(&self, category: FilterCategory) -> Option<Rect> {
        find_category(&self.headings, category)
    }

    pub fn show_all(&self, category: FilterCategory) -> Option<Rect> {
        find_category(&self.show_all, category)
    }

    pub fn entry(&self, category: FilterCategory, code: &str) -> Option<Rect> {
        self.entries
            .iter()
            .find(|(c, entry, _)| *c == category && *entry == code)
            .map(|(_, _, rect)| *rect)
    }
}

fn find_category(rows: &[(FilterCategory, Rect)], category: FilterCategory) -> Option<Rect> {
    rows.iter().find(|(c, _)| *c == category).map(|(_, rect)| *rect)
}

/// Movable window with one checkbox per layer group, opacity sliders and
/// the per-category legends. All edits go to [`UiState`]; layers pick them
/// up on the next sync.
#[derive(Default)]
pub struct LegendPanel {
    style: PanelStyle,
}

impl LegendPanel {
    pub fn new(style: PanelStyle) -> Self {
        Self { style }
    }

    pub fn show(
        &self,
        ctx: &egui::Context,
        registry: &LayerRegistry,
        state: &mut UiState,
    ) -> LegendLayout {
        let mut layout = LegendLayout::default();
        egui::Window::new("레이어")
            .id(egui::Id::new("firemap_legend"))
            .default_pos([10.0, 100.0])
            .default_width(self.style.width)
            .frame(self.style.frame())
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().max_height(ctx.screen_rect().height() * 0.75).show(ui, |ui| {
                    self.layer_section(ui, registry, state, &mut layout);
                    ui.separator();
                    self.legend_section(ui, registry, state, &mut layout);
                });
            });
        layout
    }

    fn layer_section(
        &self,
        ui: &mut Ui,
        registry: &LayerRegistry,
        state: &mut UiState,
        layout: &mut LegendLayout,
    ) {
        ui.strong("레이어 선택 및 투명도 조절");

        for group in registry.groups() {
            ui.horizontal(|ui| {
                let mut visible = state.visibility(&group.name);
                let checkbox = ui.checkbox(&mut visible, group.name.as_str());
                layout.checkboxes.push((group.name.clone(), checkbox.rect));
                if checkbox.changed() {
                    state.set_visibility(&group.name, visible);
                }

                let Some(bucket) = group.category().opacity_bucket() else {
                    return;
                };
                if !visible {
                    return;
                }
                ui.label(RichText::new("투명도:").small());
                let mut opacity = state.opacity(bucket);
                let slider = egui::Slider::new(&mut opacity, 0.0..=1.0)
                    .step_by(0.01)
                    .fixed_decimals(2);
                if ui.add(slider).changed() {
                    state.set_opacity(bucket, opacity);
                }
            });
        }
    }

    fn legend_section(
        &self,
        ui: &mut Ui,
        registry: &LayerRegistry,
        state: &mut UiState,
        layout: &mut LegendLayout,
    ) {
        ui.strong("범례");

        for category in legend_categories(registry, state) {
            ui.add_space(6.0);
            match category {
                LayerCategory::Soil | LayerCategory::Imsangdo => {
                    if let Some(filter_category) = category.filter_category() {
                        self.code_legend(ui, filter_category, state, layout);
                    }
                }
                LayerCategory::HikingTrail => self.hiking_legend(ui),
                LayerCategory::MountainStationMarkers => self.station_legend(ui),
            }
        }
    }

    fn code_legend(
        &self,
        ui: &mut Ui,
        category: FilterCategory,
        state: &mut UiState,
        layout: &mut LegendLayout,
    ) {
        let collapsed = state.legend_collapsed(category);
        let title = format!(
            "{} {}",
            heading(category),
            if collapsed { "[보이기]" } else { "[숨기기]" }
        );
        let heading = ui.add(egui::Label::new(RichText::new(title).strong()).sense(Sense::click()));
        layout.headings.push((category, heading.rect));
        if heading.clicked() {
            state.toggle_legend_collapsed(category);
        }
        if collapsed {
            return;
        }

        let showing_all = state.filter(category).is_empty();
        let label = if showing_all {
            RichText::new(SHOW_ALL).strong().underline()
        } else {
            RichText::new(SHOW_ALL)
        };
        let show_all = ui.selectable_label(showing_all, label);
        layout.show_all.push((category, show_all.rect));
        if show_all.clicked() {
            state.show_all(category);
        }
        ui.separator();

        for entry in legend_entries(category) {
            let active = state.filter(category).contains(entry.code);
            let row = ui
                .horizontal(|ui| {
                    self.swatch(ui, swatch_color(entry.color));
                    let text = RichText::new(format!("{} - {}", entry.code, entry.description));
                    let text = if active { text.strong() } else { text };
                    ui.selectable_label(active, text)
                })
                .inner;
            layout.entries.push((category, entry.code, row.rect));
            if row.clicked() {
                state.toggle_code(category, entry.code);
            }
        }
    }

    fn hiking_legend(&self, ui: &mut Ui) {
        let color = parse_hex_color(HIKING_TRAIL_COLOR).map_or(Color32::DARK_GRAY, |[r, g, b, a]| {
            Color32::from_rgba_unmultiplied(r, g, b, a)
        });
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(Vec2::new(30.0, self.style.swatch_size), Sense::hover());
            let y = rect.center().y;
            ui.painter().extend(egui::Shape::dashed_line(
                &[egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)],
                Stroke::new(2.0, color),
                5.0,
                5.0,
            ));
            ui.label(HIKING_TRAIL_LABEL);
        });
    }

    fn station_legend(&self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(self.style.swatch_size), Sense::hover());
            ui.painter().circle(
                rect.center(),
                self.style.swatch_size / 2.0 - 1.0,
                Color32::from_rgba_unmultiplied(0, 128, 0, 204),
                Stroke::new(1.5, Color32::WHITE),
            );
            ui.label(LayerCategory::MountainStationMarkers.label());
        });
    }

    fn swatch(&self, ui: &mut Ui, color: Color32) {
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(self.style.swatch_size), Sense::hover());
        ui.painter().rect_filled(rect, 0.0, color);
        ui.painter().rect_stroke(rect, 0.0, self.style.swatch_stroke);
    }
}
