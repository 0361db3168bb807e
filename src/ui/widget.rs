//! Map widget: paints the mounted surface and turns pointer input into
//! viewport changes and station clicks

use crate::core::config::TileLoadingConfig;
use crate::core::geo::{LatLngBounds, Point};
use crate::core::viewport::Viewport;
use crate::layers::base::LayerTrait;
use crate::layers::marker::MarkerLayer;
use crate::layers::vector::VectorLayer;
use crate::layers::GroupLayer;
use crate::state::UiState;
use crate::surface::MapSurface;
use crate::tiles::cache::{TileCache, TileEntry};
use crate::tiles::loader::{decode_tile, TileLoader};
use crate::tiles::source::TileSource;
use crate::ui::style::ViewerStyle;
use egui::{Color32, Painter, Pos2, Rect, Response, Sense, Shape, Stroke, TextureHandle, Ui, Vec2};

/// Zoom levels per scroll pixel
const SCROLL_ZOOM_RATE: f64 = 0.002;

/// Stateful map view kept by the app across frames.
///
/// Owns the tile pipeline (loader plus texture cache); layer handles stay on
/// the [`MapSurface`].
pub struct MapView {
    loader: TileLoader,
    textures: TileCache<TextureHandle>,
    style: ViewerStyle,
}

impl MapView {
    pub fn new(config: &TileLoadingConfig) -> Self {
        Self {
            loader: TileLoader::new(config),
            textures: TileCache::new(config.cache_size),
            style: ViewerStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ViewerStyle) -> Self {
        self.style = style;
        self
    }

    pub fn style(&self) -> &ViewerStyle {
        &self.style
    }

    /// Drops every cached texture, e.g. after a remount
    pub fn clear_tiles(&mut self) {
        self.textures.clear();
    }

    pub fn show(&mut self, ui: &mut Ui, surface: &mut MapSurface, state: &mut UiState) -> Response {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, self.style.background_color);

        let Some(viewport) = surface.viewport_mut() else {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Loading map...",
                egui::FontId::proportional(16.0),
                self.style.placeholder_text_color,
            );
            return response;
        };

        viewport.set_size(Point::new(rect.width() as f64, rect.height() as f64));
        handle_input(ui, &response, rect, viewport);

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = pos - rect.min;
                let outcome = surface.click(Point::new(local.x as f64, local.y as f64));
                log::debug!("map click at {:?}: {:?}", local, outcome);
                state.apply_click(outcome);
            }
        }

        self.receive_tiles(ui.ctx());
        self.loader.begin_frame();

        let Some(viewport) = surface.viewport().cloned() else {
            return response;
        };

        if let Some(base) = surface.base_layer().filter(|l| l.is_visible()) {
            self.paint_tiles(&painter, rect, &viewport, base.source(), base.opacity());
        }
        for layer in surface.tile_layers() {
            if layer.is_visible() && layer.opacity() > 0.0 {
                self.paint_tiles(&painter, rect, &viewport, layer.source(), layer.opacity());
            }
        }
        for layer in surface.group_layers() {
            match layer {
                GroupLayer::Vector(vector) if vector.is_visible() => {
                    paint_lines(&painter, rect, &viewport, vector)
                }
                GroupLayer::Markers(markers) if markers.is_visible() => {
                    paint_markers(&painter, rect, &viewport, markers)
                }
                _ => {}
            }
        }

        if let Some(base) = surface.base_layer() {
            self.paint_attribution(&painter, rect, base.attribution());
        }

        if self.loader.in_flight() > 0 || surface.pending_loads() > 0 {
            ui.ctx().request_repaint();
        }
        response
    }

    fn receive_tiles(&mut self, ctx: &egui::Context) {
        for response in self.loader.drain() {
            match response.data.and_then(|bytes| decode_tile(&bytes)) {
                Ok(image) => {
                    let texture =
                        ctx.load_texture(response.url.clone(), image, egui::TextureOptions::LINEAR);
                    self.textures.insert_ready(response.url, texture);
                }
                Err(e) => {
                    log::debug!("tile {} failed: {}", response.url, e);
                    self.textures.mark_failed(response.url);
                }
            }
        }
    }

    fn paint_tiles(
        &mut self,
        painter: &Painter,
        rect: Rect,
        viewport: &Viewport,
        source: &dyn TileSource,
        opacity: f32,
    ) {
        let tint = Color32::WHITE.gamma_multiply(opacity.clamp(0.0, 1.0));
        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));

        for tile in viewport.visible_tiles(source.max_zoom()) {
            let url = source.url(tile.coord);
            let tile_rect = Rect::from_min_size(
                rect.min + Vec2::new(tile.offset.x as f32, tile.offset.y as f32),
                Vec2::splat(tile.size as f32),
            );

            match self.textures.get(&url) {
                Some(TileEntry::Ready(texture)) => {
                    painter.image(texture.id(), tile_rect, uv, tint);
                }
                Some(_) => {}
                None => {
                    if self.loader.request(&url) {
                        self.textures.mark_pending(url);
                    }
                }
            }
        }
    }

    fn paint_attribution(&self, painter: &Painter, rect: Rect, text: &str) {
        if text.is_empty() {
            return;
        }
        let style = &self.style.attribution;
        let galley = painter.layout_no_wrap(text.to_string(), style.font_id.clone(), style.text_color);
        let size = galley.size() + Vec2::splat(style.padding * 2.0);
        let bg = Rect::from_min_size(
            rect.right_bottom() - size - Vec2::splat(style.margin),
            size,
        );
        painter.rect_filled(bg, 2.0, style.background_color);
        painter.galley(bg.min + Vec2::splat(style.padding), galley, style.text_color);
    }
}

fn handle_input(ui: &Ui, response: &Response, rect: Rect, viewport: &mut Viewport) {
    if response.dragged() {
        let delta = response.drag_delta();
        if delta != Vec2::ZERO {
            // Content follows the pointer
            viewport.pan(Point::new(-delta.x as f64, -delta.y as f64));
        }
    }

    if response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll.abs() > 0.1 {
            let focus = ui
                .input(|i| i.pointer.hover_pos())
                .map(|pos| pos - rect.min)
                .map(|v| Point::new(v.x as f64, v.y as f64));
            viewport.zoom_to(viewport.zoom + scroll as f64 * SCROLL_ZOOM_RATE, focus);
        }
    }
}

fn to_screen(rect: Rect, viewport: &Viewport, lat_lng: &crate::core::geo::LatLng) -> Pos2 {
    let p = viewport.lat_lng_to_pixel(lat_lng);
    rect.min + Vec2::new(p.x as f32, p.y as f32)
}

fn paint_lines(painter: &Painter, rect: Rect, viewport: &Viewport, layer: &VectorLayer) {
    let style = layer.style();
    let stroke = Stroke::new(style.width, Color32::from(style.color.faded(layer.opacity())));
    let view: LatLngBounds = viewport.bounds();
    let (dash, gap) = match style.dash_pattern.as_slice() {
        [dash, gap, ..] => (*dash, *gap),
        [dash] => (*dash, *dash),
        [] => (0.0, 0.0),
    };

    for feature in layer.source().features() {
        if feature
            .geometry
            .bounds()
            .is_some_and(|b| !b.intersects(&view))
        {
            continue;
        }
        for line in feature.geometry.lines() {
            if line.len() < 2 {
                continue;
            }
            let points: Vec<Pos2> = line.iter().map(|p| to_screen(rect, viewport, p)).collect();
            if style.is_dashed() {
                painter.extend(Shape::dashed_line(&points, stroke, dash, gap));
            } else {
                painter.add(Shape::line(points, stroke));
            }
        }
    }
}

fn paint_markers(painter: &Painter, rect: Rect, viewport: &Viewport, layer: &MarkerLayer) {
    let style = layer.style();
    let opacity = layer.opacity();
    let fill = Color32::from(style.fill_color.faded(opacity));
    let stroke = Stroke::new(style.stroke_width, Color32::from(style.stroke_color.faded(opacity)));
    let reach = rect.expand(style.radius + style.stroke_width);

    for feature in layer.features() {
        let center = to_screen(rect, viewport, &feature.position);
        if reach.contains(center) {
            painter.circle(center, style.radius, fill, stroke);
        }
    }
}
