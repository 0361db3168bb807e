use crate::legend::Rgba;
use egui::{Color32, FontId, Stroke};

/// Colors and sizes shared by the map widget and its overlays
#[derive(Debug, Clone)]
pub struct ViewerStyle {
    /// Background color when no tiles are loaded
    pub background_color: Color32,
    /// Text shown while the surface is not mounted
    pub placeholder_text_color: Color32,
    pub attribution: AttributionStyle,
    pub panel: PanelStyle,
}

/// Style for attribution text
#[derive(Debug, Clone)]
pub struct AttributionStyle {
    pub text_color: Color32,
    pub background_color: Color32,
    pub font_id: FontId,
    pub padding: f32,
    /// Distance from the bottom-right corner
    pub margin: f32,
}

/// Style for the floating legend and weather windows
#[derive(Debug, Clone)]
pub struct PanelStyle {
    /// rgba(255, 255, 255, 0.9)
    pub fill: Color32,
    pub stroke: Stroke,
    pub rounding: f32,
    pub width: f32,
    pub swatch_size: f32,
    pub swatch_stroke: Stroke,
    /// Background of selected legend rows (#eee)
    pub highlight: Color32,
}

impl Default for ViewerStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::from_rgb(230, 230, 230),
            placeholder_text_color: Color32::from_gray(100),
            attribution: AttributionStyle::default(),
            panel: PanelStyle::default(),
        }
    }
}

impl Default for AttributionStyle {
    fn default() -> Self {
        Self {
            text_color: Color32::from_gray(60),
            background_color: Color32::from_rgba_unmultiplied(255, 255, 255, 180),
            font_id: FontId::proportional(10.0),
            padding: 4.0,
            margin: 2.0,
        }
    }
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            fill: Color32::from_rgba_unmultiplied(255, 255, 255, 230),
            stroke: Stroke::new(1.0, Color32::from_gray(0xcc)),
            rounding: 5.0,
            width: 250.0,
            swatch_size: 16.0,
            swatch_stroke: Stroke::new(1.0, Color32::from_gray(0x33)),
            highlight: Color32::from_gray(0xee),
        }
    }
}

impl PanelStyle {
    pub fn frame(&self) -> egui::Frame {
        egui::Frame::window(&egui::Style::default())
            .fill(self.fill)
            .stroke(self.stroke)
            .rounding(self.rounding)
            .inner_margin(10.0)
    }
}

/// Legend swatches are drawn at 80% opacity
pub fn swatch_color(color: Rgba) -> Color32 {
    let [r, g, b, a] = color;
    Color32::from_rgba_unmultiplied(r, g, b, (a as f32 * 0.8).round() as u8)
}
