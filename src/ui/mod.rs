pub mod legend;
pub mod popup;
pub mod style;
pub mod widget;

pub use legend::{LegendLayout, LegendPanel};
pub use popup::WeatherPopup;
pub use style::{AttributionStyle, PanelStyle, ViewerStyle};
pub use widget::MapView;
