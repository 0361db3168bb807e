use crate::state::UiState;
use crate::ui::style::PanelStyle;
use crate::weather::{WeatherPanel, WeatherState};
use egui::{Align2, Ui, Vec2};

/// Weather card pinned to the top-right corner of the map
#[derive(Default)]
pub struct WeatherPopup {
    style: PanelStyle,
}

impl WeatherPopup {
    pub fn new(style: PanelStyle) -> Self {
        Self { style }
    }

    /// Renders nothing while no station is selected. The close button clears
    /// the selection, which returns the panel to idle on the next frame.
    pub fn show(&self, ctx: &egui::Context, panel: &WeatherPanel, state: &mut UiState) {
        let Some(station) = panel.station().cloned() else {
            return;
        };

        egui::Area::new(egui::Id::new("firemap_weather"))
            .anchor(Align2::RIGHT_TOP, Vec2::new(-10.0, 80.0))
            .show(ctx, |ui| {
                self.style.frame().show(ui, |ui| {
                    ui.set_min_width(self.style.width);
                    ui.horizontal(|ui| {
                        ui.strong(station.name.as_str());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("✕").clicked() {
                                state.clear_selection();
                            }
                        });
                    });
                    ui.separator();
                    body(ui, panel.state(), &station.name);
                });
            });
    }
}

fn body(ui: &mut Ui, state: &WeatherState, name: &str) {
    match state {
        WeatherState::Idle => {}
        WeatherState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(format!("날씨 정보 로딩 중... ({name})"));
            });
        }
        WeatherState::Failed(message) => {
            ui.colored_label(
                egui::Color32::from_rgb(150, 0, 0),
                format!("날씨 정보 오류: {message} ({name})"),
            );
        }
        WeatherState::Ready(None) => {
            ui.label(format!("({name}) 날씨 정보가 없습니다."));
        }
        WeatherState::Ready(Some(obs)) => {
            ui.heading(format!("{} ({})", obs.station_name(name), obs.station_id()));
            ui.label(format!("관측시간: {}", obs.observed_at()));
            ui.label(format!("온도 (2m): {}°C", obs.temperature()));
            ui.label(format!("습도 (2m): {}%", obs.humidity()));
            ui.label(format!(
                "풍향 (2m): {} ({}°)",
                obs.wind_direction(),
                obs.wind_degrees()
            ));
            ui.label(format!("풍속 (2m): {} m/s", obs.wind_speed()));
            ui.label(format!("강수량: {} mm", obs.precipitation()));
        }
    }
}
