use egui::Context as EguiContext;
use seascape_sky::{Parameters, Range};
use seascape_tools::SceneInspector;

use crate::session::{ParamEdit, Session};

/// Overlay visibility toggles.
pub struct UiState {
    pub show_panel: bool,
    pub show_stats: bool,
    /// Adapter name shown in the inspector.
    pub adapter: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_panel: true,
            show_stats: true,
            adapter: String::new(),
        }
    }
}

/// Edit to apply once the panel is drawn. Sun edits win since they also
/// push the water fields.
pub fn pending_edit(sun_changed: bool, water_changed: bool) -> Option<ParamEdit> {
    if sun_changed {
        Some(ParamEdit::Sun)
    } else if water_changed {
        Some(ParamEdit::Water)
    } else {
        None
    }
}

/// The decimal step an `f32` range step stands for. Widening 0.0001_f32
/// directly gives 0.000099999997, and snapping to that grid pulls 0.49
/// down to 0.48999998.
fn decimal_step(step: f32) -> f64 {
    let decimals = (-step.log10()).ceil().max(0.0) as i32;
    let scale = 10f64.powi(decimals);
    (step as f64 * scale).round() / scale
}

/// Slider over a copy of `field`. The field is only written when the user
/// moved the slider, so step rounding never leaks into idle frames.
fn slider(ui: &mut egui::Ui, label: &str, field: &mut f32, range: Range) -> bool {
    let mut value = *field;
    let changed = ui
        .add(
            egui::Slider::new(&mut value, range.min..=range.max)
                .step_by(decimal_step(range.step))
                .text(label),
        )
        .changed();
    if changed {
        *field = value;
    }
    changed
}

/// Draw the stats overlay and the parameter panel, applying edits to the
/// session as they happen.
pub fn draw(ctx: &EguiContext, state: &UiState, session: &mut Session) {
    if state.show_stats {
        let stats = &session.stats;
        egui::Window::new("stats")
            .title_bar(false)
            .resizable(false)
            .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
            .show(ctx, |ui| {
                ui.monospace(format!("{:>5.1} FPS", stats.fps()));
                ui.monospace(format!(
                    "{:.1} / {:.1} / {:.1} ms",
                    stats.min().as_secs_f32() * 1_000.0,
                    stats.average().as_secs_f32() * 1_000.0,
                    stats.max().as_secs_f32() * 1_000.0,
                ));
            });
    }

    if !state.show_panel {
        return;
    }

    let mut params = session.params;
    let mut sun_changed = false;
    let mut water_changed = false;

    egui::SidePanel::right("parameters")
        .default_width(280.0)
        .show(ctx, |ui| {
            ui.heading("Seascape");
            ui.separator();

            egui::CollapsingHeader::new("Sky")
                .default_open(true)
                .show(ui, |ui| {
                    sun_changed |= slider(
                        ui,
                        "inclination",
                        &mut params.inclination,
                        Parameters::INCLINATION,
                    );
                    sun_changed |= slider(ui, "azimuth", &mut params.azimuth, Parameters::AZIMUTH);
                });

            egui::CollapsingHeader::new("Water")
                .default_open(true)
                .show(ui, |ui| {
                    water_changed |= slider(
                        ui,
                        "distortionScale",
                        &mut params.distortion_scale,
                        Parameters::DISTORTION_SCALE,
                    );
                    water_changed |= slider(ui, "size", &mut params.size, Parameters::SIZE);
                    water_changed |= slider(ui, "alpha", &mut params.alpha, Parameters::ALPHA);
                });

            ui.separator();
            egui::CollapsingHeader::new("Inspector")
                .default_open(false)
                .show(ui, |ui| {
                    let summary = SceneInspector::summary(&session.scene);
                    ui.label(format!(
                        "Nodes: {}  Models: {}",
                        summary.node_count, summary.model_count
                    ));
                    ui.label(format!("Loads in flight: {}", session.loader.in_flight()));
                    let camera = session.camera.position();
                    ui.label(format!(
                        "Camera: ({:.1}, {:.1}, {:.1})",
                        camera.x, camera.y, camera.z
                    ));
                    ui.label(format!(
                        "Sun: ({:.3}, {:.3}, {:.3})",
                        summary.sun.x, summary.sun.y, summary.sun.z
                    ));
                    ui.label(format!("Water time: {:.2}", summary.water_time));
                    if !state.adapter.is_empty() {
                        ui.label(format!("Adapter: {}", state.adapter));
                    }
                    ui.separator();
                    for node in SceneInspector::list_nodes(&session.scene) {
                        ui.small(node.to_string());
                    }
                });

            ui.separator();
            ui.small("F1: Toggle Panel | F2: Toggle Stats | LMB: Orbit | Wheel: Zoom");
        });

    if let Some(edit) = pending_edit(sun_changed, water_changed) {
        session.set_params(params, edit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;

    #[test]
    fn sun_change_wins_over_water_change() {
        assert_eq!(pending_edit(true, true), Some(ParamEdit::Sun));
        assert_eq!(pending_edit(true, false), Some(ParamEdit::Sun));
    }

    #[test]
    fn water_change_alone_is_water_edit() {
        assert_eq!(pending_edit(false, true), Some(ParamEdit::Water));
    }

    #[test]
    fn untouched_sliders_are_no_edit() {
        assert_eq!(pending_edit(false, false), None);
    }

    #[test]
    fn decimal_steps_are_exact() {
        assert_eq!(decimal_step(0.0001), 0.0001);
        assert_eq!(decimal_step(0.001), 0.001);
        assert_eq!(decimal_step(0.1), 0.1);
    }

    #[test]
    fn default_params_sit_on_the_slider_grid() {
        let p = Parameters::default();
        for (value, range) in [
            (p.inclination, Parameters::INCLINATION),
            (p.azimuth, Parameters::AZIMUTH),
            (p.distortion_scale, Parameters::DISTORTION_SCALE),
            (p.size, Parameters::SIZE),
            (p.alpha, Parameters::ALPHA),
        ] {
            let start = range.min as f64;
            let step = decimal_step(range.step);
            let snapped = start + ((value as f64 - start) / step).round() * step;
            assert_eq!(snapped as f32, value);
        }
    }

    #[test]
    fn idle_frames_leave_params_and_sun_alone() {
        let ctx = EguiContext::default();
        let mut session = Session::new(1280, 720, SessionConfig::default());
        let sun = session.scene.sun();
        let state = UiState::default();

        for _ in 0..10 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| draw(ctx, &state, &mut session));
            assert_eq!(session.params, Parameters::default());
            assert_eq!(session.scene.sun(), sun);
        }
        assert_eq!(session.params.inclination, 0.49);
    }
}
