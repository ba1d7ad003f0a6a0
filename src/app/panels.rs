//! Static panels for `PlannerApp`: navbar, auth screen, the configuration
//! form, and the recommendation panels with their skeleton loading state.

use std::time::Instant;

use eframe::egui;

use fibraplan::auth::{AuthView, LOGIN_REDIRECT_DELAY};
use fibraplan::form;
use fibraplan::report;

use super::{
    AnalysisView, PlannerApp, Screen, StatusLine, COLOR_ACCENT, COLOR_ERROR, COLOR_OK,
    NAVBAR_SCROLL_THRESHOLD,
};

const NAVBAR_FILL: egui::Color32 = egui::Color32::from_rgb(31, 41, 55);
const NAVBAR_FILL_SCROLLED: egui::Color32 = egui::Color32::from_rgb(17, 24, 39);

/// The navbar switches style once the page has scrolled past the threshold.
pub fn navbar_elevated(scroll_offset: f32) -> bool {
    scroll_offset > NAVBAR_SCROLL_THRESHOLD
}

impl PlannerApp {
    // ── Planner layout ───────────────────────────────────────────────────────

    pub fn draw_planner(&mut self, ctx: &egui::Context) {
        self.draw_navbar(ctx, navbar_elevated(self.scroll_offset));

        egui::SidePanel::right("form_panel")
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_form_panel(ui, ctx);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let output = egui::ScrollArea::vertical().show(ui, |ui| {
                self.draw_map_section(ui, ctx);
                ui.add_space(16.0);
                self.draw_recommendations(ui);
                ui.add_space(24.0);
            });
            self.scroll_offset = output.state.offset.y;
        });
    }

    fn draw_navbar(&mut self, ctx: &egui::Context, elevated: bool) {
        let fill = if elevated { NAVBAR_FILL_SCROLLED } else { NAVBAR_FILL };
        let frame = egui::Frame::default()
            .fill(fill)
            .inner_margin(egui::Margin::symmetric(12.0, 8.0));
        egui::TopBottomPanel::top("navbar").frame(frame).show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new("Fibraplan")
                        .size(18.0)
                        .strong()
                        .color(egui::Color32::WHITE),
                );
                ui.label(
                    egui::RichText::new("Planificador de rutas FTTH")
                        .size(12.0)
                        .color(egui::Color32::from_gray(170)),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Salir").clicked() {
                        self.screen = Screen::Auth;
                    }
                    ui.label(
                        egui::RichText::new(self.api.base().as_str())
                            .size(11.0)
                            .color(egui::Color32::from_gray(140)),
                    );
                });
            });
        });
    }

    // ── Auth screen ──────────────────────────────────────────────────────────

    pub fn draw_auth_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.label(egui::RichText::new("Fibraplan").size(26.0).strong());
                ui.label(egui::RichText::new("Planificador de rutas FTTH").weak());
                ui.add_space(20.0);

                egui::Frame::group(ui.style())
                    .inner_margin(egui::Margin::same(18.0))
                    .show(ui, |ui| {
                        ui.set_width(320.0);
                        match self.auth.view {
                            AuthView::Login => self.draw_login_form(ui),
                            AuthView::Register => self.draw_register_form(ui),
                        }
                        if let Some(notice) = &self.auth.notice {
                            ui.add_space(8.0);
                            let color = if notice.is_error { COLOR_ERROR } else { COLOR_OK };
                            ui.colored_label(color, &notice.text);
                        }
                    });
            });
        });
    }

    fn draw_login_form(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Iniciar sesión").size(16.0).strong());
        ui.add_space(8.0);
        ui.label("Correo");
        ui.text_edit_singleline(&mut self.auth.login_email);
        ui.label("Contraseña");
        ui.add(egui::TextEdit::singleline(&mut self.auth.login_password).password(true));
        ui.add_space(10.0);

        let logging_in = self.auth_redirect_at.is_some();
        if ui
            .add_enabled(!logging_in, egui::Button::new("Entrar"))
            .clicked()
        {
            self.auth.submit_login();
            self.auth_redirect_at = Some(Instant::now() + LOGIN_REDIRECT_DELAY);
        }
        ui.add_space(6.0);
        if ui.link("¿No tienes cuenta? Regístrate").clicked() {
            self.auth.switch_to_register();
        }
    }

    fn draw_register_form(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Crear cuenta").size(16.0).strong());
        ui.add_space(8.0);
        ui.label("Nombre");
        ui.text_edit_singleline(&mut self.auth.reg_name);
        ui.label("Correo");
        ui.text_edit_singleline(&mut self.auth.reg_email);
        ui.label("Contraseña");
        ui.add(egui::TextEdit::singleline(&mut self.auth.reg_password).password(true));
        ui.label("Confirmar contraseña");
        ui.add(egui::TextEdit::singleline(&mut self.auth.reg_confirm).password(true));
        ui.add_space(10.0);

        if ui.button("Registrarse").clicked() {
            self.auth.submit_register();
        }
        ui.add_space(6.0);
        if ui.link("¿Ya tienes cuenta? Inicia sesión").clicked() {
            self.auth.switch_to_login();
        }
    }

    // ── Configuration form ───────────────────────────────────────────────────

    fn draw_form_panel(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.heading("Configuración");
        ui.add_space(8.0);

        ui.label("Arquitectura");
        let prev = self.form.arquitectura;
        egui::ComboBox::from_id_salt("arquitectura")
            .selected_text(prev.map(|c| c.label).unwrap_or("Selecciona..."))
            .show_ui(ui, |ui| {
                for c in form::ARCHITECTURES {
                    ui.selectable_value(&mut self.form.arquitectura, Some(*c), c.label);
                }
            });
        if self.form.arquitectura != prev {
            // the dependent dropdown resets with its parent
            self.form.subconfig = None;
        }

        if let Some(arch) = self.form.arquitectura {
            if let Some(heading) = form::subconfig_heading(arch.value) {
                ui.add_space(4.0);
                ui.label(heading);
                egui::ComboBox::from_id_salt("subconfig")
                    .selected_text(self.form.subconfig.map(|c| c.label).unwrap_or("Selecciona..."))
                    .show_ui(ui, |ui| {
                        for c in form::subconfig_options(arch.value) {
                            ui.selectable_value(&mut self.form.subconfig, Some(*c), c.label);
                        }
                    });
            }
        }

        ui.add_space(4.0);
        ui.label("Split");
        egui::ComboBox::from_id_salt("split")
            .selected_text(self.form.split.map(|c| c.label).unwrap_or("Selecciona..."))
            .show_ui(ui, |ui| {
                for c in form::SPLITS {
                    ui.selectable_value(&mut self.form.split, Some(*c), c.label);
                }
            });

        ui.add_space(4.0);
        ui.label("Enfoque");
        egui::ComboBox::from_id_salt("enfoque")
            .selected_text(self.form.enfoque.map(|c| c.label).unwrap_or("Selecciona..."))
            .show_ui(ui, |ui| {
                for c in form::ENFOQUES {
                    ui.selectable_value(&mut self.form.enfoque, Some(*c), c.label);
                }
            });

        ui.add_space(4.0);
        ui.label("Estudio de factibilidad (clientes)");
        let feasibility = ui.add(
            egui::TextEdit::singleline(&mut self.form.factibilidad).hint_text("Ej. 150"),
        );
        if self.focus_feasibility {
            feasibility.request_focus();
            self.focus_feasibility = false;
        }

        ui.add_space(10.0);
        let save_label = if self.saved_label_until.is_some() {
            "Guardado ✓"
        } else {
            "Guardar"
        };
        if ui.button(save_label).clicked() {
            self.start_save(ctx);
        }
        if let Some(StatusLine { text, color }) = &self.status {
            ui.colored_label(*color, text);
        }

        ui.add_space(10.0);
        ui.separator();
        ui.label(egui::RichText::new("Ruta").strong());
        match &self.route {
            Some(route) => {
                ui.label(format!(
                    "{} vértices · {:.2} km",
                    route.vertices().len(),
                    route.length_km()
                ));
            }
            None => {
                ui.label(egui::RichText::new("Sin ruta dibujada").weak());
            }
        }

        ui.add_space(6.0);
        let can_collect = self.route.is_some() && !self.collect_in_flight();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_collect, egui::Button::new("Obtener Datos"))
                .clicked()
            {
                self.start_collect(ctx);
            }
            if self.collect_in_flight() {
                ui.spinner();
            }
        });

        let analyzing = self.analysis_loading();
        let can_analyze = self.data_id.is_some() && !analyzing;
        ui.horizontal(|ui| {
            let label = if analyzing {
                "Analizando con IA..."
            } else {
                "Analizar Entorno"
            };
            if ui
                .add_enabled(can_analyze, egui::Button::new(label))
                .clicked()
            {
                self.start_analysis(ctx);
            }
            if analyzing {
                ui.spinner();
            }
        });
    }

    // ── Recommendations ──────────────────────────────────────────────────────

    fn draw_recommendations(&mut self, ui: &mut egui::Ui) {
        ui.heading("Recomendaciones");
        ui.add_space(6.0);

        let stroke = if self.highlight_until.is_some() {
            egui::Stroke::new(2.0, COLOR_ACCENT)
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke
        };
        let frame = egui::Frame::group(ui.style())
            .stroke(stroke)
            .inner_margin(egui::Margin::same(12.0));
        let inner = frame.show(ui, |ui| {
            ui.set_width(ui.available_width());
            self.draw_summary_box(ui);
            ui.add_space(12.0);
            ui.separator();
            ui.add_space(8.0);
            self.draw_detailed_box(ui);
        });

        if self.pending_scroll {
            ui.scroll_to_rect(inner.response.rect, Some(egui::Align::TOP));
            self.pending_scroll = false;
        }
    }

    fn draw_summary_box(&self, ui: &mut egui::Ui) {
        match &self.analysis_view {
            AnalysisView::Empty => {
                ui.label(
                    egui::RichText::new(
                        "Dibuja una ruta, obtén los datos y ejecuta el análisis con IA.",
                    )
                    .weak(),
                );
            }
            AnalysisView::Skeleton => {
                draw_skeleton(ui, &[0.35, 0.9, 0.7, 0.45]);
            }
            AnalysisView::ServerError { error, fallback } => {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new("Error:").strong().color(COLOR_ERROR));
                    ui.label(egui::RichText::new(error).color(COLOR_ERROR));
                });
                ui.label(fallback);
            }
            AnalysisView::TransportError(message) => {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new("Error:").strong().color(COLOR_ERROR));
                    ui.label(egui::RichText::new(message).color(COLOR_ERROR));
                });
                ui.label("Verifica tu conexión o intenta nuevamente.");
            }
            AnalysisView::Report(resp) => {
                ui.label(
                    egui::RichText::new("Análisis con IA completado exitosamente").strong(),
                );
                ui.add_space(4.0);
                let analysis = resp.route_analysis.clone().unwrap_or_default();
                let zone = if analysis.zone_type.is_empty() {
                    "N/A"
                } else {
                    analysis.zone_type.as_str()
                };
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new("Longitud:").strong());
                    ui.label(format!("{} km", analysis.length_km));
                    ui.separator();
                    ui.label(egui::RichText::new("Zona:").strong());
                    ui.label(zone);
                    ui.separator();
                    ui.label(egui::RichText::new("Modelo:").strong());
                    ui.label(resp.model_name());
                });
            }
        }
    }

    fn draw_detailed_box(&self, ui: &mut egui::Ui) {
        match &self.analysis_view {
            // server errors leave the detailed panel untouched
            AnalysisView::Empty
            | AnalysisView::ServerError { .. }
            | AnalysisView::TransportError(_) => {}
            AnalysisView::Skeleton => {
                draw_skeleton(ui, &[0.3, 0.95, 0.9, 0.6, 0.9, 0.55, 0.85, 0.4, 0.9, 0.65]);
            }
            AnalysisView::Report(resp) => {
                ui.label(
                    egui::RichText::new("Recomendaciones Generadas por IA")
                        .size(16.0)
                        .strong()
                        .color(COLOR_ACCENT),
                );
                ui.add_space(6.0);
                egui::Frame::default()
                    .fill(egui::Color32::from_rgba_unmultiplied(37, 99, 235, 16))
                    .rounding(6.0)
                    .inner_margin(egui::Margin::same(10.0))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new("Configuración analizada:").strong());
                        ui.label(resp.configuration_line());
                    });
                ui.add_space(8.0);
                match resp.ai_recommendations.as_deref() {
                    Some(text) => report::render_report(ui, text),
                    None => {
                        ui.label(
                            egui::RichText::new("Sin recomendaciones en la respuesta.").weak(),
                        );
                    }
                }
            }
        }
    }

    // ── Modal alert ──────────────────────────────────────────────────────────

    pub fn draw_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else { return };
        let mut close = false;
        egui::Window::new("Aviso")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("Aceptar").clicked() {
                        close = true;
                    }
                });
            });
        if close {
            self.alert = None;
        }
    }
}

/// Placeholder bars shown while the analysis is pending. The first width is
/// drawn taller, as a title line.
fn draw_skeleton(ui: &mut egui::Ui, widths: &[f32]) {
    let t = ui.input(|i| i.time);
    let pulse = 0.55 + 0.25 * (((t * 2.5).sin() as f32) + 1.0) / 2.0;
    let color = ui
        .visuals()
        .widgets
        .noninteractive
        .bg_fill
        .linear_multiply(pulse);
    for (i, w) in widths.iter().enumerate() {
        let height = if i == 0 { 16.0 } else { 10.0 };
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width() * w, height),
            egui::Sense::hover(),
        );
        ui.painter().rect_filled(rect, 4.0, color);
        ui.add_space(6.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navbar_elevates_past_the_threshold() {
        assert!(!navbar_elevated(0.0));
        assert!(!navbar_elevated(50.0));
        assert!(navbar_elevated(50.1));
        assert!(navbar_elevated(400.0));
    }
}
