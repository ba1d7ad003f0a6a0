//! Map canvas and location search for `PlannerApp`.
//!
//! The canvas pans by drag and zooms with the scroll wheel over a Web
//! Mercator graticule; there is no tile layer, the projection math matches
//! the usual slippy-map coordinates. The draw tool captures one polyline at
//! a time: clicks append vertices, double click or the toolbar button
//! completes the route.

use std::time::Instant;

use eframe::egui;

use fibraplan::geo::{self, LngLat, RouteGeometry};

use super::{MapView, PlannerApp, SearchPanel, COLOR_ACCENT, COLOR_ERROR, MARKER_POPUP, PLACE_ZOOM};

const MAP_HEIGHT: f32 = 420.0;
const MIN_ZOOM: f64 = 3.0;
const MAX_ZOOM: f64 = 19.0;
const SCROLL_ZOOM_RATE: f64 = 0.005;
/// Minimum on-screen spacing between graticule lines.
const GRID_SPACING_PX: f64 = 60.0;

const MAP_BG: egui::Color32 = egui::Color32::from_rgb(229, 233, 236);
const GRID_LINE: egui::Color32 = egui::Color32::from_rgb(205, 211, 216);
const GRID_LABEL: egui::Color32 = egui::Color32::from_rgb(130, 140, 148);
const DRAFT_COLOR: egui::Color32 = egui::Color32::from_rgb(245, 158, 11);
const MARKER_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);

impl MapView {
    fn to_screen(&self, rect: egui::Rect, p: LngLat) -> egui::Pos2 {
        let c = geo::project(self.center, self.zoom);
        let w = geo::project(p, self.zoom);
        egui::pos2(
            rect.center().x + (w[0] - c[0]) as f32,
            rect.center().y + (w[1] - c[1]) as f32,
        )
    }

    fn from_screen(&self, rect: egui::Rect, pos: egui::Pos2) -> LngLat {
        let c = geo::project(self.center, self.zoom);
        geo::unproject(
            c[0] + f64::from(pos.x - rect.center().x),
            c[1] + f64::from(pos.y - rect.center().y),
            self.zoom,
        )
    }
}

/// Largest graticule step (in degrees) that still keeps lines at least
/// [`GRID_SPACING_PX`] apart.
fn graticule_step(zoom: f64) -> f64 {
    const CANDIDATES: [f64; 14] = [
        20.0, 10.0, 5.0, 2.0, 1.0, 0.5, 0.2, 0.1, 0.05, 0.02, 0.01, 0.005, 0.002, 0.001,
    ];
    let px_per_deg = geo::world_extent(zoom) / 360.0;
    let mut step = CANDIDATES[0];
    for s in CANDIDATES {
        if s * px_per_deg >= GRID_SPACING_PX {
            step = s;
        }
    }
    step
}

fn format_deg(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else if step >= 0.1 {
        1
    } else if step >= 0.01 {
        2
    } else {
        3
    };
    format!("{:.*}°", decimals, value)
}

impl PlannerApp {
    pub fn draw_map_section(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (edit_rect, button_rect) = self.draw_search_row(ui, ctx);
        ui.add_space(6.0);
        self.draw_canvas(ui);
        let popup_rect = self.draw_search_results(ctx, edit_rect);
        self.dismiss_search_on_outside_click(ctx, edit_rect, button_rect, popup_rect);
    }

    // ── Search row ───────────────────────────────────────────────────────────

    fn draw_search_row(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) -> (egui::Rect, egui::Rect) {
        let inner = ui.horizontal(|ui| {
            let edit = ui.add_sized(
                [280.0, 24.0],
                egui::TextEdit::singleline(&mut self.search_input)
                    .hint_text("Buscar ubicación..."),
            );
            if edit.changed() {
                // each keystroke replaces the pending lookup; short queries
                // cancel it and hide the panel
                if !self.search_debounce.schedule(&self.search_input, Instant::now()) {
                    self.search_panel = SearchPanel::Hidden;
                }
            }
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                let query = self.search_input.clone();
                self.trigger_search(ctx, query);
            }

            let button = ui.button("Buscar");
            if button.clicked() {
                let query = self.search_input.clone();
                self.trigger_search(ctx, query);
            }

            ui.separator();

            if ui.selectable_label(self.draw.active, "Dibujar ruta").clicked() {
                if self.draw.active {
                    self.cancel_drawing();
                } else {
                    self.draw.active = true;
                    self.draw.vertices.clear();
                }
            }
            let can_finish =
                self.draw.active && self.draw.vertices.len() >= RouteGeometry::MIN_VERTICES;
            if ui
                .add_enabled(can_finish, egui::Button::new("Finalizar"))
                .clicked()
            {
                self.complete_route();
            }
            if self.draw.active && ui.button("Cancelar").clicked() {
                self.cancel_drawing();
            }

            (edit.rect, button.rect)
        });
        inner.inner
    }

    // ── Canvas ───────────────────────────────────────────────────────────────

    fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let size = egui::vec2(ui.available_width(), MAP_HEIGHT);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
        let rect = response.rect;
        let painter = painter.with_clip_rect(rect);

        painter.rect_filled(rect, 6.0, MAP_BG);

        // zoom at the wheel, pan by drag (drag is reserved while drawing)
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.map.zoom =
                    (self.map.zoom + f64::from(scroll) * SCROLL_ZOOM_RATE).clamp(MIN_ZOOM, MAX_ZOOM);
            }
        }
        if response.dragged() && !self.draw.active {
            let delta = response.drag_delta();
            let c = geo::project(self.map.center, self.map.zoom);
            self.map.center = geo::unproject(
                c[0] - f64::from(delta.x),
                c[1] - f64::from(delta.y),
                self.map.zoom,
            );
        }

        self.paint_graticule(&painter, rect);
        self.paint_route(&painter, rect);
        self.paint_draft(&painter, rect, &response);
        self.paint_marker(&painter, rect);

        if self.draw.active {
            painter.text(
                rect.left_top() + egui::vec2(8.0, 8.0),
                egui::Align2::LEFT_TOP,
                "Clic: añadir vértice · Doble clic: finalizar · Esc: cancelar",
                egui::FontId::proportional(12.0),
                GRID_LABEL,
            );
            if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.cancel_drawing();
            }
            if response.double_clicked() {
                self.complete_route();
            } else if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    self.draw.vertices.push(self.map.from_screen(rect, pos));
                }
            }
        }

        if let Some(hover) = response.hover_pos() {
            let p = self.map.from_screen(rect, hover);
            painter.text(
                rect.left_bottom() + egui::vec2(8.0, -8.0),
                egui::Align2::LEFT_BOTTOM,
                format!("{:.5}, {:.5}", p.lat, p.lon),
                egui::FontId::monospace(11.0),
                GRID_LABEL,
            );
        }
    }

    fn paint_graticule(&self, painter: &egui::Painter, rect: egui::Rect) {
        let step = graticule_step(self.map.zoom);
        let stroke = egui::Stroke::new(1.0, GRID_LINE);
        let font = egui::FontId::proportional(10.0);

        let top_left = self.map.from_screen(rect, rect.min);
        let bottom_right = self.map.from_screen(rect, rect.max);

        let start = (top_left.lon / step).floor() as i64;
        let end = (bottom_right.lon / step).ceil() as i64;
        for k in start..=end {
            let lon = k as f64 * step;
            let x = self.map.to_screen(rect, LngLat::new(lon, self.map.center.lat)).x;
            painter.line_segment(
                [egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())],
                stroke,
            );
            painter.text(
                egui::pos2(x + 3.0, rect.bottom() - 3.0),
                egui::Align2::LEFT_BOTTOM,
                format_deg(lon, step),
                font.clone(),
                GRID_LABEL,
            );
        }

        // screen y grows downward, so latitudes run from bottom_right up
        let start = (bottom_right.lat / step).floor() as i64;
        let end = (top_left.lat / step).ceil() as i64;
        for k in start..=end {
            let lat = k as f64 * step;
            let y = self.map.to_screen(rect, LngLat::new(self.map.center.lon, lat)).y;
            painter.line_segment(
                [egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)],
                stroke,
            );
            painter.text(
                egui::pos2(rect.right() - 3.0, y - 2.0),
                egui::Align2::RIGHT_BOTTOM,
                format_deg(lat, step),
                font.clone(),
                GRID_LABEL,
            );
        }
    }

    fn paint_route(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(route) = &self.route else { return };
        let points: Vec<egui::Pos2> = route
            .vertices()
            .iter()
            .map(|p| self.map.to_screen(rect, *p))
            .collect();
        for w in points.windows(2) {
            painter.line_segment([w[0], w[1]], egui::Stroke::new(3.0, COLOR_ACCENT));
        }
        for p in &points {
            painter.circle_filled(*p, 3.5, COLOR_ACCENT);
        }
    }

    fn paint_draft(&self, painter: &egui::Painter, rect: egui::Rect, response: &egui::Response) {
        if !self.draw.active {
            return;
        }
        let points: Vec<egui::Pos2> = self
            .draw
            .vertices
            .iter()
            .map(|p| self.map.to_screen(rect, *p))
            .collect();
        for w in points.windows(2) {
            painter.line_segment([w[0], w[1]], egui::Stroke::new(2.5, DRAFT_COLOR));
        }
        if let (Some(last), Some(hover)) = (points.last(), response.hover_pos()) {
            painter.line_segment([*last, hover], egui::Stroke::new(1.0, DRAFT_COLOR));
        }
        for p in &points {
            painter.circle_filled(*p, 3.5, DRAFT_COLOR);
        }
    }

    fn paint_marker(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(position) = self.marker else { return };
        let p = self.map.to_screen(rect, position);
        painter.circle_filled(p, 6.0, MARKER_COLOR);
        painter.circle_stroke(p, 6.0, egui::Stroke::new(1.5, egui::Color32::WHITE));

        let galley = painter.layout_no_wrap(
            MARKER_POPUP.to_string(),
            egui::FontId::proportional(12.0),
            egui::Color32::BLACK,
        );
        let bubble = egui::Rect::from_center_size(
            egui::pos2(p.x, p.y - 24.0),
            galley.size() + egui::vec2(12.0, 8.0),
        );
        painter.rect_filled(bubble, 4.0, egui::Color32::WHITE);
        painter.galley(
            bubble.min + egui::vec2(6.0, 4.0),
            galley,
            egui::Color32::BLACK,
        );
    }

    // ── Results popup ────────────────────────────────────────────────────────

    fn draw_search_results(
        &mut self,
        ctx: &egui::Context,
        anchor: egui::Rect,
    ) -> Option<egui::Rect> {
        if matches!(self.search_panel, SearchPanel::Hidden) {
            return None;
        }

        let mut selected = None;
        let area = egui::Area::new(egui::Id::new("search_results"))
            .fixed_pos(anchor.left_bottom() + egui::vec2(0.0, 4.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(340.0);
                    match &self.search_panel {
                        SearchPanel::Hidden => {}
                        SearchPanel::Loading => {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label("Buscando...");
                            });
                        }
                        SearchPanel::Empty => {
                            ui.label("No se encontraron resultados");
                        }
                        SearchPanel::Error => {
                            ui.colored_label(COLOR_ERROR, "Error al buscar. Intenta nuevamente.");
                        }
                        SearchPanel::Results(places) => {
                            for (i, place) in places.iter().enumerate() {
                                if i > 0 {
                                    ui.separator();
                                }
                                let Some(position) = place.position() else { continue };
                                let row = ui
                                    .vertical(|ui| {
                                        ui.label(egui::RichText::new(place.name()).strong());
                                        ui.label(
                                            egui::RichText::new(place.display_name.as_str())
                                                .size(11.0)
                                                .weak(),
                                        );
                                    })
                                    .response
                                    .interact(egui::Sense::click())
                                    .on_hover_cursor(egui::CursorIcon::PointingHand);
                                if row.clicked() {
                                    selected = Some(position);
                                }
                            }
                        }
                    }
                });
            });

        let rect = area.response.rect;
        if let Some(position) = selected {
            self.select_place(position);
        }
        Some(rect)
    }

    fn select_place(&mut self, position: LngLat) {
        log::debug!("ubicación seleccionada: {:.4}, {:.4}", position.lat, position.lon);
        self.map.center = position;
        self.map.zoom = PLACE_ZOOM;
        self.marker = Some(position);
        self.search_input.clear();
        self.search_debounce.cancel();
        self.search_panel = SearchPanel::Hidden;
    }

    fn dismiss_search_on_outside_click(
        &mut self,
        ctx: &egui::Context,
        edit: egui::Rect,
        button: egui::Rect,
        popup: Option<egui::Rect>,
    ) {
        if matches!(self.search_panel, SearchPanel::Hidden) {
            return;
        }
        if !ctx.input(|i| i.pointer.any_pressed()) {
            return;
        }
        let Some(pos) = ctx.input(|i| i.pointer.interact_pos()) else {
            return;
        };
        let inside =
            edit.contains(pos) || button.contains(pos) || popup.is_some_and(|r| r.contains(pos));
        if !inside {
            self.search_panel = SearchPanel::Hidden;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graticule_step_shrinks_with_zoom() {
        assert!(graticule_step(12.0) < graticule_step(6.0));
        // spacing stays readable at both ends
        for zoom in [MIN_ZOOM, 8.0, 12.0, MAX_ZOOM] {
            let px = graticule_step(zoom) * geo::world_extent(zoom) / 360.0;
            assert!(px >= GRID_SPACING_PX, "zoom {zoom}: spacing {px}");
        }
    }

    #[test]
    fn degree_labels_match_step_precision() {
        assert_eq!(format_deg(-80.0, 5.0), "-80°");
        assert_eq!(format_deg(-79.95, 0.05), "-79.95°");
        assert_eq!(format_deg(-2.2, 0.2), "-2.2°");
    }

    #[test]
    fn screen_projection_roundtrip() {
        let view = MapView {
            center: super::super::MAP_CENTER,
            zoom: 12.0,
        };
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 420.0));
        let p = LngLat::new(-79.9, -2.16);
        let screen = view.to_screen(rect, p);
        let back = view.from_screen(rect, screen);
        assert!((back.lon - p.lon).abs() < 1e-4);
        assert!((back.lat - p.lat).abs() < 1e-4);
    }

    #[test]
    fn map_center_lands_on_canvas_center() {
        let view = MapView {
            center: super::super::MAP_CENTER,
            zoom: 12.0,
        };
        let rect = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(800.0, 420.0));
        let screen = view.to_screen(rect, view.center);
        assert!((screen.x - rect.center().x).abs() < 1e-3);
        assert!((screen.y - rect.center().y).abs() < 1e-3);
    }
}
