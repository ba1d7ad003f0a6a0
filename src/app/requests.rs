//! Async request lifecycles for `PlannerApp`.
//!
//! Each action spawns a worker thread owning its own blocking client and a
//! channel sender; the UI polls the matching `check_*` method every frame.
//! There is no in-flight cancellation — stale collect replies are dropped by
//! revision tag, everything else is last-write-wins.

use std::sync::mpsc;
use std::time::Instant;

use eframe::egui;

use fibraplan::debounce::MIN_QUERY_LEN;
use fibraplan::net::fetch::build_client;
use fibraplan::net::geocode;

use super::{AnalysisView, PlannerApp, SearchPanel, StatusLine, MIN_ANALYSIS_DELAY, SAVED_LABEL_REVERT, SCROLL_TRIGGER_DELAY};

impl PlannerApp {
    // ── Location search ──────────────────────────────────────────────────────

    /// Issue a lookup immediately, bypassing the debounce.
    pub fn trigger_search(&mut self, ctx: &egui::Context, query: String) {
        let query = query.trim().to_string();
        if query.chars().count() < MIN_QUERY_LEN {
            return;
        }
        self.search_debounce.cancel();
        self.search_panel = SearchPanel::Loading;

        let (tx, rx) = mpsc::channel();
        self.search_rx = Some(rx);
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = build_client().and_then(|client| geocode::search(&client, &query));
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    /// Fire the debounced lookup when due and drain the result channel.
    pub fn poll_search(&mut self, ctx: &egui::Context) {
        if let Some(query) = self.search_debounce.poll(Instant::now()) {
            self.trigger_search(ctx, query);
        }

        if let Some(rx) = &self.search_rx {
            if let Ok(result) = rx.try_recv() {
                self.search_rx = None;
                self.search_panel = match result {
                    Ok(places) if places.is_empty() => SearchPanel::Empty,
                    Ok(places) => SearchPanel::Results(places),
                    Err(e) => {
                        log::warn!("búsqueda de ubicación fallida: {}", e);
                        SearchPanel::Error
                    }
                };
            }
        }
    }

    // ── Collect ──────────────────────────────────────────────────────────────

    pub fn start_collect(&mut self, ctx: &egui::Context) {
        if self.collect_in_flight() {
            return;
        }
        let Some(route) = self.route.clone() else {
            self.alert = Some("Dibuja primero la ruta en el mapa.".to_string());
            return;
        };
        let meta = self.form.meta();
        self.status = Some(StatusLine::muted("Obteniendo datos..."));

        let (tx, rx) = mpsc::channel();
        self.collect_rx = Some(rx);
        let api = self.api.clone();
        let rev = self.route_rev;
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = api.collect(&route, meta);
            let _ = tx.send((rev, result));
            ctx.request_repaint();
        });
    }

    pub fn check_collect(&mut self) {
        let Some(rx) = &self.collect_rx else { return };
        let Ok((rev, result)) = rx.try_recv() else { return };
        self.collect_rx = None;

        if rev != self.route_rev {
            // the route was redrawn while this request was in flight
            log::warn!("descartando respuesta de una ruta reemplazada");
            return;
        }
        match result {
            Ok(resp) => {
                log::info!("datos recolectados, id {}", resp.id);
                self.data_id = Some(resp.id);
                self.status = Some(StatusLine::ok("Datos guardados ✓"));
            }
            Err(e) => {
                log::warn!("error obteniendo datos: {}", e);
                self.status = Some(StatusLine::error("Error al obtener datos"));
            }
        }
    }

    // ── Analysis ─────────────────────────────────────────────────────────────

    pub fn start_analysis(&mut self, ctx: &egui::Context) {
        if self.analysis_loading() {
            return;
        }
        let Some(data_id) = self.data_id.clone() else {
            self.alert = Some(
                "Primero debes obtener los datos de la ruta (botón \"Obtener Datos\")."
                    .to_string(),
            );
            return;
        };

        let now = Instant::now();
        self.analysis_started = Some(now);
        self.analysis_pending = None;
        self.analysis_view = AnalysisView::Skeleton;
        self.scroll_to_recs_at = Some(now + SCROLL_TRIGGER_DELAY);

        let (tx, rx) = mpsc::channel();
        self.analysis_rx = Some(rx);
        let api = self.api.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = api.generate(&data_id);
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    pub fn check_analysis(&mut self) {
        if let Some(rx) = &self.analysis_rx {
            if let Ok(result) = rx.try_recv() {
                self.analysis_rx = None;
                self.analysis_pending = Some(result);
            }
        }

        let Some(started) = self.analysis_started else { return };
        // success rendering waits out the minimum perceived-loading delay;
        // failures render as soon as they arrive
        let ready = match &self.analysis_pending {
            None => false,
            Some(Err(_)) => true,
            Some(Ok(_)) => started.elapsed() >= MIN_ANALYSIS_DELAY,
        };
        if !ready {
            return;
        }

        self.analysis_started = None;
        match self.analysis_pending.take() {
            Some(Ok(resp)) if !resp.success => {
                self.analysis_view = AnalysisView::ServerError {
                    error: resp
                        .error
                        .unwrap_or_else(|| "Error desconocido".to_string()),
                    fallback: resp.fallback_recommendations.unwrap_or_else(|| {
                        "No se pudieron generar recomendaciones.".to_string()
                    }),
                };
            }
            Some(Ok(resp)) => {
                self.analysis_view = AnalysisView::Report(resp);
            }
            Some(Err(e)) => {
                log::warn!("análisis fallido: {}", e);
                self.analysis_view = AnalysisView::TransportError(e.to_string());
            }
            None => {}
        }
    }

    // ── Config save ──────────────────────────────────────────────────────────

    pub fn start_save(&mut self, ctx: &egui::Context) {
        let payload = match self.form.config_payload() {
            Ok(payload) => payload,
            Err(e) => {
                self.status = Some(StatusLine::error(e.to_string()));
                self.focus_feasibility = true;
                return;
            }
        };

        let (tx, rx) = mpsc::channel();
        self.save_rx = Some(rx);
        let api = self.api.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = api.save_config(&payload);
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    pub fn check_save(&mut self) {
        let Some(rx) = &self.save_rx else { return };
        let Ok(result) = rx.try_recv() else { return };
        self.save_rx = None;

        match result {
            Ok(()) => {
                self.status = Some(StatusLine::ok("Guardado ✓"));
                self.saved_label_until = Some(Instant::now() + SAVED_LABEL_REVERT);
            }
            Err(e) => {
                log::warn!("error guardando configuración: {}", e);
                self.status = Some(StatusLine::error("Error al guardar"));
            }
        }
    }
}
