//! `PlannerApp` — the top-level egui application state.
//!
//! This module declares the `PlannerApp` struct, its timers, and the route
//! invariants. The methods are split across the sibling sub-modules:
//!
//! - `requests`  — async request lifecycles (search, collect, analyze, save)
//! - `map_panel` — map canvas, draw tool, location search box
//! - `panels`    — navbar, auth screen, form panel, recommendations

pub mod map_panel;
pub mod panels;
pub mod requests;

use std::sync::mpsc;
use std::time::{Duration, Instant};

use eframe::egui;

use fibraplan::auth::AuthPanel;
use fibraplan::debounce::Debounce;
use fibraplan::form::FormState;
use fibraplan::geo::{LngLat, RouteGeometry};
use fibraplan::net::api::{AnalysisResponse, ApiClient, CollectResponse, DataId};
use fibraplan::net::fetch::FetchError;
use fibraplan::net::geocode::Place;

// ─── Constants ───────────────────────────────────────────────────────────────

pub const MAP_CENTER: LngLat = LngLat {
    lon: -79.9224,
    lat: -2.1709,
};
pub const DEFAULT_ZOOM: f64 = 12.0;
pub const PLACE_ZOOM: f64 = 15.0;

pub const MARKER_POPUP: &str = "Ubicación seleccionada";

/// The navbar switches to its elevated style past this scroll offset.
pub const NAVBAR_SCROLL_THRESHOLD: f32 = 50.0;

/// Delay between triggering an analysis and scrolling to the results.
pub const SCROLL_TRIGGER_DELAY: Duration = Duration::from_millis(300);
/// How long the results region stays highlighted after the scroll.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(1500);
/// Minimum perceived-loading time before a successful analysis renders.
pub const MIN_ANALYSIS_DELAY: Duration = Duration::from_millis(800);
/// How long the save button shows its confirmation label.
pub const SAVED_LABEL_REVERT: Duration = Duration::from_millis(1400);

pub const COLOR_OK: egui::Color32 = egui::Color32::from_rgb(46, 164, 79);
pub const COLOR_ERROR: egui::Color32 = egui::Color32::from_rgb(255, 107, 107);
pub const COLOR_MUTED: egui::Color32 = egui::Color32::from_rgb(136, 136, 136);
pub const COLOR_ACCENT: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);

// ─── Application state ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Planner,
}

pub struct MapView {
    pub center: LngLat,
    pub zoom: f64,
}

#[derive(Default)]
pub struct DrawTool {
    pub active: bool,
    pub vertices: Vec<LngLat>,
}

pub enum SearchPanel {
    Hidden,
    Loading,
    Results(Vec<Place>),
    Empty,
    Error,
}

pub struct StatusLine {
    pub text: String,
    pub color: egui::Color32,
}

impl StatusLine {
    pub fn muted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: COLOR_MUTED,
        }
    }

    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: COLOR_OK,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: COLOR_ERROR,
        }
    }
}

/// What the two result panels currently show.
pub enum AnalysisView {
    Empty,
    Skeleton,
    /// The backend answered but could not generate recommendations; only the
    /// summary panel renders, the detailed panel stays untouched.
    ServerError { error: String, fallback: String },
    TransportError(String),
    Report(AnalysisResponse),
}

pub struct PlannerApp {
    pub api: ApiClient,
    pub screen: Screen,
    pub auth: AuthPanel,
    pub auth_redirect_at: Option<Instant>,

    pub map: MapView,
    pub draw: DrawTool,
    /// At most one captured route; completing a drawing replaces it.
    pub route: Option<RouteGeometry>,
    /// Bumped on every completed drawing; stale collect replies are dropped.
    pub route_rev: u64,
    pub marker: Option<LngLat>,

    pub form: FormState,
    pub focus_feasibility: bool,

    /// Set by a successful collect, cleared whenever a new route is drawn.
    pub data_id: Option<DataId>,

    pub search_input: String,
    pub search_debounce: Debounce,
    pub search_rx: Option<mpsc::Receiver<Result<Vec<Place>, FetchError>>>,
    pub search_panel: SearchPanel,

    pub collect_rx: Option<mpsc::Receiver<(u64, Result<CollectResponse, FetchError>)>>,
    pub status: Option<StatusLine>,

    pub analysis_rx: Option<mpsc::Receiver<Result<AnalysisResponse, FetchError>>>,
    /// Response held back until the minimum perceived-loading delay elapses.
    pub analysis_pending: Option<Result<AnalysisResponse, FetchError>>,
    pub analysis_started: Option<Instant>,
    pub analysis_view: AnalysisView,
    pub scroll_to_recs_at: Option<Instant>,
    pub pending_scroll: bool,
    pub highlight_until: Option<Instant>,

    pub save_rx: Option<mpsc::Receiver<Result<(), FetchError>>>,
    pub saved_label_until: Option<Instant>,

    pub alert: Option<String>,
    pub scroll_offset: f32,
}

impl PlannerApp {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            screen: Screen::Auth,
            auth: AuthPanel::default(),
            auth_redirect_at: None,
            map: MapView {
                center: MAP_CENTER,
                zoom: DEFAULT_ZOOM,
            },
            draw: DrawTool::default(),
            route: None,
            route_rev: 0,
            marker: None,
            form: FormState::default(),
            focus_feasibility: false,
            data_id: None,
            search_input: String::new(),
            search_debounce: Debounce::default(),
            search_rx: None,
            search_panel: SearchPanel::Hidden,
            collect_rx: None,
            status: None,
            analysis_rx: None,
            analysis_pending: None,
            analysis_started: None,
            analysis_view: AnalysisView::Empty,
            scroll_to_recs_at: None,
            pending_scroll: false,
            highlight_until: None,
            save_rx: None,
            saved_label_until: None,
            alert: None,
            scroll_offset: 0.0,
        }
    }

    pub fn analysis_loading(&self) -> bool {
        self.analysis_started.is_some()
    }

    pub fn collect_in_flight(&self) -> bool {
        self.collect_rx.is_some()
    }

    /// Finish the active drawing. Replaces the previous route and
    /// invalidates the collection id, so Analyze is disabled until the new
    /// route is collected.
    pub fn complete_route(&mut self) {
        let vertices = std::mem::take(&mut self.draw.vertices);
        self.draw.active = false;
        if let Some(route) = RouteGeometry::from_vertices(vertices) {
            log::info!(
                "ruta capturada: {} vértices, {:.2} km",
                route.vertices().len(),
                route.length_km()
            );
            self.route = Some(route);
            self.route_rev += 1;
            self.data_id = None;
        }
    }

    pub fn cancel_drawing(&mut self) {
        self.draw.active = false;
        self.draw.vertices.clear();
    }

    fn tick_timers(&mut self, now: Instant) {
        if let Some(at) = self.auth_redirect_at {
            if now >= at {
                self.auth_redirect_at = None;
                self.auth.notice = None;
                self.screen = Screen::Planner;
            }
        }
        if let Some(at) = self.scroll_to_recs_at {
            if now >= at {
                self.scroll_to_recs_at = None;
                self.pending_scroll = true;
                self.highlight_until = Some(now + HIGHLIGHT_DURATION);
            }
        }
        if let Some(until) = self.highlight_until {
            if now >= until {
                self.highlight_until = None;
            }
        }
        if let Some(until) = self.saved_label_until {
            if now >= until {
                self.saved_label_until = None;
            }
        }
    }

    /// Keep repainting while any timer or in-flight request needs polling.
    fn schedule_repaints(&self, ctx: &egui::Context) {
        let active = self.auth_redirect_at.is_some()
            || self.search_debounce.is_pending()
            || self.search_rx.is_some()
            || self.collect_rx.is_some()
            || self.analysis_started.is_some()
            || self.scroll_to_recs_at.is_some()
            || self.highlight_until.is_some()
            || self.saved_label_until.is_some()
            || self.save_rx.is_some();
        if active {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}

impl eframe::App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.tick_timers(Instant::now());
        self.poll_search(ctx);
        self.check_collect();
        self.check_analysis();
        self.check_save();

        match self.screen {
            Screen::Auth => self.draw_auth_screen(ctx),
            Screen::Planner => self.draw_planner(ctx),
        }
        self.draw_alert(ctx);
        self.schedule_repaints(ctx);
    }
}
