//! Client for the planning backend: route collection, AI analysis, and
//! settings persistence.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use super::fetch::{build_client, post_json, post_json_unit, FetchError};
use crate::geo::RouteGeometry;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Sampling step along the route, in meters.
pub const STEP_M: u32 = 20;

/// Opaque collection id. The backend issues integers today, but the client
/// only echoes the value back, so either representation is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataId {
    Number(i64),
    Text(String),
}

impl fmt::Display for DataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataId::Number(n) => write!(f, "{}", n),
            DataId::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectResponse {
    #[serde(default)]
    pub ok: bool,
    pub id: DataId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteAnalysis {
    #[serde(default)]
    pub length_km: f64,
    #[serde(default)]
    pub zone_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(default)]
    pub route_analysis: Option<RouteAnalysis>,
    #[serde(default)]
    pub ai_recommendations: Option<String>,
    #[serde(default)]
    pub configuration: Option<Value>,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub fallback_recommendations: Option<String>,
}

impl AnalysisResponse {
    /// Model name for the summary line.
    pub fn model_name(&self) -> &str {
        self.model_used.as_deref().unwrap_or("Cohere")
    }

    /// Configuration summary, one `•`-separated line with `N/A` for anything
    /// the echoed metadata is missing.
    pub fn configuration_line(&self) -> String {
        let cfg = self.configuration.as_ref();
        format!(
            "{} • {} • {} • {} • {} clientes",
            config_field(cfg, "arquitectura_label"),
            config_field(cfg, "subconfig_label"),
            config_field(cfg, "enfoque_label"),
            config_field(cfg, "split"),
            config_field(cfg, "estudio_factibilidad"),
        )
    }
}

fn config_field(cfg: Option<&Value>, key: &str) -> String {
    match cfg.and_then(|c| c.get(key)) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "N/A".to_string(),
    }
}

/// Body of a collect request.
pub fn collect_payload(route: &RouteGeometry, meta: Value) -> Value {
    json!({
        "geojson": route.to_geojson(),
        "step_m": STEP_M,
        "meta": meta,
    })
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
}

impl ApiClient {
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let base = Url::parse(base).map_err(|e| FetchError::new(format!("Invalid base URL: {}", e)))?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base
            .join(path)
            .map_err(|e| FetchError::new(format!("Invalid endpoint {}: {}", path, e)))
    }

    /// Upload the drawn route plus form metadata; returns the collection id.
    pub fn collect(&self, route: &RouteGeometry, meta: Value) -> Result<CollectResponse, FetchError> {
        let client = build_client()?;
        let url = self.endpoint("/api/data/collect")?;
        log::info!("POST {} ({} vértices)", url, route.vertices().len());
        post_json(&client, url, &collect_payload(route, meta))
    }

    /// Request AI recommendations for a previously collected route.
    pub fn generate(&self, data_id: &DataId) -> Result<AnalysisResponse, FetchError> {
        let client = build_client()?;
        let url = self.endpoint("/api/ai/generate")?;
        log::info!("POST {} (data_id {})", url, data_id);
        post_json(&client, url, &json!({ "data_id": data_id }))
    }

    /// Persist the current form settings. The response body is unused.
    pub fn save_config(&self, payload: &Value) -> Result<(), FetchError> {
        let client = build_client()?;
        let url = self.endpoint("/api/config/save")?;
        log::info!("POST {}", url);
        post_json_unit(&client, url, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LngLat;

    #[test]
    fn collect_payload_carries_route_and_step() {
        let route = RouteGeometry::from_vertices(vec![
            LngLat::new(-79.92, -2.17),
            LngLat::new(-79.91, -2.16),
            LngLat::new(-79.90, -2.15),
        ])
        .unwrap();
        let meta = json!({ "split": "1:32" });
        let body = collect_payload(&route, meta);
        assert_eq!(body["step_m"], 20);
        assert_eq!(body["meta"]["split"], "1:32");
        let coords = body["geojson"]["geometry"]["coordinates"].as_array().unwrap();
        assert_eq!(coords.len(), 3);
    }

    #[test]
    fn data_id_accepts_both_representations() {
        let n: DataId = serde_json::from_str("42").unwrap();
        assert_eq!(n, DataId::Number(42));
        let s: DataId = serde_json::from_str(r#""abc123""#).unwrap();
        assert_eq!(s, DataId::Text("abc123".to_string()));
        // echoed back verbatim
        assert_eq!(json!({ "data_id": s })["data_id"], "abc123");
    }

    #[test]
    fn collect_response_reads_id() {
        let resp: CollectResponse = serde_json::from_str(r#"{"ok": true, "id": 7}"#).unwrap();
        assert!(resp.ok);
        assert_eq!(resp.id, DataId::Number(7));
        // `ok` may be absent
        let resp: CollectResponse = serde_json::from_str(r#"{"id": "abc123"}"#).unwrap();
        assert_eq!(resp.id, DataId::Text("abc123".to_string()));
    }

    #[test]
    fn analysis_success_variant() {
        let resp: AnalysisResponse = serde_json::from_str(
            r####"{
                "success": true,
                "route_analysis": { "length_km": 3.42, "zone_type": "urbano", "total_points": 12 },
                "ai_recommendations": "### 1. RESUMEN EJECUTIVO\n- viable",
                "configuration": { "arquitectura_label": "Punto a Multipunto (P2MP)", "split": "1:32", "estudio_factibilidad": 150 },
                "model_used": "command-r-08-2024"
            }"####,
        )
        .unwrap();
        assert!(resp.success);
        let analysis = resp.route_analysis.as_ref().unwrap();
        assert!((analysis.length_km - 3.42).abs() < 1e-9);
        assert_eq!(analysis.zone_type, "urbano");
        assert_eq!(resp.model_name(), "command-r-08-2024");
        assert_eq!(
            resp.configuration_line(),
            "Punto a Multipunto (P2MP) • N/A • N/A • 1:32 • 150 clientes"
        );
    }

    #[test]
    fn analysis_error_variant() {
        let resp: AnalysisResponse = serde_json::from_str(
            r#"{"success": false, "error": "timeout", "fallback_recommendations": "try again"}"#,
        )
        .unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("timeout"));
        assert_eq!(resp.fallback_recommendations.as_deref(), Some("try again"));
        assert_eq!(resp.model_name(), "Cohere");
    }

    #[test]
    fn endpoints_join_against_the_base() {
        let api = ApiClient::new("http://planner.local:9000").unwrap();
        let url = api.endpoint("/api/data/collect").unwrap();
        assert_eq!(url.as_str(), "http://planner.local:9000/api/data/collect");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
