//! Coordinates, Web-Mercator projection, and the captured route geometry.
//!
//! The map canvas works in "world pixels": the projected plane at a given
//! zoom level, 256 px per tile, `2^zoom` tiles per axis. Screen positions are
//! world pixels relative to the projected view center.

use serde_json::{json, Value};

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    pub lon: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Latitudes beyond this are clamped; the Mercator projection diverges at the poles.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Side length, in pixels, of the projected world at `zoom`.
pub fn world_extent(zoom: f64) -> f64 {
    256.0 * zoom.exp2()
}

/// Project to world pixels at `zoom`. Origin is the north-west corner.
pub fn project(p: LngLat, zoom: f64) -> [f64; 2] {
    let extent = world_extent(zoom);
    let x = (p.lon + 180.0) / 360.0 * extent;
    let lat = p.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * extent;
    [x, y]
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64, zoom: f64) -> LngLat {
    let extent = world_extent(zoom);
    let lon = x / extent * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / extent);
    let lat = n.sinh().atan().to_degrees();
    LngLat { lon, lat }
}

/// Great-circle distance in kilometers.
pub fn haversine_km(a: LngLat, b: LngLat) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// The user-drawn candidate route. At most one exists at a time; completing a
/// new drawing replaces the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    vertices: Vec<LngLat>,
}

impl RouteGeometry {
    pub const MIN_VERTICES: usize = 2;

    /// `None` when fewer than two vertices were captured.
    pub fn from_vertices(vertices: Vec<LngLat>) -> Option<Self> {
        (vertices.len() >= Self::MIN_VERTICES).then_some(Self { vertices })
    }

    pub fn vertices(&self) -> &[LngLat] {
        &self.vertices
    }

    /// Sum of the great-circle segment lengths.
    pub fn length_km(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| haversine_km(w[0], w[1]))
            .sum()
    }

    /// GeoJSON `Feature` wrapping a `LineString`, coordinates as `[lon, lat]`.
    pub fn to_geojson(&self) -> Value {
        let coordinates: Vec<[f64; 2]> = self.vertices.iter().map(|p| [p.lon, p.lat]).collect();
        json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_roundtrip() {
        let p = LngLat::new(-79.9224, -2.1709);
        let [x, y] = project(p, 12.0);
        let back = unproject(x, y, 12.0);
        assert!((back.lon - p.lon).abs() < 1e-9);
        assert!((back.lat - p.lat).abs() < 1e-9);
    }

    #[test]
    fn project_origin_is_world_center() {
        let [x, y] = project(LngLat::new(0.0, 0.0), 4.0);
        let half = world_extent(4.0) / 2.0;
        assert!((x - half).abs() < 1e-9);
        assert!((y - half).abs() < 1e-9);
    }

    #[test]
    fn polar_latitudes_are_clamped() {
        let [_, y] = project(LngLat::new(0.0, 89.9), 2.0);
        assert!(y.is_finite());
        assert!(y >= 0.0);
    }

    #[test]
    fn haversine_equator_degree() {
        let km = haversine_km(LngLat::new(0.0, 0.0), LngLat::new(1.0, 0.0));
        assert!((km - 111.19).abs() < 0.5);
    }

    #[test]
    fn route_needs_two_vertices() {
        assert!(RouteGeometry::from_vertices(vec![]).is_none());
        assert!(RouteGeometry::from_vertices(vec![LngLat::new(0.0, 0.0)]).is_none());
        assert!(
            RouteGeometry::from_vertices(vec![LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0)])
                .is_some()
        );
    }

    #[test]
    fn geojson_linestring_shape() {
        let route = RouteGeometry::from_vertices(vec![
            LngLat::new(-79.92, -2.17),
            LngLat::new(-79.91, -2.16),
            LngLat::new(-79.90, -2.15),
        ])
        .unwrap();
        let value = route.to_geojson();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["geometry"]["type"], "LineString");
        let coords = value["geometry"]["coordinates"].as_array().unwrap();
        assert_eq!(coords.len(), 3);
        assert_eq!(coords[0][0], -79.92);
        assert_eq!(coords[0][1], -2.17);
    }

    #[test]
    fn route_length_accumulates_segments() {
        let route = RouteGeometry::from_vertices(vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(1.0, 0.0),
            LngLat::new(2.0, 0.0),
        ])
        .unwrap();
        assert!((route.length_km() - 2.0 * 111.19).abs() < 1.0);
    }
}
