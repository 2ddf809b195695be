//! Primary mapping provider (Amap-compatible REST API): place text search,
//! geocoding and route planning.

use super::client::{HttpClient, f64_field, i64_field, str_field};
use super::coords::Coord;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const AMAP_BASE_URL: &str = "https://restapi.amap.com/v3";

/// Named road-routing optimization mode, mapped onto the provider's numeric
/// strategy codes. The codes themselves are defined by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStrategy {
    #[default]
    Fastest,
    Shortest,
    Economical,
    NoHighway,
    AvoidJam,
    Multi,
    FastestFree,
    ShortestFree,
    AvoidAll,
    Optimal,
}

impl RouteStrategy {
    pub fn amap_code(&self) -> u8 {
        match self {
            RouteStrategy::Fastest => 0,
            RouteStrategy::Economical => 1,
            RouteStrategy::Shortest => 2,
            RouteStrategy::NoHighway => 3,
            RouteStrategy::AvoidJam => 4,
            RouteStrategy::Multi => 5,
            RouteStrategy::FastestFree => 6,
            RouteStrategy::ShortestFree => 7,
            RouteStrategy::AvoidAll => 8,
            RouteStrategy::Optimal => 9,
        }
    }

    /// For fastest/shortest the provider is asked for alternatives and the
    /// quickest path wins; the other strategies trust the provider's first.
    pub fn picks_quickest_path(&self) -> bool {
        matches!(self, RouteStrategy::Fastest | RouteStrategy::Shortest)
    }
}

/// One driving path option returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct DrivePath {
    pub distance_km: f64,
    pub duration_hours: f64,
    pub traffic_lights: i64,
    pub tolls: f64,
    pub toll_distance_km: f64,
}

/// Parameters for one place text search call.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub keywords: String,
    pub city: Option<String>,
    pub types: Option<String>,
    pub offset: u32,
}

#[derive(Clone)]
pub struct AmapClient {
    http: HttpClient,
    key: String,
}

impl AmapClient {
    pub fn new(http: HttpClient, key: String) -> Self {
        Self { http, key }
    }

    pub fn enabled(&self) -> bool {
        !self.key.is_empty()
    }

    /// Place text search. Returns the raw POI objects; the orchestration
    /// layer converts and scores them.
    pub async fn place_text(&self, p: &SearchParams) -> AppResult<Vec<Value>> {
        let citylimit = p.city.is_some();
        let params = vec![
            ("key", self.key.clone()),
            ("keywords", p.keywords.clone()),
            ("types", p.types.clone().unwrap_or_default()),
            ("city", p.city.clone().unwrap_or_default()),
            ("children", "1".to_string()),
            ("offset", p.offset.to_string()),
            ("page", "1".to_string()),
            ("extensions", "all".to_string()),
            ("citylimit", citylimit.to_string()),
        ];

        let body = self
            .http
            .get_json(
                &format!("{}/place/text", AMAP_BASE_URL),
                &params,
                Duration::from_secs(10),
            )
            .await?;

        if str_field(&body, "status") != "1" {
            return Err(AppError::Provider(format!(
                "place search failed: {}",
                str_field(&body, "info")
            )));
        }

        Ok(body
            .get("pois")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Driving route between two "lng,lat" points. Asks for up to three
    /// alternative paths so the strategy can pick.
    pub async fn driving_route(
        &self,
        origin: &str,
        destination: &str,
        strategy: RouteStrategy,
    ) -> AppResult<Vec<DrivePath>> {
        let params = vec![
            ("key", self.key.clone()),
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("strategy", strategy.amap_code().to_string()),
            ("extensions", "all".to_string()),
            ("number", "3".to_string()),
            ("multiexport", "1".to_string()),
        ];

        let body = self
            .http
            .get_json(
                &format!("{}/direction/driving", AMAP_BASE_URL),
                &params,
                Duration::from_secs(15),
            )
            .await?;

        let paths = route_paths(&body).ok_or_else(|| {
            AppError::Provider(format!(
                "driving route failed: {}",
                str_field(&body, "info")
            ))
        })?;

        Ok(paths.iter().map(parse_path).collect())
    }

    /// Walking route between two "lng,lat" points, as (distance_km, hours).
    pub async fn walking_route(
        &self,
        origin: &str,
        destination: &str,
    ) -> AppResult<(f64, f64)> {
        let params = vec![
            ("key", self.key.clone()),
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
        ];

        let body = self
            .http
            .get_json(
                &format!("{}/direction/walking", AMAP_BASE_URL),
                &params,
                Duration::from_secs(10),
            )
            .await?;

        let paths = route_paths(&body).ok_or_else(|| {
            AppError::Provider(format!(
                "walking route failed: {}",
                str_field(&body, "info")
            ))
        })?;

        let first = paths
            .first()
            .ok_or_else(|| AppError::Provider("walking route returned no paths".into()))?;

        Ok((
            f64_field(first, "distance") / 1000.0,
            f64_field(first, "duration") / 3600.0,
        ))
    }

    /// Address → coordinates.
    pub async fn geocode(&self, address: &str) -> AppResult<Option<Coord>> {
        let params = vec![
            ("key", self.key.clone()),
            ("address", address.to_string()),
        ];

        let body = self
            .http
            .get_json(
                &format!("{}/geocode/geo", AMAP_BASE_URL),
                &params,
                Duration::from_secs(5),
            )
            .await?;

        if str_field(&body, "status") != "1" {
            return Ok(None);
        }

        let location = body
            .get("geocodes")
            .and_then(Value::as_array)
            .and_then(|g| g.first())
            .map(|g| str_field(g, "location"));

        match location {
            Some(loc) if !loc.is_empty() => Ok(Some(Coord::parse(&loc)?)),
            _ => Ok(None),
        }
    }
}

fn route_paths(body: &Value) -> Option<&Vec<Value>> {
    if str_field(body, "status") != "1" {
        return None;
    }
    body.get("route")?.get("paths")?.as_array()
}

fn parse_path(path: &Value) -> DrivePath {
    DrivePath {
        distance_km: f64_field(path, "distance") / 1000.0,
        duration_hours: f64_field(path, "duration") / 3600.0,
        traffic_lights: i64_field(path, "traffic_lights"),
        tolls: f64_field(path, "tolls"),
        toll_distance_km: f64_field(path, "toll_distance") / 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strategy_codes() {
        assert_eq!(RouteStrategy::Fastest.amap_code(), 0);
        assert_eq!(RouteStrategy::Shortest.amap_code(), 2);
        assert_eq!(RouteStrategy::Optimal.amap_code(), 9);
        assert!(RouteStrategy::Shortest.picks_quickest_path());
        assert!(!RouteStrategy::AvoidJam.picks_quickest_path());
    }

    #[test]
    fn strategy_parses_from_snake_case() {
        let s: RouteStrategy = serde_json::from_value(json!("avoid_jam")).unwrap();
        assert_eq!(s, RouteStrategy::AvoidJam);
    }

    #[test]
    fn path_parsing_handles_string_numbers() {
        let path = json!({
            "distance": "12500",
            "duration": "1800",
            "traffic_lights": 7,
            "tolls": "15",
            "toll_distance": "8000",
        });
        let p = parse_path(&path);
        assert!((p.distance_km - 12.5).abs() < 1e-9);
        assert!((p.duration_hours - 0.5).abs() < 1e-9);
        assert_eq!(p.traffic_lights, 7);
        assert_eq!(p.tolls, 15.0);
        assert_eq!(p.toll_distance_km, 8.0);
    }

    #[test]
    fn route_paths_requires_success_status() {
        let err = json!({"status": "0", "info": "INVALID_USER_KEY"});
        assert!(route_paths(&err).is_none());

        let ok = json!({"status": "1", "route": {"paths": [{"distance": "1"}]}});
        assert_eq!(route_paths(&ok).unwrap().len(), 1);
    }
}
