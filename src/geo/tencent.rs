//! Secondary mapping provider (Tencent-compatible REST API). Place search
//! only, used to supplement the primary provider under a daily budget.

use super::client::{HttpClient, str_field};
use super::{Place, PlaceSource};
use crate::errors::{AppError, AppResult};
use serde_json::Value;
use std::time::Duration;

pub const TENCENT_SEARCH_URL: &str = "https://apis.map.qq.com/ws/place/v1/search";

/// Fallback search boundary when no region is given: a 50 km circle around
/// the default metro area (the provider requires *some* boundary).
const DEFAULT_BOUNDARY: &str = "nearby(39.915,116.404,50000)";

#[derive(Clone)]
pub struct TencentClient {
    http: HttpClient,
    key: String,
}

impl TencentClient {
    pub fn new(http: HttpClient, key: String) -> Self {
        Self { http, key }
    }

    pub fn enabled(&self) -> bool {
        !self.key.is_empty()
    }

    /// Keyword search, optionally bounded to a region. Results come back in
    /// the unified `Place` shape, unscored.
    pub async fn search(&self, keyword: &str, region: Option<&str>) -> AppResult<Vec<Place>> {
        let boundary = match region {
            Some(r) => format!("region({},0)", r),
            None => DEFAULT_BOUNDARY.to_string(),
        };

        let params = vec![
            ("keyword", keyword.to_string()),
            ("page_size", "20".to_string()),
            ("page_index", "1".to_string()),
            ("key", self.key.clone()),
            ("boundary", boundary),
        ];

        let body = self
            .http
            .get_json(TENCENT_SEARCH_URL, &params, Duration::from_secs(15))
            .await?;

        // this provider signals success with numeric status 0
        if body.get("status").and_then(Value::as_i64) != Some(0) {
            return Err(AppError::Provider(format!(
                "secondary place search failed: {}",
                str_field(&body, "message")
            )));
        }

        let pois = body
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(pois.iter().map(convert_poi).collect())
    }
}

/// Convert a provider POI into the unified result shape. Coordinates arrive
/// nested as {lat, lng} and are flattened to the "lng,lat" string the rest
/// of the system speaks.
fn convert_poi(poi: &Value) -> Place {
    let lat = poi
        .get("location")
        .map(|l| super::client::f64_field(l, "lat"))
        .unwrap_or(0.0);
    let lng = poi
        .get("location")
        .map(|l| super::client::f64_field(l, "lng"))
        .unwrap_or(0.0);

    let ad_info = poi.get("ad_info");

    Place {
        name: str_field(poi, "title"),
        address: str_field(poi, "address"),
        full_address: str_field(poi, "address"),
        location: format!("{},{}", lng, lat),
        cityname: ad_info.map(|a| str_field(a, "city")).unwrap_or_default(),
        adname: ad_info.map(|a| str_field(a, "district")).unwrap_or_default(),
        pname: ad_info.map(|a| str_field(a, "province")).unwrap_or_default(),
        tel: str_field(poi, "tel"),
        source: PlaceSource::Tencent,
        relevance_score: 0.0,
        is_recommendation: false,
        recommendation_reason: None,
    }
}
