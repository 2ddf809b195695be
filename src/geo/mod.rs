//! Mapping-provider integration: multi-strategy place search with relevance
//! scoring and budgeted secondary supplement, route distance/time lookup
//! with an offline estimation fallback.

pub mod amap;
pub mod budget;
pub mod client;
pub mod coords;
pub mod estimate;
pub mod scoring;
pub mod tencent;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::transport::TransportMode;
use crate::utils::date;
use amap::{AmapClient, RouteStrategy, SearchParams};
use chrono::Timelike;
use client::{HttpClient, str_field};
use coords::{Coord, normalize_coordinate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tencent::TencentClient;

/// Words that mark a landmark-style query, used by the recommendation
/// fallback when a search comes back with nothing useful.
const LANDMARK_WORDS: &[&str] = &[
    "plaza", "mall", "center", "tower", "park", "hospital", "school", "station", "广场", "商场",
    "中心", "大厦", "公园", "医院", "学校", "车站",
];

/// Suffixes stripped when retrying a fruitless keyword.
const STORE_SUFFIXES: &[&str] = &["门店", "店", "store", "shop"];

/// How many results a search hands back at most.
const MAX_RESULTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceSource {
    Amap,
    Tencent,
}

/// One place-search result in the unified shape both providers map into.
#[derive(Debug, Clone, Serialize)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub full_address: String,
    /// "lng,lat"
    pub location: String,
    pub cityname: String,
    pub adname: String,
    pub pname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tel: String,
    pub source: PlaceSource,
    pub relevance_score: f64,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_recommendation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_reason: Option<String>,
}

/// Route lookup request, as the entry form submits it: either resolved
/// coordinates or store names to search for.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    pub start_store: String,
    pub end_store: String,
    #[serde(default = "default_mode")]
    pub transport_mode: TransportMode,
    #[serde(default)]
    pub route_strategy: RouteStrategy,
    #[serde(default)]
    pub start_location: Option<String>,
    #[serde(default)]
    pub end_location: Option<String>,
}

fn default_mode() -> TransportMode {
    TransportMode::Driving
}

/// One-way distance/time answer.
#[derive(Debug, Clone, Serialize)]
pub struct RouteQuote {
    pub distance: f64,
    pub duration: f64,
    pub traffic_lights: i64,
    pub tolls: f64,
    pub toll_distance: f64,
    /// false when the numbers come from the offline estimation
    pub api_used: bool,
}

pub struct GeoService {
    amap: AmapClient,
    tencent: TencentClient,
    brands: Vec<String>,
    budget: Mutex<budget::SecondaryBudget>,
}

impl GeoService {
    pub fn new(cfg: &Config) -> Self {
        let http = HttpClient::new();
        Self {
            amap: AmapClient::new(http.clone(), cfg.amap_key.clone()),
            tencent: TencentClient::new(http, cfg.tencent_key.clone()),
            brands: cfg.brands.clone(),
            budget: Mutex::new(budget::SecondaryBudget::new(
                cfg.tencent_daily_limit,
                cfg.search_cache_cap,
                date::today(),
            )),
        }
    }

    /// Budget statistics for the usage endpoint.
    pub fn usage_stats(&self) -> AppResult<budget::UsageStats> {
        let mut budget = self
            .budget
            .lock()
            .map_err(|_| AppError::Other("budget lock poisoned".into()))?;
        Ok(budget.stats(date::today()))
    }

    /// Multi-strategy place search. Primary provider first (several query
    /// shapes), secondary as a budgeted supplement, recommendations when
    /// everything scores poorly. At most [`MAX_RESULTS`] results, best first.
    pub async fn search_location(
        &self,
        keyword: &str,
        city: Option<&str>,
    ) -> AppResult<Vec<Place>> {
        let keyword = keyword.trim();
        if keyword.chars().count() < 2 {
            return Err(AppError::Validation("Search keyword too short".into()));
        }
        if !self.amap.enabled() && !self.tencent.enabled() {
            return Err(AppError::Provider(
                "location search is not configured".into(),
            ));
        }

        let mut all: Vec<Place> = Vec::new();

        if self.amap.enabled() {
            for (i, params) in self.search_strategies(keyword, city).iter().enumerate() {
                match self.amap.place_text(params).await {
                    Ok(pois) => {
                        let mut found: Vec<Place> = pois
                            .iter()
                            .take(20)
                            .map(|poi| self.convert_amap_poi(keyword, poi))
                            .collect();

                        tracing::info!(strategy = i + 1, results = found.len(), "search strategy done");

                        // any clearly-right answers end the search early
                        let mut high: Vec<Place> = found
                            .iter()
                            .filter(|p| p.relevance_score > 100.0)
                            .cloned()
                            .collect();
                        if !high.is_empty() {
                            sort_by_score(&mut high);
                            high.truncate(MAX_RESULTS);
                            return Ok(high);
                        }

                        all.append(&mut found);
                    }
                    Err(e) => {
                        tracing::error!(strategy = i + 1, error = %e, "search strategy failed");
                    }
                }
            }
        }

        // secondary supplement, rationed by the daily budget
        if self.tencent.enabled() {
            self.supplement_with_secondary(keyword, &mut all).await?;
        }

        // merge: dedup by (name, coords) keeping the better score, best first
        let mut merged = dedup_places(all);
        sort_by_score(&mut merged);

        // weak results get recommendations prepended
        let best = merged.first().map(|p| p.relevance_score).unwrap_or(0.0);
        if best < 60.0 {
            let mut recs = self.recommendations(keyword).await;
            if !recs.is_empty() {
                recs.append(&mut merged);
                merged = recs;
            }
        }

        merged.truncate(MAX_RESULTS);
        Ok(merged)
    }

    /// The query shapes tried against the primary provider, in order.
    fn search_strategies(&self, keyword: &str, city: Option<&str>) -> Vec<SearchParams> {
        let mut strategies = vec![SearchParams {
            keywords: keyword.to_string(),
            city: city.map(str::to_string),
            types: None,
            offset: 15,
        }];

        // brand-focused search when the keyword names a known chain
        let brand = scoring::find_brand(keyword, &self.brands);
        if let Some(brand) = brand {
            strategies.push(SearchParams {
                keywords: brand.to_string(),
                city: city.map(str::to_string),
                types: Some("050700".to_string()), // food & beverage POIs
                offset: 10,
            });
        }

        // long unspaced keywords: retry with the part after the brand
        if keyword.chars().count() > 4
            && !keyword.contains(' ')
            && let Some(brand) = brand
        {
            let remainder = keyword.replace(brand, "");
            let remainder = remainder.trim();
            if remainder.chars().count() >= 2 {
                strategies.push(SearchParams {
                    keywords: remainder.to_string(),
                    city: city.map(str::to_string),
                    types: None,
                    offset: 10,
                });
            }
        }

        strategies
    }

    fn convert_amap_poi(&self, keyword: &str, poi: &Value) -> Place {
        let name = str_field(poi, "name");
        let address = str_field(poi, "address");
        let pname = str_field(poi, "pname");
        let cityname = str_field(poi, "cityname");
        let adname = str_field(poi, "adname");

        let full_address = if pname.is_empty() {
            address.clone()
        } else {
            format!("{}{}{} {}", pname, cityname, adname, address)
        };

        let relevance_score = scoring::relevance_score(keyword, &name, &address, &self.brands);

        Place {
            name,
            address,
            full_address,
            location: str_field(poi, "location"),
            cityname,
            adname,
            pname,
            tel: str_field(poi, "tel"),
            source: PlaceSource::Amap,
            relevance_score,
            is_recommendation: false,
            recommendation_reason: None,
        }
    }

    /// Ask the secondary provider when the rationing rules allow it, scoring
    /// and caching whatever comes back.
    async fn supplement_with_secondary(
        &self,
        keyword: &str,
        all: &mut Vec<Place>,
    ) -> AppResult<()> {
        let today = date::today();
        let hour = chrono::Local::now().hour();
        let key = budget::cache_key(keyword, None);
        let has_brand = scoring::find_brand(keyword, &self.brands).is_some();

        // decide (and spend) under the lock, call the provider outside it
        let decision = {
            let mut budget = self
                .budget
                .lock()
                .map_err(|_| AppError::Other("budget lock poisoned".into()))?;

            if let Some(cached) = budget.cached(&key) {
                tracing::info!(keyword, "secondary search served from cache");
                all.extend(cached);
                return Ok(());
            }

            let usage = budget.usage_today(today);
            let go = budget::should_use_secondary(
                usage,
                budget.daily_limit(),
                false,
                all,
                keyword,
                has_brand,
                hour,
            );
            if go {
                budget.increment(today);
            }
            go
        };

        if !decision {
            tracing::info!(keyword, "secondary search skipped to save budget");
            return Ok(());
        }

        match self.tencent.search(keyword, None).await {
            Ok(mut places) => {
                for p in &mut places {
                    p.relevance_score =
                        scoring::relevance_score(keyword, &p.name, &p.address, &self.brands);
                }

                if let Ok(mut budget) = self.budget.lock() {
                    budget.store(key, places.clone());
                }

                tracing::info!(keyword, results = places.len(), "secondary search done");
                all.extend(places);
            }
            Err(e) => {
                // supplement only: a secondary failure never fails the search
                tracing::error!(keyword, error = %e, "secondary search failed");
            }
        }

        Ok(())
    }

    /// Last-resort suggestions when a search found nothing relevant:
    /// nationwide brand stores, or places matching a landmark word or the
    /// keyword with store suffixes stripped.
    async fn recommendations(&self, keyword: &str) -> Vec<Place> {
        if !self.amap.enabled() {
            return Vec::new();
        }

        // brand-based nationwide recommendation
        if let Some(brand) = scoring::find_brand(keyword, &self.brands) {
            let params = SearchParams {
                keywords: brand.to_string(),
                city: None,
                types: Some("050700".to_string()),
                offset: 8,
            };
            if let Ok(pois) = self.amap.place_text(&params).await {
                let recs: Vec<Place> = pois
                    .iter()
                    .take(5)
                    .map(|poi| {
                        let mut p = self.convert_amap_poi(keyword, poi);
                        p.relevance_score = 75.0;
                        p.is_recommendation = true;
                        p.recommendation_reason = Some(format!(
                            "No match for \"{}\"; showing {} stores instead",
                            keyword, brand
                        ));
                        p
                    })
                    .collect();
                if !recs.is_empty() {
                    return recs;
                }
            }
        }

        // keyword-based recommendation: landmark word, or the keyword minus
        // store suffixes
        let retry = LANDMARK_WORDS
            .iter()
            .find(|w| keyword.contains(*w))
            .map(|w| w.to_string())
            .or_else(|| {
                let mut simplified = keyword.to_string();
                for suffix in STORE_SUFFIXES {
                    simplified = simplified.replace(suffix, "");
                }
                let simplified = simplified.trim().to_string();
                (simplified.chars().count() >= 2).then_some(simplified)
            });

        if let Some(retry_kw) = retry {
            let params = SearchParams {
                keywords: retry_kw.clone(),
                city: None,
                types: None,
                offset: 6,
            };
            if let Ok(pois) = self.amap.place_text(&params).await {
                return pois
                    .iter()
                    .take(3)
                    .map(|poi| {
                        let mut p = self.convert_amap_poi(keyword, poi);
                        p.relevance_score = 60.0;
                        p.is_recommendation = true;
                        p.recommendation_reason =
                            Some(format!("Places related to \"{}\"", retry_kw));
                        p
                    })
                    .collect();
            }
        }

        Vec::new()
    }

    /// One-way route distance/time. Coordinates win over store names; store
    /// names are resolved through the place search. Driving and taxi go
    /// through the provider with an estimation fallback, the other modes are
    /// estimated directly.
    pub async fn calculate_route(&self, req: &RouteRequest) -> AppResult<RouteQuote> {
        if req.start_store.trim().is_empty() || req.end_store.trim().is_empty() {
            return Err(AppError::Validation(
                "Start and end stores are required".into(),
            ));
        }

        let origin = match req.start_location.as_deref() {
            Some(s) if !s.is_empty() => normalize_coordinate(s),
            _ => self.resolve_store(&req.start_store).await?,
        };
        let destination = match req.end_location.as_deref() {
            Some(e) if !e.is_empty() => normalize_coordinate(e),
            _ => self.resolve_store(&req.end_store).await?,
        };

        let from = Coord::parse(&origin)?;
        let to = Coord::parse(&destination)?;
        let mode = req.transport_mode;

        if mode.uses_driving_api() {
            return self.driving_quote(&origin, &destination, from, to, mode, req.route_strategy).await;
        }

        // modes without a routing API: straight-line estimation
        let straight = estimate::haversine_km(from, to);
        let duration = match mode {
            TransportMode::Walking => match self.walking_duration(&origin, &destination).await {
                Some(hours) if hours > 0.0 => hours,
                _ => straight / mode.estimate_speed_kmh(),
            },
            _ => straight / mode.estimate_speed_kmh(),
        };

        Ok(RouteQuote {
            distance: straight,
            duration,
            traffic_lights: 0,
            tolls: 0.0,
            toll_distance: 0.0,
            api_used: false,
        })
    }

    async fn driving_quote(
        &self,
        origin: &str,
        destination: &str,
        from: Coord,
        to: Coord,
        mode: TransportMode,
        strategy: RouteStrategy,
    ) -> AppResult<RouteQuote> {
        if self.amap.enabled() {
            match self.amap.driving_route(origin, destination, strategy).await {
                Ok(paths) if !paths.is_empty() => {
                    tracing::info!(count = paths.len(), "driving paths returned");

                    let best = if strategy.picks_quickest_path() {
                        paths
                            .iter()
                            .min_by(|a, b| {
                                a.duration_hours
                                    .partial_cmp(&b.duration_hours)
                                    .unwrap_or(std::cmp::Ordering::Equal)
                            })
                            .cloned()
                    } else {
                        paths.first().cloned()
                    };

                    if let Some(path) = best {
                        return Ok(RouteQuote {
                            distance: path.distance_km,
                            duration: path.duration_hours + mode.route_extra_hours(),
                            traffic_lights: path.traffic_lights,
                            tolls: path.tolls,
                            toll_distance: path.toll_distance_km,
                            api_used: true,
                        });
                    }
                }
                Ok(_) => tracing::warn!("driving route returned no paths"),
                Err(e) => tracing::error!(error = %e, "driving route failed, estimating"),
            }
        }

        // offline fallback: road-factored straight line
        let (distance, duration) = estimate::estimate_route(mode, from, to);
        Ok(RouteQuote {
            distance,
            duration: duration + mode.route_extra_hours(),
            traffic_lights: 0,
            tolls: 0.0,
            toll_distance: 0.0,
            api_used: false,
        })
    }

    async fn walking_duration(&self, origin: &str, destination: &str) -> Option<f64> {
        if !self.amap.enabled() {
            return None;
        }
        match self.amap.walking_route(origin, destination).await {
            Ok((_, hours)) => Some(hours),
            Err(e) => {
                tracing::warn!(error = %e, "walking route failed, estimating");
                None
            }
        }
    }

    /// First search hit for a store name, as a "lng,lat" string. When the
    /// place search comes up empty the name is run through plain geocoding
    /// before giving up.
    async fn resolve_store(&self, store: &str) -> AppResult<String> {
        let results = self.search_location(store, None).await?;
        if let Some(first) = results.into_iter().next() {
            return Ok(normalize_coordinate(&first.location));
        }

        if self.amap.enabled()
            && let Some(coord) = self.amap.geocode(store).await?
        {
            return Ok(coord.to_param());
        }

        Err(AppError::NotFound(format!("Store location \"{}\"", store)))
    }
}

fn sort_by_score(places: &mut [Place]) {
    places.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Deduplicate by (name, coordinates), keeping the higher-scored entry.
fn dedup_places(places: Vec<Place>) -> Vec<Place> {
    let mut by_key: HashMap<String, Place> = HashMap::new();
    for p in places {
        let key = format!("{}_{}", p.name, p.location);
        match by_key.get(&key) {
            Some(existing) if existing.relevance_score >= p.relevance_score => {}
            _ => {
                by_key.insert(key, p);
            }
        }
    }
    by_key.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, location: &str, score: f64) -> Place {
        Place {
            name: name.to_string(),
            address: String::new(),
            full_address: String::new(),
            location: location.to_string(),
            cityname: String::new(),
            adname: String::new(),
            pname: String::new(),
            tel: String::new(),
            source: PlaceSource::Amap,
            relevance_score: score,
            is_recommendation: false,
            recommendation_reason: None,
        }
    }

    #[test]
    fn dedup_keeps_higher_score() {
        let merged = dedup_places(vec![
            place("A", "120,30", 50.0),
            place("A", "120,30", 80.0),
            place("B", "121,31", 10.0),
        ]);
        assert_eq!(merged.len(), 2);
        let a = merged.iter().find(|p| p.name == "A").unwrap();
        assert_eq!(a.relevance_score, 80.0);
    }

    #[test]
    fn sort_is_descending() {
        let mut v = vec![place("A", "1,1", 10.0), place("B", "2,2", 90.0)];
        sort_by_score(&mut v);
        assert_eq!(v[0].name, "B");
    }
}
