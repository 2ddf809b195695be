//! Daily call budget and result cache for the secondary place-search
//! provider. The free tier allows a fixed number of calls per day, so the
//! search orchestration rations them: the secondary provider only runs when
//! the primary results are poor, and 30% of the quota is held back for the
//! evening shift.

use super::Place;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Local hour after which the evening reserve no longer applies.
const EVENING_HOUR: u32 = 18;

/// Fraction of the daily budget that may be spent before the evening.
const DAYTIME_SPEND_RATIO: f64 = 0.7;

#[derive(Debug)]
pub struct SecondaryBudget {
    date: NaiveDate,
    count: u32,
    daily_limit: u32,
    cache: HashMap<String, Vec<Place>>,
    cache_cap: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageStats {
    pub today_usage: u32,
    pub daily_limit: u32,
    pub remaining: u32,
    pub cache_size: usize,
    pub cache_limit: usize,
    pub usage_percentage: f64,
    pub date: String,
}

impl SecondaryBudget {
    pub fn new(daily_limit: u32, cache_cap: usize, today: NaiveDate) -> Self {
        Self {
            date: today,
            count: 0,
            daily_limit,
            cache: HashMap::new(),
            cache_cap,
        }
    }

    /// Today's usage; rolls the counter over on date change.
    pub fn usage_today(&mut self, today: NaiveDate) -> u32 {
        if self.date != today {
            self.date = today;
            self.count = 0;
        }
        self.count
    }

    pub fn increment(&mut self, today: NaiveDate) {
        self.usage_today(today);
        self.count += 1;
        tracing::info!(
            usage = self.count,
            limit = self.daily_limit,
            "secondary provider call"
        );
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    pub fn cached(&self, key: &str) -> Option<Vec<Place>> {
        self.cache.get(key).cloned()
    }

    pub fn store(&mut self, key: String, places: Vec<Place>) {
        // bounded cache, drop new entries once full
        if self.cache.len() < self.cache_cap {
            self.cache.insert(key, places);
        }
    }

    pub fn stats(&mut self, today: NaiveDate) -> UsageStats {
        let usage = self.usage_today(today);
        UsageStats {
            today_usage: usage,
            daily_limit: self.daily_limit,
            remaining: self.daily_limit.saturating_sub(usage),
            cache_size: self.cache.len(),
            cache_limit: self.cache_cap,
            usage_percentage: if self.daily_limit > 0 {
                (usage as f64 / self.daily_limit as f64 * 1000.0).round() / 10.0
            } else {
                100.0
            },
            date: self.date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Cache key for a search: keyword + optional region.
pub fn cache_key(keyword: &str, region: Option<&str>) -> String {
    format!(
        "{}_{}",
        keyword.trim().to_lowercase(),
        region.unwrap_or("nationwide")
    )
}

/// Decide whether the secondary provider should supplement this search.
/// Pure so the rationing rules are testable without a clock or state.
pub fn should_use_secondary(
    usage_today: u32,
    daily_limit: u32,
    cached: bool,
    primary: &[Place],
    keyword: &str,
    keyword_has_brand: bool,
    local_hour: u32,
) -> bool {
    // hard cap
    if usage_today >= daily_limit {
        tracing::warn!("secondary provider daily budget exhausted");
        return false;
    }

    // a cached answer never spends budget
    if cached {
        return false;
    }

    // primary came up empty: always worth a supplement
    if primary.is_empty() {
        return true;
    }

    // primary already produced enough high-relevance hits
    let high_relevance = primary.iter().filter(|p| p.relevance_score >= 100.0).count();
    if high_relevance >= 3 {
        return false;
    }

    // or enough exact name matches
    let keyword_lower = keyword.to_lowercase();
    let exact = primary
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&keyword_lower))
        .count();
    if exact >= 2 {
        return false;
    }

    // evening reserve: before 18:00 keep 30% of the quota
    if local_hour < EVENING_HOUR
        && (usage_today as f64) >= (daily_limit as f64 * DAYTIME_SPEND_RATIO)
    {
        tracing::info!("secondary budget reserved for the evening shift");
        return false;
    }

    // no brand token → landmark search, where the secondary provider shines
    if !keyword_has_brand {
        return true;
    }

    // thin primary result set
    if primary.len() < 5 {
        return true;
    }

    false
}
