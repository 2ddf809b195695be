//! Outbound HTTP with the fixed retry loop every provider call goes through.

use crate::errors::{AppError, AppResult};
use serde_json::Value;
use std::time::Duration;

const MAX_RETRIES: u32 = 3;
const RETRY_SLEEP: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// GET a JSON document, retrying up to three times with a flat 1 s sleep
    /// between attempts. Non-2xx statuses count as failures.
    pub async fn get_json(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> AppResult<Value> {
        let mut last_err: Option<AppError> = None;

        for attempt in 1..=MAX_RETRIES {
            tracing::info!(url, attempt, max = MAX_RETRIES, "provider request");

            let result = self
                .inner
                .get(url)
                .query(params)
                .timeout(timeout)
                .send()
                .await;

            match result {
                Ok(resp) => match resp.error_for_status() {
                    Ok(resp) => match resp.json::<Value>().await {
                        Ok(body) => return Ok(body),
                        Err(e) => last_err = Some(e.into()),
                    },
                    Err(e) => last_err = Some(e.into()),
                },
                Err(e) => {
                    if e.is_timeout() {
                        tracing::warn!(url, attempt, "provider request timed out");
                    } else {
                        tracing::error!(url, attempt, error = %e, "provider request failed");
                    }
                    last_err = Some(e.into());
                }
            }

            if attempt < MAX_RETRIES {
                tokio::time::sleep(RETRY_SLEEP).await;
            }
        }

        Err(last_err.unwrap_or_else(|| AppError::Provider("request failed".into())))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Helpers for picking fields out of provider JSON, which is loosely typed:
/// the same field arrives as a string, a number, or a list depending on the
/// provider's mood.
pub fn str_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

pub fn f64_field(value: &Value, key: &str) -> f64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn i64_field(value: &Value, key: &str) -> i64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loose_field_extraction() {
        let v = json!({
            "name": ["Goodme", "West Lake"],
            "distance": "1500",
            "duration": 3600,
            "tel": null,
        });
        assert_eq!(str_field(&v, "name"), "Goodme West Lake");
        assert_eq!(f64_field(&v, "distance"), 1500.0);
        assert_eq!(i64_field(&v, "duration"), 3600);
        assert_eq!(str_field(&v, "tel"), "");
        assert_eq!(str_field(&v, "missing"), "");
    }
}
