use serde::Serialize;

/// Static reference data used to resolve route endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct Store {
    pub id: i64,
    pub store_code: String, // unique
    pub store_name: String,
    pub store_city: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub address: String,
    pub created_at: String,
}

impl Store {
    /// Provider-format "lng,lat" string, when the store has coordinates.
    pub fn coord_string(&self) -> Option<String> {
        match (self.longitude, self.latitude) {
            (Some(lng), Some(lat)) => Some(format!("{},{}", lng, lat)),
            _ => None,
        }
    }
}
