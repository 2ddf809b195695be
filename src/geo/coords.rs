//! Coordinate strings in provider format ("lng,lat").

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lng: f64,
    pub lat: f64,
}

impl Coord {
    pub fn parse(s: &str) -> AppResult<Self> {
        let mut parts = s.trim().split(',');
        let (Some(a), Some(b), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AppError::InvalidCoordinate(s.to_string()));
        };

        let lng: f64 = a
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidCoordinate(s.to_string()))?;
        let lat: f64 = b
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidCoordinate(s.to_string()))?;

        Ok(Coord { lng, lat })
    }

    pub fn to_param(self) -> String {
        format!("{},{}", self.lng, self.lat)
    }
}

/// Normalize a coordinate string to "lng,lat".
///
/// Frontends occasionally hand over "lat,lng". Within mainland China the
/// ranges do not overlap (lat 18–54, lng 73–135), so a pair that reads as
/// (lat, lng) gets swapped. Anything unparseable is returned untouched —
/// the caller's parse will produce the real error.
pub fn normalize_coordinate(s: &str) -> String {
    let Ok(c) = Coord::parse(s) else {
        return s.to_string();
    };

    if (18.0..=54.0).contains(&c.lng) && (73.0..=135.0).contains(&c.lat) {
        tracing::info!(original = %s, "coordinate order corrected");
        return format!("{},{}", c.lat, c.lng);
    }

    s.trim().to_string()
}
