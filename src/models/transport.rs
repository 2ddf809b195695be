use serde::{Deserialize, Serialize};

/// How the auditor travelled between stores. Driving and taxi are routed by
/// the mapping provider; the rest are estimated from straight-line distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Driving,
    Taxi,
    Walking,
    Bus,
    Train,
    Airplane,
}

impl TransportMode {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TransportMode::Driving => "driving",
            TransportMode::Taxi => "taxi",
            TransportMode::Walking => "walking",
            TransportMode::Bus => "bus",
            TransportMode::Train => "train",
            TransportMode::Airplane => "airplane",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "driving" => Some(TransportMode::Driving),
            "taxi" => Some(TransportMode::Taxi),
            "walking" => Some(TransportMode::Walking),
            "bus" => Some(TransportMode::Bus),
            "train" => Some(TransportMode::Train),
            "airplane" => Some(TransportMode::Airplane),
            _ => None,
        }
    }

    /// Driving and taxi go through the provider's driving route API.
    pub fn uses_driving_api(&self) -> bool {
        matches!(self, TransportMode::Driving | TransportMode::Taxi)
    }

    /// Hours added on top of the submitted travel hours for long-haul modes
    /// (station/airport overhead).
    pub fn travel_hours_adjustment(&self) -> f64 {
        match self {
            TransportMode::Train => 1.0,
            TransportMode::Airplane => 2.0,
            _ => 0.0,
        }
    }

    /// Hours added to a routed duration: parking for driving, parking plus
    /// passenger wait for taxi.
    pub fn route_extra_hours(&self) -> f64 {
        match self {
            TransportMode::Driving => 0.16,
            TransportMode::Taxi => 0.16 + 0.083,
            _ => 0.0,
        }
    }

    /// Average speed (km/h) used when estimating from straight-line distance.
    pub fn estimate_speed_kmh(&self) -> f64 {
        match self {
            TransportMode::Walking => 5.0,
            TransportMode::Driving | TransportMode::Taxi | TransportMode::Bus => 60.0,
            TransportMode::Train => 200.0,
            TransportMode::Airplane => 600.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_round_trip() {
        for m in [
            TransportMode::Driving,
            TransportMode::Taxi,
            TransportMode::Walking,
            TransportMode::Bus,
            TransportMode::Train,
            TransportMode::Airplane,
        ] {
            assert_eq!(TransportMode::from_db_str(m.to_db_str()), Some(m));
        }
        assert_eq!(TransportMode::from_db_str("bicycle"), None);
    }

    #[test]
    fn long_haul_adjustments() {
        assert_eq!(TransportMode::Train.travel_hours_adjustment(), 1.0);
        assert_eq!(TransportMode::Airplane.travel_hours_adjustment(), 2.0);
        assert_eq!(TransportMode::Driving.travel_hours_adjustment(), 0.0);
    }

    #[test]
    fn taxi_waits_longer_than_driving() {
        assert!(TransportMode::Taxi.route_extra_hours() > TransportMode::Driving.route_extra_hours());
        assert_eq!(TransportMode::Bus.route_extra_hours(), 0.0);
    }
}
