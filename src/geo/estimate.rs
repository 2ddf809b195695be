//! Offline distance/time estimation, used when the routing provider is
//! unavailable or the transport mode has no routing API.

use super::coords::Coord;
use crate::models::transport::TransportMode;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Road distance is longer than the straight line; factor tuned against
/// provider results for driving.
const DRIVING_ROAD_FACTOR: f64 = 1.4;

/// Straight-line distance between two points, in km.
pub fn haversine_km(from: Coord, to: Coord) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlat = (to.lat - from.lat).to_radians();
    let dlng = (to.lng - from.lng).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Estimated (distance_km, duration_hours) for a leg, from the straight-line
/// distance and the mode's average speed. Driving and taxi apply the road
/// factor to the distance as well.
pub fn estimate_route(mode: TransportMode, from: Coord, to: Coord) -> (f64, f64) {
    let straight = haversine_km(from, to);

    let distance = if mode.uses_driving_api() {
        straight * DRIVING_ROAD_FACTOR
    } else {
        straight
    };

    let duration = distance / mode.estimate_speed_kmh();

    (distance, duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hangzhou() -> Coord {
        Coord {
            lng: 120.1552,
            lat: 30.2741,
        }
    }

    fn shanghai() -> Coord {
        Coord {
            lng: 121.4737,
            lat: 31.2304,
        }
    }

    #[test]
    fn haversine_known_pair() {
        // Hangzhou → Shanghai is roughly 165 km as the crow flies
        let d = haversine_km(hangzhou(), shanghai());
        assert!((150.0..180.0).contains(&d), "got {}", d);
    }

    #[test]
    fn haversine_never_negative() {
        let pairs = [
            (hangzhou(), hangzhou()),
            (hangzhou(), shanghai()),
            (Coord { lng: -180.0, lat: -90.0 }, Coord { lng: 180.0, lat: 90.0 }),
            (Coord { lng: 0.0, lat: 0.0 }, Coord { lng: 0.0, lat: 0.0 }),
        ];
        for (a, b) in pairs {
            assert!(haversine_km(a, b) >= 0.0);
        }
    }

    #[test]
    fn driving_is_longer_but_faster_than_walking() {
        let (d_drive, t_drive) = estimate_route(TransportMode::Driving, hangzhou(), shanghai());
        let (d_walk, t_walk) = estimate_route(TransportMode::Walking, hangzhou(), shanghai());

        assert!(d_drive > d_walk); // road factor applied
        assert!(t_drive < t_walk); // but much faster
    }

    #[test]
    fn train_beats_bus_on_time() {
        let (_, t_train) = estimate_route(TransportMode::Train, hangzhou(), shanghai());
        let (_, t_bus) = estimate_route(TransportMode::Bus, hangzhou(), shanghai());
        assert!(t_train < t_bus);
    }
}
