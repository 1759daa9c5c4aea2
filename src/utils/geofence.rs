use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two WGS84 coordinates (haversine).
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

/// Circular boundary around the facility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub lat: f64,
    pub lng: f64,
    pub radius_m: f64,
}

impl Facility {
    pub fn new(lat: f64, lng: f64, radius_m: f64) -> Self {
        Self { lat, lng, radius_m }
    }

    pub fn distance_to(&self, point: Point) -> f64 {
        distance_meters(point.lat, point.lng, self.lat, self.lng)
    }

    /// The boundary itself counts as inside.
    pub fn contains(&self, point: Point) -> bool {
        self.distance_to(point) <= self.radius_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAB: Facility = Facility {
        lat: 25.58883,
        lng: 56.26589,
        radius_m: 50.0,
    };

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_meters(25.58883, 56.26589, 25.58883, 56.26589), 0.0);
        assert_eq!(distance_meters(-33.9, 151.2, -33.9, 151.2), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ((25.58883, 56.26589), (25.59, 56.27)),
            ((51.5007, -0.1246), (40.6892, -74.0445)),
            ((0.0, 179.9), (0.0, -179.9)),
        ];
        for ((a_lat, a_lng), (b_lat, b_lng)) in pairs {
            let ab = distance_meters(a_lat, a_lng, b_lat, b_lng);
            let ba = distance_meters(b_lat, b_lng, a_lat, a_lng);
            assert!((ab - ba).abs() < 1e-6, "{ab} != {ba}");
        }
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn facility_center_is_inside() {
        let center = Point { lat: LAB.lat, lng: LAB.lng };
        assert!(LAB.contains(center));
        assert_eq!(LAB.distance_to(center), 0.0);
    }

    #[test]
    fn point_a_few_hundred_meters_away_is_outside() {
        // ~0.001 deg latitude is ~111 m
        let far = Point { lat: LAB.lat + 0.003, lng: LAB.lng };
        assert!(!LAB.contains(far));

        let near = Point { lat: LAB.lat + 0.0003, lng: LAB.lng };
        assert!(LAB.contains(near));
    }
}
