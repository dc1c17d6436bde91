use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// mean Earth radius in kilometers, shared by the haversine distance and
/// the spherical-to-Cartesian conversion so that both agree on scale.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// a WGS84 position with an optional altitude offset in kilometers.
///
/// equality is field-exact so that locations can act as deduplication
/// keys; two locations differing in any bit compare unequal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl GeoLocation {
    pub fn new(lat: f64, lon: f64) -> GeoLocation {
        GeoLocation { lat, lon, alt: 0.0 }
    }

    /// great-circle distance to another location in kilometers.
    pub fn haversine_km(&self, other: &GeoLocation) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_phi = (other.lat - self.lat).to_radians();
        let d_lambda = (other.lon - self.lon).to_radians();
        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }

    /// converts to 3-D Cartesian coordinates (km) on a sphere of radius
    /// `EARTH_RADIUS_KM + alt`. the spatial indices operate in this space.
    pub fn to_cartesian(&self) -> [f64; 3] {
        let r = EARTH_RADIUS_KM + self.alt;
        let phi = self.lat.to_radians();
        let lambda = self.lon.to_radians();
        [
            r * phi.cos() * lambda.cos(),
            r * phi.cos() * lambda.sin(),
            r * phi.sin(),
        ]
    }
}

impl Eq for GeoLocation {}

impl Hash for GeoLocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lat.to_bits().hash(state);
        self.lon.to_bits().hash(state);
        self.alt.to_bits().hash(state);
    }
}

/// straight-line (chord) distance between two Cartesian points in km.
pub fn euclidean_km(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// distance from point `p` to the segment `(a, b)` in Cartesian space,
/// along with the fractional position in [0, 1] of the closest point on
/// the segment.
pub fn point_segment_distance(p: &[f64; 3], a: &[f64; 3], b: &[f64; 3]) -> (f64, f64) {
    let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let ap = [p[0] - a[0], p[1] - a[1], p[2] - a[2]];
    let len_sq = ab[0] * ab[0] + ab[1] * ab[1] + ab[2] * ab[2];
    if len_sq == 0.0 {
        // degenerate segment, both endpoints coincide
        return (euclidean_km(p, a), 0.0);
    }
    let t = ((ap[0] * ab[0] + ap[1] * ab[1] + ap[2] * ab[2]) / len_sq).clamp(0.0, 1.0);
    let closest = [a[0] + t * ab[0], a[1] + t * ab[1], a[2] + t * ab[2]];
    (euclidean_km(p, &closest), t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_known_distance() {
        // Melbourne CBD to Sydney CBD is roughly 714 km
        let melbourne = GeoLocation::new(-37.8136, 144.9631);
        let sydney = GeoLocation::new(-33.8688, 151.2093);
        let d = melbourne.haversine_km(&sydney);
        assert!((d - 714.0).abs() < 5.0, "unexpected distance {d}");
    }

    #[test]
    fn haversine_zero_for_identical_points() {
        let p = GeoLocation::new(-38.0751637, 145.3326838);
        assert_eq!(p.haversine_km(&p), 0.0);
    }

    #[test]
    fn cartesian_chord_approximates_haversine_for_short_segments() {
        let a = GeoLocation::new(-38.0751637, 145.3326838);
        let b = GeoLocation::new(-38.0752637, 145.3326838);
        let chord = euclidean_km(&a.to_cartesian(), &b.to_cartesian());
        let arc = a.haversine_km(&b);
        assert!((chord - arc).abs() < 1e-6);
    }

    #[test]
    fn point_segment_projects_onto_interior() {
        let a = [0.0, 0.0, 0.0];
        let b = [2.0, 0.0, 0.0];
        let p = [1.0, 1.0, 0.0];
        let (d, t) = point_segment_distance(&p, &a, &b);
        assert!((d - 1.0).abs() < 1e-12);
        assert!((t - 0.5).abs() < 1e-12);
    }

    #[test]
    fn point_segment_clamps_to_endpoint() {
        let a = [0.0, 0.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        let p = [3.0, 0.0, 0.0];
        let (d, t) = point_segment_distance(&p, &a, &b);
        assert!((d - 2.0).abs() < 1e-12);
        assert_eq!(t, 1.0);
    }
}
