use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Web Mercator projection constants
const EARTH_RADIUS: f64 = 6378137.0;
const MAX_LATITUDE: f64 = 85.0511287798;

/// Mean earth radius used for travel distances
const MEAN_EARTH_RADIUS_KM: f64 = 6371.0;

/// Represents a geographical coordinate with latitude and longitude.
///
/// Serialized as a `[lat, lng]` pair, which is how the itinerary data
/// stores coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<[f64; 2]> for LatLng {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(lat_lng: LatLng) -> Self {
        [lat_lng.lat, lat_lng.lng]
    }
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Great-circle distance to another coordinate in kilometres (haversine)
    pub fn distance_km(&self, other: &LatLng) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        MEAN_EARTH_RADIUS_KM * c
    }

    /// Clamps latitude to the range Web Mercator can represent
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Converts to Web Mercator projection (EPSG:3857)
    pub fn to_mercator(&self) -> Point {
        let lat = Self::clamp_lat(self.lat);
        let x = self.lng.to_radians() * EARTH_RADIUS;
        let y = ((PI / 4.0 + lat.to_radians() / 2.0).tan().ln()) * EARTH_RADIUS;
        Point::new(x, y)
    }

    /// Creates LatLng from Web Mercator coordinates
    pub fn from_mercator(point: Point) -> Self {
        let lng = (point.x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (point.y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        Self::new(lat, lng)
    }

    /// Linear interpolation towards `other`
    pub fn lerp(&self, other: &LatLng, t: f64) -> LatLng {
        LatLng::new(
            self.lat + (other.lat - self.lat) * t,
            self.lng + (other.lng - self.lng) * t,
        )
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Smallest bounds containing every point, `None` for an empty input
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a LatLng>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self::new(first, first);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Checks if the bounds intersect with another bounds
    pub fn intersects(&self, other: &LatLngBounds) -> bool {
        !(other.north_east.lat < self.south_west.lat
            || other.south_west.lat > self.north_east.lat
            || other.north_east.lng < self.south_west.lng
            || other.south_west.lng > self.north_east.lng)
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Grows the bounds on every side by `ratio` of its span
    pub fn pad(&self, ratio: f64) -> LatLngBounds {
        let span = self.span();
        let lat_pad = span.lat * ratio;
        let lng_pad = span.lng * ratio;
        LatLngBounds::from_coords(
            self.south_west.lat - lat_pad,
            self.south_west.lng - lng_pad,
            self.north_east.lat + lat_pad,
            self.north_east.lng + lng_pad,
        )
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Gets the span of the bounds
    pub fn span(&self) -> LatLng {
        LatLng::new(
            self.north_east.lat - self.south_west.lat,
            self.north_east.lng - self.south_west.lng,
        )
    }

    /// Same area with the corners put back in south-west / north-east order
    pub fn normalized(&self) -> LatLngBounds {
        LatLngBounds::from_coords(
            self.south_west.lat.min(self.north_east.lat),
            self.south_west.lng.min(self.north_east.lng),
            self.south_west.lat.max(self.north_east.lat),
            self.south_west.lng.max(self.north_east.lng),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(35.6762, 139.6503);
        assert_eq!(coord.lat, 35.6762);
        assert_eq!(coord.lng, 139.6503);
        assert!(coord.is_valid());
        assert!(!LatLng::new(95.0, 0.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_lat_lng_distance() {
        let kyoto = LatLng::new(35.0116, 135.7681);
        let osaka = LatLng::new(34.6937, 135.5023);

        // Kyoto to Osaka is roughly 43 km as the crow flies
        let distance = kyoto.distance_km(&osaka);
        assert!((distance - 43.0).abs() < 2.0, "got {distance}");
    }

    #[test]
    fn test_serde_pair() {
        let coord: LatLng = serde_json::from_str("[35.5131, 138.7697]").unwrap();
        assert_eq!(coord, LatLng::new(35.5131, 138.7697));
        assert_eq!(serde_json::to_string(&coord).unwrap(), "[35.5131,138.7697]");
    }

    #[test]
    fn test_mercator_inverse() {
        let takayama = LatLng::new(36.1428, 137.2531);
        let back = LatLng::from_mercator(takayama.to_mercator());
        assert!((back.lat - takayama.lat).abs() < 1e-9);
        assert!((back.lng - takayama.lng).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_from_points_and_pad() {
        let points = [
            LatLng::new(35.6762, 139.6503),
            LatLng::new(34.6937, 135.5023),
            LatLng::new(36.1428, 137.2531),
        ];
        let bounds = LatLngBounds::from_points(points.iter()).unwrap();
        assert_eq!(bounds.south_west, LatLng::new(34.6937, 135.5023));
        assert_eq!(bounds.north_east, LatLng::new(36.1428, 139.6503));

        let padded = bounds.pad(0.1);
        assert!(padded.contains(&bounds.south_west));
        assert!(padded.south_west.lat < bounds.south_west.lat);

        assert!(LatLngBounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_bounds_contains() {
        let japan = LatLngBounds::from_coords(24.0, 123.0, 46.0, 148.0);
        assert!(japan.contains(&LatLng::new(35.0116, 135.7681)));
        assert!(!japan.contains(&LatLng::new(37.7749, -122.4194)));
    }
}
