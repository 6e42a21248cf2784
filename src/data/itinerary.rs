//! Static travel data: trip metadata, locations, daily plans and route segments.
//!
//! The data is read once from JSON and is read-only afterwards. Locations are
//! keyed by [`location_key`] of their display name, and each location's stay
//! window on the timeline is derived from its stay dates relative to the trip
//! start, which also drives the day→location [`DayPolicy`].

use crate::{
    core::{constants::*, geo::LatLng},
    data::policy::{DayPolicy, StayRange},
    prelude::HashMap,
    Result, TripError,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const EMBEDDED_TRIP: &str = include_str!("../../data/japan_2025.json");

static LOCATION_COLORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut colors = HashMap::default();
    colors.insert("tokyo", "#ff6b6b");
    colors.insert("kawaguchiko", "#ff9f43");
    colors.insert("takayama", "#4ecdc4");
    colors.insert("kyoto", "#45b7d1");
    colors.insert("osaka", "#45b7d1");
    colors
});

/// Derives a location key from a display name: lowercase, letters only.
///
/// `"Kawaguchi-ko"` becomes `"kawaguchiko"`.
pub fn location_key(name: &str) -> String {
    name.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripMetadata {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub total_cost: Option<CostBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub transportation: u64,
    pub accommodation: u64,
    pub food: u64,
    pub activities: u64,
    pub total: u64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub name: String,
    pub price_range: String,
    pub area: String,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Accommodations {
    pub luxury: Vec<Hotel>,
    pub mid_range: Vec<Hotel>,
    pub budget: Vec<Hotel>,
}

impl Accommodations {
    /// Number of price tiers that list at least one hotel
    pub fn available_tiers(&self) -> usize {
        [&self.luxury, &self.mid_range, &self.budget]
            .iter()
            .filter(|tier| !tier.is_empty())
            .count()
    }

    pub fn summary(&self) -> Option<String> {
        match self.available_tiers() {
            0 => None,
            1 => Some("1 price tier available".to_string()),
            n => Some(format!("{} price tiers available", n)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub high: i32,
    pub low: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub avg_temp: Temperature,
    pub conditions: String,
    #[serde(default)]
    pub clothing: Vec<String>,
}

impl Weather {
    pub fn summary(&self) -> String {
        format!(
            "{}°C to {}°C, {}",
            self.avg_temp.low, self.avg_temp.high, self.conditions
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Derived from `name` when the data is loaded
    #[serde(skip)]
    pub key: String,
    pub name: String,
    pub coords: LatLng,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub prefecture: String,
    #[serde(rename = "base_location", default)]
    pub is_base_location: bool,
    /// Nights spent, as listed in the itinerary
    #[serde(default)]
    pub stay_duration: u32,
    pub dates: StayDates,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub accommodations: Option<Accommodations>,
    #[serde(default)]
    pub transportation: HashMap<String, String>,
    #[serde(default)]
    pub weather: Option<Weather>,
    /// First timeline day spent here
    #[serde(skip)]
    pub stay_start_day: u32,
    /// Last timeline day spent here
    #[serde(skip)]
    pub stay_end_day: u32,
}

impl Location {
    pub fn color(&self) -> &'static str {
        LOCATION_COLORS
            .get(self.key.as_str())
            .copied()
            .unwrap_or(DEFAULT_LOCATION_COLOR)
    }

    pub fn marker_radius(&self) -> f64 {
        if self.is_base_location {
            BASE_MARKER_RADIUS
        } else {
            STOP_MARKER_RADIUS
        }
    }

    /// Plain-text popup shown for the location marker
    pub fn popup_summary(&self) -> String {
        let mut lines = vec![
            self.name.clone(),
            format!(
                "{} nights • {} to {}",
                self.stay_duration, self.dates.start, self.dates.end
            ),
            self.description.clone(),
        ];
        if !self.highlights.is_empty() {
            lines.push("Winter Highlights:".to_string());
            lines.extend(self.highlights.iter().map(|h| format!("• {}", h)));
        }
        if let Some(summary) = self.accommodations.as_ref().and_then(|a| a.summary()) {
            lines.push(format!("Accommodation: {}", summary));
        }
        if let Some(weather) = &self.weather {
            lines.push(format!("Weather: {}", weather.summary()));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub time: String,
    pub name: String,
    pub duration_min: u32,
    pub kind: String,
    #[serde(default)]
    pub cost: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub day: u32,
    pub date: NaiveDate,
    pub location: String,
    pub title: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

/// Inclusive day window during which a route segment is on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct DayRange {
    pub start_day: u32,
    pub end_day: u32,
}

impl From<[u32; 2]> for DayRange {
    fn from(pair: [u32; 2]) -> Self {
        Self {
            start_day: pair[0],
            end_day: pair[1],
        }
    }
}

impl From<DayRange> for [u32; 2] {
    fn from(range: DayRange) -> Self {
        [range.start_day, range.end_day]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub id: String,
    pub from: LatLng,
    pub to: LatLng,
    pub color: String,
    #[serde(default = "default_segment_weight")]
    pub weight: f64,
    #[serde(rename = "days")]
    pub active_days: DayRange,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub duration_min: Option<u32>,
    #[serde(default)]
    pub cost: Option<u64>,
}

fn default_segment_weight() -> f64 {
    4.0
}

impl RouteSegment {
    /// Rounded great-circle length in kilometres
    pub fn distance_km(&self) -> u32 {
        self.from.distance_km(&self.to).round() as u32
    }

    pub fn popup_text(&self) -> String {
        format!(
            "{}\nDays {} - {}\nDistance: {} km",
            self.description,
            self.active_days.start_day,
            self.active_days.end_day,
            self.distance_km()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Festival {
    pub name: String,
    pub dates: String,
    pub location: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WinterSpecifics {
    pub festivals: Vec<Festival>,
    pub packing_list: Vec<String>,
    pub tips: Vec<String>,
}

/// Wire layout of the data file. Locations stay untyped so that one
/// malformed entry can be skipped without rejecting the whole file.
#[derive(Deserialize)]
struct RawTravelData {
    metadata: TripMetadata,
    locations: Vec<serde_json::Value>,
    #[serde(default)]
    daily_plans: Vec<DailyPlan>,
    #[serde(default)]
    route_segments: Vec<RouteSegment>,
    #[serde(default)]
    winter_specifics: WinterSpecifics,
}

#[derive(Debug, Clone)]
pub struct TravelData {
    pub metadata: TripMetadata,
    locations: Vec<Location>,
    index: HashMap<String, usize>,
    daily_plans: Vec<DailyPlan>,
    route_segments: Vec<RouteSegment>,
    pub winter_specifics: WinterSpecifics,
    policy: DayPolicy,
    skipped: Vec<String>,
}

impl TravelData {
    /// The trip bundled with the crate
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_TRIP)
    }

    /// Parses travel data. Malformed locations are logged and skipped; an
    /// unreadable document or an empty location table is an error.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTravelData = serde_json::from_str(json)?;
        let start = raw.metadata.start_date;

        let mut skipped = Vec::new();
        let mut locations = Vec::with_capacity(raw.locations.len());
        for (position, value) in raw.locations.into_iter().enumerate() {
            match Self::parse_location(value, start) {
                Ok(location) => locations.push(location),
                Err(e) => {
                    log::warn!("Skipping location #{}: {}", position, e);
                    skipped.push(e.to_string());
                }
            }
        }

        if locations.is_empty() {
            return Err(TripError::MissingDependency(
                "travel data has no usable locations".to_string(),
            ));
        }

        locations.sort_by_key(|l| l.stay_start_day);
        Self::close_stay_windows(&mut locations);

        let mut index = HashMap::default();
        for (i, location) in locations.iter().enumerate() {
            if index.insert(location.key.clone(), i).is_some() {
                log::warn!("Duplicate location key '{}', last entry wins", location.key);
            }
        }

        for plan in &raw.daily_plans {
            if !index.contains_key(&plan.location) {
                log::warn!(
                    "Daily plan for day {} references unknown location '{}'",
                    plan.day,
                    plan.location
                );
            }
        }

        let policy = DayPolicy::new(
            locations
                .iter()
                .map(|l| StayRange::new(l.stay_start_day, l.stay_end_day, l.key.clone()))
                .collect(),
        );

        log::debug!(
            "Loaded '{}': {} locations, {} daily plans, {} route segments",
            raw.metadata.title,
            locations.len(),
            raw.daily_plans.len(),
            raw.route_segments.len()
        );

        Ok(Self {
            metadata: raw.metadata,
            locations,
            index,
            daily_plans: raw.daily_plans,
            route_segments: raw.route_segments,
            winter_specifics: raw.winter_specifics,
            policy,
            skipped,
        })
    }

    fn parse_location(value: serde_json::Value, trip_start: NaiveDate) -> Result<Location> {
        let mut location: Location = serde_json::from_value(value)?;
        if !location.coords.is_valid() {
            return Err(TripError::InvalidCoordinates(format!(
                "{}: {:?}",
                location.name, location.coords
            )));
        }

        location.key = location_key(&location.name);
        if location.key.is_empty() {
            return Err(TripError::InvalidData(format!(
                "location name '{}' yields an empty key",
                location.name
            )));
        }

        let offset = (location.dates.start - trip_start).num_days();
        if offset < 0 || offset >= TRIP_DAYS as i64 {
            return Err(TripError::InvalidData(format!(
                "{} starts outside the trip ({})",
                location.name, location.dates.start
            )));
        }
        location.stay_start_day = offset as u32 + 1;
        Ok(location)
    }

    /// Each stay runs until the day before the next one starts; the last
    /// stay runs to the end of the trip.
    fn close_stay_windows(locations: &mut [Location]) {
        let starts: Vec<u32> = locations.iter().map(|l| l.stay_start_day).collect();
        for (i, location) in locations.iter_mut().enumerate() {
            location.stay_end_day = match starts.get(i + 1) {
                Some(&next) => next.saturating_sub(1).max(location.stay_start_day),
                None => TRIP_DAYS,
            };
        }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn location(&self, key: &str) -> Option<&Location> {
        self.index.get(key).map(|&i| &self.locations[i])
    }

    /// Display name for a key, falling back to the key itself
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.location(key).map(|l| l.name.as_str()).unwrap_or(key)
    }

    pub fn daily_plan(&self, day: u32) -> Option<&DailyPlan> {
        self.daily_plans.iter().find(|plan| plan.day == day)
    }

    pub fn daily_plans(&self) -> &[DailyPlan] {
        &self.daily_plans
    }

    pub fn route_segments(&self) -> &[RouteSegment] {
        &self.route_segments
    }

    pub fn policy(&self) -> &DayPolicy {
        &self.policy
    }

    /// Calendar date of a timeline day
    pub fn date_for_day(&self, day: u32) -> NaiveDate {
        self.metadata.start_date + chrono::Duration::days(day.saturating_sub(1) as i64)
    }

    /// Errors for locations dropped while loading
    pub fn skipped_locations(&self) -> &[String] {
        &self.skipped
    }
}
