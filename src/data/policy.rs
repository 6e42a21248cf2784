//! Day→location bucketing.
//!
//! Built from the locations' stay windows rather than a hand-maintained
//! table, so the buckets can never disagree with the itinerary dates.

use crate::core::constants::TRIP_DAYS;

/// One stay on the timeline: `start_day..=end_day` spent at `key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StayRange {
    pub start_day: u32,
    pub end_day: u32,
    pub key: String,
}

impl StayRange {
    pub fn new(start_day: u32, end_day: u32, key: String) -> Self {
        Self {
            start_day,
            end_day,
            key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DayPolicy {
    ranges: Vec<StayRange>,
}

impl DayPolicy {
    pub fn new(mut ranges: Vec<StayRange>) -> Self {
        ranges.sort_by_key(|r| r.start_day);
        Self { ranges }
    }

    /// Location key for a day. Lower bounds are inclusive; days before the
    /// first stay belong to it and days after the last stay to the last one.
    pub fn location_for(&self, day: u32) -> Option<&str> {
        let day = day.clamp(1, TRIP_DAYS);
        self.ranges
            .iter()
            .rev()
            .find(|r| r.start_day <= day)
            .or_else(|| self.ranges.first())
            .map(|r| r.key.as_str())
    }

    /// Days on which the location changes; these are the timeline marker days
    pub fn transition_days(&self) -> Vec<u32> {
        self.ranges.iter().map(|r| r.start_day).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn japan() -> DayPolicy {
        DayPolicy::new(vec![
            StayRange::new(15, 18, "kyoto".to_string()),
            StayRange::new(1, 7, "tokyo".to_string()),
            StayRange::new(8, 10, "kawaguchiko".to_string()),
            StayRange::new(11, 14, "takayama".to_string()),
            StayRange::new(19, 21, "osaka".to_string()),
        ])
    }

    #[test]
    fn test_boundaries_on_both_sides() {
        let policy = japan();
        let expected = [
            (7, "tokyo"),
            (8, "kawaguchiko"),
            (10, "kawaguchiko"),
            (11, "takayama"),
            (14, "takayama"),
            (15, "kyoto"),
            (18, "kyoto"),
            (19, "osaka"),
        ];
        for (day, key) in expected {
            assert_eq!(policy.location_for(day), Some(key), "day {day}");
        }
    }

    #[test]
    fn test_out_of_range_days_clamp() {
        let policy = japan();
        assert_eq!(policy.location_for(0), Some("tokyo"));
        assert_eq!(policy.location_for(1), Some("tokyo"));
        assert_eq!(policy.location_for(21), Some("osaka"));
        assert_eq!(policy.location_for(99), Some("osaka"));
    }

    #[test]
    fn test_transition_days_and_empty_policy() {
        assert_eq!(japan().transition_days(), [1, 8, 11, 15, 19]);
        assert_eq!(DayPolicy::default().location_for(3), None);
    }
}
