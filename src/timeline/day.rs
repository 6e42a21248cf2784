use crate::{
    core::constants::TRIP_DAYS,
    data::{Activity, TravelData},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything known about one timeline day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayData {
    pub day: u32,
    pub date: NaiveDate,
    /// Location key
    pub location: String,
    pub title: String,
    pub activities: Vec<Activity>,
    /// `false` when synthesized because the itinerary has no plan for the day
    pub planned: bool,
}

impl DayData {
    /// Resolves a day against the travel data: the explicit daily plan if
    /// there is one, otherwise a plan synthesized from the day policy.
    pub fn resolve(day: u32, data: &TravelData) -> Self {
        let day = day.clamp(1, TRIP_DAYS);
        if let Some(plan) = data.daily_plan(day) {
            return Self {
                day,
                date: plan.date,
                location: plan.location.clone(),
                title: plan.title.clone(),
                activities: plan.activities.clone(),
                planned: true,
            };
        }

        let location = data.policy().location_for(day).unwrap_or_default().to_string();
        let title = format!("Day {} in {}", day, data.display_name(&location));
        Self {
            day,
            date: data.date_for_day(day),
            location,
            title,
            activities: Vec::new(),
            planned: false,
        }
    }

    /// Long form date, e.g. `January 22, 2025`
    pub fn formatted_date(&self) -> String {
        format_date(self.date)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
