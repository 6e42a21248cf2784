pub mod itinerary;
pub mod policy;

pub use itinerary::{
    location_key, Accommodations, Activity, DailyPlan, DayRange, Location, RouteSegment,
    TravelData, TripMetadata, Weather,
};
pub use policy::{DayPolicy, StayRange};
