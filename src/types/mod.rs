pub mod request;
pub mod trip;

pub use request::{Season, TripRequest};
pub use trip::{
    Accommodation, ActivityEntry, Coordinates, DayPlan, Trip, DEFAULT_SUMMARY,
    PARSE_ERROR_SUMMARY,
};
