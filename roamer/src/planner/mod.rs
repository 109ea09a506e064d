//! Planning pipeline: attractions, itinerary and transportation for a
//! complete set of trip fields.

mod coordinator;
mod types;
pub mod validation;

pub use coordinator::{PLAN_TEMPERATURE, PlanError, PlannerConfig, TripPlanner};
pub use types::{
    Activity, Attraction, DayPlan, Meals, NOT_AVAILABLE, NOT_SPECIFIED, TO_BE_DECIDED, TransportOption, TripPlan,
    format_day_label,
};
pub use validation::ValidationError;
