//! Shape checks for planning payloads
//!
//! Each validator either returns typed section data or a [`ValidationError`]
//! naming the first problem found.

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{Activity, Attraction, DayPlan, Meals, TransportOption};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Empty response from API")]
    Empty,

    #[error("Response is not a JSON object")]
    NotAnObject,

    #[error("Missing '{0}' key in response")]
    MissingKey(&'static str),

    #[error("'{0}' must be a list")]
    NotAList(&'static str),

    #[error("{kind} {index} is not a dictionary")]
    ItemNotObject { kind: &'static str, index: usize },

    #[error("{kind} {index} missing fields: {fields}")]
    ItemMissingFields {
        kind: &'static str,
        index: usize,
        fields: String,
    },

    #[error("Day {0} activities must be a list")]
    ActivitiesNotAList(usize),

    #[error("'duration' must be an integer")]
    DurationNotInteger,
}

const ATTRACTION_FIELDS: [&str; 4] = ["name", "description", "hours_needed", "category"];

/// Scalar JSON as text; `null`, arrays and objects count as absent
fn text(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn object(data: &Value) -> Result<&Map<String, Value>, ValidationError> {
    data.as_object().ok_or(ValidationError::NotAnObject)
}

fn list<'a>(data: &'a Map<String, Value>, key: &'static str) -> Result<&'a Vec<Value>, ValidationError> {
    data.get(key)
        .ok_or(ValidationError::MissingKey(key))?
        .as_array()
        .ok_or(ValidationError::NotAList(key))
}

pub fn validate_attractions(data: &Value) -> Result<Vec<Attraction>, ValidationError> {
    let items = list(object(data)?, "attractions")?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let item = item.as_object().ok_or(ValidationError::ItemNotObject {
                kind: "Attraction",
                index,
            })?;
            let missing: Vec<&str> = ATTRACTION_FIELDS
                .into_iter()
                .filter(|f| !item.contains_key(*f))
                .collect();
            if !missing.is_empty() {
                return Err(ValidationError::ItemMissingFields {
                    kind: "Attraction",
                    index,
                    fields: missing.join(", "),
                });
            }
            Ok(Attraction {
                name: text(item, "name"),
                description: text(item, "description"),
                hours_needed: text(item, "hours_needed"),
                category: text(item, "category"),
            })
        })
        .collect()
}

pub fn validate_itinerary(data: &Value) -> Result<Vec<DayPlan>, ValidationError> {
    let days = list(object(data)?, "days")?;

    days.iter()
        .enumerate()
        .map(|(index, day)| {
            let day = day.as_object().ok_or(ValidationError::ItemNotObject { kind: "Day", index })?;

            let activities = match day.get("activities") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|a| Activity {
                        time: text(a, "time"),
                        activity: text(a, "activity"),
                        duration: text(a, "duration"),
                    })
                    .collect(),
                Some(_) => return Err(ValidationError::ActivitiesNotAList(index)),
            };

            let meals = day.get("meals").and_then(Value::as_object).map(|m| Meals {
                breakfast: text(m, "breakfast"),
                lunch: text(m, "lunch"),
                dinner: text(m, "dinner"),
            });

            Ok(DayPlan {
                day_number: text(day, "day_number"),
                title: text(day, "title"),
                activities,
                meals,
                notes: text(day, "notes").filter(|n| !n.trim().is_empty()),
            })
        })
        .collect()
}

pub fn validate_transportation(data: &Value) -> Result<Vec<TransportOption>, ValidationError> {
    let data = object(data)?;
    if data.is_empty() {
        return Err(ValidationError::Empty);
    }

    let items = list(data, "transportation")?;
    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .map(|t| TransportOption {
            method: text(t, "method"),
            description: text(t, "description"),
            cost_estimate: text(t, "cost_estimate"),
            recommended_for: text(t, "recommended_for"),
        })
        .collect())
}

/// Check a raw travel-details payload: location required, integral duration
pub fn validate_travel_details(data: &Value) -> Result<(), ValidationError> {
    let data = object(data)?;
    if !data.contains_key("location") {
        return Err(ValidationError::MissingKey("location"));
    }
    match data.get("duration") {
        Some(d) if !(d.is_u64() || d.is_i64()) => Err(ValidationError::DurationNotInteger),
        _ => Ok(()),
    }
}
