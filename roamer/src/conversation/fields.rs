//! Trip field vocabulary and the sparse field set

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One named trip attribute
///
/// Declaration order is the vocabulary order and drives set ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripField {
    Location,
    Duration,
    Interests,
    Budget,
    TravelType,
}

impl TripField {
    /// The fixed field vocabulary
    pub const ALL: [TripField; 5] = [
        TripField::Location,
        TripField::Duration,
        TripField::Interests,
        TripField::Budget,
        TripField::TravelType,
    ];

    /// Order in which follow-up questions target missing fields
    pub const ASK_PRIORITY: [TripField; 4] = [
        TripField::Duration,
        TripField::Interests,
        TripField::Budget,
        TripField::TravelType,
    ];

    /// Fields the gate insists on before planning
    pub const REQUIRED: [TripField; 3] = [TripField::Location, TripField::Duration, TripField::Interests];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripField::Location => "location",
            TripField::Duration => "duration",
            TripField::Interests => "interests",
            TripField::Budget => "budget",
            TripField::TravelType => "travel_type",
        }
    }
}

impl fmt::Display for TripField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "location" => Ok(TripField::Location),
            "duration" => Ok(TripField::Duration),
            "interests" => Ok(TripField::Interests),
            "budget" => Ok(TripField::Budget),
            "travel_type" => Ok(TripField::TravelType),
            other => Err(format!("unknown trip field: {}", other)),
        }
    }
}

/// Sparse set of explicitly stated trip attributes
///
/// `None` means "not yet provided by the traveler", never "unknown": nothing
/// in the extraction path fills a field with a guessed or default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripFieldSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Trip length in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_type: Option<String>,
}

impl TripFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_duration(mut self, days: u32) -> Self {
        self.duration = Some(days);
        self
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = Some(interests.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_budget(mut self, budget: impl Into<String>) -> Self {
        self.budget = Some(budget.into());
        self
    }

    pub fn with_travel_type(mut self, travel_type: impl Into<String>) -> Self {
        self.travel_type = Some(travel_type.into());
        self
    }

    /// Whether the field was stated at all
    pub fn contains(&self, field: TripField) -> bool {
        match field {
            TripField::Location => self.location.is_some(),
            TripField::Duration => self.duration.is_some(),
            TripField::Interests => self.interests.is_some(),
            TripField::Budget => self.budget.is_some(),
            TripField::TravelType => self.travel_type.is_some(),
        }
    }

    /// Stated fields, in vocabulary order
    pub fn present(&self) -> Vec<TripField> {
        TripField::ALL.into_iter().filter(|f| self.contains(*f)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }

    /// Human-readable value of a stated field
    pub fn display_value(&self, field: TripField) -> Option<String> {
        match field {
            TripField::Location => self.location.clone(),
            TripField::Duration => self.duration.map(|d| format!("{} days", d)),
            TripField::Interests => self.interests.as_ref().map(|i| i.join(", ")),
            TripField::Budget => self.budget.clone(),
            TripField::TravelType => self.travel_type.clone(),
        }
    }

    /// `field: value` pairs of everything stated, for prompts and logs
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .present()
            .into_iter()
            .filter_map(|f| self.display_value(f).map(|v| format!("{}: {}", f, v)))
            .collect();

        if parts.is_empty() {
            "nothing yet".to_string()
        } else {
            parts.join("; ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_roundtrip() {
        for field in TripField::ALL {
            assert_eq!(field.as_str().parse::<TripField>().unwrap(), field);
        }
        assert_eq!("Travel Type".parse::<TripField>().unwrap(), TripField::TravelType);
        assert!("weather".parse::<TripField>().is_err());
    }

    #[test]
    fn test_serialization_is_sparse() {
        let fields = TripFieldSet::new().with_location("Paris");
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json, serde_json::json!({ "location": "Paris" }));
    }

    #[test]
    fn test_present_follows_vocabulary_order() {
        let fields = TripFieldSet::new()
            .with_travel_type("solo")
            .with_location("Lima")
            .with_duration(4);
        assert_eq!(
            fields.present(),
            vec![TripField::Location, TripField::Duration, TripField::TravelType]
        );
        assert!(!fields.is_empty());
        assert!(TripFieldSet::new().is_empty());
    }

    #[test]
    fn test_summary() {
        let fields = TripFieldSet::new()
            .with_location("Kyoto")
            .with_duration(3)
            .with_interests(["temples", "tea"]);
        assert_eq!(fields.summary(), "location: Kyoto; duration: 3 days; interests: temples, tea");
        assert_eq!(TripFieldSet::new().summary(), "nothing yet");
    }
}
