//! Trip plan data
//!
//! Sections are decoded leniently: item fields the model leaves out stay
//! `None` and render as placeholders.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::conversation::TripFieldSet;

/// Placeholder for a missing item field
pub const NOT_AVAILABLE: &str = "N/A";
/// Placeholder for a missing meal
pub const TO_BE_DECIDED: &str = "TBD";
/// Placeholder for an unstated travel type or empty interests
pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: Option<String>,
    pub description: Option<String>,
    pub hours_needed: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub time: Option<String>,
    pub activity: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meals {
    pub breakfast: Option<String>,
    pub lunch: Option<String>,
    pub dinner: Option<String>,
}

impl Meals {
    pub fn is_empty(&self) -> bool {
        self.breakfast.is_none() && self.lunch.is_none() && self.dinner.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Kept as text: models send both `1` and `"1"`
    pub day_number: Option<String>,
    pub title: Option<String>,
    pub activities: Vec<Activity>,
    pub meals: Option<Meals>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOption {
    pub method: Option<String>,
    pub description: Option<String>,
    pub cost_estimate: Option<String>,
    pub recommended_for: Option<String>,
}

/// Everything the planner produced for one trip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripPlan {
    pub details: TripFieldSet,
    pub attractions: Vec<Attraction>,
    pub itinerary: Vec<DayPlan>,
    pub transport: Vec<TransportOption>,
    /// One message per section that could not be produced
    pub errors: Vec<String>,
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

/// "Day N: Title", unless the title already starts with "Day N"
pub fn format_day_label(day_number: &str, title: &str) -> String {
    if title.trim().starts_with(&format!("Day {}", day_number)) {
        title.to_string()
    } else {
        format!("Day {}: {}", day_number, title)
    }
}

impl DayPlan {
    pub fn label(&self) -> String {
        format_day_label(
            self.day_number.as_deref().unwrap_or("?"),
            self.title.as_deref().unwrap_or("Day"),
        )
    }
}

impl TripPlan {
    pub fn destination(&self) -> &str {
        self.details.location.as_deref().unwrap_or("Unknown")
    }

    pub fn interests_label(&self) -> String {
        match &self.details.interests {
            Some(interests) if !interests.is_empty() => interests.join(", "),
            _ => NOT_SPECIFIED.to_string(),
        }
    }

    pub fn travel_type_label(&self) -> &str {
        self.details.travel_type.as_deref().unwrap_or(NOT_SPECIFIED)
    }

    /// Render the plan as a standalone markdown document
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# Trip to {}\n\n", self.destination()));

        if !self.errors.is_empty() {
            md.push_str("> Some information could not be fetched:\n");
            for error in &self.errors {
                md.push_str(&format!("> - {}\n", error));
            }
            md.push('\n');
        }

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- **Destination:** {}\n", self.destination()));
        if let Some(days) = self.details.duration {
            md.push_str(&format!("- **Duration:** {} days\n", days));
        }
        md.push_str(&format!("- **Travel type:** {}\n", self.travel_type_label()));
        if let Some(budget) = &self.details.budget {
            md.push_str(&format!("- **Budget:** {}\n", budget));
        }
        md.push_str(&format!("- **Interests:** {}\n\n", self.interests_label()));

        md.push_str("## Top Attractions\n\n");
        if self.attractions.is_empty() {
            md.push_str("No attractions fetched\n\n");
        } else {
            md.push_str("| Attraction | Category | Duration | Description |\n");
            md.push_str("|---|---|---|---|\n");
            for a in &self.attractions {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    or_na(&a.name),
                    or_na(&a.category),
                    or_na(&a.hours_needed),
                    or_na(&a.description)
                ));
            }
            md.push('\n');
        }

        md.push_str("## Day-by-Day Itinerary\n\n");
        if self.itinerary.is_empty() {
            md.push_str("No itinerary created\n\n");
        }
        for day in &self.itinerary {
            md.push_str(&format!("### {}\n\n", day.label()));
            for act in &day.activities {
                md.push_str(&format!(
                    "- {} {} ({})\n",
                    or_na(&act.time),
                    or_na(&act.activity),
                    or_na(&act.duration)
                ));
            }
            if let Some(meals) = day.meals.as_ref().filter(|m| !m.is_empty()) {
                md.push_str(&format!(
                    "\n**Meals:** breakfast: {}; lunch: {}; dinner: {}\n",
                    meals.breakfast.as_deref().unwrap_or(TO_BE_DECIDED),
                    meals.lunch.as_deref().unwrap_or(TO_BE_DECIDED),
                    meals.dinner.as_deref().unwrap_or(TO_BE_DECIDED)
                ));
            }
            if let Some(notes) = &day.notes {
                md.push_str(&format!("\n**Notes:** {}\n", notes));
            }
            md.push('\n');
        }

        md.push_str("## Transportation Options\n\n");
        if self.transport.is_empty() {
            md.push_str("No transportation options fetched\n\n");
        } else {
            for t in &self.transport {
                md.push_str(&format!(
                    "- **{}**: {} (cost: {}; recommended for: {})\n",
                    or_na(&t.method),
                    or_na(&t.description),
                    or_na(&t.cost_estimate),
                    or_na(&t.recommended_for)
                ));
            }
            md.push('\n');
        }

        md.push_str("Have a great trip!\n");
        md
    }

    /// Write the markdown rendering to `{dir}/{timestamp}-{slug}.md`
    pub fn save_markdown(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).context("Failed to create plan directory")?;

        let timestamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
        let slug = match slugify(self.destination()) {
            s if s.is_empty() => "trip".to_string(),
            s => s,
        };
        let path = dir.join(format!("{}-{}.md", timestamp, slug));

        std::fs::write(&path, self.to_markdown()).context("Failed to write plan file")?;
        info!(path = %path.display(), "TripPlan::save_markdown: plan written");
        Ok(path)
    }
}

/// Slugify a string for use in filenames
fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(50)
        .collect()
}
