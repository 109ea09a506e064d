//! Terminal rendering of a finished trip plan

use colored::Colorize;

use crate::planner::{NOT_AVAILABLE, TO_BE_DECIDED, TripPlan};

fn na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

/// Render the complete plan for the terminal
pub fn render_plan(plan: &TripPlan) -> String {
    let mut out = Vec::new();

    if !plan.errors.is_empty() {
        out.push(format!("{}", "Some information could not be fetched:".yellow().bold()));
        for error in &plan.errors {
            out.push(format!("  • {}", error.yellow()));
        }
        out.push(String::new());
    }

    out.push(format!("{}", "Trip Summary".bright_cyan().bold()));
    out.push(format!("  {:14} {}", "Destination:".bold(), plan.destination()));
    let duration = plan
        .details
        .duration
        .map(|d| format!("{} days", d))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    out.push(format!("  {:14} {}", "Duration:".bold(), duration));
    out.push(format!("  {:14} {}", "Travel Type:".bold(), plan.travel_type_label()));
    if let Some(budget) = &plan.details.budget {
        out.push(format!("  {:14} {}", "Budget:".bold(), budget));
    }
    out.push(format!("  {:14} {}", "Interests:".bold(), plan.interests_label()));
    out.push(String::new());

    out.push(format!("{}", "Top Attractions".bright_cyan().bold()));
    if plan.attractions.is_empty() {
        out.push(format!("  {}", "No attractions fetched".dimmed()));
    }
    for a in &plan.attractions {
        out.push(format!(
            "  {} {} ({})",
            na(&a.name).bright_white().bold(),
            format!("[{}]", na(&a.category)).dimmed(),
            na(&a.hours_needed)
        ));
        out.push(format!("      {}", na(&a.description)));
    }
    out.push(String::new());

    out.push(format!("{}", "Day-by-Day Itinerary".bright_cyan().bold()));
    if plan.itinerary.is_empty() {
        out.push(format!("  {}", "No itinerary created".dimmed()));
    }
    for day in &plan.itinerary {
        out.push(format!("  {}", day.label().green().bold()));
        for act in &day.activities {
            out.push(format!(
                "    {:>5}  {} ({})",
                na(&act.time),
                na(&act.activity),
                na(&act.duration)
            ));
        }
        if let Some(meals) = day.meals.as_ref().filter(|m| !m.is_empty()) {
            out.push(format!(
                "    Breakfast: {} | Lunch: {} | Dinner: {}",
                meals.breakfast.as_deref().unwrap_or(TO_BE_DECIDED),
                meals.lunch.as_deref().unwrap_or(TO_BE_DECIDED),
                meals.dinner.as_deref().unwrap_or(TO_BE_DECIDED)
            ));
        }
        if let Some(notes) = &day.notes {
            out.push(format!("    {} {}", "Notes:".bold(), notes));
        }
    }
    out.push(String::new());

    out.push(format!("{}", "Transportation Options".bright_cyan().bold()));
    if plan.transport.is_empty() {
        out.push(format!("  {}", "No transportation options fetched".dimmed()));
    }
    for t in &plan.transport {
        out.push(format!("  {}: {}", na(&t.method).bright_white().bold(), na(&t.description)));
        out.push(format!(
            "      Cost: {} | Recommended for: {}",
            na(&t.cost_estimate),
            na(&t.recommended_for)
        ));
    }
    out.push(String::new());

    out.push(format!("{}", "Have a great trip!".bright_green().bold()));
    out.join("\n")
}
