//! Decode-and-validate step for the terminal unit.
//!
//! The reasoning substrate answers in free text; this step extracts the JSON
//! object, decodes it into a `TravelPlan` and checks the plan's invariants.
//! Any failure is a `SchemaValidation` error, never a truncated plan.

use chrono::{Days, NaiveDate};
use tracing::warn;

use crate::error::{PlanError, PlanResult};
use crate::model::TravelPlan;

/// Absolute tolerance for cost reconciliation, in plan currency.
const COST_TOLERANCE: f64 = 0.01;

/// Pull the outermost JSON object out of a model answer.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

fn check_non_negative(value: f64, what: &str) -> PlanResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlanError::schema(format!(
            "{} must be a non-negative number, got {}",
            what, value
        )));
    }
    Ok(())
}

fn check_not_blank(value: &str, what: &str) -> PlanResult<()> {
    if value.trim().is_empty() {
        return Err(PlanError::schema(format!("{} must not be empty", what)));
    }
    Ok(())
}

/// Check the invariants serde cannot express.
pub fn validate_travel_plan(plan: &TravelPlan, strict_cost: bool) -> PlanResult<()> {
    check_not_blank(&plan.name, "name")?;
    check_not_blank(&plan.origin, "origin")?;
    check_not_blank(&plan.destination, "destination")?;
    check_non_negative(plan.total_cost, "total_cost")?;

    if plan.day_plans.is_empty() {
        return Err(PlanError::schema("day_plans must contain at least one day"));
    }

    let mut start: Option<NaiveDate> = None;
    for (index, day) in plan.day_plans.iter().enumerate() {
        let date = NaiveDate::parse_from_str(day.date.trim(), "%Y-%m-%d").map_err(|e| {
            PlanError::schema(format!(
                "day_plans[{}].date `{}` is not a YYYY-MM-DD date: {}",
                index, day.date, e
            ))
        })?;
        let first = *start.get_or_insert(date);
        let expected = first.checked_add_days(Days::new(index as u64)).ok_or_else(|| {
            PlanError::schema(format!(
                "day_plans[{}] runs past the last representable date after {}",
                index, first
            ))
        })?;
        if date != expected {
            return Err(PlanError::schema(format!(
                "day_plans[{}].date is {}, expected {} (days must be consecutive from {})",
                index, date, expected, first
            )));
        }

        if let Some(flight) = &day.flight {
            check_non_negative(flight.price, &format!("day_plans[{}].flight.price", index))?;
        }
        if let Some(hotel) = &day.hotel {
            check_non_negative(
                hotel.price_per_night,
                &format!("day_plans[{}].hotel.price_per_night", index),
            )?;
            if !(0.0..=5.0).contains(&hotel.rating) {
                return Err(PlanError::schema(format!(
                    "day_plans[{}].hotel.rating {} is outside 0.0-5.0",
                    index, hotel.rating
                )));
            }
        }
    }

    let referenced = plan.referenced_cost();
    if (referenced - plan.total_cost).abs() > COST_TOLERANCE {
        if strict_cost {
            return Err(PlanError::schema(format!(
                "total_cost {} does not match referenced flights and hotels ({})",
                plan.total_cost, referenced
            )));
        }
        warn!(
            total_cost = plan.total_cost,
            referenced_cost = referenced,
            "travel plan total does not match referenced flight and hotel prices"
        );
    }

    Ok(())
}

/// Coerce raw terminal output into a validated `TravelPlan`.
pub fn coerce_travel_plan(raw: &str, strict_cost: bool) -> PlanResult<TravelPlan> {
    let json = extract_json(raw)
        .ok_or_else(|| PlanError::schema("itinerary output did not contain a JSON object"))?;
    let plan: TravelPlan = serde_json::from_str(json)
        .map_err(|e| PlanError::schema(format!("itinerary output is not a travel plan: {}", e)))?;
    validate_travel_plan(&plan, strict_cost)?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan_json(dates: &[&str], total: f64) -> String {
        let days: Vec<_> = dates
            .iter()
            .map(|d| {
                json!({
                    "date": d,
                    "activities": ["Walk along the Seine"],
                    "restaurants": ["Le Comptoir"],
                    "hotel": {
                        "name": "Hotel Lutetia",
                        "location": "Paris",
                        "price_per_night": 200.0,
                        "rating": 4.6,
                        "amenities": ["Wi-Fi"],
                        "check_in": "3:00 PM",
                        "check_out": "12:00 PM"
                    }
                })
            })
            .collect();
        json!({
            "name": "Paris in March",
            "origin": "Chandigarh",
            "destination": "Paris",
            "day_plans": days,
            "total_cost": total
        })
        .to_string()
    }

    #[test]
    fn test_accepts_fenced_json() {
        let raw = format!(
            "Here is your plan:\n```json\n{}\n```",
            plan_json(&["2025-03-10", "2025-03-11", "2025-03-12"], 600.0)
        );
        let plan = coerce_travel_plan(&raw, true).unwrap();
        assert_eq!(plan.day_plans.len(), 3);
        assert_eq!(plan.origin, "Chandigarh");
    }

    #[test]
    fn test_rejects_non_json() {
        let err = coerce_travel_plan("I could not plan this trip.", false).unwrap_err();
        assert!(matches!(err, PlanError::SchemaValidation(_)));
    }

    #[test]
    fn test_rejects_missing_field() {
        let raw = json!({ "name": "x", "origin": "A", "destination": "B", "total_cost": 1.0 })
            .to_string();
        let err = coerce_travel_plan(&raw, false).unwrap_err();
        assert!(matches!(err, PlanError::SchemaValidation(_)));
    }

    #[test]
    fn test_rejects_empty_days() {
        let err = coerce_travel_plan(&plan_json(&[], 0.0), false).unwrap_err();
        assert!(matches!(err, PlanError::SchemaValidation(_)));
    }

    #[test]
    fn test_rejects_invalid_and_gapped_dates() {
        let err = coerce_travel_plan(&plan_json(&["2025-02-30"], 200.0), false).unwrap_err();
        assert!(matches!(err, PlanError::SchemaValidation(_)));

        let err = coerce_travel_plan(&plan_json(&["2025-03-10", "2025-03-12"], 400.0), false)
            .unwrap_err();
        assert!(matches!(err, PlanError::SchemaValidation(_)));

        let err = coerce_travel_plan(&plan_json(&["2025-03-11", "2025-03-10"], 400.0), false)
            .unwrap_err();
        assert!(matches!(err, PlanError::SchemaValidation(_)));
    }

    #[test]
    fn test_rejects_days_past_last_representable_date() {
        let raw = plan_json(&["+262142-12-31", "+262142-12-31"], 400.0);
        let err = coerce_travel_plan(&raw, false).unwrap_err();
        assert!(matches!(err, PlanError::SchemaValidation(_)));
    }

    #[test]
    fn test_rejects_negative_cost() {
        let err = coerce_travel_plan(&plan_json(&["2025-03-10"], -5.0), false).unwrap_err();
        assert!(matches!(err, PlanError::SchemaValidation(_)));
    }

    #[test]
    fn test_cost_mismatch_only_fails_when_strict() {
        let raw = plan_json(&["2025-03-10", "2025-03-11"], 1234.0);
        assert!(coerce_travel_plan(&raw, false).is_ok());
        let err = coerce_travel_plan(&raw, true).unwrap_err();
        assert!(matches!(err, PlanError::SchemaValidation(_)));
    }

    #[test]
    fn test_rating_out_of_range() {
        let raw = plan_json(&["2025-03-10"], 200.0).replace("4.6", "7.5");
        let err = coerce_travel_plan(&raw, false).unwrap_err();
        assert!(matches!(err, PlanError::SchemaValidation(_)));
    }
}
