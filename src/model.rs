//! Data model: search queries, search options, and the travel plan that the
//! itinerary unit must produce.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PlanError, PlanResult};

fn default_currency() -> String {
    "USD".to_string()
}

fn default_adults() -> u32 {
    2
}

/// Structured input of the flight search tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlightQuery {
    /// Departure airport code or location id (e.g. "IXC")
    pub departure_id: String,
    /// Arrival airport code or location id (e.g. "CDG")
    pub arrival_id: String,
    /// Outbound date, YYYY-MM-DD
    pub outbound_date: NaiveDate,
    /// Optional return date, YYYY-MM-DD
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    /// Currency code for prices
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl FlightQuery {
    /// Decode and validate tool arguments.
    pub fn from_args(args: Value) -> PlanResult<Self> {
        let query: Self = serde_json::from_value(args)
            .map_err(|e| PlanError::validation(format!("invalid flight query: {}", e)))?;
        query.validate()?;
        Ok(query)
    }

    pub fn validate(&self) -> PlanResult<()> {
        let departure = self.departure_id.trim();
        let arrival = self.arrival_id.trim();
        if departure.is_empty() {
            return Err(PlanError::validation("departure_id must not be empty"));
        }
        if arrival.is_empty() {
            return Err(PlanError::validation("arrival_id must not be empty"));
        }
        if departure.eq_ignore_ascii_case(arrival) {
            return Err(PlanError::validation(format!(
                "departure and arrival must differ (both `{}`)",
                departure
            )));
        }
        if let Some(ret) = self.return_date
            && ret < self.outbound_date
        {
            return Err(PlanError::validation(format!(
                "return_date {} is before outbound_date {}",
                ret, self.outbound_date
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(PlanError::validation("currency must not be empty"));
        }
        Ok(())
    }
}

/// Structured input of the hotel search tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HotelQuery {
    /// Free-text location (city, neighbourhood, landmark)
    pub location: String,
    /// Check-in date, YYYY-MM-DD
    pub check_in_date: NaiveDate,
    /// Check-out date, YYYY-MM-DD
    pub check_out_date: NaiveDate,
    /// Number of adult guests
    #[serde(default = "default_adults")]
    pub adults: u32,
    /// Currency code for prices
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl HotelQuery {
    /// Decode and validate tool arguments.
    pub fn from_args(args: Value) -> PlanResult<Self> {
        let query: Self = serde_json::from_value(args)
            .map_err(|e| PlanError::validation(format!("invalid hotel query: {}", e)))?;
        query.validate()?;
        Ok(query)
    }

    pub fn validate(&self) -> PlanResult<()> {
        if self.location.trim().is_empty() {
            return Err(PlanError::validation("location must not be empty"));
        }
        if self.check_in_date >= self.check_out_date {
            return Err(PlanError::validation(format!(
                "check_in_date {} must be before check_out_date {}",
                self.check_in_date, self.check_out_date
            )));
        }
        if self.adults < 1 {
            return Err(PlanError::validation("adults must be at least 1"));
        }
        if self.currency.trim().is_empty() {
            return Err(PlanError::validation("currency must not be empty"));
        }
        Ok(())
    }

    /// Number of nights between check-in and check-out.
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }
}

/// A flight referenced by a day of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlightOption {
    /// Name of the airline
    pub airline: String,
    /// Flight number
    pub flight_number: String,
    /// Departure time
    pub departure_time: String,
    /// Arrival time
    pub arrival_time: String,
    /// Price of the flight
    pub price: f64,
    /// Duration of the flight
    pub duration: String,
}

/// A hotel referenced by a day of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HotelOption {
    /// Name of the hotel
    pub name: String,
    /// Location of the hotel
    pub location: String,
    /// Price per night
    pub price_per_night: f64,
    /// Hotel rating between 0.0 and 5.0
    pub rating: f64,
    /// List of amenities
    pub amenities: Vec<String>,
    /// Check-in time
    pub check_in: String,
    /// Check-out time
    pub check_out: String,
}

/// One day of the itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DayPlan {
    /// Date of the day, YYYY-MM-DD
    pub date: String,
    /// Activities in the order they happen
    pub activities: Vec<String>,
    /// Restaurants in the order they are visited
    pub restaurants: Vec<String>,
    /// Flight taken on this day, if any
    #[serde(default)]
    pub flight: Option<FlightOption>,
    /// Hotel stayed at on this night, if any
    #[serde(default)]
    pub hotel: Option<HotelOption>,
}

/// The terminal artifact of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TravelPlan {
    /// Name of the travel plan
    pub name: String,
    /// Origin city
    pub origin: String,
    /// Destination city
    pub destination: String,
    /// One entry per day of the trip, in chronological order
    pub day_plans: Vec<DayPlan>,
    /// Total estimated cost
    pub total_cost: f64,
}

impl TravelPlan {
    /// Sum of flight prices and hotel nightly rates referenced by the plan.
    pub fn referenced_cost(&self) -> f64 {
        self.day_plans
            .iter()
            .map(|day| {
                day.flight.as_ref().map_or(0.0, |f| f.price)
                    + day.hotel.as_ref().map_or(0.0, |h| h.price_per_night)
            })
            .sum()
    }

    /// JSON schema of the plan, handed to the reasoning substrate.
    pub fn json_schema() -> Value {
        serde_json::to_value(schemars::schema_for!(TravelPlan)).unwrap_or(Value::Null)
    }
}
