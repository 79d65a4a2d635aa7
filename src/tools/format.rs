//! Renders raw provider responses into the text blocks the workers read.
//!
//! Formatting never fails: missing optional fields become "N/A" or the line
//! is omitted.

use serde_json::Value;

pub const NO_FLIGHTS: &str = "No flights found";
pub const NO_HOTELS: &str = "No hotels found";

const MAX_AMENITIES: usize = 5;
const MAX_NEARBY_PLACES: usize = 3;

/// Render a scalar JSON value for display, "N/A" when absent or null.
fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key)
}

fn list<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Format the `best_flights` list of a flight search response.
pub fn format_flights(response: &Value) -> String {
    let mut lines: Vec<String> = Vec::new();

    for option in list(response, "best_flights") {
        lines.push(format!(
            "Flight Option - Price: ${}",
            text(field(option, "price"))
        ));
        for leg in list(option, "flights") {
            let dep = field(leg, "departure_airport").unwrap_or(&Value::Null);
            let arr = field(leg, "arrival_airport").unwrap_or(&Value::Null);
            lines.push(format!(
                "  {} → {}: {} - {}",
                text(dep.get("id")),
                text(arr.get("id")),
                text(dep.get("time")),
                text(arr.get("time")),
            ));
            let flight_number = match field(leg, "flight_number") {
                None | Some(Value::Null) => String::new(),
                number => text(number),
            };
            lines.push(
                format!("  {} {}", text(field(leg, "airline")), flight_number)
                    .trim_end()
                    .to_string(),
            );
            lines.push(format!(
                "  Duration: {} minutes",
                text(field(leg, "duration"))
            ));
        }
        lines.push(String::new());
    }

    if lines.is_empty() {
        NO_FLIGHTS.to_string()
    } else {
        lines.join("\n")
    }
}

fn format_property(property: &Value) -> String {
    let mut info = vec![format!("Hotel: {}", text(field(property, "name")))];

    if let Some(rate) = field(property, "rate_per_night") {
        info.push(format!("Price per night: {}", text(rate.get("lowest"))));
    }
    if let Some(total) = field(property, "total_rate") {
        info.push(format!("Total price: {}", text(total.get("lowest"))));
    }

    info.push(format!(
        "Rating: {}/5.0",
        text(field(property, "overall_rating"))
    ));
    info.push(format!("Reviews: {}", text(field(property, "reviews"))));
    info.push(format!(
        "Hotel Class: {}",
        text(field(property, "hotel_class"))
    ));
    info.push(format!(
        "Check-in: {}",
        text(field(property, "check_in_time"))
    ));
    info.push(format!(
        "Check-out: {}",
        text(field(property, "check_out_time"))
    ));

    if field(property, "eco_certified")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
    {
        info.push("✓ Eco-certified".to_string());
    }

    if let Some(coords) = field(property, "gps_coordinates") {
        info.push(format!(
            "Location: {}, {}",
            text(coords.get("latitude")),
            text(coords.get("longitude"))
        ));
    }

    let amenities = list(property, "amenities");
    if !amenities.is_empty() {
        info.push("\nAmenities:".to_string());
        info.extend(
            amenities
                .iter()
                .take(MAX_AMENITIES)
                .map(|a| format!("- {}", text(Some(a)))),
        );
    }

    if field(property, "nearby_places").is_some() {
        info.push("\nNearby Places:".to_string());
        for place in list(property, "nearby_places").iter().take(MAX_NEARBY_PLACES) {
            info.push(format!("- {}", text(place.get("name"))));
            for transport in list(place, "transportations") {
                info.push(format!(
                    "  • {}: {}",
                    text(transport.get("type")),
                    text(transport.get("duration"))
                ));
            }
        }
    }

    info.join("\n")
}

/// Format the `properties` list of a hotel search response.
pub fn format_hotels(response: &Value) -> String {
    let mut blocks: Vec<String> = Vec::new();

    for property in list(response, "properties") {
        blocks.push(format_property(property));
        blocks.push(String::new());
    }

    if blocks.is_empty() {
        NO_HOTELS.to_string()
    } else {
        blocks.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leg(from: &str, to: &str) -> Value {
        json!({
            "departure_airport": { "id": from, "time": "2025-03-10 08:00" },
            "arrival_airport": { "id": to, "time": "2025-03-10 10:05" },
            "airline": "IndiGo",
            "flight_number": "6E 2195",
            "duration": 125
        })
    }

    #[test]
    fn test_flights_block_per_option() {
        let response = json!({
            "best_flights": [
                { "price": 650, "flights": [leg("IXC", "DEL"), leg("DEL", "CDG")] },
                { "price": 720, "flights": [leg("IXC", "CDG")] }
            ]
        });
        let out = format_flights(&response);

        assert_eq!(out.matches("Flight Option").count(), 2);
        assert!(out.starts_with("Flight Option - Price: $650\n  IXC → DEL: 2025-03-10 08:00 - 2025-03-10 10:05\n  IndiGo 6E 2195\n  Duration: 125 minutes"));
        assert!(out.contains("\n\nFlight Option - Price: $720"));
    }

    #[test]
    fn test_flights_missing_fields_use_na() {
        let response = json!({ "best_flights": [ { "flights": [ {} ] } ] });
        let out = format_flights(&response);
        assert!(out.contains("Price: $N/A"));
        assert!(out.contains("  N/A → N/A: N/A - N/A"));
        assert!(out.contains("\n  N/A\n"));
        assert!(out.contains("Duration: N/A minutes"));
    }

    #[test]
    fn test_flights_sentinel() {
        assert_eq!(format_flights(&json!({})), NO_FLIGHTS);
        assert_eq!(format_flights(&json!({ "best_flights": [] })), NO_FLIGHTS);
        assert_eq!(format_flights(&json!({ "error": "no results" })), NO_FLIGHTS);
    }

    #[test]
    fn test_hotels_truncate_amenities_and_places() {
        let response = json!({
            "properties": [{
                "name": "Hotel Lutetia",
                "rate_per_night": { "lowest": "$210" },
                "total_rate": { "lowest": "$630" },
                "overall_rating": 4.6,
                "reviews": 1520,
                "hotel_class": "5-star hotel",
                "check_in_time": "3:00 PM",
                "check_out_time": "12:00 PM",
                "eco_certified": true,
                "gps_coordinates": { "latitude": 48.85, "longitude": 2.32 },
                "amenities": ["Wi-Fi", "Pool", "Spa", "Gym", "Bar", "Parking", "Restaurant"],
                "nearby_places": [
                    { "name": "Le Bon Marché", "transportations": [ { "type": "Walking", "duration": "3 min" } ] },
                    { "name": "Musée d'Orsay", "transportations": [] },
                    { "name": "Jardin du Luxembourg" },
                    { "name": "Louvre" }
                ]
            }]
        });
        let out = format_hotels(&response);

        assert!(out.starts_with("Hotel: Hotel Lutetia\nPrice per night: $210\nTotal price: $630\nRating: 4.6/5.0"));
        assert!(out.contains("✓ Eco-certified"));
        assert!(out.contains("Location: 48.85, 2.32"));
        assert!(out.contains("\n\nAmenities:\n- Wi-Fi"));
        assert!(out.contains("- Bar"));
        assert!(!out.contains("- Parking"));
        assert!(!out.contains("- Restaurant"));
        assert!(out.contains("- Le Bon Marché\n  • Walking: 3 min"));
        assert!(out.contains("- Jardin du Luxembourg"));
        assert!(!out.contains("Louvre"));
    }

    #[test]
    fn test_hotels_optional_lines_omitted() {
        let response = json!({ "properties": [ { "name": "Ibis" } ] });
        let out = format_hotels(&response);
        assert!(!out.contains("Price per night"));
        assert!(!out.contains("Eco-certified"));
        assert!(!out.contains("Amenities"));
        assert!(!out.contains("Nearby Places"));
        assert!(out.contains("Rating: N/A/5.0"));
    }

    #[test]
    fn test_hotels_sentinel() {
        assert_eq!(format_hotels(&json!({ "properties": [] })), NO_HOTELS);
        assert_eq!(format_hotels(&Value::Null), NO_HOTELS);
    }
}
