use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    In,
    Out,
}

/// One persisted check-in or check-out event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "name": "A",
    "date": "2024-01-01",
    "now": "09:00",
    "type": "in",
    "lat": 25.58883,
    "lng": 56.26589,
    "distance": 0
}))]
pub struct AttendanceRecord {
    pub name: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    #[serde(default, alias = "time")]
    pub now: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: f64,
    /// meters from the facility center, rounded; absent on rows written before geofencing
    #[serde(default, deserialize_with = "lenient_meters")]
    pub distance: u64,
}

/// Older rows stored the raw request body, so numbers may be strings or null.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0.0),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("number out of range")),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a number, got {s:?}"))),
        other => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}

fn lenient_meters<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let meters = lenient_f64(deserializer)?;
    Ok(meters.max(0.0).round() as u64)
}

impl AttendanceRecord {
    pub fn is_for(&self, name: &str, date: &str) -> bool {
        self.name == name && self.date == date
    }

    pub fn matches(&self, name: &str, date: &str, kind: EventKind) -> bool {
        self.is_for(name, date) && self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_without_distance_or_with_string_coordinates_load() {
        let rows = json!([
            { "name": "A", "date": "2024-01-01", "now": "09:00", "type": "in",
              "lat": 25.58883, "lng": 56.26589 },
            { "name": "A", "date": "2024-01-01", "now": "17:00", "type": "out",
              "lat": "25.58883", "lng": "56.26589", "distance": 12.6 }
        ]);

        let records: Vec<AttendanceRecord> = serde_json::from_value(rows).unwrap();

        assert_eq!(records[0].distance, 0);
        assert_eq!(records[1].lat, 25.58883);
        assert_eq!(records[1].distance, 13);
        assert_eq!(records[1].kind, EventKind::Out);
    }

    #[test]
    fn non_numeric_coordinate_is_rejected() {
        let row = json!({ "name": "A", "date": "2024-01-01", "now": "09:00", "type": "in",
                          "lat": "north", "lng": 56.0 });
        assert!(serde_json::from_value::<AttendanceRecord>(row).is_err());
    }
}
