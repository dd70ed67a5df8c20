//! Core data models used throughout Health Buddy.
//!
//! These types represent the symptom records, coordinates, and facilities
//! that flow between the tip engine, the history store, and the ranker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One symptom submission and the tips produced for it.
///
/// Immutable once created. Serialized in camelCase; the legacy field
/// names `date` and `symptoms` are accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomRecord {
    pub id: String,
    #[serde(alias = "date")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "symptoms")]
    pub symptom_text: String,
    pub tips: Vec<String>,
}

impl SymptomRecord {
    /// Build a record stamped with a fresh UUID and the current time.
    pub fn new(symptom_text: impl Into<String>, tips: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            symptom_text: symptom_text.into(),
            tips,
        }
    }

    /// A record may be persisted only with non-empty text and tips.
    pub fn is_valid(&self) -> bool {
        !self.symptom_text.trim().is_empty() && !self.tips.is_empty()
    }
}

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Shift by fixed degree deltas.
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            lat: self.lat + d_lat,
            lng: self.lng + d_lng,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A medical-care location candidate as returned by a facility directory.
///
/// The wire shape flattens the coordinate into `lat`/`lng` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

/// A facility with its distance from a specific origin.
///
/// `distance_km` is the sort key; `distance` is for display only.
#[derive(Debug, Clone, Serialize)]
pub struct RankedFacility {
    #[serde(flatten)]
    pub facility: Facility,
    pub distance_km: f64,
    pub distance: String,
}

/// A static emergency phone entry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmergencyContact {
    pub name: &'static str,
    pub number: &'static str,
    pub description: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_unique_ids() {
        let a = SymptomRecord::new("cough", vec!["tip".into()]);
        let b = SymptomRecord::new("cough", vec!["tip".into()]);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_record_validity() {
        assert!(SymptomRecord::new("fever", vec!["rest".into()]).is_valid());
        assert!(!SymptomRecord::new("fever", vec![]).is_valid());
        assert!(!SymptomRecord::new("   ", vec!["rest".into()]).is_valid());
    }

    #[test]
    fn test_record_accepts_legacy_field_names() {
        let json = r#"{"id":"1700000000000","date":"2024-01-02T03:04:05.000Z","symptoms":"headache","tips":["a"]}"#;
        let rec: SymptomRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.id, "1700000000000");
        assert_eq!(rec.symptom_text, "headache");
        assert_eq!(rec.created_at.to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let rec = SymptomRecord::new("nausea", vec!["sip water".into()]);
        let value = serde_json::to_value(&rec).unwrap();
        assert!(value.get("symptomText").is_some());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_facility_wire_shape_is_flat() {
        let json = r#"{"id":"9","name":"N","address":"A","phone":"P","lat":1.5,"lng":-2.5}"#;
        let f: Facility = serde_json::from_str(json).unwrap();
        assert_eq!(f.coordinate, Coordinate::new(1.5, -2.5));
    }

    #[test]
    fn test_coordinate_range_check() {
        assert!(Coordinate::new(45.0, 120.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -181.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
