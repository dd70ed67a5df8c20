//! Emergency numbers, map links, and quick-symptom shortcuts.

use crate::models::{Coordinate, EmergencyContact, RankedFacility};

pub const EMERGENCY_CONTACTS: [EmergencyContact; 4] = [
    EmergencyContact {
        name: "Emergency Services",
        number: "911",
        description: "For life-threatening emergencies",
    },
    EmergencyContact {
        name: "Poison Control",
        number: "1-800-222-1222",
        description: "For poison emergencies",
    },
    EmergencyContact {
        name: "Suicide Prevention Lifeline",
        number: "988",
        description: "24/7 crisis support",
    },
    EmergencyContact {
        name: "Non-Emergency Medical Advice",
        number: "111",
        description: "For non-urgent medical concerns",
    },
];

pub const EMERGENCY_NOTICE: &str =
    "In case of a medical emergency, call 911 immediately or go to your nearest emergency room.";

/// Shortcut symptoms offered next to the free-text input.
pub const QUICK_SYMPTOMS: [&str; 8] = [
    "Headache",
    "Fever",
    "Cough",
    "Sore Throat",
    "Fatigue",
    "Nausea",
    "Dizziness",
    "Shortness of Breath",
];

/// `tel:` link keeping only the digits of `number`.
pub fn dial_link(number: &str) -> String {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("tel:{}", digits)
}

/// Driving directions from `origin` to a facility.
pub fn directions_url(origin: Coordinate, facility: &RankedFacility) -> String {
    let dest = facility.facility.coordinate;
    format!(
        "https://www.google.com/maps/dir/?api=1&origin={},{}&destination={},{}&travelmode=driving",
        origin.lat, origin.lng, dest.lat, dest.lng
    )
}

/// Map search for hospitals around `origin`.
pub fn maps_search_url(origin: Coordinate) -> String {
    format!(
        "https://www.google.com/maps/search/hospital/@{},{},14z",
        origin.lat, origin.lng
    )
}

/// Append a quick symptom to the current input, comma separated.
pub fn add_quick_symptom(current: &str, quick: &str) -> String {
    if current.is_empty() {
        quick.to_string()
    } else {
        format!("{}, {}", current, quick)
    }
}
