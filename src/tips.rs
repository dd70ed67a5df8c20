//! Keyword-driven health tip engine.
//!
//! Maps a free-text symptom description to an ordered list of canned
//! advice strings. Matching is case-insensitive substring containment;
//! there is no tokenization or fuzzy matching.
//!
//! # Rules
//!
//! | Triggers | Tips appended |
//! |----------|---------------|
//! | `headache` | 2 |
//! | `fever` | 2 |
//! | `cough` | 2 |
//! | `nausea`, `vomit` | 2 |
//! | `sore throat` | 2 |
//!
//! Rules are not mutually exclusive. Every rule that fires contributes its
//! tips in table order. When fewer than [`MIN_SPECIFIC_TIPS`] tips were
//! collected, four generic tips are added, the first of which echoes the
//! original input. The [`DISCLAIMER`] always comes last.

/// Below this many rule-driven tips the generic set is appended.
pub const MIN_SPECIFIC_TIPS: usize = 3;

pub const DISCLAIMER: &str =
    "If symptoms are severe or persistent, please consult with a healthcare professional.";

/// A keyword rule: any trigger substring fires it.
pub struct TipRule {
    pub triggers: &'static [&'static str],
    pub tips: [&'static str; 2],
}

impl TipRule {
    fn matches(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|t| lowered.contains(t))
    }
}

pub const RULES: &[TipRule] = &[
    TipRule {
        triggers: &["headache"],
        tips: [
            "For headaches, try resting in a dark, quiet room and applying a cold compress.",
            "Stay hydrated and consider over-the-counter pain relievers like acetaminophen or ibuprofen if appropriate.",
        ],
    },
    TipRule {
        triggers: &["fever"],
        tips: [
            "For fever, stay hydrated and rest. Consider taking acetaminophen or ibuprofen to reduce fever.",
            "If fever persists above 103°F (39.4°C) for adults or 102°F (38.9°C) for children, seek medical attention.",
        ],
    },
    TipRule {
        triggers: &["cough"],
        tips: [
            "For coughs, try drinking warm liquids like tea with honey to soothe your throat.",
            "Use a humidifier or take a steamy shower to help loosen congestion.",
        ],
    },
    TipRule {
        triggers: &["nausea", "vomit"],
        tips: [
            "For nausea, try eating small, bland meals and avoid spicy or fatty foods.",
            "Stay hydrated with small sips of clear liquids. Ginger tea may help reduce nausea.",
        ],
    },
    TipRule {
        triggers: &["sore throat"],
        tips: [
            "For a sore throat, gargle with warm salt water (1/4 to 1/2 teaspoon of salt in 8 ounces of warm water).",
            "Throat lozenges or sprays may provide temporary relief. Stay hydrated with warm liquids.",
        ],
    },
];

/// Generic advice after the echo tip.
const GENERIC_TIPS: [&str; 3] = [
    "Stay hydrated by drinking plenty of water throughout the day.",
    "Monitor your symptoms and consult a healthcare provider if they worsen or persist.",
    "Consider a balanced diet rich in fruits and vegetables to support your immune system.",
];

fn echo_tip(symptom_text: &str) -> String {
    format!(
        "Based on your symptoms: \"{}\", ensure you're getting adequate rest to help your body recover.",
        symptom_text
    )
}

/// Produce the tip list for a symptom description.
///
/// Pure and infallible. The result always ends with [`DISCLAIMER`] and is
/// never empty, even for empty input (callers reject blank input first).
pub fn generate_tips(symptom_text: &str) -> Vec<String> {
    let lowered = symptom_text.to_lowercase();

    let mut tips: Vec<String> = RULES
        .iter()
        .filter(|rule| rule.matches(&lowered))
        .flat_map(|rule| rule.tips.iter().map(|t| t.to_string()))
        .collect();

    if tips.len() < MIN_SPECIFIC_TIPS {
        tips.push(echo_tip(symptom_text));
        tips.extend(GENERIC_TIPS.iter().map(|t| t.to_string()));
    }

    tips.push(DISCLAIMER.to_string());
    tips
}
