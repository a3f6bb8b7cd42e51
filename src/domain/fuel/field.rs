//! Calculator input fields and their fixed bounds

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One of the three numeric calculator inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Distance travelled, kilometers
    Distance,
    /// Consumption rate, liters per 100 km
    FuelConsumption,
    /// Price per liter
    FuelPrice,
}

impl Field {
    /// All fields, in the order they are validated and reported.
    pub const ALL: [Field; 3] = [Field::Distance, Field::FuelConsumption, Field::FuelPrice];

    /// Wire name used in JSON bodies, query strings and form posts.
    pub fn name(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::FuelConsumption => "fuel_consumption",
            Self::FuelPrice => "fuel_price",
        }
    }

    pub fn rule(self) -> &'static FieldRule {
        match self {
            Self::Distance => &FIELD_RULES[0],
            Self::FuelConsumption => &FIELD_RULES[1],
            Self::FuelPrice => &FIELD_RULES[2],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static bounds and display label for one input field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    pub field: Field,
    /// Used in error messages
    pub label: &'static str,
    /// Used as the form widget title
    pub title: &'static str,
    pub min: f64,
    pub max: f64,
    /// Input step used by form widgets
    pub step: f64,
    /// Unit shown next to the input
    pub unit: &'static str,
}

impl FieldRule {
    /// Inclusive range check.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

pub static FIELD_RULES: [FieldRule; 3] = [
    FieldRule {
        field: Field::Distance,
        label: "Distance",
        title: "Distance travelled",
        min: 0.1,
        max: 10000.0,
        step: 0.1,
        unit: "km",
    },
    FieldRule {
        field: Field::FuelConsumption,
        label: "Fuel consumption",
        title: "Fuel consumption",
        min: 0.1,
        max: 100.0,
        step: 0.1,
        unit: "l/100 km",
    },
    FieldRule {
        field: Field::FuelPrice,
        label: "Fuel price",
        title: "Price per liter",
        min: 0.01,
        max: 10.0,
        step: 0.01,
        unit: "EUR",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_follow_field_order() {
        for (rule, field) in FIELD_RULES.iter().zip(Field::ALL) {
            assert_eq!(rule.field, field);
            assert_eq!(field.rule().field, field);
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let rule = Field::Distance.rule();
        assert!(rule.contains(0.1));
        assert!(rule.contains(10000.0));
        assert!(!rule.contains(0.0));
        assert!(!rule.contains(10000.1));
    }

    #[test]
    fn wire_names_match_serde() {
        for field in Field::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.name()));
        }
    }
}
