//! Input validation
//!
//! Turns loosely-typed request values into a [`CalculationInput`]. All three
//! fields are checked independently and every failure is reported, so a
//! caller can show the user the complete list at once.

use serde_json::Value;

use super::field::Field;
use crate::domain::error::{FieldError, ValidationErrors};

/// A single raw value as it arrived at an entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Already a number (JSON number)
    Number(f64),
    /// Text that may hold a number (form field, query parameter, JSON string)
    Text(String),
    /// Anything else (bool, array, object)
    Other,
}

impl RawValue {
    /// Interpret a JSON value; `null` counts as absent.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(n.as_f64().map_or(Self::Other, Self::Number)),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => Some(Self::Other),
        }
    }

    fn as_number(&self) -> Option<f64> {
        let value = match self {
            Self::Number(v) => *v,
            Self::Text(s) => parse_number(s)?,
            Self::Other => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Unvalidated calculator input. `None` means the field was not supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInput {
    pub distance: Option<RawValue>,
    pub fuel_consumption: Option<RawValue>,
    pub fuel_price: Option<RawValue>,
}

impl RawInput {
    pub fn new(
        distance: impl Into<RawValue>,
        fuel_consumption: impl Into<RawValue>,
        fuel_price: impl Into<RawValue>,
    ) -> Self {
        Self {
            distance: Some(distance.into()),
            fuel_consumption: Some(fuel_consumption.into()),
            fuel_price: Some(fuel_price.into()),
        }
    }

    pub fn get(&self, field: Field) -> Option<&RawValue> {
        match field {
            Field::Distance => self.distance.as_ref(),
            Field::FuelConsumption => self.fuel_consumption.as_ref(),
            Field::FuelPrice => self.fuel_price.as_ref(),
        }
    }
}

/// Validated calculator input.
///
/// Only [`validate`] can build one, so every value is finite and inside its
/// [`FieldRule`](super::FieldRule) range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationInput {
    distance: f64,
    fuel_consumption: f64,
    fuel_price: f64,
}

impl CalculationInput {
    /// Kilometers
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Liters per 100 km
    pub fn fuel_consumption(&self) -> f64 {
        self.fuel_consumption
    }

    /// Currency per liter
    pub fn fuel_price(&self) -> f64 {
        self.fuel_price
    }
}

/// Parse a decimal literal the way a web form submits it.
///
/// Accepts an optional sign, digits with an optional fraction, an optional
/// exponent, and surrounding whitespace. Rejects `inf`/`nan` spellings and
/// anything `f64::from_str` would take that a person would not type as a
/// number.
fn parse_number(text: &str) -> Option<f64> {
    let s = text.trim();
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(idx) => (&unsigned[..idx], Some(&unsigned[idx + 1..])),
        None => (unsigned, None),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits_ok = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !digits_ok(int_part) || !digits_ok(frac_part) {
        return None;
    }

    if let Some(exp) = exponent {
        let exp_digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if exp_digits.is_empty() || !digits_ok(exp_digits) {
            return None;
        }
    }

    s.parse::<f64>().ok()
}

fn check_field(raw: &RawInput, field: Field) -> Result<f64, FieldError> {
    let value = raw.get(field).ok_or(FieldError::Missing { field })?;
    let number = value.as_number().ok_or(FieldError::NonNumeric { field })?;
    if field.rule().contains(number) {
        Ok(number)
    } else {
        Err(FieldError::out_of_range(field, number))
    }
}

/// Validate all three fields, collecting every failure.
pub fn validate(raw: &RawInput) -> Result<CalculationInput, ValidationErrors> {
    let mut values = [0.0; 3];
    let mut errors = Vec::new();

    for (slot, field) in values.iter_mut().zip(Field::ALL) {
        match check_field(raw, field) {
            Ok(v) => *slot = v,
            Err(e) => errors.push(e),
        }
    }

    if let Some(errors) = ValidationErrors::from_vec(errors) {
        return Err(errors);
    }

    let [distance, fuel_consumption, fuel_price] = values;
    Ok(CalculationInput {
        distance,
        fuel_consumption,
        fuel_price,
    })
}
