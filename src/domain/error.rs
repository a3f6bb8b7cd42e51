use std::fmt;

use thiserror::Error;

use super::fuel::Field;

/// Why a single input field was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("missing field: {field}")]
    Missing { field: Field },

    #[error("field {field} must be numeric")]
    NonNumeric { field: Field },

    #[error("{label} must be between {min} and {max}")]
    OutOfRange {
        field: Field,
        label: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}

impl FieldError {
    pub fn out_of_range(field: Field, value: f64) -> Self {
        let rule = field.rule();
        Self::OutOfRange {
            field,
            label: rule.label,
            min: rule.min,
            max: rule.max,
            value,
        }
    }

    pub fn field(&self) -> Field {
        match self {
            Self::Missing { field } | Self::NonNumeric { field } => *field,
            Self::OutOfRange { field, .. } => *field,
        }
    }

    /// Short machine-readable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "missing_field",
            Self::NonNumeric { .. } => "non_numeric",
            Self::OutOfRange { .. } => "out_of_range",
        }
    }
}

/// Every field error found in one input, in field order. Never empty.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Returns `None` when there is nothing to report.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn first(&self) -> &FieldError {
        &self.errors[0]
    }

    pub fn for_field(&self, field: Field) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field() == field)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_use_field_names_and_labels() {
        assert_eq!(
            FieldError::Missing { field: Field::FuelConsumption }.to_string(),
            "missing field: fuel_consumption"
        );
        assert_eq!(
            FieldError::NonNumeric { field: Field::FuelPrice }.to_string(),
            "field fuel_price must be numeric"
        );
        assert_eq!(
            FieldError::out_of_range(Field::Distance, 50000.0).to_string(),
            "Distance must be between 0.1 and 10000"
        );
        assert_eq!(
            FieldError::out_of_range(Field::FuelPrice, 0.0).to_string(),
            "Fuel price must be between 0.01 and 10"
        );
    }

    #[test]
    fn empty_list_is_not_an_error() {
        assert!(ValidationErrors::from_vec(Vec::new()).is_none());
    }

    #[test]
    fn display_joins_all_errors() {
        let errors = ValidationErrors::from_vec(vec![
            FieldError::Missing { field: Field::Distance },
            FieldError::NonNumeric { field: Field::FuelPrice },
        ])
        .unwrap();
        assert_eq!(
            errors.to_string(),
            "missing field: distance; field fuel_price must be numeric"
        );
        assert_eq!(errors.first().field(), Field::Distance);
        assert!(errors.for_field(Field::FuelConsumption).is_none());
    }
}
