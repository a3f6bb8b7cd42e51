//! Calculator form view model
//!
//! The form is returned as data; turning it into HTML is left to the
//! frontend that embeds it.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::CalculatorDefaults;
use crate::domain::{CalculationResult, Field, RawInput, RawValue, ValidationErrors};

/// Shown instead of a value when there is no result yet.
pub const RESULT_PLACEHOLDER: &str = "-";

/// Prefill overrides, e.g. `/fuel-calculator?distance=250`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormQuery {
    pub distance: Option<String>,
    pub fuel_consumption: Option<String>,
    pub fuel_price: Option<String>,
}

/// Submitted form fields (`application/x-www-form-urlencoded`)
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FormSubmission {
    pub distance: Option<String>,
    pub fuel_consumption: Option<String>,
    pub fuel_price: Option<String>,
}

impl FormSubmission {
    fn value(&self, field: Field) -> Option<&String> {
        match field {
            Field::Distance => self.distance.as_ref(),
            Field::FuelConsumption => self.fuel_consumption.as_ref(),
            Field::FuelPrice => self.fuel_price.as_ref(),
        }
    }
}

impl From<&FormSubmission> for RawInput {
    fn from(form: &FormSubmission) -> Self {
        let raw = |v: &Option<String>| v.clone().map(RawValue::Text);
        RawInput {
            distance: raw(&form.distance),
            fuel_consumption: raw(&form.fuel_consumption),
            fuel_price: raw(&form.fuel_price),
        }
    }
}

/// One input widget
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormFieldView {
    pub name: String,
    pub title: String,
    /// Current value as it should appear in the input
    pub value: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub unit: String,
    /// Validation message for this field, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result area; `-` until something has been calculated
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormResultsView {
    pub fuel_spent: String,
    pub fuel_spent_unit: String,
    pub fuel_cost: String,
    pub fuel_cost_unit: String,
}

impl FormResultsView {
    fn new(result: Option<&CalculationResult>) -> Self {
        let (spent, cost) = match result {
            Some(r) => (r.fuel_spent.clone(), r.fuel_cost.clone()),
            None => (RESULT_PLACEHOLDER.to_string(), RESULT_PLACEHOLDER.to_string()),
        };
        Self {
            fuel_spent: spent,
            fuel_spent_unit: "liters".to_string(),
            fuel_cost: cost,
            fuel_cost_unit: Field::FuelPrice.rule().unit.to_string(),
        }
    }
}

/// Everything needed to render the calculator form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormView {
    pub title: String,
    pub fields: Vec<FormFieldView>,
    pub results: FormResultsView,
}

impl FormView {
    /// Build a view from per-field values, a result and optional errors.
    pub fn build(
        mut value_of: impl FnMut(Field) -> String,
        result: Option<&CalculationResult>,
        errors: Option<&ValidationErrors>,
    ) -> Self {
        let fields = Field::ALL
            .into_iter()
            .map(|field| {
                let rule = field.rule();
                FormFieldView {
                    name: field.name().to_string(),
                    title: rule.title.to_string(),
                    value: value_of(field),
                    min: rule.min,
                    max: rule.max,
                    step: rule.step,
                    unit: rule.unit.to_string(),
                    error: errors
                        .and_then(|e| e.for_field(field))
                        .map(ToString::to_string),
                }
            })
            .collect();

        Self {
            title: "Fuel Calculator".to_string(),
            fields,
            results: FormResultsView::new(result),
        }
    }

    /// Prefill from the query string, falling back to configured defaults.
    pub fn prefilled(
        query: &FormQuery,
        defaults: &CalculatorDefaults,
        result: Option<&CalculationResult>,
    ) -> Self {
        Self::build(
            |field| {
                let (override_value, default) = match field {
                    Field::Distance => (&query.distance, defaults.default_distance),
                    Field::FuelConsumption => {
                        (&query.fuel_consumption, defaults.default_fuel_consumption)
                    }
                    Field::FuelPrice => (&query.fuel_price, defaults.default_fuel_price),
                };
                override_value.clone().unwrap_or_else(|| default.to_string())
            },
            result,
            None,
        )
    }

    /// Echo a submission back, with its result or its errors.
    pub fn submitted(
        form: &FormSubmission,
        result: Option<&CalculationResult>,
        errors: Option<&ValidationErrors>,
    ) -> Self {
        Self::build(
            |field| form.value(field).cloned().unwrap_or_default(),
            result,
            errors,
        )
    }

    pub fn field(&self, name: &str) -> Option<&FormFieldView> {
        self.fields.iter().find(|f| f.name == name)
    }
}
