//! Domain layer
//!
//! Pure calculation logic with no I/O: input rules, validation, arithmetic,
//! result formatting and the error taxonomy.

pub mod error;
pub mod fuel;

pub use error::{FieldError, ValidationErrors};
pub use fuel::{
    calculate, evaluate, format_decimal, validate, CalculationInput, CalculationResult, Field,
    FieldRule, FuelEstimate, RawInput, RawValue, FIELD_RULES,
};
