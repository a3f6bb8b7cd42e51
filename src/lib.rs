//! # Fuel Calculator
//!
//! Computes the fuel spent on a trip and what it costs, from distance,
//! consumption rate and fuel price. Served two ways: an anonymous form with
//! per-session results and an authenticated JSON endpoint.
//!
//! ## Architecture
//!
//! - **domain**: input fields and bounds, validation, arithmetic, formatting
//! - **application**: the calculation pipeline, audit trail, settings store
//! - **infrastructure**: tracing-backed audit sink, JWT / password / API key crypto
//! - **interfaces**: HTTP router, middleware and handlers
//! - **server**: runtime lifecycle and tracing setup

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, resolve_config_path, AppConfig};
pub use domain::{evaluate, CalculationResult, RawInput, ValidationErrors};
pub use interfaces::http::{create_router, AppState};
