pub mod auth;
pub mod calculator;
pub mod form;
pub mod health;
pub mod metrics;
pub mod request_id;
pub mod settings;
