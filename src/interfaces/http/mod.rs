//! HTTP interface
//!
//! - `common`: response wrapper and extractors
//! - `middleware`: JWT / API key authentication
//! - `modules`: handlers grouped by resource
//! - `router`: route table, unified state and OpenAPI document

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_router, ApiDoc, AppState};
