//! Shared HTTP building blocks

pub mod api_response;
pub mod client_ip;
pub mod validated_json;

pub use api_response::ApiResponse;
pub use client_ip::{ClientIp, TrustedProxies};
pub use validated_json::ValidatedJson;
