//! Stability study backend.
//!
//! Hexagonal layout: [`domain`] holds the study model, ports and services;
//! [`inbound::http`] exposes them over actix-web; [`outbound::persistence`]
//! stores them in SQLite through Diesel.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
