//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod form;
pub mod health;
pub mod schemas;
pub mod state;
pub mod studies;
pub mod studies_dto;
pub mod validation;

pub use error::ApiResult;
