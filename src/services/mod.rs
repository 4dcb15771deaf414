//! Traits for external data services.

pub mod scorecard_api;
