//! HTTP API: routing, request/response mapping and process configuration.

pub mod app;
pub mod config;
pub mod middleware;
