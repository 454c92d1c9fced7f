pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod session;
pub mod types;

// Domain rules with no I/O
pub mod classify;
pub mod document;
pub mod validation;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub mod observability;
pub mod server;
