pub mod app;
pub mod auth;
pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod healthcheck;
pub mod state;
pub mod telemetry;
pub mod users;
