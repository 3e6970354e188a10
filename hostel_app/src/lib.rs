// hostel_app/src/lib.rs

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod web;
