// src/lib.rs

pub mod api;
pub mod app;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod errors;
pub mod logging;
pub mod models;
pub mod selection;
pub mod status_indicator;
pub mod ui;
pub mod upload;
