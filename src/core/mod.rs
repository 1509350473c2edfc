pub mod api;
pub mod config;
pub mod credits;
pub mod formatter;
pub mod logging;
pub mod models;
pub mod store;
