pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod navigation;
pub mod resume;
pub mod session;
pub mod store;
