/// Application configuration loading from config.toml
pub mod app;

/// Catalog seed tables from config.toml
pub mod catalog;

/// Database configuration and connection management
pub mod database;

/// Pricing policy settings
pub mod pricing;
