/// Database configuration and connection management
pub mod database;

/// Location seed configuration loading from locations.toml
pub mod locations;
