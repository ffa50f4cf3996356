pub mod config;
pub mod deliveries;
pub mod mail;
