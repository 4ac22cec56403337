//! Stamina components

pub mod config;
pub mod controller;


// Re-export all components
pub use config::*;
pub use controller::*;
