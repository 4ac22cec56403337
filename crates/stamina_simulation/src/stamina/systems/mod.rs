//! Stamina systems (authority + observer + caller side)

pub mod requests;
pub mod tick;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod systems_tests;

// Re-export all systems
pub use requests::*;
pub use tick::*;
