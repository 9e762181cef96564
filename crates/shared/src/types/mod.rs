//! Common types used across the application.

pub mod id;

pub use id::*;

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
