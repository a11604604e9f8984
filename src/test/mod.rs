//! Shared fixtures for unit tests.


pub use builder::*;
