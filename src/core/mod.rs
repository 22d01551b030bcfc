// src/core/mod.rs

/// Request and response data structures shared by the scanners and the router.
pub mod models;

/// The error type every scan reports back through.
pub mod errors;

/// Spawns external tools under a timeout and normalizes their outcome.
pub mod runner;

/// One module per scan type exposed by the API.
pub mod scanner;
