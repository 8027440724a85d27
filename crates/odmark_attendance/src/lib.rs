// --- File: crates/odmark_attendance/src/lib.rs ---
// Declare modules within this crate
pub mod auth;
pub mod doc;
pub mod events;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_test;
pub mod models;
pub mod routes;
pub mod sink;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;
