//! Physical query plan steps, pipeline descriptions, and rendering of EXPLAIN
//! output for plans.
pub mod config;
pub mod describe;
pub mod explain;
pub mod plan;
pub mod processor;
pub mod stream;
