//! Database models and API bodies.

pub mod order;
