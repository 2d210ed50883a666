//! Business logic services.

pub mod order;
